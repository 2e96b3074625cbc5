//! Remediation actions and summary counts derived from mappings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use opensilicon_core::ParamValue;

use crate::mapping::{SyncMapping, SyncStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncActionKind {
    CreateLayoutDevice,
    CreateSchematicSymbol,
    UpdateLayoutParams,
    UpdateSchematicParams,
    FixNetConnection,
    RemoveExtraLayout,
    RemoveExtraSchematic,
}

impl SyncActionKind {
    /// Lower is more urgent.
    pub fn priority(&self) -> u8 {
        match self {
            SyncActionKind::CreateLayoutDevice => 1,
            SyncActionKind::CreateSchematicSymbol => 2,
            SyncActionKind::UpdateLayoutParams => 3,
            SyncActionKind::UpdateSchematicParams => 4,
            SyncActionKind::FixNetConnection => 5,
            SyncActionKind::RemoveExtraLayout => 6,
            SyncActionKind::RemoveExtraSchematic => 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAction {
    #[serde(rename = "type")]
    pub kind: SyncActionKind,
    pub description: String,
    pub instance_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_params: Option<BTreeMap<String, ParamValue>>,
    pub priority: u8,
}

impl SyncAction {
    fn for_mapping(kind: SyncActionKind, mapping: &SyncMapping, description: String) -> Self {
        Self {
            kind,
            description,
            instance_name: mapping.instance_name.clone(),
            mapping_id: Some(mapping.id),
            suggested_params: None,
            priority: kind.priority(),
        }
    }

    fn with_suggested(mut self, params: BTreeMap<String, ParamValue>) -> Self {
        self.suggested_params = Some(params);
        self
    }
}

/// Per-status counts. The five status buckets partition the mapping list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub total: usize,
    pub synced: usize,
    pub param_mismatches: usize,
    pub missing_in_layout: usize,
    pub missing_in_schematic: usize,
    pub unlinked: usize,
    /// Pins of linked mappings without a layout net.
    pub net_mismatches: usize,
}

impl SyncSummary {
    pub fn bucket_total(&self) -> usize {
        self.synced
            + self.param_mismatches
            + self.missing_in_layout
            + self.missing_in_schematic
            + self.unlinked
    }
}

pub fn summarize(mappings: &[SyncMapping]) -> SyncSummary {
    let count = |status: SyncStatus| {
        mappings
            .iter()
            .filter(|m| m.status() == status)
            .count()
    };
    SyncSummary {
        total: mappings.len(),
        synced: count(SyncStatus::Synced),
        param_mismatches: count(SyncStatus::ParamMismatch),
        missing_in_layout: count(SyncStatus::MissingLayout),
        missing_in_schematic: count(SyncStatus::MissingSchematic),
        unlinked: count(SyncStatus::Unlinked),
        net_mismatches: mappings.iter().map(SyncMapping::unconnected_pins).sum(),
    }
}

/// Derive the action list, sorted by priority with discovery order kept
/// among equals.
///
/// Parameter mismatches always get both an update-layout and an
/// update-schematic action so either side can be chosen as the reference.
/// Net mismatches are only counted in the summary.
pub fn plan_actions(mappings: &[SyncMapping]) -> Vec<SyncAction> {
    let mut actions = Vec::new();
    for mapping in mappings {
        match mapping.status() {
            SyncStatus::MissingLayout => actions.push(SyncAction::for_mapping(
                SyncActionKind::CreateLayoutDevice,
                mapping,
                format!(
                    "Create layout for {} ({})",
                    mapping.instance_name, mapping.device_type
                ),
            )),
            SyncStatus::MissingSchematic => actions.push(SyncAction::for_mapping(
                SyncActionKind::CreateSchematicSymbol,
                mapping,
                format!(
                    "Add schematic symbol for layout device {} ({})",
                    mapping.instance_name, mapping.device_type
                ),
            )),
            SyncStatus::ParamMismatch => {
                let names = mapping
                    .deltas
                    .iter()
                    .map(|d| d.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let schematic_values = mapping
                    .deltas
                    .iter()
                    .filter(|d| !d.schematic_missing())
                    .map(|d| (d.name.clone(), d.schematic_value.clone()))
                    .collect();
                let layout_values = mapping
                    .deltas
                    .iter()
                    .filter(|d| !d.layout_missing())
                    .map(|d| (d.name.clone(), d.layout_value.clone()))
                    .collect();
                actions.push(
                    SyncAction::for_mapping(
                        SyncActionKind::UpdateLayoutParams,
                        mapping,
                        format!(
                            "Update layout of {} to schematic values ({})",
                            mapping.instance_name, names
                        ),
                    )
                    .with_suggested(schematic_values),
                );
                actions.push(
                    SyncAction::for_mapping(
                        SyncActionKind::UpdateSchematicParams,
                        mapping,
                        format!(
                            "Update schematic of {} to layout values ({})",
                            mapping.instance_name, names
                        ),
                    )
                    .with_suggested(layout_values),
                );
            }
            SyncStatus::Synced | SyncStatus::Unlinked => {}
        }
    }
    actions.sort_by_key(|a| a.priority);
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::ParameterDelta;
    use crate::schematic::SchematicDevice;
    use opensilicon_core::{DeviceKind, NetlistDevice};

    fn layout(name: &str) -> NetlistDevice {
        NetlistDevice {
            name: name.to_string(),
            kind: DeviceKind::Nmos,
            model: "nfet".to_string(),
            terminals: BTreeMap::new(),
            params: BTreeMap::new(),
            source_geometry: vec![],
        }
    }

    fn mismatch(name: &str) -> SyncMapping {
        let schematic = SchematicDevice::new(name, DeviceKind::Nmos);
        let deltas = vec![
            ParameterDelta {
                name: "w".into(),
                schematic_value: 0.84.into(),
                layout_value: 0.80.into(),
                percent_diff: Some(4.76),
            },
            ParameterDelta {
                name: "nf".into(),
                schematic_value: 2.0.into(),
                layout_value: "missing".into(),
                percent_diff: None,
            },
        ];
        SyncMapping::matched(&schematic, &layout(name), BTreeMap::new(), deltas)
    }

    #[test]
    fn test_mismatch_yields_both_directions() {
        let actions = plan_actions(&[mismatch("M1")]);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].kind, SyncActionKind::UpdateLayoutParams);
        assert_eq!(actions[0].priority, 3);
        assert_eq!(actions[1].kind, SyncActionKind::UpdateSchematicParams);
        assert_eq!(actions[1].priority, 4);

        let to_layout = actions[0].suggested_params.as_ref().unwrap();
        assert_eq!(to_layout["w"], ParamValue::Number(0.84));
        assert_eq!(to_layout["nf"], ParamValue::Number(2.0));
        let to_schematic = actions[1].suggested_params.as_ref().unwrap();
        assert_eq!(to_schematic["w"], ParamValue::Number(0.80));
        assert!(!to_schematic.contains_key("nf"));
    }

    #[test]
    fn test_actions_sorted_stably() {
        let mappings = vec![
            mismatch("M1"),
            SyncMapping::missing_schematic(&layout("M2")),
            SyncMapping::missing_layout(&SchematicDevice::new("R0", DeviceKind::Resistor)),
            SyncMapping::missing_layout(&SchematicDevice::new("R1", DeviceKind::Resistor)),
        ];
        let actions = plan_actions(&mappings);
        let order: Vec<_> = actions
            .iter()
            .map(|a| (a.priority, a.instance_name.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![(1, "R0"), (1, "R1"), (2, "M2"), (3, "M1"), (4, "M1")]
        );
        assert!(actions.windows(2).all(|w| w[0].priority <= w[1].priority));
    }

    #[test]
    fn test_summary_partitions_mappings() {
        let linked = SyncMapping::matched(
            &SchematicDevice::new("M0", DeviceKind::Nmos),
            &layout("M0"),
            [("D".to_string(), String::new()), ("G".to_string(), "n1".to_string())]
                .into_iter()
                .collect(),
            vec![],
        );
        let mappings = vec![
            linked,
            mismatch("M1"),
            SyncMapping::missing_schematic(&layout("M2")),
            SyncMapping::missing_layout(&SchematicDevice::new("R0", DeviceKind::Resistor)),
        ];
        let summary = summarize(&mappings);
        assert_eq!(summary.synced, 1);
        assert_eq!(summary.param_mismatches, 1);
        assert_eq!(summary.missing_in_layout, 1);
        assert_eq!(summary.missing_in_schematic, 1);
        assert_eq!(summary.net_mismatches, 1);
        assert_eq!(summary.bucket_total(), summary.total);
        // Net mismatches are counted, not emitted.
        assert!(plan_actions(&mappings)
            .iter()
            .all(|a| a.kind != SyncActionKind::FixNetConnection));
    }
}
