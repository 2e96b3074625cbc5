//! Refinement of name-based mappings with connectivity-verified LVS results.
//!
//! An LVS match is authoritative over the name-only pairing: it replaces the
//! mapping's geometry, status and parameter deltas.

use serde::{Deserialize, Serialize};

use opensilicon_core::ParamValue;

use crate::compare::delta_for;
use crate::mapping::{SyncMapping, SyncStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LvsMatchStatus {
    Match,
    Mismatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LvsParamCheck {
    pub name: String,
    #[serde(default)]
    pub schematic_value: Option<ParamValue>,
    #[serde(default)]
    pub layout_value: Option<ParamValue>,
    pub within_tolerance: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LvsDeviceMatch {
    pub schematic_device: String,
    pub layout_device: String,
    pub status: LvsMatchStatus,
    pub layout_geometry: Vec<usize>,
    #[serde(default)]
    pub parameters: Vec<LvsParamCheck>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LvsResult {
    pub matches: Vec<LvsDeviceMatch>,
}

impl From<LvsMatchStatus> for SyncStatus {
    fn from(status: LvsMatchStatus) -> Self {
        match status {
            LvsMatchStatus::Match => SyncStatus::Synced,
            LvsMatchStatus::Mismatch => SyncStatus::ParamMismatch,
        }
    }
}

/// Return a copy of `mappings` upgraded with `lvs`.
///
/// Each LVS match updates the first mapping whose instance name equals its
/// schematic or layout device name, ignoring case. Matches with no
/// corresponding mapping are ignored.
pub fn refine_with_lvs(mappings: &[SyncMapping], lvs: &LvsResult) -> Vec<SyncMapping> {
    let mut refined = mappings.to_vec();
    let mut applied = 0usize;

    for device in &lvs.matches {
        let target = refined.iter_mut().find(|m| {
            m.instance_name.eq_ignore_ascii_case(&device.schematic_device)
                || m.instance_name.eq_ignore_ascii_case(&device.layout_device)
        });
        let Some(mapping) = target else {
            log::debug!(
                "LVS match {} <-> {} has no mapping",
                device.schematic_device,
                device.layout_device
            );
            continue;
        };

        mapping.layout_geometry = device.layout_geometry.clone();
        mapping.layout_instance_id = Some(device.layout_device.clone());
        let deltas = device
            .parameters
            .iter()
            .filter(|p| !p.within_tolerance)
            .filter_map(|p| {
                delta_for(&p.name, p.schematic_value.as_ref(), p.layout_value.as_ref())
            })
            .collect();
        mapping.apply_lvs(device.status.into(), deltas);
        applied += 1;
    }

    log::info!(
        "LVS refined {} of {} mappings",
        applied,
        refined.len()
    );
    refined
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use opensilicon_core::{DeviceKind, NetlistDevice};

    use crate::compare::ParameterDelta;
    use crate::schematic::SchematicDevice;

    fn linked(name: &str, deltas: Vec<ParameterDelta>) -> SyncMapping {
        let layout = NetlistDevice {
            name: name.to_string(),
            kind: DeviceKind::Nmos,
            model: "nfet".into(),
            terminals: BTreeMap::new(),
            params: BTreeMap::new(),
            source_geometry: vec![0, 1],
        };
        SyncMapping::matched(
            &SchematicDevice::new(name, DeviceKind::Nmos),
            &layout,
            BTreeMap::new(),
            deltas,
        )
    }

    fn check(name: &str, s: f64, l: f64, ok: bool) -> LvsParamCheck {
        LvsParamCheck {
            name: name.into(),
            schematic_value: Some(s.into()),
            layout_value: Some(l.into()),
            within_tolerance: ok,
        }
    }

    #[test]
    fn test_lvs_overrides_name_match() {
        let original = vec![
            linked("M0", vec![]),
            linked(
                "M1",
                vec![ParameterDelta {
                    name: "w".into(),
                    schematic_value: 0.84.into(),
                    layout_value: 0.80.into(),
                    percent_diff: Some(4.76),
                }],
            ),
        ];
        let lvs = LvsResult {
            matches: vec![
                LvsDeviceMatch {
                    schematic_device: "m0".into(),
                    layout_device: "XM0".into(),
                    status: LvsMatchStatus::Mismatch,
                    layout_geometry: vec![4, 5],
                    parameters: vec![check("w", 1.0, 1.06, false), check("l", 0.15, 0.15, true)],
                },
                LvsDeviceMatch {
                    schematic_device: "M1".into(),
                    layout_device: "M1".into(),
                    status: LvsMatchStatus::Match,
                    layout_geometry: vec![7, 8],
                    parameters: vec![check("w", 0.84, 0.80, true)],
                },
            ],
        };

        let refined = refine_with_lvs(&original, &lvs);
        assert_eq!(refined[0].status(), SyncStatus::ParamMismatch);
        assert_eq!(refined[0].layout_geometry, vec![4, 5]);
        assert_eq!(refined[0].layout_instance_id.as_deref(), Some("XM0"));
        assert_eq!(refined[0].deltas.len(), 1);
        assert!((refined[0].deltas[0].percent_diff.unwrap() - 6.0).abs() < 1e-9);

        assert_eq!(refined[1].status(), SyncStatus::Synced);
        assert!(refined[1].deltas.is_empty());

        // The input is left alone.
        assert_eq!(original[0].status(), SyncStatus::Synced);
        assert_eq!(original[1].deltas.len(), 1);
    }

    #[test]
    fn test_missing_side_in_lvs_check() {
        let lvs = LvsResult {
            matches: vec![LvsDeviceMatch {
                schematic_device: "M0".into(),
                layout_device: "M0".into(),
                status: LvsMatchStatus::Mismatch,
                layout_geometry: vec![],
                parameters: vec![LvsParamCheck {
                    name: "nf".into(),
                    schematic_value: Some(2.0.into()),
                    layout_value: None,
                    within_tolerance: false,
                }],
            }],
        };
        let refined = refine_with_lvs(&[linked("M0", vec![])], &lvs);
        let delta = &refined[0].deltas[0];
        assert!(delta.layout_missing());
        assert_eq!(delta.percent_diff, None);
    }

    #[test]
    fn test_unmatched_lvs_entries_ignored() {
        let lvs = LvsResult {
            matches: vec![LvsDeviceMatch {
                schematic_device: "M9".into(),
                layout_device: "M9".into(),
                status: LvsMatchStatus::Match,
                layout_geometry: vec![1],
                parameters: vec![],
            }],
        };
        let original = vec![linked("M0", vec![])];
        assert_eq!(refine_with_lvs(&original, &lvs), original);
    }
}
