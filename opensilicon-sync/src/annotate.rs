//! Back-annotation of extracted values onto schematic devices.
//!
//! [`back_annotate`] never touches the schematic it reads. It returns a
//! [`ParameterUpdates`] map that the caller merges into its own parameter
//! store, one entry per device id.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use opensilicon_core::{
    ExtractedNetlist, NetlistDevice, ParamValue, ParasiticElement, ParasiticKind,
    DEVICE_PARAM_KEYS,
};

use crate::compare::round_to;
use crate::schematic::SchematicDevice;

/// Display-only key carrying the total parasitic resistance (Ω).
pub const PARASITIC_R_KEY: &str = "_parasitic_R";
/// Display-only key carrying the total parasitic capacitance (fF).
pub const PARASITIC_C_KEY: &str = "_parasitic_C_fF";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalParasitics {
    pub net: String,
    pub resistance: f64,
    pub capacitance_ff: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParasiticSummary {
    pub total_resistance: f64,
    pub total_capacitance_ff: f64,
    pub per_terminal: BTreeMap<String, TerminalParasitics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackAnnotation {
    pub instance_name: String,
    pub extracted_params: BTreeMap<String, f64>,
    pub parasitics: ParasiticSummary,
    /// Terminal name to net name.
    pub net_connections: BTreeMap<String, String>,
}

/// Sum the parasitics touching a device's nets.
///
/// A parasitic counts once toward the totals if either endpoint is on one of
/// the device's nets. Each terminal's breakdown uses only its own net, so an
/// element shared with another device is attributed to both.
pub fn summarize_parasitics(
    device: &NetlistDevice,
    parasitics: &[ParasiticElement],
) -> ParasiticSummary {
    let nets: BTreeSet<&str> = device.terminals.values().map(String::as_str).collect();
    let touches = |p: &ParasiticElement, net: &str| p.node_a == net || p.node_b == net;

    let mut summary = ParasiticSummary::default();
    for p in parasitics {
        if !nets.iter().any(|net| touches(p, *net)) {
            continue;
        }
        match p.kind {
            ParasiticKind::Resistor => summary.total_resistance += p.value,
            ParasiticKind::Capacitor => summary.total_capacitance_ff += p.value * 1e15,
        }
    }

    for (terminal, net) in &device.terminals {
        let mut entry = TerminalParasitics {
            net: net.clone(),
            ..Default::default()
        };
        for p in parasitics.iter().filter(|p| touches(p, net.as_str())) {
            match p.kind {
                ParasiticKind::Resistor => entry.resistance += p.value,
                ParasiticKind::Capacitor => entry.capacitance_ff += p.value * 1e15,
            }
        }
        summary.per_terminal.insert(terminal.clone(), entry);
    }
    summary
}

/// One annotation record per extracted device.
pub fn build_back_annotations(netlist: &ExtractedNetlist) -> Vec<BackAnnotation> {
    netlist
        .devices
        .iter()
        .map(|device| BackAnnotation {
            instance_name: device.name.clone(),
            extracted_params: device.params.clone(),
            parasitics: summarize_parasitics(device, &netlist.parasitics),
            net_connections: device.terminals.clone(),
        })
        .collect()
}

/// New parameter maps keyed by schematic device id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterUpdates {
    updates: BTreeMap<Uuid, BTreeMap<String, ParamValue>>,
}

impl ParameterUpdates {
    pub fn get(&self, device_id: &Uuid) -> Option<&BTreeMap<String, ParamValue>> {
        self.updates.get(device_id)
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Compute updated parameter maps for every schematic device that has an
/// annotation with the same instance name (case-insensitive).
///
/// Only device parameters (`w`, `l`, `nf`, `mult`, `r`, `c`) are copied over
/// the existing map; other keys are kept. The parasitic totals are added
/// under [`PARASITIC_R_KEY`] and [`PARASITIC_C_KEY`], rounded to three
/// decimals.
pub fn back_annotate(
    annotations: &[BackAnnotation],
    schematic: &[SchematicDevice],
) -> ParameterUpdates {
    let mut updates = BTreeMap::new();
    for device in schematic {
        let Some(annotation) = annotations
            .iter()
            .find(|a| a.instance_name.eq_ignore_ascii_case(&device.instance_name))
        else {
            continue;
        };

        let mut params = device.parameters.clone();
        for key in DEVICE_PARAM_KEYS {
            if let Some(value) = annotation.extracted_params.get(key) {
                params.insert(key.to_string(), ParamValue::Number(*value));
            }
        }
        params.insert(
            PARASITIC_R_KEY.to_string(),
            ParamValue::Number(round_to(annotation.parasitics.total_resistance, 3)),
        );
        params.insert(
            PARASITIC_C_KEY.to_string(),
            ParamValue::Number(round_to(annotation.parasitics.total_capacitance_ff, 3)),
        );
        updates.insert(device.id, params);
    }
    log::debug!(
        "Back-annotated {} of {} schematic devices",
        updates.len(),
        schematic.len()
    );
    ParameterUpdates { updates }
}
