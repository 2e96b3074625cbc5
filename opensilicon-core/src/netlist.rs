use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the pre-seeded supply net.
pub const SUPPLY_NET: &str = "VDD";
/// Name of the pre-seeded ground net.
pub const GROUND_NET: &str = "GND";

/// Parameter keys exchanged between schematic and layout.
pub const DEVICE_PARAM_KEYS: [&str; 6] = ["w", "l", "nf", "r", "c", "mult"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Signal,
    Power,
    Ground,
    Io,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetlistNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

impl NetlistNode {
    pub fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Nmos,
    Pmos,
    Resistor,
    Capacitor,
}

impl DeviceKind {
    pub fn is_transistor(&self) -> bool {
        matches!(self, DeviceKind::Nmos | DeviceKind::Pmos)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Nmos => "nmos",
            DeviceKind::Pmos => "pmos",
            DeviceKind::Resistor => "resistor",
            DeviceKind::Capacitor => "capacitor",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schematic or layout parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric view of the value. Text that parses as a plain float counts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

/// A device recognized in the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetlistDevice {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    pub model: String,
    /// Terminal name (`drain`, `gate`, `source`, `body`, ...) to net name.
    pub terminals: BTreeMap<String, String>,
    pub params: BTreeMap<String, f64>,
    pub source_geometry: Vec<usize>,
}

impl NetlistDevice {
    pub fn terminal(&self, name: &str) -> Option<&str> {
        self.terminals.get(name).map(String::as_str)
    }

    pub fn param(&self, name: &str) -> Option<f64> {
        self.params.get(name).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParasiticKind {
    Resistor,
    Capacitor,
}

/// An unintended R or C between two nets. Resistors are in ohms, capacitors
/// in farads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParasiticElement {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParasiticKind,
    pub node_a: String,
    pub node_b: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_geometry: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    pub device_count: usize,
    pub node_count: usize,
    pub parasitic_count: usize,
    pub elapsed_ms: f64,
    /// Geometries handed to the extraction call.
    pub geometries_considered: usize,
    /// Geometries dropped for empty points or zero area.
    pub degenerate_geometries: usize,
    /// Conductor layers present in the layout but absent from the PDK table.
    pub skipped_layers: Vec<String>,
    /// Via shapes on wire layers, left without contact resistance.
    #[serde(default)]
    pub unresolved_vias: usize,
}

/// The result of one extraction call. Never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedNetlist {
    pub nodes: Vec<NetlistNode>,
    pub devices: Vec<NetlistDevice>,
    pub parasitics: Vec<ParasiticElement>,
    pub spice: String,
    pub timestamp: DateTime<Utc>,
    pub stats: ExtractionStats,
}

impl ExtractedNetlist {
    /// Names referenced by devices or parasitics that are neither registered
    /// nodes nor the global supplies. Empty for a well-formed netlist.
    pub fn dangling_references(&self) -> Vec<String> {
        let known: HashSet<&str> = self.nodes.iter().map(|n| n.name.as_str()).collect();
        let is_known = |name: &str| known.contains(name) || name == SUPPLY_NET || name == GROUND_NET;

        let mut dangling = Vec::new();
        let device_nets = self.devices.iter().flat_map(|d| d.terminals.values());
        let parasitic_nets = self
            .parasitics
            .iter()
            .flat_map(|p| [&p.node_a, &p.node_b]);
        for net in device_nets.chain(parasitic_nets) {
            if !is_known(net) && !dangling.contains(net) {
                dangling.push(net.clone());
            }
        }
        dangling
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
