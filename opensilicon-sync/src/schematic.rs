use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use opensilicon_core::{DeviceKind, ParamValue};

/// A pin of a schematic symbol and the net it is wired to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchematicPin {
    pub name: String,
    pub net: String,
}

/// A device instance as the schematic editor knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchematicDevice {
    pub id: Uuid,
    pub instance_name: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    #[serde(default)]
    pub pins: Vec<SchematicPin>,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,
}

impl SchematicDevice {
    pub fn new(instance_name: &str, kind: DeviceKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            instance_name: instance_name.to_string(),
            kind,
            pins: Vec::new(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_pin(mut self, name: &str, net: &str) -> Self {
        self.pins.push(SchematicPin {
            name: name.to_string(),
            net: net.to_string(),
        });
        self
    }

    pub fn with_param(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }
}
