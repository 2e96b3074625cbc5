use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use opensilicon_core::{DeviceKind, NetlistDevice};

use crate::compare::ParameterDelta;
use crate::schematic::SchematicDevice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    Synced,
    ParamMismatch,
    MissingLayout,
    MissingSchematic,
    Unlinked,
}

impl SyncStatus {
    /// Status follows from which sides are present and whether any
    /// parameter was flagged.
    pub fn derive(has_schematic: bool, has_layout: bool, has_deltas: bool) -> Self {
        match (has_schematic, has_layout) {
            (true, true) if has_deltas => SyncStatus::ParamMismatch,
            (true, true) => SyncStatus::Synced,
            (true, false) => SyncStatus::MissingLayout,
            (false, true) => SyncStatus::MissingSchematic,
            (false, false) => SyncStatus::Unlinked,
        }
    }

    pub fn is_linked(&self) -> bool {
        matches!(self, SyncStatus::Synced | SyncStatus::ParamMismatch)
    }
}

/// Pairing of one schematic device with its layout counterpart, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMapping {
    pub id: Uuid,
    pub schematic_id: Option<Uuid>,
    pub instance_name: String,
    pub device_type: DeviceKind,
    pub layout_geometry: Vec<usize>,
    pub layout_instance_id: Option<String>,
    /// Schematic pin name to layout net. Empty when the pin has no layout
    /// terminal.
    pub pin_nets: BTreeMap<String, String>,
    status: SyncStatus,
    pub deltas: Vec<ParameterDelta>,
}

impl SyncMapping {
    pub fn matched(
        schematic: &SchematicDevice,
        layout: &NetlistDevice,
        pin_nets: BTreeMap<String, String>,
        deltas: Vec<ParameterDelta>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            schematic_id: Some(schematic.id),
            instance_name: schematic.instance_name.clone(),
            device_type: schematic.kind,
            layout_geometry: layout.source_geometry.clone(),
            layout_instance_id: Some(layout.name.clone()),
            pin_nets,
            status: SyncStatus::derive(true, true, !deltas.is_empty()),
            deltas,
        }
    }

    pub fn missing_layout(schematic: &SchematicDevice) -> Self {
        Self {
            id: Uuid::new_v4(),
            schematic_id: Some(schematic.id),
            instance_name: schematic.instance_name.clone(),
            device_type: schematic.kind,
            layout_geometry: Vec::new(),
            layout_instance_id: None,
            pin_nets: BTreeMap::new(),
            status: SyncStatus::derive(true, false, false),
            deltas: Vec::new(),
        }
    }

    pub fn missing_schematic(layout: &NetlistDevice) -> Self {
        Self {
            id: Uuid::new_v4(),
            schematic_id: None,
            instance_name: layout.name.clone(),
            device_type: layout.kind,
            layout_geometry: layout.source_geometry.clone(),
            layout_instance_id: Some(layout.name.clone()),
            pin_nets: layout.terminals.clone(),
            status: SyncStatus::derive(false, true, false),
            deltas: Vec::new(),
        }
    }

    /// Derived from which sides are present and the parameter deltas, or
    /// taken from an LVS verdict.
    pub fn status(&self) -> SyncStatus {
        self.status
    }

    /// Replace status and deltas with an LVS verdict. LVS results are the
    /// only source allowed to override the derived status.
    pub(crate) fn apply_lvs(&mut self, status: SyncStatus, deltas: Vec<ParameterDelta>) {
        self.status = status;
        self.deltas = deltas;
    }

    /// Pins of a linked mapping that found no layout net.
    pub fn unconnected_pins(&self) -> usize {
        if !self.status.is_linked() {
            return 0;
        }
        self.pin_nets.values().filter(|net| net.is_empty()).count()
    }
}
