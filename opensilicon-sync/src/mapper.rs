//! Name-based pairing of schematic devices with layout devices.
//!
//! Names are compared case-insensitively in a single pass. Each layout device
//! is claimed at most once and the first candidate wins when names repeat.

use std::collections::{BTreeMap, HashMap};

use opensilicon_core::{DeviceKind, NetlistDevice};

use crate::compare::ParameterComparator;
use crate::mapping::SyncMapping;
use crate::schematic::SchematicDevice;

/// Translate a schematic pin name to the layout terminal it corresponds to.
pub fn pin_to_terminal(kind: DeviceKind, pin: &str) -> String {
    let upper = pin.trim().to_ascii_uppercase();
    let mapped = match kind {
        DeviceKind::Nmos | DeviceKind::Pmos => match upper.as_str() {
            "D" | "DRAIN" => Some("drain"),
            "G" | "GATE" => Some("gate"),
            "S" | "SOURCE" => Some("source"),
            "B" | "BODY" | "BULK" => Some("body"),
            _ => None,
        },
        DeviceKind::Resistor | DeviceKind::Capacitor => match upper.as_str() {
            "A" | "+" => Some("plus"),
            "B" | "-" | "K" => Some("minus"),
            _ => None,
        },
    };
    mapped
        .map(str::to_string)
        .unwrap_or_else(|| pin.trim().to_ascii_lowercase())
}

/// Names occurring more than once, compared case-insensitively. Each name is
/// reported once, spelled as at its first repeat.
pub fn duplicate_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut duplicates = Vec::new();
    for name in names {
        let count = seen.entry(name.to_ascii_lowercase()).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push(name.to_string());
        }
    }
    duplicates
}

pub struct SyncMapper<'a> {
    comparator: &'a ParameterComparator,
}

impl<'a> SyncMapper<'a> {
    pub fn new(comparator: &'a ParameterComparator) -> Self {
        Self { comparator }
    }

    /// Map every schematic and layout device to exactly one mapping.
    ///
    /// Mappings come in schematic order, followed by unclaimed layout devices
    /// in layout order.
    pub fn map(
        &self,
        schematic: &[SchematicDevice],
        layout: &[NetlistDevice],
    ) -> Vec<SyncMapping> {
        for name in duplicate_names(schematic.iter().map(|d| d.instance_name.as_str())) {
            log::warn!("Duplicate schematic instance '{}', first match wins", name);
        }
        for name in duplicate_names(layout.iter().map(|d| d.name.as_str())) {
            log::warn!("Duplicate layout instance '{}', first match wins", name);
        }

        let mut claimed = vec![false; layout.len()];
        let mut mappings = Vec::with_capacity(schematic.len() + layout.len());

        for device in schematic {
            let found = layout.iter().enumerate().find(|(i, l)| {
                !claimed[*i] && l.name.eq_ignore_ascii_case(&device.instance_name)
            });
            match found {
                Some((i, layout_device)) => {
                    claimed[i] = true;
                    mappings.push(self.link(device, layout_device));
                }
                None => mappings.push(SyncMapping::missing_layout(device)),
            }
        }

        for (device, _) in layout.iter().zip(&claimed).filter(|(_, c)| !**c) {
            mappings.push(SyncMapping::missing_schematic(device));
        }
        mappings
    }

    fn link(&self, schematic: &SchematicDevice, layout: &NetlistDevice) -> SyncMapping {
        let pin_nets: BTreeMap<String, String> = schematic
            .pins
            .iter()
            .map(|pin| {
                let terminal = pin_to_terminal(schematic.kind, &pin.name);
                let net = layout.terminal(&terminal).unwrap_or_default().to_string();
                (pin.name.clone(), net)
            })
            .collect();
        let deltas = self.comparator.compare(&schematic.parameters, &layout.params);
        SyncMapping::matched(schematic, layout, pin_nets, deltas)
    }
}
