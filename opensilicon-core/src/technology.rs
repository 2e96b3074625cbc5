use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TechnologyError {
    #[error("Invalid technology JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Layer '{layer}' has invalid sheet resistance {value}")]
    InvalidSheetResistance { layer: String, value: f64 },

    #[error("Via '{via}' has invalid contact resistance {value}")]
    InvalidContactResistance { via: String, value: f64 },
}

/// Conductor layer coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerTech {
    /// Ohms per square.
    pub sheet_resistance: f64,
}

/// Cut layer coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViaTech {
    /// Ohms per cut.
    pub contact_resistance: f64,
}

/// PDK technology table consumed by extraction.
///
/// Keys are layer aliases; lookups are case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technology {
    pub name: String,
    #[serde(default)]
    pub layers: BTreeMap<String, LayerTech>,
    #[serde(default)]
    pub vias: BTreeMap<String, ViaTech>,
    pub nmos_model: String,
    pub pmos_model: String,
}

impl Technology {
    pub fn new(name: &str, nmos_model: &str, pmos_model: &str) -> Self {
        Self {
            name: name.to_string(),
            layers: BTreeMap::new(),
            vias: BTreeMap::new(),
            nmos_model: nmos_model.to_string(),
            pmos_model: pmos_model.to_string(),
        }
    }

    pub fn with_layer(mut self, alias: &str, sheet_resistance: f64) -> Self {
        self.layers
            .insert(alias.to_ascii_lowercase(), LayerTech { sheet_resistance });
        self
    }

    pub fn with_via(mut self, alias: &str, contact_resistance: f64) -> Self {
        self.vias
            .insert(alias.to_ascii_lowercase(), ViaTech { contact_resistance });
        self
    }

    /// SkyWater 130nm typical-corner values.
    pub fn sky130() -> Self {
        Self::new(
            "sky130",
            "sky130_fd_pr__nfet_01v8",
            "sky130_fd_pr__pfet_01v8",
        )
        .with_layer("li1", 12.8)
        .with_layer("met1", 0.125)
        .with_layer("met2", 0.125)
        .with_layer("met3", 0.047)
        .with_layer("met4", 0.047)
        .with_layer("met5", 0.0285)
        .with_via("licon", 152.0)
        .with_via("mcon", 9.3)
        .with_via("via", 4.5)
        .with_via("via2", 3.41)
        .with_via("via3", 3.41)
        .with_via("via4", 0.38)
    }

    pub fn layer(&self, alias: &str) -> Option<&LayerTech> {
        self.layers
            .get(alias)
            .or_else(|| self.layers.get(&alias.to_ascii_lowercase()))
    }

    pub fn via(&self, alias: &str) -> Option<&ViaTech> {
        self.vias
            .get(alias)
            .or_else(|| self.vias.get(&alias.to_ascii_lowercase()))
    }

    /// Parse and validate a technology table. Keys are normalized to lower case.
    pub fn from_json(json: &str) -> Result<Self, TechnologyError> {
        let raw: Technology = serde_json::from_str(json)?;
        let tech = Technology {
            layers: raw
                .layers
                .into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v))
                .collect(),
            vias: raw
                .vias
                .into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v))
                .collect(),
            ..raw
        };
        tech.validate()?;
        log::info!(
            "Technology '{}': {} conductor layers, {} cut layers",
            tech.name,
            tech.layers.len(),
            tech.vias.len()
        );
        Ok(tech)
    }

    pub fn validate(&self) -> Result<(), TechnologyError> {
        for (layer, t) in &self.layers {
            if !t.sheet_resistance.is_finite() || t.sheet_resistance < 0.0 {
                return Err(TechnologyError::InvalidSheetResistance {
                    layer: layer.clone(),
                    value: t.sheet_resistance,
                });
            }
        }
        for (via, t) in &self.vias {
            if !t.contact_resistance.is_finite() || t.contact_resistance < 0.0 {
                return Err(TechnologyError::InvalidContactResistance {
                    via: via.clone(),
                    value: t.contact_resistance,
                });
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
