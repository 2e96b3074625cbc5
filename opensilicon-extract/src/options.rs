use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Tunables for one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractionOptions {
    /// Wire width (µm) assumed for paths drawn without one.
    pub default_wire_width: f64,
    /// Wire resistances below this (Ω) are dropped as noise.
    pub noise_floor_ohms: f64,
    /// Title written into the SPICE header.
    pub title: String,
    /// Write the generation time into the SPICE header. Turn off for
    /// byte-identical decks across runs.
    pub include_timestamp: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            default_wire_width: 0.14, // sky130 met1 minimum width
            noise_floor_ohms: 0.01,
            title: "OpenSilicon extracted netlist".to_string(),
            include_timestamp: true,
        }
    }
}

impl ExtractionOptions {
    pub fn from_json(json: &str) -> Result<Self, ExtractError> {
        let options: ExtractionOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ExtractError> {
        if !(self.default_wire_width > 0.0) || !self.default_wire_width.is_finite() {
            return Err(ExtractError::InvalidOptions(format!(
                "default wire width must be positive, got {}",
                self.default_wire_width
            )));
        }
        if !(self.noise_floor_ohms >= 0.0) {
            return Err(ExtractError::InvalidOptions(format!(
                "noise floor must be non-negative, got {}",
                self.noise_floor_ohms
            )));
        }
        Ok(())
    }
}
