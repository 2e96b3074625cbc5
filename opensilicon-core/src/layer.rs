use serde::{Deserialize, Serialize};

use crate::geometry::{Geometry, GeometryKind};

/// Electrical role of a layer alias, as far as extraction is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerRole {
    Poly,
    Diffusion,
    NWell,
    /// Routing conductor (local interconnect or metal).
    Metal,
    /// Contact or via cut between conductors.
    Cut,
    Other,
}

impl LayerRole {
    /// Classify a layer alias. Matching is case-insensitive and accepts the
    /// usual synonyms found in PDK layer maps.
    pub fn from_alias(alias: &str) -> Self {
        let alias = alias.trim().to_ascii_lowercase();
        match alias.as_str() {
            "poly" | "po" | "polysilicon" => LayerRole::Poly,
            "diff" | "diffusion" | "active" | "od" => LayerRole::Diffusion,
            "nwell" | "nw" | "n_well" => LayerRole::NWell,
            "li" | "li1" | "locali" => LayerRole::Metal,
            "licon" | "licon1" | "mcon" | "contact" | "cont" => LayerRole::Cut,
            a if a.starts_with("via") => LayerRole::Cut,
            a if is_metal_alias(a) => LayerRole::Metal,
            _ => LayerRole::Other,
        }
    }

    /// Role of a concrete geometry. Via-shaped geometries are cuts whatever
    /// layer they are drawn on.
    pub fn of(geometry: &Geometry) -> Self {
        if geometry.kind == GeometryKind::Via {
            return LayerRole::Cut;
        }
        Self::from_alias(&geometry.layer)
    }

    /// Whether geometry on this role carries wire or contact resistance.
    pub fn is_conductor(&self) -> bool {
        matches!(self, LayerRole::Metal | LayerRole::Cut)
    }
}

/// `met1`, `metal2`, `m3` ...
fn is_metal_alias(alias: &str) -> bool {
    let digits = alias
        .strip_prefix("metal")
        .or_else(|| alias.strip_prefix("met"))
        .or_else(|| alias.strip_prefix('m'));
    match digits {
        Some(d) => !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}
