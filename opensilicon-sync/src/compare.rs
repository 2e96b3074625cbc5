//! Tolerance-based parameter comparison.
//!
//! Only the keys in [`DEVICE_PARAM_KEYS`] are compared. Numeric pairs are
//! flagged when their percent difference exceeds the tolerance; a value present
//! on one side only is always flagged, with the absent side recorded as
//! `"missing"`; non-numeric pairs are flagged when the strings differ.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use opensilicon_core::{ParamValue, DEVICE_PARAM_KEYS};

/// Placeholder recorded for the absent side of a one-sided parameter.
pub const MISSING: &str = "missing";

/// Default flag threshold, compared against the percent difference.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDelta {
    pub name: String,
    pub schematic_value: ParamValue,
    pub layout_value: ParamValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_diff: Option<f64>,
}

impl ParameterDelta {
    pub fn schematic_missing(&self) -> bool {
        is_missing(&self.schematic_value)
    }

    pub fn layout_missing(&self) -> bool {
        is_missing(&self.layout_value)
    }
}

fn is_missing(v: &ParamValue) -> bool {
    matches!(v, ParamValue::Text(s) if s == MISSING)
}

/// `|schematic - layout| / max(|schematic|, 1e-18)`, in percent.
pub fn percent_diff(schematic: f64, layout: f64) -> f64 {
    (schematic - layout).abs() / schematic.abs().max(1e-18) * 100.0
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Build the delta for a pair of values regardless of tolerance. Returns
/// `None` when both sides are absent.
pub(crate) fn delta_for(
    name: &str,
    schematic: Option<&ParamValue>,
    layout: Option<&ParamValue>,
) -> Option<ParameterDelta> {
    let missing = || ParamValue::Text(MISSING.to_string());
    let percent = match (schematic.and_then(|v| v.as_f64()), layout.and_then(|v| v.as_f64())) {
        (Some(s), Some(l)) => Some(round_to(percent_diff(s, l), 2)),
        _ => None,
    };
    if schematic.is_none() && layout.is_none() {
        return None;
    }
    Some(ParameterDelta {
        name: name.to_string(),
        schematic_value: schematic.cloned().unwrap_or_else(missing),
        layout_value: layout.cloned().unwrap_or_else(missing),
        percent_diff: percent,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct ParameterComparator {
    tolerance: f64,
}

impl Default for ParameterComparator {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl ParameterComparator {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Compare one pair of values, returning a delta only when flagged.
    pub fn compare_value(
        &self,
        name: &str,
        schematic: Option<&ParamValue>,
        layout: Option<&ParamValue>,
    ) -> Option<ParameterDelta> {
        let (s, l) = match (schematic, layout) {
            (None, None) => return None,
            (Some(_), None) | (None, Some(_)) => return delta_for(name, schematic, layout),
            (Some(s), Some(l)) => (s, l),
        };
        let flagged = match (s.as_f64(), l.as_f64()) {
            (Some(sv), Some(lv)) => percent_diff(sv, lv) > self.tolerance,
            _ => s.to_string() != l.to_string(),
        };
        if flagged {
            delta_for(name, schematic, layout)
        } else {
            None
        }
    }

    /// Compare a schematic parameter map against a layout device's numeric
    /// parameters.
    pub fn compare(
        &self,
        schematic: &BTreeMap<String, ParamValue>,
        layout: &BTreeMap<String, f64>,
    ) -> Vec<ParameterDelta> {
        DEVICE_PARAM_KEYS
            .iter()
            .filter_map(|key| {
                let layout_value = layout.get(*key).map(|v| ParamValue::Number(*v));
                self.compare_value(key, schematic.get(*key), layout_value.as_ref())
            })
            .collect()
    }
}
