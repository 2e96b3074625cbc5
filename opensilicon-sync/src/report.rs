use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use opensilicon_core::NetlistDevice;

use crate::compare::{ParameterComparator, DEFAULT_TOLERANCE};
use crate::lvs::{refine_with_lvs, LvsResult};
use crate::mapper::SyncMapper;
use crate::mapping::SyncMapping;
use crate::planner::{plan_actions, summarize, SyncAction, SyncSummary};
use crate::schematic::SchematicDevice;

/// Reconciliation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncOptions {
    /// Flag threshold compared against each parameter's percent difference.
    pub tolerance: f64,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub timestamp: DateTime<Utc>,
    pub duration_ms: f64,
    pub mappings: Vec<SyncMapping>,
    /// Sorted by ascending priority.
    pub actions: Vec<SyncAction>,
    pub summary: SyncSummary,
}

impl SyncReport {
    /// Plan actions and summarize an already-built mapping list.
    pub fn from_mappings(mappings: Vec<SyncMapping>, started: Instant) -> Self {
        let actions = plan_actions(&mappings);
        let summary = summarize(&mappings);
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        log::info!(
            "Sync: {} mappings ({} synced, {} mismatched, {} missing in layout, {} missing in schematic), {} actions",
            summary.total,
            summary.synced,
            summary.param_mismatches,
            summary.missing_in_layout,
            summary.missing_in_schematic,
            actions.len()
        );
        Self {
            timestamp: Utc::now(),
            duration_ms,
            mappings,
            actions,
            summary,
        }
    }

    pub fn mapping(&self, instance_name: &str) -> Option<&SyncMapping> {
        self.mappings
            .iter()
            .find(|m| m.instance_name.eq_ignore_ascii_case(instance_name))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Map, compare and plan in one pass.
pub fn reconcile(
    schematic: &[SchematicDevice],
    layout: &[NetlistDevice],
    options: &SyncOptions,
) -> SyncReport {
    let started = Instant::now();
    let comparator = ParameterComparator::new(options.tolerance);
    let mappings = SyncMapper::new(&comparator).map(schematic, layout);
    SyncReport::from_mappings(mappings, started)
}

/// Like [`reconcile`], with LVS results applied before planning.
pub fn reconcile_with_lvs(
    schematic: &[SchematicDevice],
    layout: &[NetlistDevice],
    lvs: &LvsResult,
    options: &SyncOptions,
) -> SyncReport {
    let started = Instant::now();
    let comparator = ParameterComparator::new(options.tolerance);
    let mappings = SyncMapper::new(&comparator).map(schematic, layout);
    SyncReport::from_mappings(refine_with_lvs(&mappings, lvs), started)
}
