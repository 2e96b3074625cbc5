//! # OpenSilicon Sync
//!
//! Two-way reconciliation between a schematic device list and an extracted
//! layout netlist: name-based device mapping, tolerance-based parameter
//! comparison, prioritized remediation actions, LVS refinement, and
//! back-annotation of extracted values.
//!
//! Every stage takes its inputs by reference and returns new values; callers
//! own the schematic and apply updates themselves.

pub mod annotate;
pub mod compare;
pub mod lvs;
pub mod mapper;
pub mod mapping;
pub mod planner;
pub mod report;
pub mod schematic;

pub use annotate::{
    back_annotate, build_back_annotations, summarize_parasitics, BackAnnotation,
    ParameterUpdates, ParasiticSummary, TerminalParasitics, PARASITIC_C_KEY, PARASITIC_R_KEY,
};
pub use compare::{percent_diff, ParameterComparator, ParameterDelta, MISSING};
pub use lvs::{refine_with_lvs, LvsDeviceMatch, LvsMatchStatus, LvsParamCheck, LvsResult};
pub use mapper::{duplicate_names, pin_to_terminal, SyncMapper};
pub use mapping::{SyncMapping, SyncStatus};
pub use planner::{plan_actions, summarize, SyncAction, SyncActionKind, SyncSummary};
pub use report::{reconcile, reconcile_with_lvs, SyncOptions, SyncReport};
pub use schematic::{SchematicDevice, SchematicPin};
