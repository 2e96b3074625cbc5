//! # OpenSilicon Core
//!
//! Shared vocabulary of the extraction and reconciliation crates: flattened
//! layout geometry, layer roles, the R-tree spatial index, PDK technology
//! tables, and the extracted netlist data model.

pub mod geometry;
pub mod layer;
pub mod netlist;
pub mod spatial;
pub mod technology;

pub use geometry::{BBox, Geometry, GeometryKind, Point};
pub use layer::LayerRole;
pub use netlist::{
    DeviceKind, ExtractedNetlist, ExtractionStats, NetlistDevice, NetlistNode, NodeKind,
    ParamValue, ParasiticElement, ParasiticKind, DEVICE_PARAM_KEYS, GROUND_NET, SUPPLY_NET,
};
pub use spatial::SpatialIndex;
pub use technology::{LayerTech, Technology, TechnologyError, ViaTech};
