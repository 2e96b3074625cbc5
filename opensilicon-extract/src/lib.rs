//! # OpenSilicon Extract
//!
//! Layout-to-netlist extraction: MOS recognition from poly/diffusion overlap,
//! wire and via resistance from conductor geometry, netlist assembly with
//! per-call naming, and SPICE deck generation.
//!
//! Net identity is local to each device and parasitic; shared geometry is not
//! traced into merged nets. A connectivity pass would slot in between
//! recognition and assembly.

pub mod assembler;
pub mod cancel;
pub mod context;
pub mod error;
pub mod job;
pub mod options;
pub mod parasitics;
pub mod recognizer;
pub mod spice;

pub use assembler::extract;
pub use cancel::CancelToken;
pub use context::ExtractionContext;
pub use error::ExtractError;
pub use job::ExtractionJob;
pub use options::ExtractionOptions;
pub use parasitics::{ParasiticExtractor, ParasiticPass};
pub use recognizer::{DeviceRecognizer, FrontEndLayers};
pub use spice::{format_si, render_deck, DeckHeader};
