use std::time::Instant;

use chrono::Utc;

use opensilicon_core::{ExtractedNetlist, ExtractionStats, Geometry, Technology};

use crate::cancel::CancelToken;
use crate::context::ExtractionContext;
use crate::error::ExtractError;
use crate::options::ExtractionOptions;
use crate::parasitics::ParasiticExtractor;
use crate::recognizer::{DeviceRecognizer, FrontEndLayers};
use crate::spice::{render_deck, DeckHeader};

/// Run device recognition and parasitic extraction over `geometries` and
/// assemble the result into one netlist.
///
/// All naming state lives in a context local to this call. Cancellation
/// returns `ExtractError::Cancelled` and discards any partial work.
pub fn extract(
    geometries: &[Geometry],
    tech: &Technology,
    options: &ExtractionOptions,
    cancel: &CancelToken,
) -> Result<ExtractedNetlist, ExtractError> {
    options.validate()?;
    tech.validate()?;
    let started = Instant::now();
    let timestamp = Utc::now();
    let mut ctx = ExtractionContext::new();

    let layers = FrontEndLayers::group(geometries);
    let devices = DeviceRecognizer::new(tech)
        .recognize(geometries, &layers, &mut ctx, cancel)
        .map_err(log_cancel)?;
    let pass = ParasiticExtractor::new(tech, options)
        .extract(geometries, &mut ctx, cancel)
        .map_err(log_cancel)?;

    let spice = render_deck(
        &devices,
        &pass.parasitics,
        &DeckHeader {
            title: &options.title,
            timestamp: options.include_timestamp.then_some(timestamp),
        },
    );

    let nodes = ctx.into_nodes();
    let stats = ExtractionStats {
        device_count: devices.len(),
        node_count: nodes.len(),
        parasitic_count: pass.parasitics.len(),
        elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
        geometries_considered: geometries.len(),
        degenerate_geometries: layers.degenerate,
        skipped_layers: pass.skipped_layers.into_iter().collect(),
        unresolved_vias: pass.unresolved_vias,
    };
    log::info!(
        "Extracted {} devices, {} nodes, {} parasitics from {} geometries in {:.2} ms",
        stats.device_count,
        stats.node_count,
        stats.parasitic_count,
        stats.geometries_considered,
        stats.elapsed_ms
    );

    Ok(ExtractedNetlist {
        nodes,
        devices,
        parasitics: pass.parasitics,
        spice,
        timestamp,
        stats,
    })
}

fn log_cancel(e: ExtractError) -> ExtractError {
    if matches!(e, ExtractError::Cancelled) {
        log::info!("Extraction cancelled, partial results discarded");
    }
    e
}
