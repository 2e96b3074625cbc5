//! MOS transistor recognition from poly/diffusion overlap.
//!
//! Every poly shape crossing a diffusion shape forms a gate. The overlap's
//! vertical extent is the gate width and its horizontal extent the gate
//! length; the axis convention is fixed rather than inferred from shape
//! orientation. A device is PMOS when the diffusion's center lies inside an
//! n-well, NMOS otherwise.
//!
//! Each device receives three fresh nets for drain, gate and source. Nets are
//! not merged across devices, and overlapping detections are not deduplicated.

use std::collections::BTreeMap;

use opensilicon_core::{
    BBox, DeviceKind, Geometry, LayerRole, NetlistDevice, SpatialIndex, Technology, GROUND_NET,
    SUPPLY_NET,
};

use crate::cancel::CancelToken;
use crate::context::ExtractionContext;
use crate::error::ExtractError;

/// Geometry indices bucketed by front-end layer role.
#[derive(Debug, Default, Clone)]
pub struct FrontEndLayers {
    pub poly: Vec<usize>,
    pub diffusion: Vec<usize>,
    pub nwell: Vec<usize>,
    /// Geometries excluded for empty points or zero area.
    pub degenerate: usize,
}

impl FrontEndLayers {
    pub fn group(geometries: &[Geometry]) -> Self {
        let mut layers = FrontEndLayers::default();
        for (i, g) in geometries.iter().enumerate() {
            let bucket = match LayerRole::of(g) {
                LayerRole::Poly => &mut layers.poly,
                LayerRole::Diffusion => &mut layers.diffusion,
                LayerRole::NWell => &mut layers.nwell,
                _ => continue,
            };
            if g.is_degenerate() {
                layers.degenerate += 1;
                continue;
            }
            bucket.push(i);
        }
        layers
    }
}

pub struct DeviceRecognizer<'a> {
    tech: &'a Technology,
}

impl<'a> DeviceRecognizer<'a> {
    pub fn new(tech: &'a Technology) -> Self {
        Self { tech }
    }

    /// Detect transistors in `geometries`. Zero devices is a valid result.
    /// Indices in `layers` that fall outside `geometries` are ignored.
    pub fn recognize(
        &self,
        geometries: &[Geometry],
        layers: &FrontEndLayers,
        ctx: &mut ExtractionContext,
        cancel: &CancelToken,
    ) -> Result<Vec<NetlistDevice>, ExtractError> {
        let diffusion_index = SpatialIndex::from_geometries(geometries, &layers.diffusion);
        let wells: Vec<BBox> = layers
            .nwell
            .iter()
            .filter_map(|&i| geometries.get(i).map(|g| g.bbox))
            .collect();
        let mut devices = Vec::new();

        for &poly_idx in &layers.poly {
            cancel.check()?;
            let Some(poly) = geometries.get(poly_idx) else {
                continue;
            };
            for diff_idx in diffusion_index.query_intersecting(&poly.bbox) {
                let Some(diff) = geometries.get(diff_idx) else {
                    continue;
                };
                let gate = match poly.bbox.intersection(&diff.bbox) {
                    Some(gate) if !gate.is_degenerate() => gate,
                    _ => continue,
                };
                let in_well = wells.iter().any(|w| w.contains_point(&diff.bbox.center()));
                let kind = if in_well { DeviceKind::Pmos } else { DeviceKind::Nmos };
                let device = self.build_device(kind, &gate, poly_idx, diff_idx, ctx);
                log::debug!(
                    "{} {} at poly #{} / diff #{}: W={:.3} L={:.3}",
                    kind,
                    device.name,
                    poly_idx,
                    diff_idx,
                    gate.height(),
                    gate.width()
                );
                devices.push(device);
            }
        }
        Ok(devices)
    }

    fn build_device(
        &self,
        kind: DeviceKind,
        gate: &BBox,
        poly_idx: usize,
        diff_idx: usize,
        ctx: &mut ExtractionContext,
    ) -> NetlistDevice {
        let name = ctx.next_device_name();
        let (model, body) = match kind {
            DeviceKind::Pmos => (&self.tech.pmos_model, SUPPLY_NET),
            _ => (&self.tech.nmos_model, GROUND_NET),
        };

        let mut terminals = BTreeMap::new();
        terminals.insert("drain".to_string(), ctx.fresh_net());
        terminals.insert("gate".to_string(), ctx.fresh_net());
        terminals.insert("source".to_string(), ctx.fresh_net());
        terminals.insert("body".to_string(), body.to_string());

        let mut params = BTreeMap::new();
        params.insert("w".to_string(), gate.height());
        params.insert("l".to_string(), gate.width());

        NetlistDevice {
            name,
            kind,
            model: model.clone(),
            terminals,
            params,
            source_geometry: vec![poly_idx, diff_idx],
        }
    }
}
