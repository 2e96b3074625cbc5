//! Wire and via resistance from conductor geometry.
//!
//! The technology table decides what is a conductor. A geometry on a layer
//! with a via entry, or drawn as a via, is a cut and contributes the per-cut
//! contact resistance. A rect or path on a layer with a sheet-resistance entry
//! is a wire with `R = Rs * length / width`. Paths take their polyline length
//! and drawn width; rectangles take the longer side as length and the shorter
//! as width. Every element gets two fresh nets; nothing is merged.

use std::collections::BTreeSet;

use opensilicon_core::{
    Geometry, GeometryKind, LayerRole, ParasiticElement, ParasiticKind, Technology,
};

use crate::cancel::CancelToken;
use crate::context::ExtractionContext;
use crate::error::ExtractError;
use crate::options::ExtractionOptions;

/// Output of the parasitic pass.
#[derive(Debug, Default)]
pub struct ParasiticPass {
    pub parasitics: Vec<ParasiticElement>,
    /// Conductor layers seen in the layout with no technology entry.
    pub skipped_layers: BTreeSet<String>,
    /// Via shapes drawn on a wire layer, which carries no contact resistance.
    pub unresolved_vias: usize,
}

pub struct ParasiticExtractor<'a> {
    tech: &'a Technology,
    options: &'a ExtractionOptions,
}

impl<'a> ParasiticExtractor<'a> {
    pub fn new(tech: &'a Technology, options: &'a ExtractionOptions) -> Self {
        Self { tech, options }
    }

    pub fn extract(
        &self,
        geometries: &[Geometry],
        ctx: &mut ExtractionContext,
        cancel: &CancelToken,
    ) -> Result<ParasiticPass, ExtractError> {
        let mut pass = ParasiticPass::default();

        for (index, geom) in geometries.iter().enumerate() {
            cancel.check()?;
            let cut = self.tech.via(&geom.layer);
            let wire = self.tech.layer(&geom.layer);
            let value = match (cut, wire) {
                (Some(via), _) => Some(via.contact_resistance),
                (None, Some(_)) if geom.kind == GeometryKind::Via => {
                    pass.unresolved_vias += 1;
                    continue;
                }
                (None, Some(layer)) => self
                    .wire_resistance(geom, layer.sheet_resistance)
                    .filter(|r| *r >= self.options.noise_floor_ohms),
                (None, None) => {
                    if LayerRole::of(geom).is_conductor() {
                        pass.skipped_layers.insert(geom.layer.clone());
                    }
                    continue;
                }
            };

            if let Some(value) = value {
                pass.parasitics.push(ParasiticElement {
                    name: ctx.next_parasitic_name(),
                    kind: ParasiticKind::Resistor,
                    node_a: ctx.fresh_net(),
                    node_b: ctx.fresh_net(),
                    value,
                    source_geometry: Some(index),
                });
            }
        }

        for layer in &pass.skipped_layers {
            log::debug!("No technology entry for layer '{}', parasitics skipped", layer);
        }
        if pass.unresolved_vias > 0 {
            log::debug!(
                "{} via shapes drawn on wire layers, no contact resistance applied",
                pass.unresolved_vias
            );
        }
        Ok(pass)
    }

    /// Resistance of a wire shape, or `None` for shapes that carry no
    /// measurable length/width.
    fn wire_resistance(&self, geom: &Geometry, sheet_resistance: f64) -> Option<f64> {
        let (length, width) = match geom.kind {
            GeometryKind::Path => {
                let width = geom
                    .width
                    .filter(|w| *w > 0.0)
                    .unwrap_or(self.options.default_wire_width);
                (geom.polyline_length(), width)
            }
            GeometryKind::Rect => {
                let (w, h) = (geom.bbox.width(), geom.bbox.height());
                (w.max(h), w.min(h))
            }
            // Polygons and stray via shapes are not modeled as wires.
            _ => return None,
        };
        if width <= 0.0 {
            return None;
        }
        Some(sheet_resistance * length / width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opensilicon_core::Point;

    fn run(geometries: &[Geometry]) -> ParasiticPass {
        run_with(&Technology::sky130(), geometries)
    }

    fn run_with(tech: &Technology, geometries: &[Geometry]) -> ParasiticPass {
        let options = ExtractionOptions::default();
        let mut ctx = ExtractionContext::new();
        ParasiticExtractor::new(tech, &options)
            .extract(geometries, &mut ctx, &CancelToken::new())
            .unwrap()
    }

    #[test]
    fn test_path_resistance() {
        // 10 µm of li1 at 0.2 µm: 12.8 * 10 / 0.2 = 640 Ω
        let geoms = vec![Geometry::path(
            "li1",
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
            Some(0.2),
        )];
        let pass = run(&geoms);
        assert_eq!(pass.parasitics.len(), 1);
        let r = &pass.parasitics[0];
        assert!((r.value - 640.0).abs() < 1e-9);
        assert_eq!(r.kind, ParasiticKind::Resistor);
        assert_eq!(r.source_geometry, Some(0));
        assert_ne!(r.node_a, r.node_b);
    }

    #[test]
    fn test_path_without_width_uses_default() {
        let geoms = vec![Geometry::path(
            "met1",
            vec![Point::new(0.0, 0.0), Point::new(0.0, 14.0)],
            None,
        )];
        let pass = run(&geoms);
        // 0.125 * 14 / 0.14
        assert!((pass.parasitics[0].value - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_rect_orientation_independent() {
        let horizontal = run(&[Geometry::rect("li1", 0.0, 0.0, 5.0, 0.5)]);
        let vertical = run(&[Geometry::rect("li1", 0.0, 0.0, 0.5, 5.0)]);
        assert!((horizontal.parasitics[0].value - 128.0).abs() < 1e-9);
        assert!((vertical.parasitics[0].value - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_noise_floor() {
        // 0.0285 * 0.1 / 1.6 is below 0.01 Ω
        let pass = run(&[Geometry::path(
            "met5",
            vec![Point::new(0.0, 0.0), Point::new(0.1, 0.0)],
            Some(1.6),
        )]);
        assert!(pass.parasitics.is_empty());
    }

    #[test]
    fn test_via_uses_contact_resistance() {
        let pass = run(&[
            Geometry::via("mcon", Point::new(0.0, 0.0), 0.17),
            Geometry::via("mcon", Point::new(5.0, 0.0), 0.5),
        ]);
        assert_eq!(pass.parasitics.len(), 2);
        assert!((pass.parasitics[0].value - 9.3).abs() < 1e-12);
        assert!((pass.parasitics[1].value - 9.3).abs() < 1e-12);
    }

    #[test]
    fn test_missing_layer_is_skipped_not_fatal() {
        let pass = run(&[
            Geometry::rect("met9", 0.0, 0.0, 10.0, 1.0),
            Geometry::rect("met1", 0.0, 0.0, 10.0, 1.0),
            Geometry::rect("poly", 0.0, 0.0, 10.0, 1.0),
        ]);
        assert_eq!(pass.parasitics.len(), 1);
        assert_eq!(pass.parasitics[0].source_geometry, Some(1));
        assert!(pass.skipped_layers.contains("met9"));
        assert!(!pass.skipped_layers.contains("poly"));
    }

    #[test]
    fn test_custom_aliases_follow_technology_table() {
        let tech = Technology::new("toy", "n", "p")
            .with_layer("rdl", 0.01)
            .with_layer("m1_drw", 0.1)
            .with_via("tsv_cut", 0.05);
        let pass = run_with(
            &tech,
            &[
                Geometry::rect("rdl", 0.0, 0.0, 100.0, 2.0),
                Geometry::rect("M1_DRW", 0.0, 0.0, 10.0, 0.5),
                Geometry::rect("tsv_cut", 0.0, 0.0, 1.0, 1.0),
                Geometry::rect("met2", 0.0, 0.0, 10.0, 0.5),
                Geometry::rect("poly", 0.0, 0.0, 10.0, 0.5),
            ],
        );
        let values: Vec<f64> = pass.parasitics.iter().map(|p| p.value).collect();
        assert_eq!(values.len(), 3);
        assert!((values[0] - 0.5).abs() < 1e-12);
        assert!((values[1] - 2.0).abs() < 1e-12);
        assert!((values[2] - 0.05).abs() < 1e-12);
        assert_eq!(pass.skipped_layers.into_iter().collect::<Vec<_>>(), vec!["met2"]);
    }

    #[test]
    fn test_via_on_wire_layer_is_not_a_skipped_layer() {
        let pass = run(&[
            Geometry::via("met1", Point::new(0.0, 0.0), 0.17),
            Geometry::via("via7", Point::new(1.0, 0.0), 0.17),
        ]);
        assert!(pass.parasitics.is_empty());
        assert_eq!(pass.unresolved_vias, 1);
        assert_eq!(pass.skipped_layers.into_iter().collect::<Vec<_>>(), vec!["via7"]);
    }
}
