use rstar::{RTree, RTreeObject, AABB};

use crate::geometry::{BBox, Geometry};

/// An entry in the R-tree spatial index, referencing a geometry by its index.
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    /// Index into the extracted geometry slice.
    pub geometry_index: usize,
    /// Bounding box of the geometry.
    pub bbox: BBox,
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bbox.min.x, self.bbox.min.y],
            [self.bbox.max.x, self.bbox.max.y],
        )
    }
}

/// Spatial index over a subset of layout geometries.
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl SpatialIndex {
    /// Build the index from a list of entries.
    pub fn build(entries: Vec<SpatialEntry>) -> Self {
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Index the geometries at `indices` of `geometries`.
    pub fn from_geometries(geometries: &[Geometry], indices: &[usize]) -> Self {
        let entries = indices
            .iter()
            .filter_map(|&i| {
                geometries.get(i).map(|g| SpatialEntry {
                    geometry_index: i,
                    bbox: g.bbox,
                })
            })
            .collect();
        Self::build(entries)
    }

    /// Indices of all entries whose box intersects `bbox` (touching included),
    /// in ascending geometry-index order.
    pub fn query_intersecting(&self, bbox: &BBox) -> Vec<usize> {
        let envelope = AABB::from_corners([bbox.min.x, bbox.min.y], [bbox.max.x, bbox.max.y]);
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| e.geometry_index)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Number of entries in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
