use serde::{Deserialize, Serialize};

/// A 2D point in layout coordinates (micrometers).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Build a box from two opposite corners in any order.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min: Point::new(x1.min(x2), y1.min(y2)),
            max: Point::new(x1.max(x2), y1.max(y2)),
        }
    }

    pub fn from_points(points: &[Point]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        })
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Zero-area boxes (lines and points) never take part in recognition.
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &BBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// The overlapping region, or `None` when the boxes are disjoint.
    /// Boxes that only touch yield a degenerate intersection.
    pub fn intersection(&self, other: &BBox) -> Option<BBox> {
        if !self.intersects(other) {
            return None;
        }
        Some(BBox {
            min: Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        })
    }
}

/// Shape kind of a layout geometry as delivered by the layout store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Rect,
    Polygon,
    Path,
    Via,
}

/// A flattened layout geometry with its layer alias and resolved bounding box.
///
/// Geometries are read-only inputs; extraction refers to them by their index
/// in the slice it was handed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: GeometryKind,
    pub layer: String,
    pub bbox: BBox,
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

impl Geometry {
    pub fn rect(layer: &str, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let bbox = BBox::from_corners(x1, y1, x2, y2);
        Self {
            kind: GeometryKind::Rect,
            layer: layer.to_string(),
            bbox,
            points: vec![bbox.min, bbox.max],
            width: None,
        }
    }

    pub fn polygon(layer: &str, vertices: Vec<Point>) -> Self {
        let bbox = BBox::from_points(&vertices)
            .unwrap_or_else(|| BBox::new(Point::new(0.0, 0.0), Point::new(0.0, 0.0)));
        Self {
            kind: GeometryKind::Polygon,
            layer: layer.to_string(),
            bbox,
            points: vertices,
            width: None,
        }
    }

    /// A wire along a centerline. The bounding box is grown by half the width.
    pub fn path(layer: &str, points: Vec<Point>, width: Option<f64>) -> Self {
        let half_w = width.unwrap_or(0.0) / 2.0;
        let bbox = BBox::from_points(&points)
            .map(|b| {
                BBox::new(
                    Point::new(b.min.x - half_w, b.min.y - half_w),
                    Point::new(b.max.x + half_w, b.max.y + half_w),
                )
            })
            .unwrap_or_else(|| BBox::new(Point::new(0.0, 0.0), Point::new(0.0, 0.0)));
        Self {
            kind: GeometryKind::Path,
            layer: layer.to_string(),
            bbox,
            points,
            width,
        }
    }

    /// A square cut centered on `position`.
    pub fn via(layer: &str, position: Point, size: f64) -> Self {
        let half = size / 2.0;
        Self {
            kind: GeometryKind::Via,
            layer: layer.to_string(),
            bbox: BBox::new(
                Point::new(position.x - half, position.y - half),
                Point::new(position.x + half, position.y + half),
            ),
            points: vec![position],
            width: Some(size),
        }
    }

    /// Empty point lists and zero-area boxes are excluded from recognition.
    pub fn is_degenerate(&self) -> bool {
        self.points.is_empty() || self.bbox.is_degenerate()
    }

    /// Centerline length of a path (sum of segment lengths).
    pub fn polyline_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }
}
