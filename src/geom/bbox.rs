use geo::{Coord, Rect};
use rstar::{RTreeObject, AABB};

/// A feature's bounding box in an R-tree, associated with the feature by index.
#[derive(Debug, Clone)]
pub(super) struct FeatureBounds {
    idx: usize, // Index of the feature in the geometry source
    bbox: Rect<f64>,
}

impl FeatureBounds {
    pub(super) fn new(idx: usize, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    /// Get the index of the corresponding feature.
    pub(super) fn idx(&self) -> usize { self.idx }
}

impl RTreeObject for FeatureBounds {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Smallest rectangle covering both inputs.
pub(crate) fn union_rect(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}
