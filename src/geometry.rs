//! Common geometric types and collision/support primitives, in the decimal
//! domain throughout.
//!
//! This absorbs what this codebase used to split across `types.rs` (vector
//! and bounding-box types, trait abstractions) and `geometry.rs` (standalone
//! collision functions) into one module, since both halves now share the
//! same `HighPrecision` coordinate type.

use serde::{Deserialize, Serialize};

use crate::numerics::HighPrecision;

/// A point or extent in 3D space: X = length axis, Y = width axis, Z = height axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: HighPrecision,
    pub y: HighPrecision,
    pub z: HighPrecision,
}

impl Vec3 {
    pub fn new(x: HighPrecision, y: HighPrecision, z: HighPrecision) -> Self {
        Vec3 { x, y, z }
    }

    pub fn zero() -> Self {
        Vec3::new(HighPrecision::ZERO, HighPrecision::ZERO, HighPrecision::ZERO)
    }

    pub fn from_f64(x: f64, y: f64, z: f64) -> Self {
        Vec3::new(
            HighPrecision::from_f64(x),
            HighPrecision::from_f64(y),
            HighPrecision::from_f64(z),
        )
    }

    pub fn as_f64_tuple(&self) -> (f64, f64, f64) {
        (self.x.to_f64(), self.y.to_f64(), self.z.to_f64())
    }

    pub fn add(&self, other: &Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn sub(&self, other: &Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn volume(&self) -> HighPrecision {
        self.x * self.y * self.z
    }

    pub fn base_area(&self) -> HighPrecision {
        self.x * self.y
    }
}

/// Shared behavior for anything with a 3D extent.
pub trait Dimensional {
    fn dims(&self) -> Vec3;

    fn volume(&self) -> HighPrecision {
        self.dims().volume()
    }

    fn base_area(&self) -> HighPrecision {
        self.dims().base_area()
    }
}

/// Shared behavior for anything with a committed 3D position.
pub trait Positioned {
    fn position(&self) -> Vec3;
}

/// Shared behavior for anything that carries a weight.
pub trait Weighted {
    fn weight(&self) -> HighPrecision;
}

/// An axis-aligned bounding box, `min` inclusive and `max` exclusive-by-convention
/// for overlap purposes (touching faces are not an overlap).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        BoundingBox { min, max }
    }

    pub fn from_position_and_dims(position: Vec3, dims: Vec3) -> Self {
        BoundingBox::new(position, position.add(&dims))
    }

    pub fn dimensions(&self) -> Vec3 {
        self.max.sub(&self.min)
    }

    pub fn top_z(&self) -> HighPrecision {
        self.max.z
    }

    pub fn contains_point(&self, point: Vec3, epsilon: HighPrecision) -> bool {
        point.x.approx_ge(self.min.x, epsilon)
            && point.x.approx_le(self.max.x, epsilon)
            && point.y.approx_ge(self.min.y, epsilon)
            && point.y.approx_le(self.max.y, epsilon)
            && point.z.approx_ge(self.min.z, epsilon)
            && point.z.approx_le(self.max.z, epsilon)
    }
}

/// Length of the overlap of two 1D intervals; zero or negative means no overlap.
pub fn overlap_1d(a_min: HighPrecision, a_max: HighPrecision, b_min: HighPrecision, b_max: HighPrecision) -> HighPrecision {
    a_max.min(b_max) - a_min.max(b_min)
}

/// True if two boxes share a positive-volume open interior (I2): touching on
/// a face is allowed.
pub fn intersects(a: &BoundingBox, b: &BoundingBox, epsilon: HighPrecision) -> bool {
    let ox = overlap_1d(a.min.x, a.max.x, b.min.x, b.max.x);
    let oy = overlap_1d(a.min.y, a.max.y, b.min.y, b.max.y);
    let oz = overlap_1d(a.min.z, a.max.z, b.min.z, b.max.z);
    ox > epsilon && oy > epsilon && oz > epsilon
}

/// Footprint (XY) overlap area of two boxes; zero if they do not overlap in plan.
pub fn overlap_area_xy(a: &BoundingBox, b: &BoundingBox) -> HighPrecision {
    let ox = overlap_1d(a.min.x, a.max.x, b.min.x, b.max.x);
    let oy = overlap_1d(a.min.y, a.max.y, b.min.y, b.max.y);
    if ox.is_positive() && oy.is_positive() {
        ox * oy
    } else {
        HighPrecision::ZERO
    }
}

/// True if `upper`'s bottom face rests on `lower`'s top face (within
/// `height_epsilon`) with a positive-area XY overlap.
pub fn rests_on(upper: &BoundingBox, lower: &BoundingBox, height_epsilon: HighPrecision) -> bool {
    upper.min.z.approx_eq(lower.max.z, height_epsilon) && overlap_area_xy(upper, lower).is_positive()
}

/// Weighted XY centroid of a set of (point, weight) pairs; `None` for an
/// empty or zero-total-weight input.
pub fn weighted_center_xy<I>(points: I) -> Option<(HighPrecision, HighPrecision)>
where
    I: IntoIterator<Item = (HighPrecision, HighPrecision, HighPrecision)>,
{
    let mut wx = HighPrecision::ZERO;
    let mut wy = HighPrecision::ZERO;
    let mut total = HighPrecision::ZERO;
    for (x, y, w) in points {
        wx = wx + x * w;
        wy = wy + y * w;
        total = total + w;
    }
    if total.is_zero() {
        None
    } else {
        Some((wx / total, wy / total))
    }
}

/// Planar distance between two XY points.
pub fn distance_2d(a: (HighPrecision, HighPrecision), b: (HighPrecision, HighPrecision)) -> HighPrecision {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt().unwrap_or(HighPrecision::ZERO)
}

/// √3/2, the row-spacing factor for hexagonal-staggered circle packing.
pub fn hex_row_spacing_factor() -> HighPrecision {
    HighPrecision::from_f64(3.0).sqrt().unwrap_or(HighPrecision::ONE) / HighPrecision::from_f64(2.0)
}
