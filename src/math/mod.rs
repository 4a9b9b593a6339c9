pub mod cross_2d;
pub mod distance_2d;
pub mod polygon_2d;

use std::hash::{Hash, Hasher};

/// 2D vector type, used for unit normals attached to offset vertices.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Largest coordinate magnitude accepted by the engines.
///
/// Products of two coordinate differences must fit in an `i128`.
pub const HI_RANGE: i64 = 0x3FFF_FFFF_FFFF_FFFF;

/// Threshold below which a floating-point value is treated as zero.
pub const TOLERANCE: f64 = 1.0e-20;

/// Returns `true` when `value` is indistinguishable from zero.
#[must_use]
pub fn near_zero(value: f64) -> bool {
    value > -TOLERANCE && value < TOLERANCE
}

/// Rounds to the nearest integer, ties away from zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn round(value: f64) -> i64 {
    if value < 0.0 {
        (value - 0.5) as i64
    } else {
        (value + 0.5) as i64
    }
}

/// How an [`IntPoint`] came to exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointOrigin {
    /// Supplied by the caller or copied unchanged from input.
    #[default]
    Input,
    /// Generated by the offsetter from a source vertex.
    Offset,
    /// Computed by the sweep where two edges cross.
    Intersection,
}

/// Integer 2D point with optional offset metadata.
///
/// Only `x` and `y` take part in equality and hashing. The remaining fields
/// are carried along so that callers tessellating offset outlines can recover
/// which source vertex and which unit normal produced each output vertex.
#[derive(Debug, Clone, Copy)]
pub struct IntPoint {
    pub x: i64,
    pub y: i64,
    /// Index of the source vertex this point was derived from.
    pub source: Option<usize>,
    pub origin: PointOrigin,
    /// Unit normal (or scaled miter vector) used to produce this point.
    pub normal: Vector2,
}

impl IntPoint {
    /// Creates a plain point without metadata.
    #[must_use]
    pub fn new(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            source: None,
            origin: PointOrigin::Input,
            normal: Vector2::zeros(),
        }
    }

    /// Creates a point by truncating floating-point coordinates.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_f64(x: f64, y: f64) -> Self {
        Self::new(x as i64, y as i64)
    }

    /// Returns a copy carrying offset metadata.
    #[must_use]
    pub fn with_offset_tag(mut self, normal: Vector2, source: Option<usize>) -> Self {
        self.normal = normal;
        self.source = source;
        if source.is_some() {
            self.origin = PointOrigin::Offset;
        }
        self
    }
}

impl Default for IntPoint {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl PartialEq for IntPoint {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl Eq for IntPoint {}

impl Hash for IntPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.y.hash(state);
    }
}

impl From<(i64, i64)> for IntPoint {
    fn from((x, y): (i64, i64)) -> Self {
        Self::new(x, y)
    }
}

/// Axis-aligned integer rectangle. `top` is the minimum Y.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntRect {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl IntRect {
    /// Creates a rectangle from its four sides.
    #[must_use]
    pub fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// One open or closed contour.
pub type Path = Vec<IntPoint>;

/// A set of contours.
pub type Paths = Vec<Path>;

/// Builds a [`Path`] from coordinate pairs.
#[must_use]
pub fn path_from_coords(coords: &[(i64, i64)]) -> Path {
    coords.iter().copied().map(IntPoint::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn round_ties_away_from_zero() {
        assert_eq!(round(2.5), 3);
        assert_eq!(round(-2.5), -3);
        assert_eq!(round(2.4), 2);
        assert_eq!(round(-2.4), -2);
        assert_eq!(round(0.0), 0);
    }

    #[test]
    fn equality_ignores_metadata() {
        let plain = IntPoint::new(3, 4);
        let tagged = IntPoint::new(3, 4).with_offset_tag(Vector2::new(0.0, 1.0), Some(7));
        assert_eq!(plain, tagged);
        assert_eq!(tagged.origin, PointOrigin::Offset);

        let mut set = HashSet::new();
        set.insert(plain);
        assert!(set.contains(&tagged));
    }

    #[test]
    fn near_zero_threshold() {
        assert!(near_zero(0.0));
        assert!(near_zero(1.0e-21));
        assert!(!near_zero(1.0e-10));
    }

    #[test]
    fn path_from_coords_keeps_order() {
        let path = path_from_coords(&[(0, 0), (5, 0), (5, 5)]);
        assert_eq!(path.len(), 3);
        assert_eq!(path[1], IntPoint::new(5, 0));
    }
}
