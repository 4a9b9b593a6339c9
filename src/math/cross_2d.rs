//! Exact orientation predicates on integer points.
//!
//! Coordinate differences are multiplied in 128-bit arithmetic so that the
//! products of two values up to [`HI_RANGE`](super::HI_RANGE) never overflow.

use super::IntPoint;

/// Full-width product of two 64-bit values.
#[must_use]
#[inline]
pub fn mul_wide(lhs: i64, rhs: i64) -> i128 {
    i128::from(lhs) * i128::from(rhs)
}

/// Returns `true` when `pt1 -> pt2` and `pt2 -> pt3` have the same slope.
#[must_use]
pub fn slopes_equal3(pt1: IntPoint, pt2: IntPoint, pt3: IntPoint) -> bool {
    mul_wide(pt1.y - pt2.y, pt2.x - pt3.x) == mul_wide(pt1.x - pt2.x, pt2.y - pt3.y)
}

/// Returns `true` when segment `pt1 -> pt2` is parallel to `pt3 -> pt4`.
#[must_use]
pub fn slopes_equal4(pt1: IntPoint, pt2: IntPoint, pt3: IntPoint, pt4: IntPoint) -> bool {
    mul_wide(pt1.y - pt2.y, pt3.x - pt4.x) == mul_wide(pt1.x - pt2.x, pt3.y - pt4.y)
}

/// Returns `true` when two deltas `(dx, dy)` describe the same slope.
#[must_use]
pub fn deltas_parallel(d1: IntPoint, d2: IntPoint) -> bool {
    mul_wide(d1.y, d2.x) == mul_wide(d1.x, d2.y)
}

/// Returns `true` when `pt2` lies strictly between `pt1` and `pt3` along
/// their dominant axis. Coincident points are never "between".
#[must_use]
pub fn pt2_is_between_pt1_and_pt3(pt1: IntPoint, pt2: IntPoint, pt3: IntPoint) -> bool {
    if pt1 == pt3 || pt1 == pt2 || pt3 == pt2 {
        false
    } else if pt1.x != pt3.x {
        (pt2.x > pt1.x) == (pt2.x < pt3.x)
    } else {
        (pt2.y > pt1.y) == (pt2.y < pt3.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::HI_RANGE;

    fn p(x: i64, y: i64) -> IntPoint {
        IntPoint::new(x, y)
    }

    #[test]
    fn wide_product_does_not_overflow() {
        let product = mul_wide(HI_RANGE, HI_RANGE);
        assert!(product > i128::from(i64::MAX));
        assert_eq!(mul_wide(-HI_RANGE, HI_RANGE), -product);
    }

    #[test]
    fn collinear_points() {
        assert!(slopes_equal3(p(0, 0), p(5, 5), p(10, 10)));
        assert!(!slopes_equal3(p(0, 0), p(5, 6), p(10, 10)));
    }

    #[test]
    fn collinear_at_full_range() {
        let big = HI_RANGE / 2;
        assert!(slopes_equal3(p(-big, -big), p(0, 0), p(big, big)));
        assert!(!slopes_equal3(p(-big, -big), p(0, 1), p(big, big)));
    }

    #[test]
    fn parallel_segments() {
        assert!(slopes_equal4(p(0, 0), p(2, 1), p(10, 10), p(14, 12)));
        assert!(!slopes_equal4(p(0, 0), p(2, 1), p(10, 10), p(14, 13)));
    }

    #[test]
    fn between_checks_dominant_axis() {
        assert!(pt2_is_between_pt1_and_pt3(p(0, 0), p(5, 0), p(10, 0)));
        assert!(!pt2_is_between_pt1_and_pt3(p(0, 0), p(15, 0), p(10, 0)));
        assert!(pt2_is_between_pt1_and_pt3(p(0, 0), p(0, 4), p(0, 10)));
        assert!(!pt2_is_between_pt1_and_pt3(p(0, 0), p(0, 0), p(0, 10)));
    }
}
