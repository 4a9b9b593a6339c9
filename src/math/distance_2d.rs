use super::IntPoint;

/// Squared Euclidean distance between two points.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn distance_sqrd(pt1: IntPoint, pt2: IntPoint) -> f64 {
    let dx = pt1.x as f64 - pt2.x as f64;
    let dy = pt1.y as f64 - pt2.y as f64;
    dx * dx + dy * dy
}

/// Squared perpendicular distance from `pt` to the infinite line through
/// `ln1` and `ln2`.
///
/// The line is written in general form `Ax + By + C = 0` with
/// `A = y1 - y2`, `B = x2 - x1`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn distance_from_line_sqrd(pt: IntPoint, ln1: IntPoint, ln2: IntPoint) -> f64 {
    let a = (ln1.y - ln2.y) as f64;
    let b = (ln2.x - ln1.x) as f64;
    let mut c = a * ln1.x as f64 + b * ln1.y as f64;
    c = a * pt.x as f64 + b * pt.y as f64 - c;
    (c * c) / (a * a + b * b)
}

/// Returns `true` when the three points are within `dist_sqrd` of being
/// collinear.
///
/// The point that lies geometrically between the other two is the one
/// measured against the line through them. With spikes either end point can
/// be the middle one.
#[must_use]
pub fn slopes_near_collinear(pt1: IntPoint, pt2: IntPoint, pt3: IntPoint, dist_sqrd: f64) -> bool {
    if (pt1.x - pt2.x).abs() > (pt1.y - pt2.y).abs() {
        if (pt1.x > pt2.x) == (pt1.x < pt3.x) {
            distance_from_line_sqrd(pt1, pt2, pt3) < dist_sqrd
        } else if (pt2.x > pt1.x) == (pt2.x < pt3.x) {
            distance_from_line_sqrd(pt2, pt1, pt3) < dist_sqrd
        } else {
            distance_from_line_sqrd(pt3, pt1, pt2) < dist_sqrd
        }
    } else if (pt1.y > pt2.y) == (pt1.y < pt3.y) {
        distance_from_line_sqrd(pt1, pt2, pt3) < dist_sqrd
    } else if (pt2.y > pt1.y) == (pt2.y < pt3.y) {
        distance_from_line_sqrd(pt2, pt1, pt3) < dist_sqrd
    } else {
        distance_from_line_sqrd(pt3, pt1, pt2) < dist_sqrd
    }
}

/// Returns `true` when two points are within `sqrt(dist_sqrd)` of each other.
#[must_use]
pub fn points_are_close(pt1: IntPoint, pt2: IntPoint, dist_sqrd: f64) -> bool {
    distance_sqrd(pt1, pt2) <= dist_sqrd
}
