use super::cross_2d::mul_wide;
use super::{IntPoint, IntRect, Path, Paths};

/// Classification of a point relative to a closed polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClassification {
    Inside,
    Outside,
    OnBoundary,
}

impl PointClassification {
    /// Numeric form used by the clipping engine: `+1` inside, `0` outside,
    /// `-1` on the boundary.
    #[must_use]
    pub fn to_i32(self) -> i32 {
        match self {
            Self::Inside => 1,
            Self::Outside => 0,
            Self::OnBoundary => -1,
        }
    }
}

/// Signed area of a closed polygon.
///
/// Positive when the vertices wind counter-clockwise in a Y-up frame
/// (clockwise on a Y-down display). Fewer than 3 vertices yield `0.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn area(path: &[IntPoint]) -> f64 {
    let cnt = path.len();
    if cnt < 3 {
        return 0.0;
    }
    let mut a = 0.0;
    let mut j = cnt - 1;
    for i in 0..cnt {
        a += (path[j].x as f64 + path[i].x as f64) * (path[j].y as f64 - path[i].y as f64);
        j = i;
    }
    -a * 0.5
}

/// Returns `true` for non-negative [`area`], i.e. outer-ring orientation.
#[must_use]
pub fn orientation(path: &[IntPoint]) -> bool {
    area(path) >= 0.0
}

/// Reverses the vertex order of every path in place.
pub fn reverse_paths(paths: &mut Paths) {
    for path in paths.iter_mut() {
        path.reverse();
    }
}

/// Classifies `pt` against a closed ring given as a vertex sequence.
///
/// The ring is implicitly closed between its last and first vertex. Uses the
/// Hormann-Agathos crossing test with exact 128-bit cross products, so a
/// point on any edge or vertex is reported as
/// [`PointClassification::OnBoundary`].
pub fn classify_point_in_ring<I>(pt: IntPoint, ring: I) -> PointClassification
where
    I: IntoIterator<Item = IntPoint>,
{
    let mut iter = ring.into_iter();
    let Some(first) = iter.next() else {
        return PointClassification::Outside;
    };
    let mut inside = false;
    let mut ip = first;
    for ip_next in iter.chain(std::iter::once(first)) {
        if ip_next.y == pt.y
            && (ip_next.x == pt.x || (ip.y == pt.y && ((ip_next.x > pt.x) == (ip.x < pt.x))))
        {
            return PointClassification::OnBoundary;
        }
        if (ip.y < pt.y) != (ip_next.y < pt.y) {
            if ip.x >= pt.x && ip_next.x > pt.x {
                inside = !inside;
            } else if ip.x >= pt.x || ip_next.x > pt.x {
                let d = mul_wide(ip.x - pt.x, ip_next.y - pt.y)
                    - mul_wide(ip_next.x - pt.x, ip.y - pt.y);
                if d == 0 {
                    return PointClassification::OnBoundary;
                }
                if (d > 0) == (ip_next.y > ip.y) {
                    inside = !inside;
                }
            }
        }
        ip = ip_next;
    }
    if inside {
        PointClassification::Inside
    } else {
        PointClassification::Outside
    }
}

/// Classifies `pt` against a closed polygon.
///
/// Polygons with fewer than 3 vertices contain nothing.
#[must_use]
pub fn point_in_polygon(pt: IntPoint, path: &[IntPoint]) -> PointClassification {
    if path.len() < 3 {
        return PointClassification::Outside;
    }
    classify_point_in_ring(pt, path.iter().copied())
}

/// Axis-aligned bounds of all vertices; an all-empty input yields the zero
/// rectangle.
#[must_use]
pub fn bounds(paths: &[Path]) -> IntRect {
    let mut points = paths.iter().flatten();
    let Some(first) = points.next() else {
        return IntRect::default();
    };
    points.fold(
        IntRect::new(first.x, first.y, first.x, first.y),
        |mut rect, pt| {
            rect.left = rect.left.min(pt.x);
            rect.right = rect.right.max(pt.x);
            rect.top = rect.top.min(pt.y);
            rect.bottom = rect.bottom.max(pt.y);
            rect
        },
    )
}
