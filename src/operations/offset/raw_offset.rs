//! Raw offset contours, built vertex by vertex before the union clean-up.
//!
//! A raw contour may self-intersect and fold back on itself at concave
//! corners. Those artifacts disappear when the contours are unioned with a
//! fill rule matching the sign of the offset.

use std::f64::consts::{PI, TAU};

use crate::math::{round, IntPoint, Path, Vector2};

use super::{EndType, JoinType};

/// Arc tolerance used when the caller asks for a non-positive one.
const DEFAULT_ARC_TOLERANCE: f64 = 0.25;

/// Unit normal of the segment `pt1 -> pt2`; zero for coincident points.
#[allow(clippy::cast_precision_loss)]
fn unit_normal(pt1: IntPoint, pt2: IntPoint) -> Vector2 {
    let d = Vector2::new((pt2.x - pt1.x) as f64, (pt2.y - pt1.y) as f64);
    let len = d.norm();
    if len == 0.0 {
        return Vector2::zeros();
    }
    Vector2::new(d.y / len, -d.x / len)
}

/// Rotation step used to approximate arcs for one offset distance.
#[derive(Debug, Clone, Copy)]
pub(super) struct ArcSteps {
    sin: f64,
    cos: f64,
    steps_per_rad: f64,
    /// Steps per full circle.
    steps: f64,
}

impl ArcSteps {
    /// Chooses the rotation step so that no chord strays further than
    /// `arc_tolerance` from the true arc of radius `|delta|`.
    pub fn new(delta: f64, arc_tolerance: f64) -> Self {
        let radius = delta.abs();
        let y = if arc_tolerance <= 0.0 {
            DEFAULT_ARC_TOLERANCE
        } else if arc_tolerance > radius * DEFAULT_ARC_TOLERANCE {
            radius * DEFAULT_ARC_TOLERANCE
        } else {
            arc_tolerance
        };
        let steps = PI / (1.0 - y / radius).acos();
        let angle = TAU / steps;
        let sin = if delta < 0.0 { -angle.sin() } else { angle.sin() };
        Self {
            sin,
            cos: angle.cos(),
            steps_per_rad: steps / TAU,
            steps,
        }
    }

    fn rotate(&self, v: Vector2) -> Vector2 {
        Vector2::new(
            v.x * self.cos - self.sin * v.y,
            v.x * self.sin + v.y * self.cos,
        )
    }
}

/// Per-distance offset parameters shared by every contour of one run.
#[derive(Debug, Clone, Copy)]
pub(super) struct OffsetParams {
    pub delta: f64,
    pub arc: ArcSteps,
    /// Smallest `1 + cos` between adjacent normals that still gets a miter.
    pub miter_lim: f64,
}

/// Builder state for the offset of a single source path.
struct RawOffset<'a> {
    src: &'a [IntPoint],
    normals: Vec<Vector2>,
    dest: Path,
    params: OffsetParams,
    /// Sine of the angle between the current pair of normals.
    sin_a: f64,
}

/// Builds the raw offset contours of `src`.
///
/// Closed polygons yield one contour, closed lines two (one per side),
/// open paths one contour wrapping both sides and the end caps. Returns
/// nothing for empty input, and for shrinking anything other than a
/// closed polygon with at least three vertices.
pub(super) fn build(
    src: &[IntPoint],
    join_type: JoinType,
    end_type: EndType,
    params: OffsetParams,
) -> Vec<Path> {
    let len = src.len();
    if len == 0 || (params.delta <= 0.0 && (len < 3 || end_type != EndType::ClosedPolygon)) {
        return Vec::new();
    }

    let mut raw = RawOffset {
        src,
        normals: Vec::with_capacity(len),
        dest: Vec::new(),
        params,
        sin_a: 0.0,
    };
    if len == 1 {
        raw.point_shape(join_type);
        return vec![raw.dest];
    }

    raw.normals
        .extend(src.windows(2).map(|pair| unit_normal(pair[0], pair[1])));
    let closing = if end_type.is_closed() {
        unit_normal(src[len - 1], src[0])
    } else {
        raw.normals[len - 2]
    };
    raw.normals.push(closing);

    match end_type {
        EndType::ClosedPolygon => {
            raw.closed_pass(join_type);
            vec![raw.dest]
        }
        EndType::ClosedLine => {
            raw.closed_pass(join_type);
            let outer = std::mem::take(&mut raw.dest);
            raw.reverse_closed_normals();
            let mut k = 0;
            for j in (0..len).rev() {
                raw.offset_point(j, &mut k, join_type);
            }
            vec![outer, raw.dest]
        }
        EndType::OpenButt | EndType::OpenSquare | EndType::OpenRound => {
            raw.open_pass(join_type, end_type);
            vec![raw.dest]
        }
    }
}

impl RawOffset<'_> {
    /// `src[j]` moved by `offset`.
    #[allow(clippy::cast_precision_loss)]
    fn project(&self, j: usize, offset: Vector2) -> IntPoint {
        let pt = self.src[j];
        IntPoint::new(
            round(pt.x as f64 + offset.x),
            round(pt.y as f64 + offset.y),
        )
    }

    /// Pushes `src[j]` moved by `normal * delta`, tagged with both.
    fn push_along(&mut self, j: usize, normal: Vector2) {
        let pt = self.project(j, normal * self.params.delta);
        self.dest.push(pt.with_offset_tag(normal, Some(j)));
    }

    /// Circle or square around a lone vertex.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn point_shape(&mut self, join_type: JoinType) {
        if join_type == JoinType::Round {
            let count = self.params.arc.steps.floor() as usize;
            let mut v = Vector2::new(1.0, 0.0);
            for _ in 0..count {
                self.push_along(0, v);
                v = self.params.arc.rotate(v);
            }
        } else {
            for (x, y) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                self.push_along(0, Vector2::new(x, y));
            }
        }
    }

    fn closed_pass(&mut self, join_type: JoinType) {
        let mut k = self.src.len() - 1;
        for j in 0..self.src.len() {
            self.offset_point(j, &mut k, join_type);
        }
    }

    /// Normals for walking a closed line backwards.
    fn reverse_closed_normals(&mut self) {
        let len = self.normals.len();
        let last = self.normals[len - 1];
        for j in (1..len).rev() {
            self.normals[j] = -self.normals[j - 1];
        }
        self.normals[0] = -last;
    }

    /// Walks one side of an open path, caps the end, walks back along the
    /// other side and caps the start.
    fn open_pass(&mut self, join_type: JoinType, end_type: EndType) {
        let len = self.src.len();
        let last = len - 1;
        let mut k = 0;
        for j in 1..last {
            self.offset_point(j, &mut k, join_type);
        }

        if end_type == EndType::OpenButt {
            let n = self.normals[last];
            self.push_along(last, n);
            self.push_along(last, -n);
        } else {
            self.sin_a = 0.0;
            self.normals[last] = -self.normals[last];
            self.cap(end_type, last, last - 1);
        }

        for j in (1..len).rev() {
            self.normals[j] = -self.normals[j - 1];
        }
        self.normals[0] = -self.normals[1];

        k = last;
        for j in (1..last).rev() {
            self.offset_point(j, &mut k, join_type);
        }

        if end_type == EndType::OpenButt {
            let n = self.normals[0];
            self.push_along(0, -n);
            self.push_along(0, n);
        } else {
            self.sin_a = 0.0;
            self.cap(end_type, 0, 1);
        }
    }

    fn cap(&mut self, end_type: EndType, j: usize, k: usize) {
        if end_type == EndType::OpenSquare {
            self.do_square(j, k);
        } else {
            self.do_round(j, k);
        }
    }

    /// Emits the vertices for corner `j`, arriving along normal `k`.
    ///
    /// `k` advances to `j` unless the corner is so flat that a single vertex
    /// suffices.
    fn offset_point(&mut self, j: usize, k: &mut usize, join_type: JoinType) {
        let nk = self.normals[*k];
        let nj = self.normals[j];
        let delta = self.params.delta;
        self.sin_a = nk.perp(&nj);
        let cos_a = nk.dot(&nj);

        if (self.sin_a * delta).abs() < 1.0 {
            if cos_a > 0.0 {
                self.push_along(j, nk);
                return;
            }
        } else {
            self.sin_a = self.sin_a.clamp(-1.0, 1.0);
        }

        if self.sin_a * delta < 0.0 {
            // Concave: fold through the source vertex; the union removes it.
            let pt = self.project(j, nk * delta);
            self.dest.push(pt.with_offset_tag(nk, None));
            self.dest.push(self.src[j].with_offset_tag(nk, Some(j)));
            self.push_along(j, nj);
        } else {
            match join_type {
                JoinType::Miter => {
                    let r = 1.0 + cos_a;
                    if r >= self.params.miter_lim {
                        self.do_miter(j, *k, r);
                    } else {
                        self.do_square(j, *k);
                    }
                }
                JoinType::Square => self.do_square(j, *k),
                JoinType::Round => self.do_round(j, *k),
            }
        }
        *k = j;
    }

    fn do_square(&mut self, j: usize, k: usize) {
        let nk = self.normals[k];
        let nj = self.normals[j];
        let dx = (self.sin_a.atan2(nk.dot(&nj)) / 4.0).tan();
        self.push_along(j, Vector2::new(nk.x - nk.y * dx, nk.y + nk.x * dx));
        self.push_along(j, Vector2::new(nj.x + nj.y * dx, nj.y - nj.x * dx));
    }

    fn do_miter(&mut self, j: usize, k: usize, r: f64) {
        let v = (self.normals[k] + self.normals[j]) * (self.params.delta / r);
        let pt = self.project(j, v);
        self.dest.push(pt.with_offset_tag(v, Some(j)));
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn do_round(&mut self, j: usize, k: usize) {
        let nj = self.normals[j];
        let a = self.sin_a.atan2(self.normals[k].dot(&nj));
        let steps = round(self.params.arc.steps_per_rad * a.abs()).max(1) as usize;
        let mut v = self.normals[k];
        for _ in 0..steps {
            self.push_along(j, v);
            v = self.params.arc.rotate(v);
        }
        self.push_along(j, nj);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::path_from_coords;
    use approx::assert_relative_eq;

    fn params(delta: f64) -> OffsetParams {
        OffsetParams {
            delta,
            arc: ArcSteps::new(delta, 0.25),
            miter_lim: 0.5,
        }
    }

    #[test]
    fn unit_normal_points_right_of_travel() {
        let n = unit_normal(IntPoint::new(0, 0), IntPoint::new(10, 0));
        assert_relative_eq!(n.x, 0.0);
        assert_relative_eq!(n.y, -1.0);
        assert_eq!(
            unit_normal(IntPoint::new(3, 3), IntPoint::new(3, 3)),
            Vector2::zeros()
        );
    }

    #[test]
    fn finer_tolerance_means_more_steps() {
        let coarse = ArcSteps::new(100.0, 5.0);
        let fine = ArcSteps::new(100.0, 0.1);
        assert!(fine.steps > coarse.steps);
        // Tolerances above a quarter of the radius are clamped.
        let clamped = ArcSteps::new(4.0, 10.0);
        assert_relative_eq!(clamped.steps, ArcSteps::new(4.0, 1.0).steps);
    }

    #[test]
    fn mitered_square_grows_by_delta() {
        let square = path_from_coords(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        let raw = build(&square, JoinType::Miter, EndType::ClosedPolygon, params(2.0));
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].len(), 4);
        for corner in [(-2, -2), (12, -2), (12, 12), (-2, 12)] {
            assert!(raw[0].contains(&IntPoint::from(corner)));
        }
        assert!(raw[0].iter().all(|p| p.source.is_some()));
    }

    #[test]
    fn shrinking_open_paths_yields_nothing() {
        let line = path_from_coords(&[(0, 0), (10, 0)]);
        assert!(build(&line, JoinType::Round, EndType::OpenRound, params(-1.0)).is_empty());
        assert!(build(&[], JoinType::Round, EndType::ClosedPolygon, params(1.0)).is_empty());
    }

    #[test]
    fn closed_line_yields_both_sides() {
        let square = path_from_coords(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        let raw = build(&square, JoinType::Miter, EndType::ClosedLine, params(1.0));
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn butt_ends_cap_flush_with_endpoints() {
        let line = path_from_coords(&[(0, 0), (10, 0)]);
        let raw = build(&line, JoinType::Square, EndType::OpenButt, params(3.0));
        assert_eq!(raw.len(), 1);
        assert!(raw[0].iter().all(|p| p.x == 0 || p.x == 10));
        assert!(raw[0].iter().all(|p| p.y.abs() == 3));
    }
}
