mod raw_offset;

use tracing::debug;

use crate::error::Result;
use crate::math::polygon_2d::{bounds, orientation};
use crate::math::{near_zero, IntPoint, Path, Paths};
use crate::operations::boolean::{ClipOptions, ClipType, Clipper, PolyFillType, PolyType};
use crate::topology::PolyTree;

use raw_offset::{ArcSteps, OffsetParams};

/// Corner treatment where two offset edges meet on the convex side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    /// Corners are cut off at distance `|delta|` from the vertex.
    Square,
    /// Corners follow an arc approximated within the arc tolerance.
    #[default]
    Round,
    /// Sharp corners, squared off beyond the miter limit.
    Miter,
}

/// How path ends are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndType {
    /// Closed ring offset as a filled polygon.
    #[default]
    ClosedPolygon,
    /// Closed ring offset on both sides as an outline.
    ClosedLine,
    /// Open path with ends cut flush at the end vertices.
    OpenButt,
    /// Open path with ends extended by `|delta|`.
    OpenSquare,
    /// Open path with rounded ends.
    OpenRound,
}

impl EndType {
    #[must_use]
    pub fn is_closed(self) -> bool {
        matches!(self, Self::ClosedPolygon | Self::ClosedLine)
    }
}

/// Offsetting parameters.
#[derive(Debug, Clone, Copy)]
pub struct OffsetOptions {
    /// Maximum distance a round join may deviate from the true arc.
    /// Non-positive values fall back to `0.25`.
    pub arc_tolerance: f64,
    /// Maximum miter length as a multiple of `|delta|`. Values up to `2.0`
    /// behave like `2.0`.
    pub miter_limit: f64,
}

impl Default for OffsetOptions {
    fn default() -> Self {
        Self {
            arc_tolerance: 0.25,
            miter_limit: 2.0,
        }
    }
}

/// One loaded path together with its join and end treatment.
#[derive(Debug, Clone)]
struct OffsetPath {
    contour: Path,
    join_type: JoinType,
    end_type: EndType,
}

/// Inflates or deflates polygons and polylines by a fixed distance.
///
/// Positive distances grow outer rings and shrink holes. Open paths can only
/// be inflated. The raw offset contours are unioned, so the result contains
/// no self-intersections.
#[derive(Debug, Default)]
pub struct ClipperOffset {
    paths: Vec<OffsetPath>,
    /// Path and vertex index of the bottom-most vertex among closed polygons.
    lowest: Option<(usize, usize)>,
    options: OffsetOptions,
}

impl ClipperOffset {
    /// Creates an empty offsetter with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty offsetter with the given options.
    #[must_use]
    pub fn with_options(options: OffsetOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn options(&self) -> &OffsetOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut OffsetOptions {
        &mut self.options
    }

    /// Adds a path. Consecutive duplicate vertices are dropped, as is the
    /// closing duplicate of a closed path. A closed polygon left with exactly
    /// two vertices is ignored; a single vertex is kept and offset into a
    /// circle or square.
    pub fn add_path(&mut self, path: &[IntPoint], join_type: JoinType, end_type: EndType) {
        let Some(&first) = path.first() else {
            return;
        };
        let mut high = path.len() - 1;
        if end_type.is_closed() {
            while high > 0 && path[0] == path[high] {
                high -= 1;
            }
        }

        let mut contour: Path = Vec::with_capacity(high + 1);
        contour.push(first);
        let mut k = 0;
        for &pt in &path[1..=high] {
            if contour[contour.len() - 1] == pt {
                continue;
            }
            contour.push(pt);
            let low = contour[k];
            if pt.y > low.y || (pt.y == low.y && pt.x < low.x) {
                k = contour.len() - 1;
            }
        }
        if end_type == EndType::ClosedPolygon && contour.len() == 2 {
            return;
        }

        let candidate = contour[k];
        self.paths.push(OffsetPath {
            contour,
            join_type,
            end_type,
        });
        if end_type != EndType::ClosedPolygon {
            return;
        }
        let idx = self.paths.len() - 1;
        let is_lower = self.lowest.is_none_or(|(i, j)| {
            let low = self.paths[i].contour[j];
            candidate.y > low.y || (candidate.y == low.y && candidate.x < low.x)
        });
        if is_lower {
            self.lowest = Some((idx, k));
        }
    }

    pub fn add_paths(&mut self, paths: &[Path], join_type: JoinType, end_type: EndType) {
        for path in paths {
            self.add_path(path, join_type, end_type);
        }
    }

    /// Removes every loaded path.
    pub fn clear(&mut self) {
        self.paths.clear();
        self.lowest = None;
    }

    /// Offsets the loaded paths by `delta`.
    ///
    /// # Errors
    ///
    /// Returns an error if the union clean-up fails.
    pub fn execute(&self, delta: f64) -> Result<Paths> {
        self.execute_paths(delta, 0)
    }

    /// Like [`ClipperOffset::execute`], but lets crossing points created by
    /// the clean-up inherit source indices below `source_len`.
    ///
    /// # Errors
    ///
    /// Returns an error if the union clean-up fails.
    pub fn execute_with_source_len(&self, delta: f64, source_len: usize) -> Result<Paths> {
        let last = i64::try_from(source_len).unwrap_or(i64::MAX) - 1;
        self.execute_paths(delta, last)
    }

    /// Offsets the loaded paths by `delta` into a [`PolyTree`].
    ///
    /// # Errors
    ///
    /// Returns an error if the union clean-up fails.
    pub fn execute_tree(&self, delta: f64) -> Result<PolyTree> {
        let (mut clipper, fill) = self.clean_up_clipper(delta, 0)?;
        let mut tree = clipper.execute_tree(ClipType::Union, fill, fill)?;
        if delta <= 0.0 {
            // Drop the bounding frame and promote what it encloses.
            let frame = tree.first();
            let has_only_frame = tree.child_count(tree.root())? == 1;
            let frame_has_children = match frame {
                Some(frame) => tree.child_count(frame)? > 0,
                None => false,
            };
            if has_only_frame && frame_has_children {
                tree.lift_first_child();
            } else {
                tree.clear();
            }
        }
        debug!(nodes = tree.total(), "offset finished");
        Ok(tree)
    }

    fn execute_paths(&self, delta: f64, last_source_index: i64) -> Result<Paths> {
        let (mut clipper, fill) = self.clean_up_clipper(delta, last_source_index)?;
        let mut solution = clipper.execute_with(ClipType::Union, fill)?;
        if delta <= 0.0 && !solution.is_empty() {
            solution.remove(0);
        }
        debug!(paths = solution.len(), "offset finished");
        Ok(solution)
    }

    /// Loaded paths with orientations normalized so that positive deltas
    /// grow outer rings: the lowest closed polygon decides.
    fn oriented_paths(&self) -> Vec<OffsetPath> {
        let flip_polygons = self
            .lowest
            .is_some_and(|(i, _)| !orientation(&self.paths[i].contour));
        self.paths
            .iter()
            .map(|path| {
                let mut path = path.clone();
                let reverse = match path.end_type {
                    EndType::ClosedPolygon => flip_polygons,
                    EndType::ClosedLine => orientation(&path.contour) == flip_polygons,
                    _ => false,
                };
                if reverse {
                    path.contour.reverse();
                }
                path
            })
            .collect()
    }

    fn raw_offset(&self, delta: f64) -> Paths {
        let paths = self.oriented_paths();
        if near_zero(delta) {
            return paths
                .into_iter()
                .filter(|p| p.end_type == EndType::ClosedPolygon)
                .map(|p| p.contour)
                .collect();
        }

        let limit = self.options.miter_limit;
        let params = OffsetParams {
            delta,
            arc: ArcSteps::new(delta, self.options.arc_tolerance),
            miter_lim: if limit > 2.0 { 2.0 / (limit * limit) } else { 0.5 },
        };
        paths
            .iter()
            .flat_map(|p| raw_offset::build(&p.contour, p.join_type, p.end_type, params))
            .collect()
    }

    /// A clipper loaded with the raw offset contours and the fill rule that
    /// removes their self-overlaps. Shrinking adds an enclosing frame and
    /// reverses the solution so holes come out as outer rings.
    fn clean_up_clipper(
        &self,
        delta: f64,
        last_source_index: i64,
    ) -> Result<(Clipper, PolyFillType)> {
        let raw = self.raw_offset(delta);
        debug!(delta, paths = self.paths.len(), contours = raw.len(), "raw offset built");
        let mut clipper = Clipper::with_options(ClipOptions {
            last_source_index,
            ..ClipOptions::default()
        });
        clipper.add_paths(&raw, PolyType::Subject, true)?;
        if delta > 0.0 {
            return Ok((clipper, PolyFillType::Positive));
        }

        let r = bounds(&raw);
        let frame = [
            IntPoint::new(r.left - 10, r.bottom + 10),
            IntPoint::new(r.right + 10, r.bottom + 10),
            IntPoint::new(r.right + 10, r.top - 10),
            IntPoint::new(r.left - 10, r.top - 10),
        ];
        clipper.add_path(&frame, PolyType::Subject, true)?;
        clipper.options_mut().reverse_solution = true;
        Ok((clipper, PolyFillType::Negative))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::path_from_coords;
    use crate::math::polygon_2d::area;
    use crate::math::PointOrigin;
    use approx::assert_relative_eq;

    fn square(x: i64, y: i64, size: i64) -> Path {
        path_from_coords(&[(x, y), (x + size, y), (x + size, y + size), (x, y + size)])
    }

    fn offset(path: &[IntPoint], join: JoinType, end: EndType, delta: f64) -> Paths {
        let mut co = ClipperOffset::new();
        co.add_path(path, join, end);
        co.execute(delta).unwrap()
    }

    fn total_area(paths: &Paths) -> f64 {
        paths.iter().map(|p| area(p)).sum()
    }

    #[test]
    fn mitered_square_grows_to_larger_square() {
        let result = offset(&square(0, 0, 100), JoinType::Miter, EndType::ClosedPolygon, 10.0);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].len(), 4);
        assert_relative_eq!(area(&result[0]), 14_400.0);
    }

    #[test]
    fn reversed_input_still_grows() {
        let mut reversed = square(0, 0, 100);
        reversed.reverse();
        let result = offset(&reversed, JoinType::Miter, EndType::ClosedPolygon, 10.0);
        assert_eq!(result.len(), 1);
        assert_relative_eq!(area(&result[0]).abs(), 14_400.0);
    }

    #[test]
    fn round_and_square_joins_cut_the_corners() {
        let src = square(0, 0, 100);
        let miter = area(&offset(&src, JoinType::Miter, EndType::ClosedPolygon, 10.0)[0]);
        let round = area(&offset(&src, JoinType::Round, EndType::ClosedPolygon, 10.0)[0]);
        let sq = area(&offset(&src, JoinType::Square, EndType::ClosedPolygon, 10.0)[0]);
        // Exact rounded area is 10000 + 4000 + 100 * pi.
        assert!((round - 14_314.0).abs() < 30.0, "{round}");
        assert!(sq < miter);
        assert!(round < miter);
        assert!(sq > 14_000.0);
    }

    #[test]
    fn grow_then_shrink_restores_convex_area() {
        let pentagon = path_from_coords(&[(0, 0), (1000, 0), (1400, 700), (500, 1300), (-400, 700)]);
        let original = area(&pentagon);

        let mut co = ClipperOffset::with_options(OffsetOptions {
            arc_tolerance: 0.05,
            ..OffsetOptions::default()
        });
        co.add_path(&pentagon, JoinType::Round, EndType::ClosedPolygon);
        let grown = co.execute(50.0).unwrap();
        assert_eq!(grown.len(), 1);
        assert!(area(&grown[0]) > original);

        let mut back = ClipperOffset::with_options(*co.options());
        back.add_paths(&grown, JoinType::Round, EndType::ClosedPolygon);
        let restored = back.execute(-50.0).unwrap();
        assert_eq!(restored.len(), 1);
        let rel = (area(&restored[0]) - original).abs() / original;
        assert!(rel < 1e-3, "{original} vs {}", area(&restored[0]));
    }

    #[test]
    fn negative_delta_shrinks_square() {
        let result = offset(&square(0, 0, 100), JoinType::Round, EndType::ClosedPolygon, -10.0);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].len(), 4);
        assert_relative_eq!(area(&result[0]), 6_400.0);
        for corner in [(10, 10), (90, 10), (90, 90), (10, 90)] {
            assert!(result[0].contains(&IntPoint::from(corner)));
        }
    }

    #[test]
    fn shrinking_past_the_inradius_removes_everything() {
        let result = offset(&square(0, 0, 10), JoinType::Miter, EndType::ClosedPolygon, -6.0);
        assert!(result.is_empty());
    }

    #[test]
    fn single_point_becomes_a_circle() {
        let pt = [IntPoint::new(0, 0)];
        let result = offset(&pt, JoinType::Round, EndType::ClosedPolygon, 100.0);
        assert_eq!(result.len(), 1);
        let a = area(&result[0]);
        assert!(a > 30_000.0 && a < std::f64::consts::PI * 10_000.0, "{a}");

        let mut fine = ClipperOffset::with_options(OffsetOptions {
            arc_tolerance: 0.05,
            ..OffsetOptions::default()
        });
        fine.add_path(&pt, JoinType::Round, EndType::ClosedPolygon);
        let finer = fine.execute(100.0).unwrap();
        assert!(finer[0].len() > result[0].len());
    }

    #[test]
    fn single_point_with_square_join_becomes_a_square() {
        let result = offset(&[IntPoint::new(5, 5)], JoinType::Square, EndType::ClosedPolygon, 5.0);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].len(), 4);
        assert_relative_eq!(area(&result[0]), 100.0);
    }

    #[test]
    fn two_point_polygon_is_ignored() {
        let line = path_from_coords(&[(0, 0), (10, 0)]);
        assert!(offset(&line, JoinType::Round, EndType::ClosedPolygon, 5.0).is_empty());
    }

    #[test]
    fn open_line_end_caps() {
        let line = path_from_coords(&[(0, 0), (100, 0)]);
        let butt = offset(&line, JoinType::Miter, EndType::OpenButt, 5.0);
        assert_eq!(butt.len(), 1);
        assert_relative_eq!(area(&butt[0]).abs(), 1_000.0);

        let square_cap = offset(&line, JoinType::Miter, EndType::OpenSquare, 5.0);
        assert_relative_eq!(area(&square_cap[0]).abs(), 1_100.0);

        let round_cap = offset(&line, JoinType::Miter, EndType::OpenRound, 5.0);
        let a = area(&round_cap[0]).abs();
        assert!(a > 1_000.0 && a < 1_100.0, "{a}");
    }

    #[test]
    fn closed_line_becomes_a_frame() {
        let result = offset(&square(0, 0, 100), JoinType::Miter, EndType::ClosedLine, 5.0);
        assert_eq!(result.len(), 2);
        assert_relative_eq!(total_area(&result).abs(), 110.0 * 110.0 - 90.0 * 90.0);
    }

    #[test]
    fn zero_delta_returns_closed_polygons_unchanged() {
        let mut co = ClipperOffset::new();
        co.add_path(&square(0, 0, 10), JoinType::Round, EndType::ClosedPolygon);
        co.add_path(&path_from_coords(&[(0, 0), (5, 5)]), JoinType::Round, EndType::OpenRound);
        let result = co.execute(0.0).unwrap();
        assert_eq!(result.len(), 1);
        assert_relative_eq!(area(&result[0]), 100.0);
    }

    #[test]
    fn duplicates_are_dropped_on_add() {
        let mut co = ClipperOffset::new();
        co.add_path(
            &path_from_coords(&[(0, 0), (0, 0), (10, 0), (10, 10), (0, 10), (0, 0)]),
            JoinType::Miter,
            EndType::ClosedPolygon,
        );
        assert_eq!(co.paths[0].contour.len(), 4);
        assert_eq!(co.lowest, Some((0, 3)));
        co.clear();
        assert!(co.paths.is_empty());
        assert!(co.lowest.is_none());
    }

    #[test]
    fn offset_vertices_carry_source_and_normal() {
        let src = square(0, 0, 100);
        let mut co = ClipperOffset::new();
        co.add_path(&src, JoinType::Round, EndType::ClosedPolygon);
        let result = co.execute_with_source_len(10.0, src.len()).unwrap();
        let tagged: Vec<_> = result[0]
            .iter()
            .filter(|p| p.origin == PointOrigin::Offset)
            .collect();
        assert!(!tagged.is_empty());
        for pt in tagged {
            let j = pt.source.unwrap();
            assert!(j < src.len());
            assert_relative_eq!(pt.normal.norm(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn shrinking_into_a_tree_drops_the_frame() {
        let mut co = ClipperOffset::new();
        co.add_path(&square(0, 0, 100), JoinType::Miter, EndType::ClosedPolygon);
        let tree = co.execute_tree(-10.0).unwrap();
        assert_eq!(tree.total(), 1);
        let node = tree.first().unwrap();
        assert!(!tree.is_hole(node).unwrap());
        assert_relative_eq!(area(tree.contour(node).unwrap()).abs(), 6_400.0);

        co.clear();
        co.add_path(&square(0, 0, 10), JoinType::Miter, EndType::ClosedPolygon);
        assert_eq!(co.execute_tree(-6.0).unwrap().total(), 0);
    }

    #[test]
    fn growing_into_a_tree_keeps_holes() {
        let mut co = ClipperOffset::new();
        let mut hole = square(30, 30, 40);
        hole.reverse();
        co.add_paths(&[square(0, 0, 100), hole], JoinType::Miter, EndType::ClosedPolygon);
        let tree = co.execute_tree(5.0).unwrap();
        assert_eq!(tree.total(), 2);
        let outer = tree.first().unwrap();
        let holes = tree.children(outer).unwrap();
        assert_eq!(holes.len(), 1);
        assert_relative_eq!(area(tree.contour(holes[0]).unwrap()).abs(), 900.0);
    }
}
