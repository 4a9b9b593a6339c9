use crate::error::Result;
use crate::math::polygon_2d::orientation;
use crate::math::{IntPoint, Path, Paths};
use crate::operations::boolean::{ClipType, Clipper, PolyFillType, PolyType};

/// Quads swept by each pattern edge as the pattern moves along `path`.
///
/// With `is_sum` the pattern is added to every path vertex, otherwise
/// subtracted. Every quad is oriented positively so a non-zero union
/// covers the swept area.
fn minkowski(pattern: &[IntPoint], path: &[IntPoint], is_sum: bool, is_closed: bool) -> Paths {
    let poly_cnt = pattern.len();
    let path_cnt = path.len();
    if poly_cnt == 0 || path_cnt == 0 {
        return Vec::new();
    }

    let placed: Vec<Path> = path
        .iter()
        .map(|p| {
            pattern
                .iter()
                .map(|q| {
                    if is_sum {
                        IntPoint::new(p.x + q.x, p.y + q.y)
                    } else {
                        IntPoint::new(p.x - q.x, p.y - q.y)
                    }
                })
                .collect()
        })
        .collect();

    let steps = path_cnt - 1 + usize::from(is_closed);
    let mut quads = Vec::with_capacity(steps * poly_cnt);
    for i in 0..steps {
        let (a, b) = (&placed[i % path_cnt], &placed[(i + 1) % path_cnt]);
        for j in 0..poly_cnt {
            let k = (j + 1) % poly_cnt;
            let mut quad = vec![a[j], b[j], b[k], a[k]];
            if !orientation(&quad) {
                quad.reverse();
            }
            quads.push(quad);
        }
    }
    quads
}

fn union_non_zero(subject: &[Path], clip: &[Path]) -> Result<Paths> {
    let mut clipper = Clipper::new();
    clipper.add_paths(subject, PolyType::Subject, true)?;
    clipper.add_paths(clip, PolyType::Clip, true)?;
    clipper.execute_with(ClipType::Union, PolyFillType::NonZero)
}

/// Area swept by `pattern` as its origin travels along `path`.
///
/// For a closed path the sweep follows the closing edge too; the interior
/// enclosed by the path is not filled.
///
/// # Errors
///
/// Returns an error if a coordinate is out of range or the union fails.
pub fn minkowski_sum(pattern: &[IntPoint], path: &[IntPoint], path_is_closed: bool) -> Result<Paths> {
    let quads = minkowski(pattern, path, true, path_is_closed);
    union_non_zero(&quads, &[])
}

/// [`minkowski_sum`] over several paths at once. Closed paths also
/// contribute their interior, shifted by the first pattern vertex.
///
/// # Errors
///
/// Returns an error if a coordinate is out of range or the union fails.
pub fn minkowski_sum_paths(pattern: &[IntPoint], paths: &[Path], path_is_closed: bool) -> Result<Paths> {
    let mut quads = Vec::new();
    let mut interiors: Paths = Vec::new();
    for path in paths {
        quads.extend(minkowski(pattern, path, true, path_is_closed));
        if let (true, Some(origin)) = (path_is_closed, pattern.first()) {
            interiors.push(
                path.iter()
                    .map(|p| IntPoint::new(p.x + origin.x, p.y + origin.y))
                    .collect(),
            );
        }
    }
    union_non_zero(&quads, &interiors)
}

/// Minkowski difference `poly2 - poly1` of two closed polygons.
///
/// # Errors
///
/// Returns an error if a coordinate is out of range or the union fails.
pub fn minkowski_diff(poly1: &[IntPoint], poly2: &[IntPoint]) -> Result<Paths> {
    let quads = minkowski(poly1, poly2, false, true);
    union_non_zero(&quads, &[])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::path_from_coords;
    use crate::math::polygon_2d::area;
    use approx::assert_relative_eq;

    fn unit_box() -> Path {
        path_from_coords(&[(-1, -1), (1, -1), (1, 1), (-1, 1)])
    }

    fn total_area(paths: &Paths) -> f64 {
        paths.iter().map(|p| area(p)).sum()
    }

    #[test]
    fn box_swept_along_segment() {
        let line = path_from_coords(&[(0, 0), (10, 0)]);
        let result = minkowski_sum(&unit_box(), &line, false).unwrap();
        assert_eq!(result.len(), 1);
        assert_relative_eq!(area(&result[0]).abs(), 24.0);
    }

    #[test]
    fn closed_path_sweep_leaves_a_hole() {
        let square = path_from_coords(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        let result = minkowski_sum(&unit_box(), &square, true).unwrap();
        assert_eq!(result.len(), 2);
        assert_relative_eq!(total_area(&result).abs(), 144.0 - 64.0);
    }

    #[test]
    fn closed_paths_sum_fills_interior() {
        let square = path_from_coords(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        let result = minkowski_sum_paths(&unit_box(), &[square], true).unwrap();
        assert_eq!(result.len(), 1);
        assert_relative_eq!(area(&result[0]).abs(), 144.0);
    }

    #[test]
    fn difference_of_equal_squares() {
        let square = path_from_coords(&[(0, 0), (2, 0), (2, 2), (0, 2)]);
        let result = minkowski_diff(&square, &square).unwrap();
        assert_relative_eq!(total_area(&result).abs(), 16.0);
    }

    #[test]
    fn empty_inputs_give_nothing() {
        assert!(minkowski(&[], &unit_box(), true, true).is_empty());
        assert!(minkowski_sum(&unit_box(), &[], false).unwrap().is_empty());
    }
}
