use crate::error::Result;
use crate::math::{IntPoint, Path, Paths};
use crate::operations::boolean::{ClipOptions, ClipType, Clipper, PolyFillType, PolyType};

fn strictly_simple_clipper() -> Clipper {
    Clipper::with_options(ClipOptions {
        strictly_simple: true,
        ..ClipOptions::default()
    })
}

/// Splits a self-intersecting polygon into simple polygons whose interiors
/// are filled according to `fill`.
///
/// # Errors
///
/// Returns an error if a coordinate is out of range or the union fails.
pub fn simplify_polygon(path: &[IntPoint], fill: PolyFillType) -> Result<Paths> {
    let mut clipper = strictly_simple_clipper();
    clipper.add_path(path, PolyType::Subject, true)?;
    clipper.execute_with(ClipType::Union, fill)
}

/// Like [`simplify_polygon`] for a set of polygons filled together.
///
/// # Errors
///
/// Returns an error if a coordinate is out of range or the union fails.
pub fn simplify_polygons(paths: &[Path], fill: PolyFillType) -> Result<Paths> {
    let mut clipper = strictly_simple_clipper();
    clipper.add_paths(paths, PolyType::Subject, true)?;
    clipper.execute_with(ClipType::Union, fill)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::path_from_coords;
    use crate::math::polygon_2d::area;
    use approx::assert_relative_eq;

    #[test]
    fn bow_tie_splits_in_two() {
        let bow_tie = path_from_coords(&[(0, 0), (10, 10), (10, 0), (0, 10)]);
        let result = simplify_polygon(&bow_tie, PolyFillType::EvenOdd).unwrap();
        assert_eq!(result.len(), 2);
        for ring in &result {
            assert_eq!(ring.len(), 3);
            assert_relative_eq!(area(ring).abs(), 25.0);
        }
    }

    #[test]
    fn overlapping_squares_merge_under_nonzero() {
        let squares = vec![
            path_from_coords(&[(0, 0), (10, 0), (10, 10), (0, 10)]),
            path_from_coords(&[(5, 0), (15, 0), (15, 10), (5, 10)]),
        ];
        let result = simplify_polygons(&squares, PolyFillType::NonZero).unwrap();
        assert_eq!(result.len(), 1);
        assert_relative_eq!(area(&result[0]), 150.0);
    }

    #[test]
    fn even_odd_cuts_overlap_out() {
        let squares = vec![
            path_from_coords(&[(0, 0), (10, 0), (10, 10), (0, 10)]),
            path_from_coords(&[(5, 0), (15, 0), (15, 10), (5, 10)]),
        ];
        let result = simplify_polygons(&squares, PolyFillType::EvenOdd).unwrap();
        assert_eq!(result.len(), 2);
        let total: f64 = result.iter().map(|p| area(p).abs()).sum();
        assert_relative_eq!(total, 100.0);
    }
}
