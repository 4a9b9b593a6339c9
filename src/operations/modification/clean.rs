use crate::math::distance_2d::{points_are_close, slopes_near_collinear};
use crate::math::{IntPoint, Path, Paths};

/// Proximity below which [`clean_polygon`] strips vertices by default.
///
/// Slightly above `sqrt(2)`, so a vertex within one unit of a neighbour on
/// both axes is removed.
pub const DEFAULT_CLEAN_DISTANCE: f64 = 1.415;

/// Circular doubly linked list over the vertex indices of one ring.
struct Ring {
    next: Vec<usize>,
    prev: Vec<usize>,
    checked: Vec<bool>,
}

impl Ring {
    fn new(len: usize) -> Self {
        Self {
            next: (0..len).map(|i| (i + 1) % len).collect(),
            prev: (0..len).map(|i| (i + len - 1) % len).collect(),
            checked: vec![false; len],
        }
    }

    /// Unlinks `op` and returns its predecessor, which must be checked again.
    fn exclude(&mut self, op: usize) -> usize {
        let prev = self.prev[op];
        let next = self.next[op];
        self.next[prev] = next;
        self.prev[next] = prev;
        self.checked[prev] = false;
        prev
    }
}

/// Removes vertices that are within `distance` of an adjacent or
/// semi-adjacent vertex, or that lie within `distance` of the line through
/// their neighbours.
///
/// Returns an empty path if fewer than three vertices survive.
#[must_use]
pub fn clean_polygon(path: &[IntPoint], distance: f64) -> Path {
    let mut cnt = path.len();
    if cnt == 0 {
        return Vec::new();
    }
    let dist_sqrd = distance * distance;
    let mut ring = Ring::new(cnt);
    let mut op = 0;
    while !ring.checked[op] && ring.next[op] != ring.prev[op] {
        let prev = ring.prev[op];
        let next = ring.next[op];
        if points_are_close(path[op], path[prev], dist_sqrd) {
            op = ring.exclude(op);
            cnt -= 1;
        } else if points_are_close(path[prev], path[next], dist_sqrd) {
            ring.exclude(next);
            op = ring.exclude(op);
            cnt -= 2;
        } else if slopes_near_collinear(path[prev], path[op], path[next], dist_sqrd) {
            op = ring.exclude(op);
            cnt -= 1;
        } else {
            ring.checked[op] = true;
            op = next;
        }
    }

    if cnt < 3 {
        return Vec::new();
    }
    let mut result = Vec::with_capacity(cnt);
    for _ in 0..cnt {
        result.push(path[op]);
        op = ring.next[op];
    }
    result
}

/// [`clean_polygon`] applied to every path; emptied paths are kept as
/// empty entries.
#[must_use]
pub fn clean_polygons(paths: &[Path], distance: f64) -> Paths {
    paths.iter().map(|p| clean_polygon(p, distance)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::path_from_coords;

    #[test]
    fn strips_collinear_and_nearby_vertices() {
        let path = path_from_coords(&[(0, 0), (50, 0), (100, 0), (100, 1), (100, 100), (0, 100)]);
        let clean = clean_polygon(&path, DEFAULT_CLEAN_DISTANCE);
        assert_eq!(clean.len(), 4);
        for pt in [(0, 0), (100, 100), (0, 100)] {
            assert!(clean.contains(&IntPoint::from(pt)));
        }
        assert!(!clean.contains(&IntPoint::new(50, 0)));
    }

    #[test]
    fn tiny_rings_collapse() {
        let sliver = path_from_coords(&[(0, 0), (1, 0), (0, 1)]);
        assert!(clean_polygon(&sliver, DEFAULT_CLEAN_DISTANCE).is_empty());
        assert!(clean_polygon(&[], DEFAULT_CLEAN_DISTANCE).is_empty());
    }

    #[test]
    fn clean_square_is_untouched() {
        let square = path_from_coords(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        assert_eq!(clean_polygon(&square, DEFAULT_CLEAN_DISTANCE), square);
    }

    #[test]
    fn cleans_each_path() {
        let paths = vec![
            path_from_coords(&[(0, 0), (10, 0), (10, 10), (0, 10)]),
            path_from_coords(&[(0, 0), (1, 1), (0, 1)]),
        ];
        let clean = clean_polygons(&paths, DEFAULT_CLEAN_DISTANCE);
        assert_eq!(clean.len(), 2);
        assert_eq!(clean[0].len(), 4);
        assert!(clean[1].is_empty());
    }
}
