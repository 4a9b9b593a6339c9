//! Path clean-up and derived shapes built on the boolean engine.

mod clean;
mod minkowski;
mod simplify;

pub use clean::{clean_polygon, clean_polygons, DEFAULT_CLEAN_DISTANCE};
pub use minkowski::{minkowski_diff, minkowski_sum, minkowski_sum_paths};
pub use simplify::{simplify_polygon, simplify_polygons};
