//! Boolean clipping of integer polygons with Vatti's sweep-line algorithm.
//!
//! The sweep runs from the largest Y toward the smallest. Input paths are
//! split into bounds at their local minima (`local_minima`); the sweep
//! keeps the edges crossing the current scanline in an active edge list,
//! resolves crossings per scanbeam (`intersections`), handles horizontals
//! separately (`horizontal`) and grows output rings (`out_rec`) that
//! are post-processed (`joins`) into paths or a tree (`result`).

mod clipper;
mod edge;
mod horizontal;
mod intersections;
mod joins;
mod local_minima;
mod out_rec;
mod result;
mod select;
mod sweep;

pub use clipper::{ClipOptions, Clipper};
pub use select::{ClipType, PolyFillType, PolyType};
