use tracing::debug;

use crate::error::{OperationError, Result};
use crate::math::{IntPoint, IntRect, Path, Paths};
use crate::topology::PolyTree;

use super::local_minima::EdgeStore;
use super::select::{ClipType, FillRules, PolyFillType, PolyType};
use super::sweep::Sweep;

/// Options controlling the shape of clipping output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipOptions {
    /// Flips the orientation of every output ring.
    pub reverse_solution: bool,
    /// Splits rings that touch themselves or each other at a vertex.
    pub strictly_simple: bool,
    /// Keeps collinear vertices in input and output.
    pub preserve_collinear: bool,
    /// Highest source-vertex index that crossing points may inherit.
    pub last_source_index: i64,
}

/// Boolean clipping of subject and clip polygons.
///
/// Paths are loaded with [`Clipper::add_path`] and stay loaded across
/// executions until [`Clipper::clear`] is called.
#[derive(Debug, Default)]
pub struct Clipper {
    pub(super) store: EdgeStore,
    options: ClipOptions,
}

impl Clipper {
    /// Creates an empty clipper with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty clipper with the given options.
    #[must_use]
    pub fn with_options(options: ClipOptions) -> Self {
        Self {
            store: EdgeStore::default(),
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &ClipOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ClipOptions {
        &mut self.options
    }

    /// Adds one path as subject or clip.
    ///
    /// Returns `Ok(false)` when the path degenerates to nothing after removal
    /// of duplicate and collinear vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if an open path is added as clip or a coordinate is
    /// out of range.
    pub fn add_path(&mut self, path: &[IntPoint], poly_type: PolyType, closed: bool) -> Result<bool> {
        self.store
            .add_path(path, poly_type, closed, self.options.preserve_collinear)
    }

    /// Adds several paths; returns `Ok(true)` if any of them was kept.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`Clipper::add_path`].
    pub fn add_paths(&mut self, paths: &[Path], poly_type: PolyType, closed: bool) -> Result<bool> {
        let mut added = false;
        for path in paths {
            added |= self.add_path(path, poly_type, closed)?;
        }
        Ok(added)
    }

    /// Removes every loaded path.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Bounding rectangle of the loaded paths.
    #[must_use]
    pub fn bounds(&self) -> IntRect {
        self.store.bounds()
    }

    /// Clips the loaded paths into a flat list of closed rings.
    ///
    /// Rings are kept down to two vertices, so strictly simple output may
    /// contain degenerate two-point rings. [`Clipper::execute_tree`] drops
    /// closed rings with fewer than three vertices.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::OpenPathsRequireTree` when open paths are
    /// loaded, or an error if the sweep fails.
    pub fn execute(
        &mut self,
        clip_type: ClipType,
        subject_fill: PolyFillType,
        clip_fill: PolyFillType,
    ) -> Result<Paths> {
        if self.store.has_open_paths {
            return Err(OperationError::OpenPathsRequireTree.into());
        }
        let fills = FillRules {
            subject: subject_fill,
            clip: clip_fill,
        };
        debug!(?clip_type, ?fills, minima = self.store.minima.len(), "clipping");
        let mut sweep = Sweep::new(&mut self.store, clip_type, fills, self.options, false);
        sweep.execute()?;
        let paths = sweep.build_result();
        debug!(paths = paths.len(), "clipping finished");
        Ok(paths)
    }

    /// Like [`Clipper::execute`] with one fill rule for both operands.
    ///
    /// # Errors
    ///
    /// See [`Clipper::execute`].
    pub fn execute_with(&mut self, clip_type: ClipType, fill: PolyFillType) -> Result<Paths> {
        self.execute(clip_type, fill, fill)
    }

    /// Clips the loaded paths into a [`PolyTree`]; open subject paths become
    /// open children of the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the sweep fails.
    pub fn execute_tree(
        &mut self,
        clip_type: ClipType,
        subject_fill: PolyFillType,
        clip_fill: PolyFillType,
    ) -> Result<PolyTree> {
        let fills = FillRules {
            subject: subject_fill,
            clip: clip_fill,
        };
        debug!(?clip_type, ?fills, minima = self.store.minima.len(), "clipping into tree");
        let mut sweep = Sweep::new(&mut self.store, clip_type, fills, self.options, true);
        sweep.execute()?;
        let tree = sweep.build_result_tree();
        debug!(nodes = tree.total(), "clipping finished");
        Ok(tree)
    }
}
