use crate::math::Path;

slotmap::new_key_type! {
    /// Unique identifier for a node in a [`PolyTree`](super::PolyTree).
    pub struct PolyNodeId;
}

/// One contour in a [`PolyTree`](super::PolyTree) together with its links.
#[derive(Debug, Clone, Default)]
pub struct PolyNode {
    /// The contour vertices. Empty for the root.
    pub contour: Path,
    /// Nested contours, in insertion order.
    pub children: Vec<PolyNodeId>,
    pub parent: Option<PolyNodeId>,
    /// Position of this node within its parent's `children`.
    pub index: usize,
    /// `true` for open polylines, which are always children of the root.
    pub is_open: bool,
}

impl PolyNode {
    /// Creates a detached node holding `contour`.
    #[must_use]
    pub fn new(contour: Path, is_open: bool) -> Self {
        Self {
            contour,
            is_open,
            ..Self::default()
        }
    }
}
