pub mod poly_node;

pub use poly_node::{PolyNode, PolyNodeId};

use crate::error::TopologyError;
use crate::math::{Path, Paths};
use slotmap::SlotMap;

/// Hierarchical clipping result.
///
/// Nodes live in an arena and reference each other via typed IDs. The root
/// carries no contour; its children are outer rings and open polylines, the
/// children of an outer ring are its holes, and so on alternately.
#[derive(Debug)]
pub struct PolyTree {
    nodes: SlotMap<PolyNodeId, PolyNode>,
    root: PolyNodeId,
}

impl Default for PolyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PolyTree {
    /// Creates a tree holding only the root node.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(PolyNode::default());
        Self { nodes, root }
    }

    /// Removes every node except the root.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.insert(PolyNode::default());
    }

    /// The contour-less root node.
    #[must_use]
    pub fn root(&self) -> PolyNodeId {
        self.root
    }

    /// Returns a reference to the node, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` does not belong to this tree.
    pub fn node(&self, id: PolyNodeId) -> Result<&PolyNode, TopologyError> {
        self.nodes
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("poly node".into()))
    }

    /// Children of `id` in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` does not belong to this tree.
    pub fn children(&self, id: PolyNodeId) -> Result<&[PolyNodeId], TopologyError> {
        Ok(&self.node(id)?.children)
    }

    /// Number of direct children of `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` does not belong to this tree.
    pub fn child_count(&self, id: PolyNodeId) -> Result<usize, TopologyError> {
        Ok(self.node(id)?.children.len())
    }

    /// Parent of `id`; `None` for the root.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` does not belong to this tree.
    pub fn parent(&self, id: PolyNodeId) -> Result<Option<PolyNodeId>, TopologyError> {
        Ok(self.node(id)?.parent)
    }

    /// Contour of `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` does not belong to this tree.
    pub fn contour(&self, id: PolyNodeId) -> Result<&Path, TopologyError> {
        Ok(&self.node(id)?.contour)
    }

    /// Returns `true` when `id` is an open polyline.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` does not belong to this tree.
    pub fn is_open(&self, id: PolyNodeId) -> Result<bool, TopologyError> {
        Ok(self.node(id)?.is_open)
    }

    /// Returns `true` when `id` sits at an odd depth below the root's
    /// children, i.e. it is a hole.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` does not belong to this tree.
    pub fn is_hole(&self, id: PolyNodeId) -> Result<bool, TopologyError> {
        let mut result = true;
        let mut current = self.node(id)?.parent;
        while let Some(parent) = current {
            result = !result;
            current = self.node(parent)?.parent;
        }
        Ok(result)
    }

    /// Number of contour nodes in the tree (the root is not counted).
    #[must_use]
    pub fn total(&self) -> usize {
        self.nodes.len() - 1
    }

    /// First child of the root, if any.
    #[must_use]
    pub fn first(&self) -> Option<PolyNodeId> {
        self.nodes[self.root].children.first().copied()
    }

    /// Next node in depth-first order, or `None` after the last node.
    #[must_use]
    pub fn next(&self, id: PolyNodeId) -> Option<PolyNodeId> {
        let node = self.nodes.get(id)?;
        if let Some(&child) = node.children.first() {
            return Some(child);
        }
        self.next_sibling_up(id)
    }

    fn next_sibling_up(&self, id: PolyNodeId) -> Option<PolyNodeId> {
        let mut current = id;
        loop {
            let node = self.nodes.get(current)?;
            let parent = self.nodes.get(node.parent?)?;
            if let Some(&sibling) = parent.children.get(node.index + 1) {
                return Some(sibling);
            }
            current = node.parent?;
        }
    }

    /// Every non-empty contour, open or closed, in depth-first order.
    #[must_use]
    pub fn to_paths(&self) -> Paths {
        let mut paths = Vec::with_capacity(self.total());
        self.collect_paths(self.root, true, &mut paths);
        paths
    }

    /// Every non-empty closed contour in depth-first order.
    #[must_use]
    pub fn closed_paths(&self) -> Paths {
        let mut paths = Vec::with_capacity(self.total());
        self.collect_paths(self.root, false, &mut paths);
        paths
    }

    /// Contours of the open polylines (children of the root).
    #[must_use]
    pub fn open_paths(&self) -> Paths {
        self.nodes[self.root]
            .children
            .iter()
            .filter_map(|&id| self.nodes.get(id))
            .filter(|node| node.is_open)
            .map(|node| node.contour.clone())
            .collect()
    }

    fn collect_paths(&self, id: PolyNodeId, include_open: bool, paths: &mut Paths) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.is_open && !include_open {
            return;
        }
        if !node.contour.is_empty() {
            paths.push(node.contour.clone());
        }
        for &child in &node.children {
            self.collect_paths(child, include_open, paths);
        }
    }

    /// Inserts a detached node.
    pub(crate) fn add_node(&mut self, node: PolyNode) -> PolyNodeId {
        self.nodes.insert(node)
    }

    /// Appends `child` to `parent`'s children.
    pub(crate) fn add_child(&mut self, parent: PolyNodeId, child: PolyNodeId) {
        let Some(parent_node) = self.nodes.get_mut(parent) else {
            return;
        };
        let index = parent_node.children.len();
        parent_node.children.push(child);
        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = Some(parent);
            child_node.index = index;
        }
    }

    /// Removes the root's first child and lifts its children into its place.
    pub(crate) fn lift_first_child(&mut self) {
        let Some(frame) = self.first() else {
            return;
        };
        let Some(frame_node) = self.nodes.remove(frame) else {
            return;
        };
        let siblings = std::mem::take(&mut self.nodes[self.root].children);
        let root = self.root;
        for child in frame_node
            .children
            .into_iter()
            .chain(siblings.into_iter().skip(1))
        {
            self.add_child(root, child);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::path_from_coords;

    fn sample_tree() -> (PolyTree, PolyNodeId, PolyNodeId, PolyNodeId, PolyNodeId) {
        let mut tree = PolyTree::new();
        let outer = tree.add_node(PolyNode::new(
            path_from_coords(&[(0, 0), (100, 0), (100, 100), (0, 100)]),
            false,
        ));
        let hole = tree.add_node(PolyNode::new(
            path_from_coords(&[(10, 10), (10, 90), (90, 90), (90, 10)]),
            false,
        ));
        let island = tree.add_node(PolyNode::new(
            path_from_coords(&[(40, 40), (60, 40), (60, 60), (40, 60)]),
            false,
        ));
        let line = tree.add_node(PolyNode::new(path_from_coords(&[(0, 0), (5, 5)]), true));
        tree.add_child(tree.root(), outer);
        tree.add_child(outer, hole);
        tree.add_child(hole, island);
        tree.add_child(tree.root(), line);
        (tree, outer, hole, island, line)
    }

    #[test]
    fn hole_state_alternates_with_depth() {
        let (tree, outer, hole, island, line) = sample_tree();
        assert!(!tree.is_hole(outer).unwrap());
        assert!(tree.is_hole(hole).unwrap());
        assert!(!tree.is_hole(island).unwrap());
        assert!(!tree.is_hole(line).unwrap());
        assert_eq!(tree.parent(hole).unwrap(), Some(outer));
        assert_eq!(tree.parent(tree.root()).unwrap(), None);
    }

    #[test]
    fn depth_first_traversal_visits_every_node() {
        let (tree, outer, hole, island, line) = sample_tree();
        let mut order = Vec::new();
        let mut current = tree.first();
        while let Some(id) = current {
            order.push(id);
            current = tree.next(id);
        }
        assert_eq!(order, vec![outer, hole, island, line]);
        assert_eq!(tree.total(), 4);
    }

    #[test]
    fn path_extraction_separates_open_and_closed() {
        let (tree, ..) = sample_tree();
        assert_eq!(tree.to_paths().len(), 4);
        assert_eq!(tree.closed_paths().len(), 3);
        let open = tree.open_paths();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].len(), 2);
    }

    #[test]
    fn lifting_first_child_removes_frame() {
        let (mut tree, _, hole, island, line) = sample_tree();
        tree.lift_first_child();
        assert_eq!(tree.children(tree.root()).unwrap(), &[hole, line]);
        assert!(!tree.is_hole(hole).unwrap());
        assert!(tree.is_hole(island).unwrap());
        assert_eq!(tree.total(), 3);
    }

    #[test]
    fn clear_keeps_root_only() {
        let (mut tree, outer, ..) = sample_tree();
        tree.clear();
        assert_eq!(tree.total(), 0);
        assert!(tree.first().is_none());
        assert!(tree.node(outer).is_err());
        assert_eq!(tree.child_count(tree.root()).unwrap(), 0);
    }
}
