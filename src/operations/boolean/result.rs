//! Conversion of finished output rings into paths or a [`PolyTree`].

use crate::math::{Path, Paths};
use crate::topology::{PolyNode, PolyNodeId, PolyTree};

use super::out_rec::{point_count, OutPtId};
use super::sweep::Sweep;

impl Sweep<'_> {
    /// Vertices of a ring, walked backwards from the right-most vertex so
    /// that output orientation matches the area convention.
    fn ring_path(&self, pts: OutPtId, count: usize) -> Path {
        let mut op = self.out_pts[pts].prev;
        let mut path = Vec::with_capacity(count);
        for _ in 0..count {
            path.push(self.out_pts[op].pt);
            op = self.out_pts[op].prev;
        }
        path
    }

    /// Every ring with at least two vertices, as a flat list.
    pub fn build_result(&self) -> Paths {
        self.out_recs
            .iter()
            .filter_map(|rec| {
                let pts = rec.pts?;
                let count = point_count(&self.out_pts, Some(pts));
                (count >= 2).then(|| self.ring_path(pts, count))
            })
            .collect()
    }

    /// Skips `first_left` links to records that are gone or share the
    /// record's own hole state, so every hole points at its outer ring.
    fn fix_hole_linkage(&mut self, rec: usize) {
        let Some(first_left) = self.out_recs[rec].first_left else {
            return;
        };
        let is_hole = self.out_recs[rec].is_hole;
        let fl = &self.out_recs[first_left];
        if is_hole != fl.is_hole && fl.pts.is_some() {
            return;
        }
        let mut orfl = Some(first_left);
        while let Some(idx) = orfl {
            let candidate = &self.out_recs[idx];
            if candidate.is_hole != is_hole && candidate.pts.is_some() {
                break;
            }
            orfl = candidate.first_left;
        }
        self.out_recs[rec].first_left = orfl;
    }

    /// Builds the containment hierarchy of the output rings.
    pub fn build_result_tree(&mut self) -> PolyTree {
        let mut tree = PolyTree::new();
        let mut nodes: Vec<Option<PolyNodeId>> = vec![None; self.out_recs.len()];

        for idx in 0..self.out_recs.len() {
            let rec = &self.out_recs[idx];
            let Some(pts) = rec.pts else { continue };
            let count = point_count(&self.out_pts, Some(pts));
            if (rec.is_open && count < 2) || (!rec.is_open && count < 3) {
                continue;
            }
            let is_open = rec.is_open;
            self.fix_hole_linkage(idx);
            let contour = self.ring_path(pts, count);
            nodes[idx] = Some(tree.add_node(PolyNode::new(contour, is_open)));
        }

        let root = tree.root();
        for (idx, node) in nodes.iter().enumerate() {
            let Some(node) = *node else { continue };
            let rec = &self.out_recs[idx];
            let parent = if rec.is_open {
                None
            } else {
                rec.first_left.and_then(|fl| nodes[fl])
            };
            tree.add_child(parent.unwrap_or(root), node);
        }
        tree
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::IntPoint;
    use crate::operations::boolean::clipper::ClipOptions;
    use crate::operations::boolean::local_minima::EdgeStore;
    use crate::operations::boolean::out_rec::{link, OutPt};
    use crate::operations::boolean::select::{ClipType, FillRules, PolyFillType};

    fn push_ring(sweep: &mut Sweep<'_>, coords: &[(i64, i64)]) {
        let idx = sweep.create_out_rec();
        let ids: Vec<OutPtId> = coords
            .iter()
            .map(|&c| {
                sweep.out_pts.insert_with_key(|key| OutPt {
                    idx,
                    pt: IntPoint::from(c),
                    next: key,
                    prev: key,
                })
            })
            .collect();
        for (i, &id) in ids.iter().enumerate() {
            link(&mut sweep.out_pts, id, ids[(i + 1) % ids.len()]);
        }
        sweep.out_recs[idx].pts = Some(ids[0]);
    }

    #[test]
    fn two_point_rings_appear_only_in_flat_output() {
        let mut store = EdgeStore::default();
        let fills = FillRules {
            subject: PolyFillType::NonZero,
            clip: PolyFillType::NonZero,
        };
        let mut sweep = Sweep::new(&mut store, ClipType::Union, fills, ClipOptions::default(), false);
        push_ring(&mut sweep, &[(0, 0), (10, 0), (10, 10)]);
        push_ring(&mut sweep, &[(3, 7), (4, 7)]);

        let flat = sweep.build_result();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].len(), 3);
        assert_eq!(flat[1].len(), 2);

        let tree = sweep.build_result_tree();
        assert_eq!(tree.total(), 1);
        let only = tree.first().unwrap();
        assert_eq!(tree.contour(only).unwrap().len(), 3);
    }
}
