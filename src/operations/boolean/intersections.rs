//! Edge crossings inside one scanbeam.

use tracing::warn;

use crate::error::{OperationError, Result};
use crate::math::{round, IntPoint, PointOrigin};

use super::edge::{EdgeId, TEdge};
use super::sweep::{EdgeList, Sweep};

/// A pending crossing between two active edges.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IntersectNode {
    pub edge1: EdgeId,
    pub edge2: EdgeId,
    pub pt: IntPoint,
}

/// Source index for a crossing point, when both edges come from interior
/// vertices of the same tagged path.
fn pivot_source(n1: i64, n2: i64, last: i64) -> Option<usize> {
    let is_clamp = n1 > 0 && n1 < last && n2 > 0 && n2 < last;
    if !is_clamp {
        return None;
    }
    let pivot = if n1 > n2 { n1 - 1 } else { n2 };
    usize::try_from(pivot).ok()
}

fn source_index(pt: IntPoint) -> i64 {
    pt.source
        .and_then(|s| i64::try_from(s).ok())
        .unwrap_or(-1)
}

/// Where `edge1` and `edge2` cross, kept within the current scanbeam.
#[allow(clippy::float_cmp, clippy::cast_precision_loss)]
pub(crate) fn intersect_point(edge1: &TEdge, edge2: &TEdge, last_source_index: i64) -> IntPoint {
    let mut ip = IntPoint::new(0, 0);
    ip.origin = PointOrigin::Intersection;
    ip.source = pivot_source(
        source_index(edge1.curr),
        source_index(edge2.curr),
        last_source_index,
    );

    if edge1.dx == edge2.dx {
        ip.y = edge1.curr.y;
        ip.x = edge1.top_x(ip.y);
        return ip;
    }

    if edge1.delta.x == 0 {
        ip.x = edge1.bot.x;
        if edge2.is_horizontal() {
            ip.y = edge2.bot.y;
        } else {
            let b2 = edge2.bot.y as f64 - edge2.bot.x as f64 / edge2.dx;
            ip.y = round(ip.x as f64 / edge2.dx + b2);
        }
    } else if edge2.delta.x == 0 {
        ip.x = edge2.bot.x;
        if edge1.is_horizontal() {
            ip.y = edge1.bot.y;
        } else {
            let b1 = edge1.bot.y as f64 - edge1.bot.x as f64 / edge1.dx;
            ip.y = round(ip.x as f64 / edge1.dx + b1);
        }
    } else {
        let b1 = edge1.bot.x as f64 - edge1.bot.y as f64 * edge1.dx;
        let b2 = edge2.bot.x as f64 - edge2.bot.y as f64 * edge2.dx;
        let q = (b2 - b1) / (edge1.dx - edge2.dx);
        ip.y = round(q);
        ip.x = if edge1.dx.abs() < edge2.dx.abs() {
            round(edge1.dx * q + b1)
        } else {
            round(edge2.dx * q + b2)
        };
    }

    if ip.y < edge1.top.y || ip.y < edge2.top.y {
        ip.y = edge1.top.y.max(edge2.top.y);
        ip.x = if edge1.dx.abs() < edge2.dx.abs() {
            edge1.top_x(ip.y)
        } else {
            edge2.top_x(ip.y)
        };
    }
    // Never below the bottom of the scanbeam; the steeper edge gives X.
    if ip.y > edge1.curr.y {
        ip.y = edge1.curr.y;
        ip.x = if edge1.dx.abs() > edge2.dx.abs() {
            edge2.top_x(ip.y)
        } else {
            edge1.top_x(ip.y)
        };
    }
    ip
}

impl Sweep<'_> {
    /// Resolves every crossing between the bottom and `top_y` of the
    /// current scanbeam.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::IntersectionOrder` when the crossings cannot
    /// be ordered so that each one swaps adjacent edges.
    pub(super) fn process_intersections(&mut self, top_y: i64) -> Result<()> {
        if self.active_edges.is_none() {
            return Ok(());
        }
        self.build_intersect_list(top_y);
        let ordered = self.intersections.len() <= 1 || self.fixup_intersection_order();
        self.sorted_edges = None;
        if !ordered {
            warn!(y = top_y, count = self.intersections.len(), "unresolvable intersection order");
            self.intersections.clear();
            return Err(OperationError::IntersectionOrder { y: top_y }.into());
        }
        self.process_intersect_list();
        Ok(())
    }

    /// Bubble-sorts a copy of the AEL by X at `top_y`, recording each swap
    /// as a crossing.
    fn build_intersect_list(&mut self, top_y: i64) {
        self.sorted_edges = self.active_edges;
        let mut e = self.active_edges;
        while let Some(id) = e {
            let edge = &mut self.edges[id];
            edge.prev_in_sel = edge.prev_in_ael;
            edge.next_in_sel = edge.next_in_ael;
            edge.curr.x = edge.top_x(top_y);
            e = edge.next_in_ael;
        }

        let last_source_index = self.options.last_source_index;
        let mut is_modified = true;
        while is_modified {
            let Some(head) = self.sorted_edges else { break };
            is_modified = false;
            let mut e = head;
            while let Some(next) = self.edges[e].next_in_sel {
                if self.edges[e].curr.x > self.edges[next].curr.x {
                    let mut pt = intersect_point(&self.edges[e], &self.edges[next], last_source_index);
                    if pt.y < top_y {
                        pt = IntPoint::new(self.edges[e].top_x(top_y), top_y);
                    }
                    self.intersections.push(IntersectNode {
                        edge1: e,
                        edge2: next,
                        pt,
                    });
                    self.swap_positions(EdgeList::Sorted, e, next);
                    is_modified = true;
                } else {
                    e = next;
                }
            }
            // The last edge is in place; shrink the pass.
            match self.edges[e].prev_in_sel {
                Some(prev) => self.edges[prev].next_in_sel = None,
                None => break,
            }
        }
        self.sorted_edges = None;
    }

    fn edges_adjacent(&self, node: &IntersectNode) -> bool {
        let edge1 = &self.edges[node.edge1];
        edge1.next_in_sel == Some(node.edge2) || edge1.prev_in_sel == Some(node.edge2)
    }

    /// Orders crossings bottom-most first so that each swaps two edges that
    /// are adjacent at that moment.
    fn fixup_intersection_order(&mut self) -> bool {
        self.intersections.sort_by(|a, b| b.pt.y.cmp(&a.pt.y));
        self.copy_ael_to_sel();
        for i in 0..self.intersections.len() {
            if !self.edges_adjacent(&self.intersections[i]) {
                let Some(j) = (i + 1..self.intersections.len())
                    .find(|&j| self.edges_adjacent(&self.intersections[j]))
                else {
                    return false;
                };
                self.intersections.swap(i, j);
            }
            let node = self.intersections[i];
            self.swap_positions(EdgeList::Sorted, node.edge1, node.edge2);
        }
        true
    }

    fn process_intersect_list(&mut self) {
        let nodes = std::mem::take(&mut self.intersections);
        for node in &nodes {
            self.intersect_edges(node.edge1, node.edge2, node.pt);
            self.swap_positions(EdgeList::Active, node.edge1, node.edge2);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ClipperError;
    use crate::math::polygon_2d::area;
    use crate::math::{path_from_coords, Path};
    use crate::operations::boolean::select::{ClipType, FillRules, PolyFillType, PolyType};
    use crate::operations::boolean::Clipper;

    fn edge(bot: (i64, i64), top: (i64, i64), source: Option<usize>) -> TEdge {
        let mut e = TEdge::new(IntPoint::from(bot), PolyType::Subject);
        e.bot = IntPoint::from(bot);
        e.top = IntPoint::from(top);
        e.curr.source = source;
        e.set_dx();
        e
    }

    #[test]
    fn crossing_of_two_diagonals() {
        let e1 = edge((0, 10), (10, 0), None);
        let e2 = edge((10, 10), (0, 0), None);
        let ip = intersect_point(&e1, &e2, 0);
        assert_eq!(ip, IntPoint::new(5, 5));
        assert_eq!(ip.origin, PointOrigin::Intersection);
        assert_eq!(ip.source, None);
    }

    #[test]
    fn crossing_with_vertical_edge() {
        let vertical = edge((4, 10), (4, 0), None);
        let diagonal = edge((0, 10), (10, 0), None);
        assert_eq!(intersect_point(&vertical, &diagonal, 0), IntPoint::new(4, 6));
        assert_eq!(intersect_point(&diagonal, &vertical, 0), IntPoint::new(4, 6));
    }

    #[test]
    fn crossing_is_clamped_to_edge_tops() {
        // Nearly parallel edges whose lines meet far above both tops.
        let e1 = edge((0, 10), (1, 0), None);
        let e2 = edge((3, 10), (3, 0), None);
        let ip = intersect_point(&e1, &e2, 0);
        assert_eq!(ip.y, 0);
    }

    #[test]
    fn pivot_source_requires_interior_indices() {
        assert_eq!(pivot_source(3, 2, 10), Some(2));
        assert_eq!(pivot_source(2, 3, 10), Some(3));
        assert_eq!(pivot_source(0, 3, 10), None);
        assert_eq!(pivot_source(3, 10, 10), None);
        assert_eq!(pivot_source(-1, 3, 10), None);
    }

    #[test]
    fn tagged_edges_produce_pivot() {
        let e1 = edge((0, 10), (10, 0), Some(4));
        let e2 = edge((10, 10), (0, 0), Some(2));
        let ip = intersect_point(&e1, &e2, 8);
        assert_eq!(ip.source, Some(3));
    }

    fn diamond(cx: i64) -> Path {
        path_from_coords(&[(cx, 0), (cx + 5, 5), (cx, 10), (cx - 5, 5)])
    }

    #[test]
    fn unordered_crossings_fail_and_clipper_stays_usable() {
        let mut clipper = Clipper::new();
        clipper
            .add_paths(&[diamond(5), diamond(25)], PolyType::Subject, true)
            .unwrap();
        let fills = FillRules {
            subject: PolyFillType::NonZero,
            clip: PolyFillType::NonZero,
        };
        let options = *clipper.options();
        {
            let mut sweep = Sweep::new(&mut clipper.store, ClipType::Union, fills, options, false);
            let bot_y = sweep.pop_scanbeam().unwrap();
            sweep.insert_local_minima_into_ael(bot_y);
            let first = sweep.active_edges.unwrap();
            let second = sweep.edges[first].next_in_ael.unwrap();
            let third = sweep.edges[second].next_in_ael.unwrap();

            // Crossings between edges that never become neighbours.
            for _ in 0..2 {
                sweep.intersections.push(IntersectNode {
                    edge1: first,
                    edge2: third,
                    pt: IntPoint::new(15, 5),
                });
            }
            let top_y = sweep.pop_scanbeam().unwrap();
            assert_eq!(top_y, 5);
            let err = sweep.process_intersections(top_y).unwrap_err();
            assert!(matches!(
                err,
                ClipperError::Operation(OperationError::IntersectionOrder { y: 5 })
            ));
            assert!(sweep.intersections.is_empty());
            assert!(sweep.sorted_edges.is_none());
        }

        let result = clipper
            .execute_with(ClipType::Union, PolyFillType::NonZero)
            .unwrap();
        assert_eq!(result.len(), 2);
        let total: f64 = result.iter().map(|p| area(p).abs()).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }
}
