//! Output polygons under construction.
//!
//! Each [`OutRec`] owns a circular ring of [`OutPt`]s stored in a shared
//! arena. `OutRec::pts` is the left-most vertex of the ring and its `prev`
//! the right-most, which lets the sweep append to either end in O(1).

use std::cmp::Ordering;

use slotmap::SlotMap;

use crate::math::cross_2d::slopes_equal4;
use crate::math::polygon_2d::{classify_point_in_ring, PointClassification};
use crate::math::IntPoint;

use super::edge::{EdgeId, EdgeSide, OutIdx, HORIZONTAL};
use super::sweep::Sweep;

slotmap::new_key_type! {
    /// Unique identifier for an output vertex.
    pub(crate) struct OutPtId;
}

/// Arena holding the vertices of every output ring.
pub(crate) type OutPts = SlotMap<OutPtId, OutPt>;

/// One vertex of an output ring.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OutPt {
    /// Index of the [`OutRec`] this vertex was created for. May refer to a
    /// record that has since been merged away; see [`Sweep::get_out_rec`].
    pub idx: usize,
    pub pt: IntPoint,
    pub next: OutPtId,
    pub prev: OutPtId,
}

/// One output polygon or polyline.
#[derive(Debug, Clone)]
pub(crate) struct OutRec {
    /// Equals the record's own position unless it was merged into another.
    pub idx: usize,
    pub is_hole: bool,
    pub is_open: bool,
    /// Nearest record to the left at creation time; the container candidate
    /// for holes.
    pub first_left: Option<usize>,
    pub pts: Option<OutPtId>,
    pub bottom_pt: Option<OutPtId>,
}

impl OutRec {
    fn new(idx: usize) -> Self {
        Self {
            idx,
            is_hole: false,
            is_open: false,
            first_left: None,
            pts: None,
            bottom_pt: None,
        }
    }
}

/// A pair of output vertices that must be spliced together after the sweep.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Join {
    pub out_pt1: OutPtId,
    pub out_pt2: OutPtId,
    pub off_pt: IntPoint,
}

/// Ids of a ring starting at `start`, following `next`.
pub(crate) fn ring_ids(pts: &OutPts, start: OutPtId) -> impl Iterator<Item = OutPtId> + '_ {
    std::iter::successors(Some(start), move |&op| {
        let next = pts[op].next;
        (next != start).then_some(next)
    })
}

/// Points of a ring starting at `start`, following `next`.
pub(crate) fn ring_points(pts: &OutPts, start: OutPtId) -> impl Iterator<Item = IntPoint> + '_ {
    ring_ids(pts, start).map(move |op| pts[op].pt)
}

pub(crate) fn point_count(pts: &OutPts, start: Option<OutPtId>) -> usize {
    start.map_or(0, |op| ring_ids(pts, op).count())
}

/// Signed area of a ring; positive for holes in the sweep's orientation.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn ring_area(pts: &OutPts, start: OutPtId) -> f64 {
    let a: f64 = ring_ids(pts, start)
        .map(|op| {
            let cur = pts[op].pt;
            let prev = pts[pts[op].prev].pt;
            (prev.x as f64 + cur.x as f64) * (prev.y as f64 - cur.y as f64)
        })
        .sum();
    a * 0.5
}

/// Reverses the direction of a ring in place.
pub(crate) fn reverse_links(pts: &mut OutPts, start: OutPtId) {
    let ids: Vec<OutPtId> = ring_ids(pts, start).collect();
    for op in ids {
        let p = &mut pts[op];
        std::mem::swap(&mut p.next, &mut p.prev);
    }
}

/// Links `a -> b`.
pub(crate) fn link(pts: &mut OutPts, a: OutPtId, b: OutPtId) {
    pts[a].next = b;
    pts[b].prev = a;
}

/// Inserts a copy of `op` next to it and returns the copy.
pub(crate) fn dup_out_pt(pts: &mut OutPts, op: OutPtId, insert_after: bool) -> OutPtId {
    let OutPt { idx, pt, next, prev } = pts[op];
    if insert_after {
        let dup = pts.insert(OutPt {
            idx,
            pt,
            next,
            prev: op,
        });
        link(pts, dup, next);
        link(pts, op, dup);
        dup
    } else {
        let dup = pts.insert(OutPt {
            idx,
            pt,
            next: op,
            prev,
        });
        link(pts, prev, dup);
        link(pts, dup, op);
        dup
    }
}

/// Returns `true` when every vertex of the first ring that is not on the
/// second ring's boundary lies inside it.
pub(crate) fn poly2_contains_poly1(pts: &OutPts, out_pt1: OutPtId, out_pt2: OutPtId) -> bool {
    for pt in ring_points(pts, out_pt1) {
        match classify_point_in_ring(pt, ring_points(pts, out_pt2)) {
            PointClassification::OnBoundary => {}
            PointClassification::Inside => return true,
            PointClassification::Outside => return false,
        }
    }
    true
}

#[allow(clippy::cast_precision_loss)]
fn get_dx(pt1: IntPoint, pt2: IntPoint) -> f64 {
    if pt1.y == pt2.y {
        HORIZONTAL
    } else {
        (pt2.x - pt1.x) as f64 / (pt2.y - pt1.y) as f64
    }
}

/// Decides between two vertices at the same bottom location by comparing
/// the steepness of the edges leaving them.
#[allow(clippy::float_cmp)]
fn first_is_bottom_pt(pts: &OutPts, btm_pt1: OutPtId, btm_pt2: OutPtId) -> bool {
    let spread = |start: OutPtId| {
        let origin = pts[start].pt;
        let mut p = pts[start].prev;
        while pts[p].pt == origin && p != start {
            p = pts[p].prev;
        }
        let dxp = get_dx(origin, pts[p].pt).abs();
        p = pts[start].next;
        while pts[p].pt == origin && p != start {
            p = pts[p].next;
        }
        let dxn = get_dx(origin, pts[p].pt).abs();
        (dxp, dxn)
    };
    let (dx1p, dx1n) = spread(btm_pt1);
    let (dx2p, dx2n) = spread(btm_pt2);
    if dx1p.max(dx1n) == dx2p.max(dx2n) && dx1p.min(dx1n) == dx2p.min(dx2n) {
        ring_area(pts, btm_pt1) > 0.0
    } else {
        (dx1p >= dx2p && dx1p >= dx2n) || (dx1n >= dx2p && dx1n >= dx2n)
    }
}

/// Lowest (largest Y, then smallest X) vertex of a ring.
pub(crate) fn get_bottom_pt(pts: &OutPts, start: OutPtId) -> OutPtId {
    let mut pp = start;
    let mut dups = None;
    let mut p = pts[pp].next;
    while p != pp {
        let (best, cur) = (pts[pp].pt, pts[p].pt);
        if cur.y > best.y {
            pp = p;
            dups = None;
        } else if cur.y == best.y && cur.x <= best.x {
            if cur.x < best.x {
                dups = None;
                pp = p;
            } else if pts[p].next != pp && pts[p].prev != pp {
                dups = Some(p);
            }
        }
        p = pts[p].next;
    }
    if let Some(mut dup) = dups {
        // At least two vertices share the bottom point.
        while dup != p {
            if !first_is_bottom_pt(pts, p, dup) {
                pp = dup;
            }
            dup = pts[dup].next;
            while pts[dup].pt != pts[pp].pt {
                dup = pts[dup].next;
            }
        }
    }
    pp
}

impl Sweep<'_> {
    pub(super) fn create_out_rec(&mut self) -> usize {
        let idx = self.out_recs.len();
        self.out_recs.push(OutRec::new(idx));
        idx
    }

    fn new_ring(&mut self, idx: usize, pt: IntPoint) -> OutPtId {
        let op = self.out_pts.insert_with_key(|key| OutPt {
            idx,
            pt,
            next: key,
            prev: key,
        });
        self.out_recs[idx].pts = Some(op);
        op
    }

    /// Appends `pt` to the output ring of `e`, starting a new ring when the
    /// edge is not yet contributing.
    pub(super) fn add_out_pt(&mut self, e: EdgeId, pt: IntPoint) -> OutPtId {
        let edge = self.edges[e];
        let Some(idx) = edge.out_idx.rec() else {
            let idx = self.create_out_rec();
            let is_open = edge.wind_delta == 0;
            self.out_recs[idx].is_open = is_open;
            let op = self.new_ring(idx, pt);
            if !is_open {
                self.set_hole_state(e, idx);
            }
            self.edges[e].out_idx = OutIdx::Rec(idx);
            return op;
        };

        let Some(op) = self.out_recs[idx].pts else {
            return self.new_ring(idx, pt);
        };
        let to_front = edge.side == EdgeSide::Left;
        let last = self.out_pts[op].prev;
        if to_front && pt == self.out_pts[op].pt {
            return op;
        }
        if !to_front && pt == self.out_pts[last].pt {
            return last;
        }
        let new_op = self.out_pts.insert(OutPt {
            idx,
            pt,
            next: op,
            prev: last,
        });
        link(&mut self.out_pts, last, new_op);
        link(&mut self.out_pts, new_op, op);
        if to_front {
            self.out_recs[idx].pts = Some(new_op);
        }
        new_op
    }

    /// The vertex most recently added on the side `e` is building.
    pub(super) fn get_last_out_pt(&self, e: EdgeId) -> Option<OutPtId> {
        let edge = &self.edges[e];
        let pts = self.out_recs[edge.out_idx.rec()?].pts?;
        Some(match edge.side {
            EdgeSide::Left => pts,
            EdgeSide::Right => self.out_pts[pts].prev,
        })
    }

    fn set_hole_state(&mut self, e: EdgeId, rec: usize) {
        let mut e2 = self.edges[e].prev_in_ael;
        let mut e_tmp: Option<EdgeId> = None;
        while let Some(id) = e2 {
            let edge = &self.edges[id];
            if edge.out_idx.is_assigned() && edge.wind_delta != 0 {
                match e_tmp {
                    None => e_tmp = Some(id),
                    Some(t) if self.edges[t].out_idx == edge.out_idx => e_tmp = None,
                    Some(_) => {}
                }
            }
            e2 = edge.prev_in_ael;
        }
        match e_tmp.and_then(|t| self.edges[t].out_idx.rec()) {
            None => {
                self.out_recs[rec].first_left = None;
                self.out_recs[rec].is_hole = false;
            }
            Some(first_left) => {
                self.out_recs[rec].first_left = Some(first_left);
                self.out_recs[rec].is_hole = !self.out_recs[first_left].is_hole;
            }
        }
    }

    fn bottom_pt(&mut self, rec: usize) -> Option<OutPtId> {
        if self.out_recs[rec].bottom_pt.is_none() {
            let pts = self.out_recs[rec].pts?;
            self.out_recs[rec].bottom_pt = Some(get_bottom_pt(&self.out_pts, pts));
        }
        self.out_recs[rec].bottom_pt
    }

    /// The record whose bottom vertex is lower; it carries the correct hole
    /// state when two fragments merge.
    pub(super) fn get_lowermost_rec(&mut self, rec1: usize, rec2: usize) -> usize {
        let (Some(b1), Some(b2)) = (self.bottom_pt(rec1), self.bottom_pt(rec2)) else {
            return rec1;
        };
        let (p1, p2) = (self.out_pts[b1].pt, self.out_pts[b2].pt);
        match (p1.y.cmp(&p2.y), p1.x.cmp(&p2.x)) {
            (Ordering::Greater, _) | (Ordering::Equal, Ordering::Less) => rec1,
            (Ordering::Less, _) | (Ordering::Equal, Ordering::Greater) => rec2,
            _ if self.out_pts[b1].next == b1 => rec2,
            _ if self.out_pts[b2].next == b2 => rec1,
            _ if first_is_bottom_pt(&self.out_pts, b1, b2) => rec1,
            _ => rec2,
        }
    }

    /// Returns `true` when `rec2` appears in the `first_left` chain of `rec1`.
    pub(super) fn outrec1_right_of_outrec2(&self, rec1: usize, rec2: usize) -> bool {
        let mut current = self.out_recs[rec1].first_left;
        while let Some(idx) = current {
            if idx == rec2 {
                return true;
            }
            current = self.out_recs[idx].first_left;
        }
        false
    }

    /// Follows merge redirections to the live record.
    pub(super) fn get_out_rec(&self, idx: usize) -> usize {
        let mut current = idx;
        while self.out_recs[current].idx != current {
            current = self.out_recs[current].idx;
        }
        current
    }

    /// Joins the ring of `e2` onto the ring of `e1` where the two edges meet
    /// at a local maximum.
    fn append_polygon(&mut self, e1: EdgeId, e2: EdgeId) {
        let (Some(rec1), Some(rec2)) = (self.edges[e1].out_idx.rec(), self.edges[e2].out_idx.rec())
        else {
            return;
        };
        let hole_state_rec = if self.outrec1_right_of_outrec2(rec1, rec2) {
            rec2
        } else if self.outrec1_right_of_outrec2(rec2, rec1) {
            rec1
        } else {
            self.get_lowermost_rec(rec1, rec2)
        };

        let (Some(p1_lft), Some(p2_lft)) = (self.out_recs[rec1].pts, self.out_recs[rec2].pts)
        else {
            return;
        };
        let p1_rt = self.out_pts[p1_lft].prev;
        let p2_rt = self.out_pts[p2_lft].prev;
        let side1 = self.edges[e1].side;

        let pts = &mut self.out_pts;
        match (side1, self.edges[e2].side) {
            (EdgeSide::Left, EdgeSide::Left) => {
                // z y x a b c
                reverse_links(pts, p2_lft);
                link(pts, p2_lft, p1_lft);
                link(pts, p1_rt, p2_rt);
                self.out_recs[rec1].pts = Some(p2_rt);
            }
            (EdgeSide::Left, EdgeSide::Right) => {
                // x y z a b c
                link(pts, p2_rt, p1_lft);
                link(pts, p1_rt, p2_lft);
                self.out_recs[rec1].pts = Some(p2_lft);
            }
            (EdgeSide::Right, EdgeSide::Right) => {
                // a b c z y x
                reverse_links(pts, p2_lft);
                link(pts, p1_rt, p2_rt);
                link(pts, p2_lft, p1_lft);
            }
            (EdgeSide::Right, EdgeSide::Left) => {
                // a b c x y z
                link(pts, p1_rt, p2_lft);
                link(pts, p2_rt, p1_lft);
            }
        }

        self.out_recs[rec1].bottom_pt = None;
        if hole_state_rec == rec2 {
            if self.out_recs[rec2].first_left != Some(rec1) {
                self.out_recs[rec1].first_left = self.out_recs[rec2].first_left;
            }
            self.out_recs[rec1].is_hole = self.out_recs[rec2].is_hole;
        }
        let obsolete = &mut self.out_recs[rec2];
        obsolete.pts = None;
        obsolete.bottom_pt = None;
        obsolete.first_left = Some(rec1);

        self.edges[e1].out_idx = OutIdx::Unassigned;
        self.edges[e2].out_idx = OutIdx::Unassigned;

        let mut e = self.active_edges;
        while let Some(id) = e {
            let edge = &mut self.edges[id];
            if edge.out_idx == OutIdx::Rec(rec2) {
                edge.out_idx = OutIdx::Rec(rec1);
                edge.side = side1;
                break;
            }
            e = edge.next_in_ael;
        }
        self.out_recs[rec2].idx = self.out_recs[rec1].idx;
    }

    /// Starts a new ring where two edges bounding a filled region meet at a
    /// local minimum.
    pub(super) fn add_local_min_poly(&mut self, e1: EdgeId, e2: EdgeId, pt: IntPoint) -> OutPtId {
        let (result, e, prev_e) =
            if self.edges[e2].is_horizontal() || self.edges[e1].dx > self.edges[e2].dx {
                let result = self.add_out_pt(e1, pt);
                self.edges[e2].out_idx = self.edges[e1].out_idx;
                self.edges[e1].side = EdgeSide::Left;
                self.edges[e2].side = EdgeSide::Right;
                let prev_e = if self.edges[e1].prev_in_ael == Some(e2) {
                    self.edges[e2].prev_in_ael
                } else {
                    self.edges[e1].prev_in_ael
                };
                (result, e1, prev_e)
            } else {
                let result = self.add_out_pt(e2, pt);
                self.edges[e1].out_idx = self.edges[e2].out_idx;
                self.edges[e1].side = EdgeSide::Right;
                self.edges[e2].side = EdgeSide::Left;
                let prev_e = if self.edges[e2].prev_in_ael == Some(e1) {
                    self.edges[e1].prev_in_ael
                } else {
                    self.edges[e2].prev_in_ael
                };
                (result, e2, prev_e)
            };

        if let Some(prev) = prev_e {
            let (pe, ee) = (self.edges[prev], self.edges[e]);
            if pe.out_idx.is_assigned() && pe.top.y < pt.y && ee.top.y < pt.y {
                let x_prev = pe.top_x(pt.y);
                let x_e = ee.top_x(pt.y);
                if x_prev == x_e
                    && ee.wind_delta != 0
                    && pe.wind_delta != 0
                    && slopes_equal4(
                        IntPoint::new(x_prev, pt.y),
                        pe.top,
                        IntPoint::new(x_e, pt.y),
                        ee.top,
                    )
                {
                    let out_pt = self.add_out_pt(prev, pt);
                    self.add_join(result, out_pt, ee.top);
                }
            }
        }
        result
    }

    /// Closes or merges rings where two contributing edges meet at a local
    /// maximum.
    pub(super) fn add_local_max_poly(&mut self, e1: EdgeId, e2: EdgeId, pt: IntPoint) {
        self.add_out_pt(e1, pt);
        if self.edges[e2].wind_delta == 0 {
            self.add_out_pt(e2, pt);
        }
        let (idx1, idx2) = (self.edges[e1].out_idx, self.edges[e2].out_idx);
        if idx1 == idx2 {
            self.edges[e1].out_idx = OutIdx::Unassigned;
            self.edges[e2].out_idx = OutIdx::Unassigned;
        } else if idx1.rec() < idx2.rec() {
            self.append_polygon(e1, e2);
        } else {
            self.append_polygon(e2, e1);
        }
    }

    pub(super) fn add_join(&mut self, out_pt1: OutPtId, out_pt2: OutPtId, off_pt: IntPoint) {
        self.joins.push(Join {
            out_pt1,
            out_pt2,
            off_pt,
        });
    }

    pub(super) fn add_ghost_join(&mut self, out_pt: OutPtId, off_pt: IntPoint) {
        self.ghost_joins.push(Join {
            out_pt1: out_pt,
            out_pt2: out_pt,
            off_pt,
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ring(pts: &mut OutPts, coords: &[(i64, i64)]) -> OutPtId {
        let ids: Vec<OutPtId> = coords
            .iter()
            .map(|&c| {
                pts.insert_with_key(|key| OutPt {
                    idx: 0,
                    pt: IntPoint::from(c),
                    next: key,
                    prev: key,
                })
            })
            .collect();
        for (i, &id) in ids.iter().enumerate() {
            link(pts, id, ids[(i + 1) % ids.len()]);
        }
        ids[0]
    }

    #[test]
    fn ring_area_sign_and_reversal() {
        let mut pts = OutPts::with_key();
        let start = ring(&mut pts, &[(0, 0), (10, 0), (10, 10), (0, 10)]);
        assert_eq!(point_count(&pts, Some(start)), 4);
        let a = ring_area(&pts, start);
        assert_relative_eq!(a.abs(), 100.0);
        reverse_links(&mut pts, start);
        assert_relative_eq!(ring_area(&pts, start), -a);
        assert_eq!(point_count(&pts, None), 0);
    }

    #[test]
    fn dup_out_pt_inserts_on_requested_side() {
        let mut pts = OutPts::with_key();
        let start = ring(&mut pts, &[(0, 0), (10, 0), (10, 10)]);
        let after = dup_out_pt(&mut pts, start, true);
        assert_eq!(pts[start].next, after);
        let before = dup_out_pt(&mut pts, start, false);
        assert_eq!(pts[start].prev, before);
        assert_eq!(point_count(&pts, Some(start)), 5);
        assert_eq!(pts[after].pt, pts[before].pt);
    }

    #[test]
    fn bottom_point_is_lowest_then_leftmost() {
        let mut pts = OutPts::with_key();
        let start = ring(&mut pts, &[(5, 0), (10, 8), (2, 8), (0, 3)]);
        let bottom = get_bottom_pt(&pts, start);
        assert_eq!(pts[bottom].pt, IntPoint::new(2, 8));
    }

    #[test]
    fn containment_between_rings() {
        let mut pts = OutPts::with_key();
        let outer = ring(&mut pts, &[(0, 0), (10, 0), (10, 10), (0, 10)]);
        let inner = ring(&mut pts, &[(2, 2), (4, 2), (4, 4), (2, 4)]);
        let touching = ring(&mut pts, &[(0, 0), (5, 0), (5, 5)]);
        assert!(poly2_contains_poly1(&pts, inner, outer));
        assert!(!poly2_contains_poly1(&pts, outer, inner));
        assert!(poly2_contains_poly1(&pts, touching, outer));
    }
}
