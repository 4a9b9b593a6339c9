//! Post-sweep passes over the output rings: splicing collinear joins,
//! removing redundant vertices and splitting touching rings.

use tracing::trace;

use crate::math::cross_2d::{pt2_is_between_pt1_and_pt3, slopes_equal3};
use crate::math::IntPoint;

use super::edge::Direction;
use super::out_rec::{
    dup_out_pt, link, poly2_contains_poly1, reverse_links, ring_area, ring_ids, Join, OutPtId,
    OutPts,
};
use super::sweep::Sweep;

/// Overlap `(left, right)` of the X ranges `[a1, a2]` and `[b1, b2]`, if it
/// has positive length.
fn get_overlap(a1: i64, a2: i64, b1: i64, b2: i64) -> Option<(i64, i64)> {
    let left = a1.min(a2).max(b1.min(b2));
    let right = a1.max(a2).min(b1.max(b2));
    (left < right).then_some((left, right))
}

/// Splices two rings at `op1` and `op2`, which share a location. Returns the
/// duplicate of `op1` that now starts the second ring.
fn splice(pts: &mut OutPts, op1: OutPtId, op2: OutPtId, reverse: bool) -> OutPtId {
    if reverse {
        let op1b = dup_out_pt(pts, op1, false);
        let op2b = dup_out_pt(pts, op2, true);
        link(pts, op2, op1);
        link(pts, op1b, op2b);
        op1b
    } else {
        let op1b = dup_out_pt(pts, op1, true);
        let op2b = dup_out_pt(pts, op2, false);
        link(pts, op1, op2);
        link(pts, op2b, op1b);
        op1b
    }
}

/// Walks `op` along its horizontal run toward `pt` and makes sure a vertex
/// sits exactly at `pt`. Returns the vertex at `pt` and its duplicate.
fn seat_on_horizontal(
    pts: &mut OutPts,
    mut op: OutPtId,
    dir: Direction,
    pt: IntPoint,
    discard_left: bool,
) -> (OutPtId, OutPtId) {
    let insert_after = (dir == Direction::LeftToRight) != discard_left;
    loop {
        let (cur, next) = (pts[op].pt, pts[pts[op].next].pt);
        let toward = match dir {
            Direction::LeftToRight => next.x <= pt.x && next.x >= cur.x,
            Direction::RightToLeft => next.x >= pt.x && next.x <= cur.x,
        };
        if !(toward && next.y == pt.y) {
            break;
        }
        op = pts[op].next;
    }
    if !insert_after && pts[op].pt.x != pt.x {
        op = pts[op].next;
    }
    let mut opb = dup_out_pt(pts, op, insert_after);
    if pts[opb].pt != pt {
        op = opb;
        pts[op].pt = pt;
        opb = dup_out_pt(pts, op, insert_after);
    }
    (op, opb)
}

fn direction(from: IntPoint, to: IntPoint) -> Direction {
    if from.x > to.x {
        Direction::RightToLeft
    } else {
        Direction::LeftToRight
    }
}

/// Joins two overlapping horizontal runs `op1..op1b` and `op2..op2b` at `pt`.
fn join_horz(
    pts: &mut OutPts,
    op1: OutPtId,
    op1b: OutPtId,
    op2: OutPtId,
    op2b: OutPtId,
    pt: IntPoint,
    discard_left: bool,
) -> bool {
    let dir1 = direction(pts[op1].pt, pts[op1b].pt);
    let dir2 = direction(pts[op2].pt, pts[op2b].pt);
    if dir1 == dir2 {
        return false;
    }
    let (op1, op1b) = seat_on_horizontal(pts, op1, dir1, pt, discard_left);
    let (op2, op2b) = seat_on_horizontal(pts, op2, dir2, pt, discard_left);
    if (dir1 == Direction::LeftToRight) == discard_left {
        link(pts, op2, op1);
        link(pts, op1b, op2b);
    } else {
        link(pts, op1, op2);
        link(pts, op2b, op1b);
    }
    true
}

/// First vertex after `op` (following `next` or `prev`) at a different
/// location.
fn first_distinct(pts: &OutPts, op: OutPtId, forward: bool) -> OutPtId {
    let step = |id: OutPtId| if forward { pts[id].next } else { pts[id].prev };
    let mut other = step(op);
    while pts[other].pt == pts[op].pt && other != op {
        other = step(other);
    }
    other
}

impl Sweep<'_> {
    /// Splices the rings referenced by each recorded join.
    pub(super) fn join_common_edges(&mut self) {
        let joins = std::mem::take(&mut self.joins);
        let mut joined = 0_usize;
        for mut join in joins {
            let rec1 = self.get_out_rec(self.out_pts[join.out_pt1].idx);
            let rec2 = self.get_out_rec(self.out_pts[join.out_pt2].idx);
            let (r1, r2) = (&self.out_recs[rec1], &self.out_recs[rec2]);
            if r1.pts.is_none() || r2.pts.is_none() || r1.is_open || r2.is_open {
                continue;
            }

            // The fragment with the correct hole state.
            let hole_state_rec = if rec1 == rec2 {
                rec1
            } else if self.outrec1_right_of_outrec2(rec1, rec2) {
                rec2
            } else if self.outrec1_right_of_outrec2(rec2, rec1) {
                rec1
            } else {
                self.get_lowermost_rec(rec1, rec2)
            };

            if !self.join_points(&mut join, rec1, rec2) {
                continue;
            }
            joined += 1;

            if rec1 == rec2 {
                // One ring has been split into two.
                self.out_recs[rec1].pts = Some(join.out_pt1);
                self.out_recs[rec1].bottom_pt = None;
                let rec2 = self.create_out_rec();
                self.out_recs[rec2].pts = Some(join.out_pt2);
                self.update_out_pt_idxs(rec2);
                self.classify_split(rec1, rec2, true);
            } else {
                let rec1_idx = self.out_recs[rec1].idx;
                let hole_is_hole = self.out_recs[hole_state_rec].is_hole;
                let rec2_first_left = self.out_recs[rec2].first_left;

                let obsolete = &mut self.out_recs[rec2];
                obsolete.pts = None;
                obsolete.bottom_pt = None;
                obsolete.idx = rec1_idx;
                obsolete.first_left = Some(rec1);

                self.out_recs[rec1].is_hole = hole_is_hole;
                if hole_state_rec == rec2 {
                    self.out_recs[rec1].first_left = rec2_first_left;
                }
                if self.using_tree {
                    self.fixup_first_lefts3(rec2, rec1);
                }
            }
        }
        trace!(joined, "joined common edges");
    }

    /// Assigns hole state and containers after `rec1` was split, leaving the
    /// new ring in `rec2`.
    fn classify_split(&mut self, rec1: usize, rec2: usize, fix_orientation: bool) {
        let (Some(p1), Some(p2)) = (self.out_recs[rec1].pts, self.out_recs[rec2].pts) else {
            return;
        };
        if poly2_contains_poly1(&self.out_pts, p2, p1) {
            self.out_recs[rec2].is_hole = !self.out_recs[rec1].is_hole;
            self.out_recs[rec2].first_left = Some(rec1);
            if self.using_tree {
                self.fixup_first_lefts2(rec2, rec1);
            }
            if fix_orientation {
                self.orient(rec2);
            }
        } else if poly2_contains_poly1(&self.out_pts, p1, p2) {
            self.out_recs[rec2].is_hole = self.out_recs[rec1].is_hole;
            self.out_recs[rec1].is_hole = !self.out_recs[rec2].is_hole;
            self.out_recs[rec2].first_left = self.out_recs[rec1].first_left;
            self.out_recs[rec1].first_left = Some(rec2);
            if self.using_tree {
                self.fixup_first_lefts2(rec1, rec2);
            }
            if fix_orientation {
                self.orient(rec1);
            }
        } else {
            self.out_recs[rec2].is_hole = self.out_recs[rec1].is_hole;
            self.out_recs[rec2].first_left = self.out_recs[rec1].first_left;
            if self.using_tree {
                self.fixup_first_lefts1(rec1, rec2);
            }
        }
    }

    fn orient(&mut self, rec: usize) {
        let Some(pts) = self.out_recs[rec].pts else {
            return;
        };
        let hole = self.out_recs[rec].is_hole ^ self.options.reverse_solution;
        if hole == (ring_area(&self.out_pts, pts) > 0.0) {
            reverse_links(&mut self.out_pts, pts);
        }
    }

    /// Splices the rings at a join. There are three kinds:
    ///
    /// 1. Horizontal joins, where both vertices lie anywhere along collinear
    ///    horizontal runs and `off_pt` is on the same horizontal.
    /// 2. Non-horizontal joins, where both vertices sit at the bottom of the
    ///    overlapping segment and `off_pt` is above.
    /// 3. Touching joins for strictly simple output, where both vertices and
    ///    `off_pt` share one location.
    fn join_points(&mut self, j: &mut Join, rec1: usize, rec2: usize) -> bool {
        let pts = &mut self.out_pts;
        let mut op1 = j.out_pt1;
        let mut op2 = j.out_pt2;
        let off = j.off_pt;
        let is_horizontal = pts[op1].pt.y == off.y;

        if is_horizontal && off == pts[op1].pt && off == pts[op2].pt {
            if rec1 != rec2 {
                return false;
            }
            let beyond = |start: OutPtId| {
                let mut other = pts[start].next;
                while other != start && pts[other].pt == off {
                    other = pts[other].next;
                }
                pts[other].pt.y > off.y
            };
            let reverse1 = beyond(op1);
            let reverse2 = beyond(op2);
            if reverse1 == reverse2 {
                return false;
            }
            j.out_pt2 = splice(pts, op1, op2, reverse1);
            j.out_pt1 = op1;
            return true;
        }

        if is_horizontal {
            // The two vertices may be anywhere along their horizontal runs.
            let mut op1b = op1;
            while pts[pts[op1].prev].pt.y == pts[op1].pt.y
                && pts[op1].prev != op1b
                && pts[op1].prev != op2
            {
                op1 = pts[op1].prev;
            }
            while pts[pts[op1b].next].pt.y == pts[op1b].pt.y
                && pts[op1b].next != op1
                && pts[op1b].next != op2
            {
                op1b = pts[op1b].next;
            }
            if pts[op1b].next == op1 || pts[op1b].next == op2 {
                return false;
            }

            let mut op2b = op2;
            while pts[pts[op2].prev].pt.y == pts[op2].pt.y
                && pts[op2].prev != op2b
                && pts[op2].prev != op1b
            {
                op2 = pts[op2].prev;
            }
            while pts[pts[op2b].next].pt.y == pts[op2b].pt.y
                && pts[op2b].next != op2
                && pts[op2b].next != op1
            {
                op2b = pts[op2b].next;
            }
            if pts[op2b].next == op2 || pts[op2b].next == op1 {
                return false;
            }

            let (p1, p1b, p2, p2b) = (pts[op1].pt, pts[op1b].pt, pts[op2].pt, pts[op2b].pt);
            let Some((left, right)) = get_overlap(p1.x, p1b.x, p2.x, p2b.x) else {
                return false;
            };

            // The spike created by joining overlapping runs is discarded on
            // the side away from op1 and op2.
            let within = |p: IntPoint| p.x >= left && p.x <= right;
            let (pt, discard_left) = if within(p1) {
                (p1, p1.x > p1b.x)
            } else if within(p2) {
                (p2, p2.x > p2b.x)
            } else if within(p1b) {
                (p1b, p1b.x > p1.x)
            } else {
                (p2b, p2b.x > p2.x)
            };
            j.out_pt1 = op1;
            j.out_pt2 = op2;
            return join_horz(pts, op1, op1b, op2, op2b, pt, discard_left);
        }

        // Both vertices share a location below off_pt; orient each ring so
        // that it heads up toward off_pt.
        let heads_away = |op: OutPtId, opb: OutPtId| {
            pts[opb].pt.y > pts[op].pt.y || !slopes_equal3(pts[op].pt, pts[opb].pt, off)
        };
        let mut op1b = first_distinct(pts, op1, true);
        let reverse1 = heads_away(op1, op1b);
        if reverse1 {
            op1b = first_distinct(pts, op1, false);
            if heads_away(op1, op1b) {
                return false;
            }
        }
        let mut op2b = first_distinct(pts, op2, true);
        let reverse2 = heads_away(op2, op2b);
        if reverse2 {
            op2b = first_distinct(pts, op2, false);
            if heads_away(op2, op2b) {
                return false;
            }
        }

        if op1b == op1 || op2b == op2 || op1b == op2b || (rec1 == rec2 && reverse1 == reverse2) {
            return false;
        }
        j.out_pt2 = splice(pts, op1, op2, reverse1);
        j.out_pt1 = op1;
        true
    }

    fn parse_first_left(&self, mut first_left: Option<usize>) -> Option<usize> {
        while let Some(idx) = first_left {
            if self.out_recs[idx].pts.is_some() {
                break;
            }
            first_left = self.out_recs[idx].first_left;
        }
        first_left
    }

    fn contains_rec(&self, inner: usize, outer: usize) -> bool {
        match (self.out_recs[inner].pts, self.out_recs[outer].pts) {
            (Some(p1), Some(p2)) => poly2_contains_poly1(&self.out_pts, p1, p2),
            _ => false,
        }
    }

    /// Re-parents records that were inside `old` and now lie in `new`.
    fn fixup_first_lefts1(&mut self, old: usize, new: usize) {
        for idx in 0..self.out_recs.len() {
            let rec = &self.out_recs[idx];
            if rec.pts.is_some()
                && self.parse_first_left(rec.first_left) == Some(old)
                && self.contains_rec(idx, new)
            {
                self.out_recs[idx].first_left = Some(new);
            }
        }
    }

    /// After a ring split into `inner` nested in `outer`, re-parents every
    /// record that shared their container.
    fn fixup_first_lefts2(&mut self, inner: usize, outer: usize) {
        let orfl = self.out_recs[outer].first_left;
        for idx in 0..self.out_recs.len() {
            if idx == inner || idx == outer || self.out_recs[idx].pts.is_none() {
                continue;
            }
            let first_left = self.parse_first_left(self.out_recs[idx].first_left);
            if first_left != orfl && first_left != Some(inner) && first_left != Some(outer) {
                continue;
            }
            if self.contains_rec(idx, inner) {
                self.out_recs[idx].first_left = Some(inner);
            } else if self.contains_rec(idx, outer) {
                self.out_recs[idx].first_left = Some(outer);
            } else if matches!(self.out_recs[idx].first_left, Some(fl) if fl == inner || fl == outer)
            {
                self.out_recs[idx].first_left = orfl;
            }
        }
    }

    /// Like [`Self::fixup_first_lefts1`] without the containment test.
    fn fixup_first_lefts3(&mut self, old: usize, new: usize) {
        for idx in 0..self.out_recs.len() {
            let rec = &self.out_recs[idx];
            if rec.pts.is_some() && self.parse_first_left(rec.first_left) == Some(old) {
                self.out_recs[idx].first_left = Some(new);
            }
        }
    }

    fn update_out_pt_idxs(&mut self, rec: usize) {
        let Some(start) = self.out_recs[rec].pts else {
            return;
        };
        let idx = self.out_recs[rec].idx;
        let ids: Vec<OutPtId> = ring_ids(&self.out_pts, start).collect();
        for op in ids {
            self.out_pts[op].idx = idx;
        }
    }

    /// Splits rings at every repeated vertex so that no ring touches itself.
    pub(super) fn do_simple_polygons(&mut self) {
        let mut i = 0;
        while i < self.out_recs.len() {
            let rec = i;
            i += 1;
            let Some(mut op) = self.out_recs[rec].pts else {
                continue;
            };
            if self.out_recs[rec].is_open {
                continue;
            }
            loop {
                let mut op2 = self.out_pts[op].next;
                while Some(op2) != self.out_recs[rec].pts {
                    let pts = &mut self.out_pts;
                    if pts[op].pt == pts[op2].pt && pts[op2].next != op && pts[op2].prev != op {
                        let op3 = pts[op].prev;
                        let op4 = pts[op2].prev;
                        link(pts, op4, op);
                        link(pts, op3, op2);

                        self.out_recs[rec].pts = Some(op);
                        let rec2 = self.create_out_rec();
                        self.out_recs[rec2].pts = Some(op2);
                        self.update_out_pt_idxs(rec2);
                        self.classify_split(rec, rec2, false);
                        op2 = op;
                    }
                    op2 = self.out_pts[op2].next;
                }
                op = self.out_pts[op].next;
                if Some(op) == self.out_recs[rec].pts {
                    break;
                }
            }
        }
    }

    /// Removes duplicate vertices and collinear midpoints from a closed ring,
    /// dropping the ring entirely when fewer than three vertices remain.
    pub(super) fn fixup_out_polygon(&mut self, rec: usize) {
        self.out_recs[rec].bottom_pt = None;
        let Some(mut pp) = self.out_recs[rec].pts else {
            return;
        };
        let preserve_col = self.options.preserve_collinear || self.options.strictly_simple;
        let pts = &mut self.out_pts;
        let mut last_ok: Option<OutPtId> = None;
        loop {
            let (prev, next) = (pts[pp].prev, pts[pp].next);
            if prev == pp || prev == next {
                self.out_recs[rec].pts = None;
                return;
            }
            let (pv, pc, pn) = (pts[prev].pt, pts[pp].pt, pts[next].pt);
            if pc == pn
                || pc == pv
                || (slopes_equal3(pv, pc, pn)
                    && (!preserve_col || !pt2_is_between_pt1_and_pt3(pv, pc, pn)))
            {
                last_ok = None;
                link(pts, prev, next);
                pts.remove(pp);
                pp = prev;
            } else if Some(pp) == last_ok {
                break;
            } else {
                if last_ok.is_none() {
                    last_ok = Some(pp);
                }
                pp = next;
            }
        }
        self.out_recs[rec].pts = Some(pp);
    }

    /// Removes consecutive duplicate vertices from an open path.
    pub(super) fn fixup_out_polyline(&mut self, rec: usize) {
        let Some(mut pp) = self.out_recs[rec].pts else {
            return;
        };
        let pts = &mut self.out_pts;
        let mut last_pp = pts[pp].prev;
        while pp != last_pp {
            pp = pts[pp].next;
            let prev = pts[pp].prev;
            if pts[pp].pt == pts[prev].pt {
                if pp == last_pp {
                    last_pp = prev;
                }
                let next = pts[pp].next;
                link(pts, prev, next);
                pts.remove(pp);
                pp = prev;
            }
        }
        if pts[pp].prev == pp {
            self.out_recs[rec].pts = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::boolean::out_rec::{point_count, OutPt};

    fn ring(pts: &mut OutPts, coords: &[(i64, i64)]) -> Vec<OutPtId> {
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
        ids
    }

    #[test]
    fn overlap_of_ranges() {
        assert_eq!(get_overlap(0, 10, 5, 15), Some((5, 10)));
        assert_eq!(get_overlap(10, 0, 15, 5), Some((5, 10)));
        assert_eq!(get_overlap(0, 5, 5, 10), None);
    }

    #[test]
    fn splice_merges_two_rings_at_shared_vertex() {
        let mut pts = OutPts::with_key();
        let a = ring(&mut pts, &[(0, 0), (4, 0), (4, 4), (0, 4)]);
        let b = ring(&mut pts, &[(4, 4), (8, 4), (8, 8), (4, 8)]);
        let dup = splice(&mut pts, a[2], b[0], false);
        assert_eq!(pts[dup].pt, IntPoint::new(4, 4));
        assert_eq!(pts[a[2]].next, b[0]);
        assert_eq!(point_count(&pts, Some(a[0])), 10);
    }

    #[test]
    fn first_distinct_skips_duplicates() {
        let mut pts = OutPts::with_key();
        let ids = ring(&mut pts, &[(0, 0), (0, 0), (0, 0), (4, 4)]);
        assert_eq!(first_distinct(&pts, ids[0], true), ids[3]);
        assert_eq!(first_distinct(&pts, ids[0], false), ids[3]);
        assert_eq!(point_count(&pts, Some(ids[0])), 4);
    }
}
