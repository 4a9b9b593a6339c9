//! The scanbeam loop and active edge list maintenance.

use std::collections::BinaryHeap;

use slotmap::SlotMap;
use tracing::trace;

use crate::error::{OperationError, Result};
use crate::math::cross_2d::slopes_equal4;
use crate::math::IntPoint;

use super::clipper::ClipOptions;
use super::edge::{EdgeId, OutIdx, TEdge};
use super::intersections::IntersectNode;
use super::local_minima::{EdgeStore, LocalMinima};
use super::out_rec::{reverse_links, ring_area, Join, OutPts, OutRec};
use super::select::{self, ClipType, FillRules, PolyFillType, PolyType, WindState};

/// The two intrusive lists threaded through the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EdgeList {
    /// Edges crossing the sweep line, ordered by current X.
    Active,
    /// Scratch list for horizontals and intersection sorting.
    Sorted,
}

/// Scratch state for one execution of the clipper.
pub(crate) struct Sweep<'a> {
    pub(super) edges: &'a mut SlotMap<EdgeId, TEdge>,
    minima: &'a [LocalMinima],
    current_lm: usize,
    scanbeam: BinaryHeap<i64>,
    /// Sorted, duplicate-free X coordinates of maxima in the current
    /// scanbeam. Only filled when strictly simple output is requested.
    pub(super) maxima: Vec<i64>,
    pub(super) active_edges: Option<EdgeId>,
    pub(super) sorted_edges: Option<EdgeId>,
    pub(super) intersections: Vec<IntersectNode>,
    pub(super) out_recs: Vec<OutRec>,
    pub(super) out_pts: OutPts,
    pub(super) joins: Vec<Join>,
    pub(super) ghost_joins: Vec<Join>,
    pub(super) clip_type: ClipType,
    pub(super) fills: FillRules,
    pub(super) options: ClipOptions,
    pub(super) using_tree: bool,
}

impl<'a> Sweep<'a> {
    /// Resets the store's bounds and seeds the scanbeam with every local
    /// minimum.
    pub fn new(
        store: &'a mut EdgeStore,
        clip_type: ClipType,
        fills: FillRules,
        options: ClipOptions,
        using_tree: bool,
    ) -> Self {
        store.reset();
        let EdgeStore { edges, minima, .. } = store;
        let scanbeam = minima.iter().map(|lm| lm.y).collect();
        Self {
            edges,
            minima,
            current_lm: 0,
            scanbeam,
            maxima: Vec::new(),
            active_edges: None,
            sorted_edges: None,
            intersections: Vec::new(),
            out_recs: Vec::new(),
            out_pts: OutPts::with_key(),
            joins: Vec::new(),
            ghost_joins: Vec::new(),
            clip_type,
            fills,
            options,
            using_tree,
        }
    }

    /// Runs the sweep and the post-processing passes, leaving finished rings
    /// in `out_recs`.
    ///
    /// # Errors
    ///
    /// Returns an error when a batch of intersections cannot be ordered or an
    /// internal invariant of the edge lists is broken.
    pub fn execute(&mut self) -> Result<()> {
        let result = self.run();
        self.joins.clear();
        self.ghost_joins.clear();
        result
    }

    fn run(&mut self) -> Result<()> {
        let Some(bot_y) = self.pop_scanbeam() else {
            return Ok(());
        };
        self.insert_local_minima_into_ael(bot_y);
        while let Some(top_y) = self.pop_scanbeam() {
            trace!(y = top_y, "scanbeam");
            self.process_horizontals()?;
            self.ghost_joins.clear();
            self.process_intersections(top_y)?;
            self.process_edges_at_top_of_scanbeam(top_y)?;
            self.insert_local_minima_into_ael(top_y);
        }

        let reverse = self.options.reverse_solution;
        for rec in &self.out_recs {
            let Some(pts) = rec.pts else { continue };
            if rec.is_open {
                continue;
            }
            if (rec.is_hole ^ reverse) == (ring_area(&self.out_pts, pts) > 0.0) {
                reverse_links(&mut self.out_pts, pts);
            }
        }

        self.join_common_edges();

        for idx in 0..self.out_recs.len() {
            if self.out_recs[idx].pts.is_none() {
                continue;
            }
            if self.out_recs[idx].is_open {
                self.fixup_out_polyline(idx);
            } else {
                self.fixup_out_polygon(idx);
            }
        }

        if self.options.strictly_simple {
            self.do_simple_polygons();
        }
        Ok(())
    }

    pub(super) fn insert_scanbeam(&mut self, y: i64) {
        self.scanbeam.push(y);
    }

    pub(super) fn pop_scanbeam(&mut self) -> Option<i64> {
        let y = self.scanbeam.pop()?;
        while self.scanbeam.peek() == Some(&y) {
            self.scanbeam.pop();
        }
        Some(y)
    }

    fn pop_local_minima(&mut self, y: i64) -> Option<LocalMinima> {
        let lm = *self.minima.get(self.current_lm)?;
        if lm.y != y {
            return None;
        }
        self.current_lm += 1;
        Some(lm)
    }

    fn insert_maxima(&mut self, x: i64) {
        if let Err(pos) = self.maxima.binary_search(&x) {
            self.maxima.insert(pos, x);
        }
    }

    fn is_contributing(&self, e: EdgeId) -> bool {
        let edge = &self.edges[e];
        select::is_contributing(
            WindState {
                poly_type: edge.poly_type,
                wind_delta: edge.wind_delta,
                wind_cnt: edge.wind_cnt,
                wind_cnt2: edge.wind_cnt2,
            },
            self.clip_type,
            self.fills,
        )
    }

    fn is_even_odd_fill(&self, e: EdgeId) -> bool {
        self.fills.own(self.edges[e].poly_type) == PolyFillType::EvenOdd
    }

    fn is_even_odd_alt_fill(&self, e: EdgeId) -> bool {
        self.fills.other(self.edges[e].poly_type) == PolyFillType::EvenOdd
    }

    pub(super) fn insert_local_minima_into_ael(&mut self, bot_y: i64) {
        while let Some(lm) = self.pop_local_minima(bot_y) {
            let mut op1 = None;
            match (lm.left_bound, lm.right_bound) {
                (None, Some(rb)) => {
                    self.insert_edge_into_ael(rb, None);
                    self.set_winding_count(rb);
                    if self.is_contributing(rb) {
                        op1 = Some(self.add_out_pt(rb, self.edges[rb].bot));
                    }
                }
                (Some(lb), None) => {
                    self.insert_edge_into_ael(lb, None);
                    self.set_winding_count(lb);
                    if self.is_contributing(lb) {
                        op1 = Some(self.add_out_pt(lb, self.edges[lb].bot));
                    }
                    self.insert_scanbeam(self.edges[lb].top.y);
                }
                (Some(lb), Some(rb)) => {
                    self.insert_edge_into_ael(lb, None);
                    self.insert_edge_into_ael(rb, Some(lb));
                    self.set_winding_count(lb);
                    self.edges[rb].wind_cnt = self.edges[lb].wind_cnt;
                    self.edges[rb].wind_cnt2 = self.edges[lb].wind_cnt2;
                    if self.is_contributing(lb) {
                        op1 = Some(self.add_local_min_poly(lb, rb, self.edges[lb].bot));
                    }
                    self.insert_scanbeam(self.edges[lb].top.y);
                }
                (None, None) => continue,
            }

            if let Some(rb) = lm.right_bound {
                if self.edges[rb].is_horizontal() {
                    if let Some(next) = self.edges[rb].next_in_lml {
                        self.insert_scanbeam(self.edges[next].top.y);
                    }
                    self.add_edge_to_sel(rb);
                } else {
                    self.insert_scanbeam(self.edges[rb].top.y);
                }
            }

            let (Some(lb), Some(rb)) = (lm.left_bound, lm.right_bound) else {
                continue;
            };

            // Output sharing an edge with a horizontal right bound needs
            // joining later.
            if let Some(op1) = op1 {
                let right = self.edges[rb];
                if right.is_horizontal() && right.wind_delta != 0 {
                    let ghosts: Vec<Join> = self
                        .ghost_joins
                        .iter()
                        .filter(|j| {
                            horz_segments_overlap(
                                self.out_pts[j.out_pt1].pt.x,
                                j.off_pt.x,
                                right.bot.x,
                                right.top.x,
                            )
                        })
                        .copied()
                        .collect();
                    for j in ghosts {
                        self.add_join(j.out_pt1, op1, j.off_pt);
                    }
                }
            }

            let left = self.edges[lb];
            if let (Some(op1), Some(prev)) = (op1, left.prev_in_ael) {
                let pe = self.edges[prev];
                if left.out_idx.is_assigned()
                    && pe.curr.x == left.bot.x
                    && pe.out_idx.is_assigned()
                    && slopes_equal4(pe.curr, pe.top, left.curr, left.top)
                    && left.wind_delta != 0
                    && pe.wind_delta != 0
                {
                    let op2 = self.add_out_pt(prev, left.bot);
                    self.add_join(op1, op2, left.top);
                }
            }

            if self.edges[lb].next_in_ael != Some(rb) {
                let right = self.edges[rb];
                if let (Some(op1), Some(prev)) = (op1, right.prev_in_ael) {
                    let pe = self.edges[prev];
                    if right.out_idx.is_assigned()
                        && pe.out_idx.is_assigned()
                        && slopes_equal4(pe.curr, pe.top, right.curr, right.top)
                        && right.wind_delta != 0
                        && pe.wind_delta != 0
                    {
                        let op2 = self.add_out_pt(prev, right.bot);
                        self.add_join(op1, op2, right.top);
                    }
                }

                // The right bound is to the right of every edge between the
                // two bounds above the minimum.
                let mut e = self.edges[lb].next_in_ael;
                let lb_curr = self.edges[lb].curr;
                while let Some(id) = e.filter(|&id| id != rb) {
                    self.intersect_edges(rb, id, lb_curr);
                    e = self.edges[id].next_in_ael;
                }
            }
        }
    }

    fn insert_edge_into_ael(&mut self, edge: EdgeId, start: Option<EdgeId>) {
        let Some(head) = self.active_edges else {
            self.edges[edge].prev_in_ael = None;
            self.edges[edge].next_in_ael = None;
            self.active_edges = Some(edge);
            return;
        };
        if start.is_none() && self.e2_inserts_before_e1(head, edge) {
            self.edges[edge].prev_in_ael = None;
            self.edges[edge].next_in_ael = Some(head);
            self.edges[head].prev_in_ael = Some(edge);
            self.active_edges = Some(edge);
            return;
        }
        let mut start = start.unwrap_or(head);
        while let Some(next) = self.edges[start].next_in_ael {
            if self.e2_inserts_before_e1(next, edge) {
                break;
            }
            start = next;
        }
        let next = self.edges[start].next_in_ael;
        self.edges[edge].next_in_ael = next;
        if let Some(next) = next {
            self.edges[next].prev_in_ael = Some(edge);
        }
        self.edges[edge].prev_in_ael = Some(start);
        self.edges[start].next_in_ael = Some(edge);
    }

    fn e2_inserts_before_e1(&self, e1: EdgeId, e2: EdgeId) -> bool {
        let (a, b) = (&self.edges[e1], &self.edges[e2]);
        if b.curr.x == a.curr.x {
            if b.top.y > a.top.y {
                b.top.x < a.top_x(b.top.y)
            } else {
                a.top.x > b.top_x(a.top.y)
            }
        } else {
            b.curr.x < a.curr.x
        }
    }

    /// Seeds the winding counts of an edge entering the AEL from its
    /// left neighbours.
    fn set_winding_count(&mut self, edge: EdgeId) {
        let new = self.edges[edge];
        let mut e = new.prev_in_ael;
        while let Some(id) = e {
            let prev = &self.edges[id];
            if prev.poly_type == new.poly_type && prev.wind_delta != 0 {
                break;
            }
            e = prev.prev_in_ael;
        }

        let (wind_cnt, mut wind_cnt2, mut cursor) = match e {
            None => {
                let wind_cnt = if new.wind_delta == 0 {
                    if self.fills.own(new.poly_type) == PolyFillType::Negative {
                        -1
                    } else {
                        1
                    }
                } else {
                    new.wind_delta
                };
                (wind_cnt, 0, self.active_edges)
            }
            Some(id) if new.wind_delta == 0 && self.clip_type != ClipType::Union => {
                let prev = &self.edges[id];
                (1, prev.wind_cnt2, prev.next_in_ael)
            }
            Some(id) if self.is_even_odd_fill(edge) => {
                let prev = &self.edges[id];
                let wind_cnt = if new.wind_delta == 0 {
                    // An open path is inside when an odd number of closed
                    // same-type edges lie to its left.
                    let mut inside = true;
                    let mut e2 = prev.prev_in_ael;
                    while let Some(id2) = e2 {
                        let other = &self.edges[id2];
                        if other.poly_type == prev.poly_type && other.wind_delta != 0 {
                            inside = !inside;
                        }
                        e2 = other.prev_in_ael;
                    }
                    i32::from(!inside)
                } else {
                    new.wind_delta
                };
                (wind_cnt, prev.wind_cnt2, prev.next_in_ael)
            }
            Some(id) => {
                let prev = &self.edges[id];
                let wind_cnt = if prev.wind_cnt * prev.wind_delta < 0 {
                    // The previous edge decreases the count toward zero.
                    if prev.wind_cnt.abs() > 1 {
                        if prev.wind_delta * new.wind_delta < 0 {
                            prev.wind_cnt
                        } else {
                            prev.wind_cnt + new.wind_delta
                        }
                    } else if new.wind_delta == 0 {
                        1
                    } else {
                        new.wind_delta
                    }
                } else if new.wind_delta == 0 {
                    if prev.wind_cnt < 0 {
                        prev.wind_cnt - 1
                    } else {
                        prev.wind_cnt + 1
                    }
                } else if prev.wind_delta * new.wind_delta < 0 {
                    prev.wind_cnt
                } else {
                    prev.wind_cnt + new.wind_delta
                };
                (wind_cnt, prev.wind_cnt2, prev.next_in_ael)
            }
        };

        let alt_even_odd = self.is_even_odd_alt_fill(edge);
        while let Some(id) = cursor.filter(|&id| id != edge) {
            let other = &self.edges[id];
            if alt_even_odd {
                if other.wind_delta != 0 {
                    wind_cnt2 = i32::from(wind_cnt2 == 0);
                }
            } else {
                wind_cnt2 += other.wind_delta;
            }
            cursor = other.next_in_ael;
        }

        let target = &mut self.edges[edge];
        target.wind_cnt = wind_cnt;
        target.wind_cnt2 = wind_cnt2;
    }

    fn next_in(&self, e: EdgeId, list: EdgeList) -> Option<EdgeId> {
        match list {
            EdgeList::Active => self.edges[e].next_in_ael,
            EdgeList::Sorted => self.edges[e].next_in_sel,
        }
    }

    fn prev_in(&self, e: EdgeId, list: EdgeList) -> Option<EdgeId> {
        match list {
            EdgeList::Active => self.edges[e].prev_in_ael,
            EdgeList::Sorted => self.edges[e].prev_in_sel,
        }
    }

    fn set_next_in(&mut self, e: EdgeId, list: EdgeList, value: Option<EdgeId>) {
        match list {
            EdgeList::Active => self.edges[e].next_in_ael = value,
            EdgeList::Sorted => self.edges[e].next_in_sel = value,
        }
    }

    fn set_prev_in(&mut self, e: EdgeId, list: EdgeList, value: Option<EdgeId>) {
        match list {
            EdgeList::Active => self.edges[e].prev_in_ael = value,
            EdgeList::Sorted => self.edges[e].prev_in_sel = value,
        }
    }

    fn head(&self, list: EdgeList) -> Option<EdgeId> {
        match list {
            EdgeList::Active => self.active_edges,
            EdgeList::Sorted => self.sorted_edges,
        }
    }

    fn set_head(&mut self, list: EdgeList, value: Option<EdgeId>) {
        match list {
            EdgeList::Active => self.active_edges = value,
            EdgeList::Sorted => self.sorted_edges = value,
        }
    }

    /// Exchanges the positions of two edges in `list`.
    pub(super) fn swap_positions(&mut self, list: EdgeList, edge1: EdgeId, edge2: EdgeId) {
        // An edge with no neighbours has already been removed.
        if self.next_in(edge1, list) == self.prev_in(edge1, list)
            || self.next_in(edge2, list) == self.prev_in(edge2, list)
        {
            return;
        }

        if self.next_in(edge1, list) == Some(edge2) {
            let next = self.next_in(edge2, list);
            if let Some(next) = next {
                self.set_prev_in(next, list, Some(edge1));
            }
            let prev = self.prev_in(edge1, list);
            if let Some(prev) = prev {
                self.set_next_in(prev, list, Some(edge2));
            }
            self.set_prev_in(edge2, list, prev);
            self.set_next_in(edge2, list, Some(edge1));
            self.set_prev_in(edge1, list, Some(edge2));
            self.set_next_in(edge1, list, next);
        } else if self.next_in(edge2, list) == Some(edge1) {
            let next = self.next_in(edge1, list);
            if let Some(next) = next {
                self.set_prev_in(next, list, Some(edge2));
            }
            let prev = self.prev_in(edge2, list);
            if let Some(prev) = prev {
                self.set_next_in(prev, list, Some(edge1));
            }
            self.set_prev_in(edge1, list, prev);
            self.set_next_in(edge1, list, Some(edge2));
            self.set_prev_in(edge2, list, Some(edge1));
            self.set_next_in(edge2, list, next);
        } else {
            let next = self.next_in(edge1, list);
            let prev = self.prev_in(edge1, list);
            let next2 = self.next_in(edge2, list);
            let prev2 = self.prev_in(edge2, list);
            self.set_next_in(edge1, list, next2);
            if let Some(n) = next2 {
                self.set_prev_in(n, list, Some(edge1));
            }
            self.set_prev_in(edge1, list, prev2);
            if let Some(p) = prev2 {
                self.set_next_in(p, list, Some(edge1));
            }
            self.set_next_in(edge2, list, next);
            if let Some(n) = next {
                self.set_prev_in(n, list, Some(edge2));
            }
            self.set_prev_in(edge2, list, prev);
            if let Some(p) = prev {
                self.set_next_in(p, list, Some(edge2));
            }
        }

        if self.prev_in(edge1, list).is_none() {
            self.set_head(list, Some(edge1));
        } else if self.prev_in(edge2, list).is_none() {
            self.set_head(list, Some(edge2));
        }
    }

    /// Unlinks `e` from `list`; a no-op when it is not a member.
    pub(super) fn delete_from(&mut self, list: EdgeList, e: EdgeId) {
        let prev = self.prev_in(e, list);
        let next = self.next_in(e, list);
        if prev.is_none() && next.is_none() && self.head(list) != Some(e) {
            return;
        }
        match prev {
            Some(p) => self.set_next_in(p, list, next),
            None => self.set_head(list, next),
        }
        if let Some(n) = next {
            self.set_prev_in(n, list, prev);
        }
        self.set_next_in(e, list, None);
        self.set_prev_in(e, list, None);
    }

    pub(super) fn add_edge_to_sel(&mut self, e: EdgeId) {
        let head = self.sorted_edges;
        self.edges[e].prev_in_sel = None;
        self.edges[e].next_in_sel = head;
        if let Some(head) = head {
            self.edges[head].prev_in_sel = Some(e);
        }
        self.sorted_edges = Some(e);
    }

    pub(super) fn pop_edge_from_sel(&mut self) -> Option<EdgeId> {
        let e = self.sorted_edges?;
        self.sorted_edges = self.edges[e].next_in_sel;
        if let Some(head) = self.sorted_edges {
            self.edges[head].prev_in_sel = None;
        }
        self.edges[e].next_in_sel = None;
        self.edges[e].prev_in_sel = None;
        Some(e)
    }

    pub(super) fn copy_ael_to_sel(&mut self) {
        self.sorted_edges = self.active_edges;
        let mut e = self.active_edges;
        while let Some(id) = e {
            let edge = &mut self.edges[id];
            edge.prev_in_sel = edge.prev_in_ael;
            edge.next_in_sel = edge.next_in_ael;
            e = edge.next_in_ael;
        }
    }

    /// Replaces `e` in the AEL by the next edge of its bound and returns it.
    pub(super) fn update_edge_into_ael(&mut self, e: EdgeId) -> Result<EdgeId> {
        let edge = self.edges[e];
        let Some(next) = edge.next_in_lml else {
            return Err(OperationError::Failed("edge promoted past the end of its bound".into()).into());
        };
        match edge.prev_in_ael {
            Some(prev) => self.edges[prev].next_in_ael = Some(next),
            None => self.active_edges = Some(next),
        }
        if let Some(after) = edge.next_in_ael {
            self.edges[after].prev_in_ael = Some(next);
        }
        let promoted = &mut self.edges[next];
        promoted.out_idx = edge.out_idx;
        promoted.side = edge.side;
        promoted.wind_delta = edge.wind_delta;
        promoted.wind_cnt = edge.wind_cnt;
        promoted.wind_cnt2 = edge.wind_cnt2;
        promoted.curr = promoted.bot;
        promoted.prev_in_ael = edge.prev_in_ael;
        promoted.next_in_ael = edge.next_in_ael;
        if !promoted.is_horizontal() {
            let top_y = promoted.top.y;
            self.insert_scanbeam(top_y);
        }
        Ok(next)
    }

    /// Updates winding counts and output where `e1` and `e2` cross at `pt`.
    /// `e1` is left of `e2` below the crossing.
    pub(super) fn intersect_edges(&mut self, e1: EdgeId, e2: EdgeId, pt: IntPoint) {
        let e1_contributing = self.edges[e1].out_idx.is_assigned();
        let e2_contributing = self.edges[e2].out_idx.is_assigned();
        let (wd1, wd2) = (self.edges[e1].wind_delta, self.edges[e2].wind_delta);

        if wd1 == 0 || wd2 == 0 {
            self.intersect_open_edges(e1, e2, pt);
            return;
        }

        let (pt1, pt2) = (self.edges[e1].poly_type, self.edges[e2].poly_type);
        if pt1 == pt2 {
            if self.is_even_odd_fill(e1) {
                let old = self.edges[e1].wind_cnt;
                self.edges[e1].wind_cnt = self.edges[e2].wind_cnt;
                self.edges[e2].wind_cnt = old;
            } else {
                let w1 = self.edges[e1].wind_cnt;
                self.edges[e1].wind_cnt = if w1 + wd2 == 0 { -w1 } else { w1 + wd2 };
                let w2 = self.edges[e2].wind_cnt;
                self.edges[e2].wind_cnt = if w2 - wd1 == 0 { -w2 } else { w2 - wd1 };
            }
        } else {
            if self.is_even_odd_fill(e2) {
                self.edges[e1].wind_cnt2 = i32::from(self.edges[e1].wind_cnt2 == 0);
            } else {
                self.edges[e1].wind_cnt2 += wd2;
            }
            if self.is_even_odd_fill(e1) {
                self.edges[e2].wind_cnt2 = i32::from(self.edges[e2].wind_cnt2 == 0);
            } else {
                self.edges[e2].wind_cnt2 -= wd1;
            }
        }

        let e1_wc = self.fills.own(pt1).effective(self.edges[e1].wind_cnt);
        let e2_wc = self.fills.own(pt2).effective(self.edges[e2].wind_cnt);
        let unit = |wc: i32| wc == 0 || wc == 1;

        if e1_contributing && e2_contributing {
            if !unit(e1_wc) || !unit(e2_wc) || (pt1 != pt2 && self.clip_type != ClipType::Xor) {
                self.add_local_max_poly(e1, e2, pt);
            } else {
                self.add_out_pt(e1, pt);
                self.add_out_pt(e2, pt);
                self.swap_sides(e1, e2);
                self.swap_poly_indexes(e1, e2);
            }
        } else if e1_contributing {
            if unit(e2_wc) {
                self.add_out_pt(e1, pt);
                self.swap_sides(e1, e2);
                self.swap_poly_indexes(e1, e2);
            }
        } else if e2_contributing {
            if unit(e1_wc) {
                self.add_out_pt(e2, pt);
                self.swap_sides(e1, e2);
                self.swap_poly_indexes(e1, e2);
            }
        } else if unit(e1_wc) && unit(e2_wc) {
            let e1_wc2 = self.fills.other(pt1).effective(self.edges[e1].wind_cnt2);
            let e2_wc2 = self.fills.other(pt2).effective(self.edges[e2].wind_cnt2);
            if pt1 != pt2 {
                self.add_local_min_poly(e1, e2, pt);
            } else if e1_wc == 1 && e2_wc == 1 {
                let starts_region = match self.clip_type {
                    ClipType::Intersection => e1_wc2 > 0 && e2_wc2 > 0,
                    ClipType::Union => e1_wc2 <= 0 && e2_wc2 <= 0,
                    ClipType::Difference => {
                        (pt1 == PolyType::Clip && e1_wc2 > 0 && e2_wc2 > 0)
                            || (pt1 == PolyType::Subject && e1_wc2 <= 0 && e2_wc2 <= 0)
                    }
                    ClipType::Xor => true,
                };
                if starts_region {
                    self.add_local_min_poly(e1, e2, pt);
                }
            } else {
                self.swap_sides(e1, e2);
            }
        }
    }

    /// Crossings involving an open path only ever clip the open path.
    fn intersect_open_edges(&mut self, e1: EdgeId, e2: EdgeId, pt: IntPoint) {
        let (a, b) = (self.edges[e1], self.edges[e2]);
        let e1_contributing = a.out_idx.is_assigned();
        let e2_contributing = b.out_idx.is_assigned();
        if a.wind_delta == 0 && b.wind_delta == 0 {
            return;
        }
        if a.poly_type == b.poly_type
            && a.wind_delta != b.wind_delta
            && self.clip_type == ClipType::Union
        {
            if a.wind_delta == 0 {
                if e2_contributing {
                    self.add_out_pt(e1, pt);
                    if e1_contributing {
                        self.edges[e1].out_idx = OutIdx::Unassigned;
                    }
                }
            } else if e1_contributing {
                self.add_out_pt(e2, pt);
                if e2_contributing {
                    self.edges[e2].out_idx = OutIdx::Unassigned;
                }
            }
        } else if a.poly_type != b.poly_type {
            if a.wind_delta == 0
                && b.wind_cnt.abs() == 1
                && (self.clip_type != ClipType::Union || b.wind_cnt2 == 0)
            {
                self.add_out_pt(e1, pt);
                if e1_contributing {
                    self.edges[e1].out_idx = OutIdx::Unassigned;
                }
            } else if b.wind_delta == 0
                && a.wind_cnt.abs() == 1
                && (self.clip_type != ClipType::Union || a.wind_cnt2 == 0)
            {
                self.add_out_pt(e2, pt);
                if e2_contributing {
                    self.edges[e2].out_idx = OutIdx::Unassigned;
                }
            }
        }
    }

    fn swap_sides(&mut self, e1: EdgeId, e2: EdgeId) {
        let side = self.edges[e1].side;
        self.edges[e1].side = self.edges[e2].side;
        self.edges[e2].side = side;
    }

    fn swap_poly_indexes(&mut self, e1: EdgeId, e2: EdgeId) {
        let out_idx = self.edges[e1].out_idx;
        self.edges[e1].out_idx = self.edges[e2].out_idx;
        self.edges[e2].out_idx = out_idx;
    }

    fn is_maxima(&self, e: EdgeId, y: i64) -> bool {
        let edge = &self.edges[e];
        edge.top.y == y && edge.next_in_lml.is_none()
    }

    fn is_intermediate(&self, e: EdgeId, y: i64) -> bool {
        let edge = &self.edges[e];
        edge.top.y == y && edge.next_in_lml.is_some()
    }

    /// The edge sharing `e`'s top vertex at the end of the adjoining bound.
    pub(super) fn get_maxima_pair(&self, e: EdgeId) -> Option<EdgeId> {
        let edge = &self.edges[e];
        [edge.next, edge.prev].into_iter().find(|&other| {
            let o = &self.edges[other];
            o.top == edge.top && o.next_in_lml.is_none()
        })
    }

    /// Like [`Self::get_maxima_pair`] but ignores pairs that are not in the AEL.
    fn get_maxima_pair_ex(&self, e: EdgeId) -> Option<EdgeId> {
        let pair = self.get_maxima_pair(e)?;
        let p = &self.edges[pair];
        if p.out_idx == OutIdx::Skip || (p.next_in_ael == p.prev_in_ael && !p.is_horizontal()) {
            None
        } else {
            Some(pair)
        }
    }

    /// Returns `true` when `other` touches the bottom of the freshly promoted
    /// `e` with the same slope, so their output needs a join.
    pub(super) fn shares_collinear_bottom(&self, e: EdgeId, other: EdgeId) -> bool {
        let (a, b) = (&self.edges[e], &self.edges[other]);
        b.curr == a.bot
            && b.out_idx.is_assigned()
            && b.curr.y > b.top.y
            && a.wind_delta != 0
            && b.wind_delta != 0
            && slopes_equal4(a.curr, a.top, b.curr, b.top)
    }

    fn process_edges_at_top_of_scanbeam(&mut self, top_y: i64) -> Result<()> {
        let mut e = self.active_edges;
        while let Some(mut id) = e {
            // Maxima are treated as bent horizontals, except maxima with
            // horizontal edges.
            let mut is_maxima_edge = self.is_maxima(id, top_y);
            if is_maxima_edge {
                if let Some(pair) = self.get_maxima_pair_ex(id) {
                    is_maxima_edge = !self.edges[pair].is_horizontal();
                }
            }

            if is_maxima_edge {
                if self.options.strictly_simple {
                    self.insert_maxima(self.edges[id].top.x);
                }
                let prev = self.edges[id].prev_in_ael;
                self.do_maxima(id)?;
                e = match prev {
                    None => self.active_edges,
                    Some(prev) => self.edges[prev].next_in_ael,
                };
                continue;
            }

            let next_is_horizontal = self.edges[id]
                .next_in_lml
                .is_some_and(|next| self.edges[next].is_horizontal());
            if self.is_intermediate(id, top_y) && next_is_horizontal {
                id = self.update_edge_into_ael(id)?;
                if self.edges[id].out_idx.is_assigned() {
                    self.add_out_pt(id, self.edges[id].bot);
                }
                self.add_edge_to_sel(id);
            } else {
                let x = self.edges[id].top_x(top_y);
                let curr = &mut self.edges[id].curr;
                curr.x = x;
                curr.y = top_y;
            }

            // Touching edges both get a vertex here for strictly simple output.
            if self.options.strictly_simple {
                let edge = self.edges[id];
                if let Some(prev) = edge.prev_in_ael {
                    let pe = self.edges[prev];
                    if edge.out_idx.is_assigned()
                        && edge.wind_delta != 0
                        && pe.out_idx.is_assigned()
                        && pe.curr.x == edge.curr.x
                        && pe.wind_delta != 0
                    {
                        let ip = edge.curr;
                        let op = self.add_out_pt(prev, ip);
                        let op2 = self.add_out_pt(id, ip);
                        self.add_join(op, op2, ip);
                    }
                }
            }
            e = self.edges[id].next_in_ael;
        }

        self.process_horizontals()?;
        self.maxima.clear();

        // Promote intermediate vertices.
        let mut e = self.active_edges;
        while let Some(mut id) = e {
            if self.is_intermediate(id, top_y) {
                let op = if self.edges[id].out_idx.is_assigned() {
                    Some(self.add_out_pt(id, self.edges[id].top))
                } else {
                    None
                };
                id = self.update_edge_into_ael(id)?;

                if let Some(op) = op {
                    let edge = self.edges[id];
                    if let Some(prev) = edge
                        .prev_in_ael
                        .filter(|&prev| self.shares_collinear_bottom(id, prev))
                    {
                        let op2 = self.add_out_pt(prev, edge.bot);
                        self.add_join(op, op2, edge.top);
                    } else if let Some(next) = edge
                        .next_in_ael
                        .filter(|&next| self.shares_collinear_bottom(id, next))
                    {
                        let op2 = self.add_out_pt(next, edge.bot);
                        self.add_join(op, op2, edge.top);
                    }
                }
            }
            e = self.edges[id].next_in_ael;
        }
        Ok(())
    }

    fn do_maxima(&mut self, e: EdgeId) -> Result<()> {
        let Some(max_pair) = self.get_maxima_pair_ex(e) else {
            if self.edges[e].out_idx.is_assigned() {
                self.add_out_pt(e, self.edges[e].top);
            }
            self.delete_from(EdgeList::Active, e);
            return Ok(());
        };

        let mut next = self.edges[e].next_in_ael;
        while let Some(n) = next.filter(|&n| n != max_pair) {
            self.intersect_edges(e, n, self.edges[e].top);
            self.swap_positions(EdgeList::Active, e, n);
            next = self.edges[e].next_in_ael;
        }

        let top = self.edges[e].top;
        match (self.edges[e].out_idx, self.edges[max_pair].out_idx) {
            (OutIdx::Unassigned, OutIdx::Unassigned) => {
                self.delete_from(EdgeList::Active, e);
                self.delete_from(EdgeList::Active, max_pair);
            }
            (OutIdx::Rec(_), OutIdx::Rec(_)) => {
                self.add_local_max_poly(e, max_pair, top);
                self.delete_from(EdgeList::Active, e);
                self.delete_from(EdgeList::Active, max_pair);
            }
            _ if self.edges[e].wind_delta == 0 => {
                if self.edges[e].out_idx.is_assigned() {
                    self.add_out_pt(e, top);
                    self.edges[e].out_idx = OutIdx::Unassigned;
                }
                self.delete_from(EdgeList::Active, e);
                if self.edges[max_pair].out_idx.is_assigned() {
                    self.add_out_pt(max_pair, top);
                    self.edges[max_pair].out_idx = OutIdx::Unassigned;
                }
                self.delete_from(EdgeList::Active, max_pair);
            }
            _ => {
                return Err(
                    OperationError::Failed(format!("unpaired maxima at y = {}", top.y)).into(),
                )
            }
        }
        Ok(())
    }
}

/// Returns `true` when the X ranges `[seg1a, seg1b]` and `[seg2a, seg2b]`
/// overlap by more than a point.
pub(super) fn horz_segments_overlap(seg1a: i64, seg1b: i64, seg2a: i64, seg2b: i64) -> bool {
    let (lo1, hi1) = (seg1a.min(seg1b), seg1a.max(seg1b));
    let (lo2, hi2) = (seg2a.min(seg2b), seg2a.max(seg2b));
    lo1 < hi2 && lo2 < hi1
}
