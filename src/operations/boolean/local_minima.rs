//! Conversion of input paths into edge bounds grouped by local minima.

use slotmap::SlotMap;

use crate::error::{GeometryError, OperationError, Result};
use crate::math::cross_2d::{pt2_is_between_pt1_and_pt3, slopes_equal3};
use crate::math::{IntPoint, IntRect, HI_RANGE};

use super::edge::{EdgeId, EdgeSide, OutIdx, TEdge};
use super::select::PolyType;

/// A vertex where two bounds start climbing toward smaller Y.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LocalMinima {
    pub y: i64,
    pub left_bound: Option<EdgeId>,
    pub right_bound: Option<EdgeId>,
}

/// Owns every edge loaded into a clipper and the local minima that index them.
#[derive(Debug, Default)]
pub(crate) struct EdgeStore {
    pub edges: SlotMap<EdgeId, TEdge>,
    /// Sorted by descending Y.
    pub minima: Vec<LocalMinima>,
    pub has_open_paths: bool,
}

fn range_test(pt: IntPoint) -> Result<()> {
    let range = -HI_RANGE..=HI_RANGE;
    if range.contains(&pt.x) && range.contains(&pt.y) {
        Ok(())
    } else {
        Err(GeometryError::CoordinateOutOfRange {
            x: pt.x,
            y: pt.y,
            limit: HI_RANGE,
        }
        .into())
    }
}

impl EdgeStore {
    /// Removes all edges and minima.
    pub fn clear(&mut self) {
        self.edges.clear();
        self.minima.clear();
        self.has_open_paths = false;
    }

    fn next(&self, e: EdgeId) -> EdgeId {
        self.edges[e].next
    }

    fn prev(&self, e: EdgeId) -> EdgeId {
        self.edges[e].prev
    }

    fn is_horizontal(&self, e: EdgeId) -> bool {
        self.edges[e].is_horizontal()
    }

    /// Converts `path` into edges and registers its bounds.
    ///
    /// Returns `Ok(false)` when the path degenerates to nothing after
    /// duplicate and collinear vertex removal.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for an open clip path and
    /// `GeometryError::CoordinateOutOfRange` for coordinates beyond
    /// [`HI_RANGE`].
    pub fn add_path(
        &mut self,
        path: &[IntPoint],
        poly_type: PolyType,
        closed: bool,
        preserve_collinear: bool,
    ) -> Result<bool> {
        if !closed && poly_type == PolyType::Clip {
            return Err(
                OperationError::InvalidInput("open paths must be subject paths".into()).into(),
            );
        }
        if path.is_empty() {
            return Ok(false);
        }

        let mut high_i = path.len() - 1;
        if closed {
            while high_i > 0 && path[high_i] == path[0] {
                high_i -= 1;
            }
        }
        while high_i > 0 && path[high_i] == path[high_i - 1] {
            high_i -= 1;
        }
        if (closed && high_i < 2) || (!closed && high_i < 1) {
            return Ok(false);
        }
        for &pt in &path[..=high_i] {
            range_test(pt)?;
        }

        let ids: Vec<EdgeId> = path[..=high_i]
            .iter()
            .map(|&pt| self.edges.insert(TEdge::new(pt, poly_type)))
            .collect();
        for (i, &id) in ids.iter().enumerate() {
            let edge = &mut self.edges[id];
            edge.next = ids[(i + 1) % ids.len()];
            edge.prev = ids[(i + ids.len() - 1) % ids.len()];
        }

        // Remove duplicate vertices and, for closed paths, collinear edges.
        let mut e_start = ids[0];
        let mut e = e_start;
        let mut e_loop_stop = e_start;
        loop {
            let next = self.next(e);
            let prev = self.prev(e);
            if self.edges[e].curr == self.edges[next].curr && (closed || next != e_start) {
                if e == next {
                    break;
                }
                if e == e_start {
                    e_start = next;
                }
                e = self.remove_edge(e);
                e_loop_stop = e;
                continue;
            }
            if prev == next {
                break;
            }
            let (pc, ec, nc) = (
                self.edges[prev].curr,
                self.edges[e].curr,
                self.edges[next].curr,
            );
            if closed
                && slopes_equal3(pc, ec, nc)
                && (!preserve_collinear || !pt2_is_between_pt1_and_pt3(pc, ec, nc))
            {
                if e == e_start {
                    e_start = next;
                }
                e = self.remove_edge(e);
                e = self.prev(e);
                e_loop_stop = e;
                continue;
            }
            e = next;
            if e == e_loop_stop || (!closed && self.next(e) == e_start) {
                break;
            }
        }

        if (!closed && e == self.next(e)) || (closed && self.prev(e) == self.next(e)) {
            self.discard(&ids);
            return Ok(false);
        }

        if !closed {
            self.has_open_paths = true;
            let last = self.prev(e_start);
            self.edges[last].out_idx = OutIdx::Skip;
        }

        let mut is_flat = true;
        let start_y = self.edges[e_start].curr.y;
        e = e_start;
        loop {
            self.init_edge2(e);
            e = self.next(e);
            if is_flat && self.edges[e].curr.y != start_y {
                is_flat = false;
            }
            if e == e_start {
                break;
            }
        }

        if is_flat {
            if closed {
                self.discard(&ids);
                return Ok(false);
            }
            self.add_flat_open_path(e);
            return Ok(true);
        }

        let mut e_min: Option<EdgeId> = None;
        let prev = self.prev(e);
        if self.edges[prev].bot == self.edges[prev].top {
            e = self.next(e);
        }

        loop {
            e = self.find_next_loc_min(e);
            if Some(e) == e_min {
                break;
            }
            if e_min.is_none() {
                e_min = Some(e);
            }

            // e and e.prev share a local minimum (left-aligned if horizontal).
            let prev = self.prev(e);
            let y = self.edges[e].bot.y;
            let (left, right, left_is_forward) = if self.edges[e].dx < self.edges[prev].dx {
                (prev, e, false)
            } else {
                (e, prev, true)
            };
            self.edges[left].side = EdgeSide::Left;
            self.edges[right].side = EdgeSide::Right;
            let wind_delta = if !closed {
                0
            } else if self.next(left) == right {
                -1
            } else {
                1
            };
            self.edges[left].wind_delta = wind_delta;
            self.edges[right].wind_delta = -wind_delta;

            let mut e_left = self.process_bound(left, left_is_forward);
            if self.edges[e_left].out_idx == OutIdx::Skip {
                e_left = self.process_bound(e_left, left_is_forward);
            }
            let mut e_right = self.process_bound(right, !left_is_forward);
            if self.edges[e_right].out_idx == OutIdx::Skip {
                e_right = self.process_bound(e_right, !left_is_forward);
            }

            let mut lm = LocalMinima {
                y,
                left_bound: Some(left),
                right_bound: Some(right),
            };
            if self.edges[left].out_idx == OutIdx::Skip {
                lm.left_bound = None;
            } else if self.edges[right].out_idx == OutIdx::Skip {
                lm.right_bound = None;
            }
            self.insert_local_minima(lm);
            e = if left_is_forward { e_left } else { e_right };
        }
        Ok(true)
    }

    fn discard(&mut self, ids: &[EdgeId]) {
        for &id in ids {
            self.edges.remove(id);
        }
    }

    /// Unlinks `e` from its ring and returns its successor.
    fn remove_edge(&mut self, e: EdgeId) -> EdgeId {
        let TEdge { prev, next, .. } = self.edges[e];
        self.edges[prev].next = next;
        self.edges[next].prev = prev;
        self.edges.remove(e);
        next
    }

    fn init_edge2(&mut self, e: EdgeId) {
        let next_curr = self.edges[self.next(e)].curr;
        let edge = &mut self.edges[e];
        if edge.curr.y >= next_curr.y {
            edge.bot = edge.curr;
            edge.top = next_curr;
        } else {
            edge.top = edge.curr;
            edge.bot = next_curr;
        }
        edge.set_dx();
    }

    /// A totally flat open path becomes a single right bound.
    fn add_flat_open_path(&mut self, mut e: EdgeId) {
        let last = self.prev(e);
        self.edges[last].out_idx = OutIdx::Skip;
        let lm = LocalMinima {
            y: self.edges[e].bot.y,
            left_bound: None,
            right_bound: Some(e),
        };
        self.edges[e].side = EdgeSide::Right;
        self.edges[e].wind_delta = 0;
        loop {
            if self.edges[e].bot.x != self.edges[self.prev(e)].top.x {
                self.edges[e].reverse_horizontal();
            }
            let next = self.next(e);
            if self.edges[next].out_idx == OutIdx::Skip {
                break;
            }
            self.edges[e].next_in_lml = Some(next);
            e = next;
        }
        self.insert_local_minima(lm);
    }

    fn find_next_loc_min(&self, mut e: EdgeId) -> EdgeId {
        loop {
            while self.edges[e].bot != self.edges[self.prev(e)].bot
                || self.edges[e].curr == self.edges[e].top
            {
                e = self.next(e);
            }
            if !self.is_horizontal(e) && !self.is_horizontal(self.prev(e)) {
                break;
            }
            while self.is_horizontal(self.prev(e)) {
                e = self.prev(e);
            }
            let e2 = e;
            while self.is_horizontal(e) {
                e = self.next(e);
            }
            if self.edges[e].top.y == self.edges[self.prev(e)].bot.y {
                // An intermediate horizontal.
                continue;
            }
            if self.edges[self.prev(e2)].bot.x < self.edges[e].bot.x {
                e = e2;
            }
            break;
        }
        e
    }

    /// Chains the edges of one bound through `next_in_lml` and returns the
    /// first edge beyond it.
    fn process_bound(&mut self, start: EdgeId, forward: bool) -> EdgeId {
        let step = |store: &Self, e: EdgeId| {
            if forward {
                store.next(e)
            } else {
                store.prev(e)
            }
        };
        let step_back = |store: &Self, e: EdgeId| {
            if forward {
                store.prev(e)
            } else {
                store.next(e)
            }
        };

        let mut result = start;
        let mut e = start;

        if self.edges[result].out_idx == OutIdx::Skip {
            // Edges beyond the skip edge form another local minimum.
            while self.edges[e].top.y == self.edges[step(self, e)].bot.y {
                e = step(self, e);
            }
            while e != result && self.is_horizontal(e) {
                e = step_back(self, e);
            }
            if e == result {
                result = step(self, e);
            } else {
                e = step(self, result);
                let lm = LocalMinima {
                    y: self.edges[e].bot.y,
                    left_bound: None,
                    right_bound: Some(e),
                };
                self.edges[e].wind_delta = 0;
                result = self.process_bound(e, forward);
                self.insert_local_minima(lm);
            }
            return result;
        }

        if self.is_horizontal(e) {
            // Consecutive horizontals may head left before going right.
            let e_start = step_back(self, e);
            let e_bot_x = self.edges[e].bot.x;
            if self.is_horizontal(e_start) {
                if self.edges[e_start].bot.x != e_bot_x && self.edges[e_start].top.x != e_bot_x {
                    self.edges[e].reverse_horizontal();
                }
            } else if self.edges[e_start].bot.x != e_bot_x {
                self.edges[e].reverse_horizontal();
            }
        }

        let e_start = e;
        while self.edges[result].top.y == self.edges[step(self, result)].bot.y
            && self.edges[step(self, result)].out_idx != OutIdx::Skip
        {
            result = step(self, result);
        }
        if self.is_horizontal(result) && self.edges[step(self, result)].out_idx != OutIdx::Skip {
            // Horizontals at the top of a bound join it only when the
            // preceding edge attaches to the horizontal's near end.
            let mut horz = result;
            while self.is_horizontal(step_back(self, horz)) {
                horz = step_back(self, horz);
            }
            let beyond_x = self.edges[step_back(self, horz)].top.x;
            let next_top_x = self.edges[step(self, result)].top.x;
            let take = if forward {
                beyond_x > next_top_x
            } else {
                beyond_x >= next_top_x
            };
            if take {
                result = step_back(self, horz);
            }
        }

        loop {
            if e != result {
                self.edges[e].next_in_lml = Some(step(self, e));
            }
            let behind_top_x = self.edges[step_back(self, e)].top.x;
            if self.is_horizontal(e) && e != e_start && self.edges[e].bot.x != behind_top_x {
                self.edges[e].reverse_horizontal();
            }
            if e == result {
                break;
            }
            e = step(self, e);
        }
        step(self, result)
    }

    fn insert_local_minima(&mut self, lm: LocalMinima) {
        let pos = self.minima.partition_point(|m| m.y > lm.y);
        self.minima.insert(pos, lm);
    }

    /// Bounding rectangle of every loaded edge.
    pub fn bounds(&self) -> IntRect {
        let mut points = self.edges.values().flat_map(|e| [e.bot, e.top]);
        let Some(first) = points.next() else {
            return IntRect::default();
        };
        points.fold(
            IntRect::new(first.x, first.y, first.x, first.y),
            |mut rect, pt| {
                rect.left = rect.left.min(pt.x);
                rect.right = rect.right.max(pt.x);
                rect.top = rect.top.min(pt.y);
                rect.bottom = rect.bottom.max(pt.y);
                rect
            },
        )
    }

    /// Restores every bound's first edge to its starting state.
    pub fn reset(&mut self) {
        for lm in &self.minima {
            for bound in [lm.left_bound, lm.right_bound].into_iter().flatten() {
                let edge = &mut self.edges[bound];
                edge.curr = edge.bot;
                edge.out_idx = OutIdx::Unassigned;
            }
        }
    }
}
