//! Horizontal edge processing.
//!
//! Horizontals never enter the scanbeam. They are queued on the sorted edge
//! list and swept across the AEL once the sweep line reaches their Y.

use crate::error::Result;
use crate::math::cross_2d::deltas_parallel;
use crate::math::IntPoint;

use super::edge::{Direction, EdgeId};
use super::out_rec::OutPtId;
use super::sweep::{horz_segments_overlap, EdgeList, Sweep};

/// Direction of a horizontal and its X extent `(left, right)`.
fn horz_direction(bot_x: i64, top_x: i64) -> (Direction, i64, i64) {
    if bot_x < top_x {
        (Direction::LeftToRight, bot_x, top_x)
    } else {
        (Direction::RightToLeft, top_x, bot_x)
    }
}

impl Sweep<'_> {
    pub(super) fn process_horizontals(&mut self) -> Result<()> {
        while let Some(horz) = self.pop_edge_from_sel() {
            self.process_horizontal(horz)?;
        }
        Ok(())
    }

    fn next_in_direction(&self, e: EdgeId, dir: Direction) -> Option<EdgeId> {
        match dir {
            Direction::LeftToRight => self.edges[e].next_in_ael,
            Direction::RightToLeft => self.edges[e].prev_in_ael,
        }
    }

    /// Joins `op1` with every queued horizontal overlapping `horz`.
    fn join_overlapping_horizontals(&mut self, horz: EdgeId, op1: OutPtId) {
        let (bot_x, top_x) = (self.edges[horz].bot.x, self.edges[horz].top.x);
        let mut next_horz = self.sorted_edges;
        while let Some(id) = next_horz {
            let other = self.edges[id];
            if other.out_idx.is_assigned()
                && horz_segments_overlap(bot_x, top_x, other.bot.x, other.top.x)
            {
                if let Some(op2) = self.get_last_out_pt(id) {
                    self.add_join(op2, op1, other.top);
                }
            }
            next_horz = other.next_in_sel;
        }
    }

    /// Sweeps a horizontal (and any horizontals chained after it in its
    /// bound) across the AEL, intersecting every edge it passes.
    #[allow(clippy::too_many_lines)]
    fn process_horizontal(&mut self, mut horz: EdgeId) -> Result<()> {
        let is_open = self.edges[horz].wind_delta == 0;
        let (mut dir, mut horz_left, mut horz_right) =
            horz_direction(self.edges[horz].bot.x, self.edges[horz].top.x);

        let mut last_horz = horz;
        while let Some(next) = self.edges[last_horz]
            .next_in_lml
            .filter(|&next| self.edges[next].is_horizontal())
        {
            last_horz = next;
        }
        let max_pair = if self.edges[last_horz].next_in_lml.is_none() {
            self.get_maxima_pair(last_horz)
        } else {
            None
        };

        // Cursor into the maxima touching this horizontal.
        let mut curr_max: Option<usize> = None;
        if !self.maxima.is_empty() {
            let bot_x = self.edges[horz].bot.x;
            let last_top_x = self.edges[last_horz].top.x;
            match dir {
                Direction::LeftToRight => {
                    let i = self.maxima.partition_point(|&x| x <= bot_x);
                    curr_max = (i < self.maxima.len() && self.maxima[i] < last_top_x).then_some(i);
                }
                Direction::RightToLeft => {
                    let mut i = 0;
                    while i + 1 < self.maxima.len() && self.maxima[i + 1] < bot_x {
                        i += 1;
                    }
                    curr_max = (self.maxima[i] > last_top_x).then_some(i);
                }
            }
        }

        let mut op1: Option<OutPtId> = None;
        loop {
            let is_last_horz = horz == last_horz;
            let mut e = self.next_in_direction(horz, dir);
            while let Some(id) = e {
                // Vertices where maxima touch the horizontal help later
                // simplification.
                if let Some(mut i) = curr_max {
                    let edge_x = self.edges[id].curr.x;
                    let contributing = self.edges[horz].out_idx.is_assigned() && !is_open;
                    let bot_y = self.edges[horz].bot.y;
                    match dir {
                        Direction::LeftToRight => {
                            while i < self.maxima.len() && self.maxima[i] < edge_x {
                                if contributing {
                                    self.add_out_pt(horz, IntPoint::new(self.maxima[i], bot_y));
                                }
                                i += 1;
                            }
                            curr_max = (i < self.maxima.len()).then_some(i);
                        }
                        Direction::RightToLeft => {
                            let mut cursor = Some(i);
                            while let Some(j) = cursor.filter(|&j| self.maxima[j] > edge_x) {
                                if contributing {
                                    self.add_out_pt(horz, IntPoint::new(self.maxima[j], bot_y));
                                }
                                cursor = j.checked_sub(1);
                            }
                            curr_max = cursor;
                        }
                    }
                }

                let edge = self.edges[id];
                if (dir == Direction::LeftToRight && edge.curr.x > horz_right)
                    || (dir == Direction::RightToLeft && edge.curr.x < horz_left)
                {
                    break;
                }

                // Stop at the end of an intermediate horizontal; smaller dx
                // lies to the right above the horizontal.
                let h = self.edges[horz];
                if edge.curr.x == h.top.x {
                    if let Some(next) = h.next_in_lml {
                        if edge.dx < self.edges[next].dx {
                            break;
                        }
                    }
                }

                if h.out_idx.is_assigned() && !is_open {
                    let op = self.add_out_pt(horz, edge.curr);
                    op1 = Some(op);
                    self.join_overlapping_horizontals(horz, op);
                    self.add_ghost_join(op, h.bot);
                }

                if Some(id) == max_pair && is_last_horz {
                    if self.edges[horz].out_idx.is_assigned() {
                        self.add_local_max_poly(horz, id, h.top);
                    }
                    self.delete_from(EdgeList::Active, horz);
                    self.delete_from(EdgeList::Active, id);
                    return Ok(());
                }

                let pt = IntPoint::new(edge.curr.x, h.curr.y);
                match dir {
                    Direction::LeftToRight => self.intersect_edges(horz, id, pt),
                    Direction::RightToLeft => self.intersect_edges(id, horz, pt),
                }
                let next = self.next_in_direction(id, dir);
                self.swap_positions(EdgeList::Active, horz, id);
                e = next;
            }

            let next_is_horizontal = self.edges[horz]
                .next_in_lml
                .is_some_and(|next| self.edges[next].is_horizontal());
            if !next_is_horizontal {
                break;
            }
            horz = self.update_edge_into_ael(horz)?;
            if self.edges[horz].out_idx.is_assigned() {
                self.add_out_pt(horz, self.edges[horz].bot);
            }
            (dir, horz_left, horz_right) =
                horz_direction(self.edges[horz].bot.x, self.edges[horz].top.x);
        }

        if self.edges[horz].out_idx.is_assigned() && op1.is_none() {
            if let Some(op) = self.get_last_out_pt(horz) {
                self.join_overlapping_horizontals(horz, op);
                self.add_ghost_join(op, self.edges[horz].top);
            }
        }

        if self.edges[horz].next_in_lml.is_none() {
            if self.edges[horz].out_idx.is_assigned() {
                self.add_out_pt(horz, self.edges[horz].top);
            }
            self.delete_from(EdgeList::Active, horz);
            return Ok(());
        }

        if !self.edges[horz].out_idx.is_assigned() {
            self.update_edge_into_ael(horz)?;
            return Ok(());
        }

        let op1 = self.add_out_pt(horz, self.edges[horz].top);
        horz = self.update_edge_into_ael(horz)?;
        if self.edges[horz].wind_delta == 0 {
            return Ok(());
        }
        // The promoted edge is no longer horizontal.
        let h = self.edges[horz];
        let joins_with = |other: EdgeId| {
            let o = &self.edges[other];
            o.curr == h.bot
                && o.wind_delta != 0
                && o.out_idx.is_assigned()
                && o.curr.y > o.top.y
                && deltas_parallel(h.delta, o.delta)
        };
        let partner = h
            .prev_in_ael
            .filter(|&prev| joins_with(prev))
            .or_else(|| h.next_in_ael.filter(|&next| joins_with(next)));
        if let Some(partner) = partner {
            let op2 = self.add_out_pt(partner, h.bot);
            self.add_join(op1, op2, h.top);
        }
        Ok(())
    }
}
