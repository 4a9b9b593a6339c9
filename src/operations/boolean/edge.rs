use crate::math::{round, IntPoint};

use super::select::PolyType;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the edge arena.
    pub(crate) struct EdgeId;
}

/// Sentinel `dx` for horizontal edges.
pub(crate) const HORIZONTAL: f64 = -3.4e38;

/// Link from an edge to the output ring it is currently building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutIdx {
    /// Not contributing to any output ring.
    Unassigned,
    /// Marks the edge that closes an open path; it never enters the sweep.
    Skip,
    /// Index into the sweep's output records.
    Rec(usize),
}

impl OutIdx {
    pub fn rec(self) -> Option<usize> {
        match self {
            Self::Rec(idx) => Some(idx),
            Self::Unassigned | Self::Skip => None,
        }
    }

    pub fn is_assigned(self) -> bool {
        matches!(self, Self::Rec(_))
    }
}

/// Which side of its output ring an edge is building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeSide {
    Left,
    Right,
}

/// Horizontal traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    RightToLeft,
    LeftToRight,
}

/// One edge of an input path.
///
/// `bot` is the end with the larger Y; the sweep moves from large Y to small
/// Y, so `bot.y >= top.y` always holds.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TEdge {
    pub bot: IntPoint,
    /// Current position on the sweep line.
    pub curr: IntPoint,
    pub top: IntPoint,
    /// `top - bot`.
    pub delta: IntPoint,
    /// Inverse slope `dx/dy`, or [`HORIZONTAL`].
    pub dx: f64,
    pub poly_type: PolyType,
    pub side: EdgeSide,
    /// +1 or -1 by direction for closed paths, 0 for open paths.
    pub wind_delta: i32,
    /// Winding count for the edge's own operand.
    pub wind_cnt: i32,
    /// Winding count for the opposite operand.
    pub wind_cnt2: i32,
    pub out_idx: OutIdx,
    /// Ring neighbours within the input path.
    pub next: EdgeId,
    pub prev: EdgeId,
    /// Successor within the same bound.
    pub next_in_lml: Option<EdgeId>,
    pub next_in_ael: Option<EdgeId>,
    pub prev_in_ael: Option<EdgeId>,
    pub next_in_sel: Option<EdgeId>,
    pub prev_in_sel: Option<EdgeId>,
}

impl TEdge {
    /// Creates an edge starting at `pt`. Links are filled in by the caller.
    pub fn new(pt: IntPoint, poly_type: PolyType) -> Self {
        Self {
            bot: IntPoint::default(),
            curr: pt,
            top: IntPoint::default(),
            delta: IntPoint::default(),
            dx: 0.0,
            poly_type,
            side: EdgeSide::Left,
            wind_delta: 0,
            wind_cnt: 0,
            wind_cnt2: 0,
            out_idx: OutIdx::Unassigned,
            next: EdgeId::default(),
            prev: EdgeId::default(),
            next_in_lml: None,
            next_in_ael: None,
            prev_in_ael: None,
            next_in_sel: None,
            prev_in_sel: None,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.delta.y == 0
    }

    /// Recomputes `delta` and `dx` from `bot` and `top`.
    #[allow(clippy::cast_precision_loss)]
    pub fn set_dx(&mut self) {
        self.delta = IntPoint::new(self.top.x - self.bot.x, self.top.y - self.bot.y);
        self.dx = if self.delta.y == 0 {
            HORIZONTAL
        } else {
            self.delta.x as f64 / self.delta.y as f64
        };
    }

    /// X coordinate of the edge at height `current_y`.
    #[allow(clippy::cast_precision_loss)]
    pub fn top_x(&self, current_y: i64) -> i64 {
        if current_y == self.top.y {
            return self.top.x;
        }
        self.bot.x + round(self.dx * (current_y - self.bot.y) as f64)
    }

    /// Swaps `bot.x` and `top.x` so a horizontal runs the other way.
    pub fn reverse_horizontal(&mut self) {
        std::mem::swap(&mut self.top.x, &mut self.bot.x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(bot: (i64, i64), top: (i64, i64)) -> TEdge {
        let mut e = TEdge::new(IntPoint::from(bot), PolyType::Subject);
        e.bot = IntPoint::from(bot);
        e.top = IntPoint::from(top);
        e.set_dx();
        e
    }

    #[test]
    fn dx_of_sloped_edge() {
        let e = edge((0, 10), (5, 0));
        assert_eq!(e.delta, IntPoint::new(5, -10));
        assert!((e.dx + 0.5).abs() < 1e-12);
        assert!(!e.is_horizontal());
    }

    #[test]
    fn horizontal_edge_uses_sentinel() {
        let e = edge((0, 3), (8, 3));
        assert!(e.is_horizontal());
        assert!((e.dx - HORIZONTAL).abs() < 1.0);
    }

    #[test]
    fn top_x_interpolates_and_rounds() {
        let e = edge((0, 10), (5, 0));
        assert_eq!(e.top_x(0), 5);
        assert_eq!(e.top_x(10), 0);
        assert_eq!(e.top_x(5), 3);
    }

    #[test]
    fn out_idx_helpers() {
        assert_eq!(OutIdx::Rec(4).rec(), Some(4));
        assert!(OutIdx::Rec(0).is_assigned());
        assert!(!OutIdx::Skip.is_assigned());
        assert_eq!(OutIdx::Unassigned.rec(), None);
    }
}
