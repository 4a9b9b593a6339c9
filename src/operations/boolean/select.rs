/// The boolean operation applied between subject and clip polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipType {
    Intersection,
    Union,
    Difference,
    Xor,
}

/// Which operand a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyType {
    Subject,
    Clip,
}

/// Rule deciding which winding numbers count as "inside".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolyFillType {
    #[default]
    EvenOdd,
    NonZero,
    Positive,
    Negative,
}

impl PolyFillType {
    /// Winding count as seen by this fill rule: negated for `Negative`,
    /// absolute for `EvenOdd` and `NonZero`.
    #[must_use]
    pub fn effective(self, wind_cnt: i32) -> i32 {
        match self {
            Self::Positive => wind_cnt,
            Self::Negative => -wind_cnt,
            Self::EvenOdd | Self::NonZero => wind_cnt.abs(),
        }
    }
}

/// Fill rules in effect for one execute call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FillRules {
    pub subject: PolyFillType,
    pub clip: PolyFillType,
}

impl FillRules {
    /// Fill rule of the edge's own operand.
    pub fn own(&self, poly_type: PolyType) -> PolyFillType {
        match poly_type {
            PolyType::Subject => self.subject,
            PolyType::Clip => self.clip,
        }
    }

    /// Fill rule of the opposite operand.
    pub fn other(&self, poly_type: PolyType) -> PolyFillType {
        match poly_type {
            PolyType::Subject => self.clip,
            PolyType::Clip => self.subject,
        }
    }
}

/// Winding state of an edge at the moment it is tested for contribution.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WindState {
    pub poly_type: PolyType,
    pub wind_delta: i32,
    pub wind_cnt: i32,
    pub wind_cnt2: i32,
}

/// Decides whether an edge bounds the output region.
///
/// First the edge must lie on the boundary of its own operand under that
/// operand's fill rule. Then the opposite operand's winding count
/// (`wind_cnt2`) decides per clip type:
///
/// | Clip type    | Subject edge kept when | Clip edge kept when |
/// |--------------|------------------------|---------------------|
/// | Intersection | inside clip            | inside subject      |
/// | Union        | outside clip           | outside subject     |
/// | Difference   | outside clip           | inside subject      |
/// | Xor          | always (closed)        | always (closed)     |
///
/// Open subject paths (`wind_delta == 0`) under Xor behave like Union.
#[allow(clippy::match_same_arms)]
pub(crate) fn is_contributing(edge: WindState, clip_type: ClipType, fills: FillRules) -> bool {
    let pft = fills.own(edge.poly_type);
    let pft2 = fills.other(edge.poly_type);

    let on_own_boundary = match pft {
        // An open path inside a subject polygon is flagged by wind_cnt != 1.
        PolyFillType::EvenOdd => edge.wind_delta != 0 || edge.wind_cnt == 1,
        PolyFillType::NonZero => edge.wind_cnt.abs() == 1,
        PolyFillType::Positive => edge.wind_cnt == 1,
        PolyFillType::Negative => edge.wind_cnt == -1,
    };
    if !on_own_boundary {
        return false;
    }

    let inside_other = || match pft2 {
        PolyFillType::EvenOdd | PolyFillType::NonZero => edge.wind_cnt2 != 0,
        PolyFillType::Positive => edge.wind_cnt2 > 0,
        PolyFillType::Negative => edge.wind_cnt2 < 0,
    };

    match (clip_type, edge.poly_type) {
        (ClipType::Intersection, _) => inside_other(),
        (ClipType::Union, _) => !inside_other(),
        (ClipType::Difference, PolyType::Subject) => !inside_other(),
        (ClipType::Difference, PolyType::Clip) => inside_other(),
        (ClipType::Xor, _) => edge.wind_delta != 0 || !inside_other(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVEN_ODD: FillRules = FillRules {
        subject: PolyFillType::EvenOdd,
        clip: PolyFillType::EvenOdd,
    };

    fn edge(poly_type: PolyType, wind_cnt: i32, wind_cnt2: i32) -> WindState {
        WindState {
            poly_type,
            wind_delta: 1,
            wind_cnt,
            wind_cnt2,
        }
    }

    #[test]
    fn union_keeps_edges_outside_other_operand() {
        assert!(is_contributing(
            edge(PolyType::Subject, 1, 0),
            ClipType::Union,
            EVEN_ODD
        ));
        assert!(!is_contributing(
            edge(PolyType::Subject, 1, 1),
            ClipType::Union,
            EVEN_ODD
        ));
    }

    #[test]
    fn intersection_keeps_edges_inside_other_operand() {
        assert!(is_contributing(
            edge(PolyType::Clip, 1, 1),
            ClipType::Intersection,
            EVEN_ODD
        ));
        assert!(!is_contributing(
            edge(PolyType::Clip, 1, 0),
            ClipType::Intersection,
            EVEN_ODD
        ));
    }

    #[test]
    fn difference_is_asymmetric() {
        assert!(is_contributing(
            edge(PolyType::Subject, 1, 0),
            ClipType::Difference,
            EVEN_ODD
        ));
        assert!(!is_contributing(
            edge(PolyType::Subject, 1, 1),
            ClipType::Difference,
            EVEN_ODD
        ));
        assert!(is_contributing(
            edge(PolyType::Clip, 1, 1),
            ClipType::Difference,
            EVEN_ODD
        ));
        assert!(!is_contributing(
            edge(PolyType::Clip, 1, 0),
            ClipType::Difference,
            EVEN_ODD
        ));
    }

    #[test]
    fn xor_keeps_every_closed_boundary_edge() {
        for wc2 in [-2, 0, 1, 3] {
            assert!(is_contributing(
                edge(PolyType::Subject, 1, wc2),
                ClipType::Xor,
                EVEN_ODD
            ));
        }
    }

    #[test]
    fn nonzero_rejects_interior_edges() {
        let fills = FillRules {
            subject: PolyFillType::NonZero,
            clip: PolyFillType::NonZero,
        };
        assert!(is_contributing(
            edge(PolyType::Subject, -1, 0),
            ClipType::Union,
            fills
        ));
        assert!(!is_contributing(
            edge(PolyType::Subject, 2, 0),
            ClipType::Union,
            fills
        ));
    }

    #[test]
    fn positive_and_negative_are_sign_sensitive() {
        let positive = FillRules {
            subject: PolyFillType::Positive,
            clip: PolyFillType::Positive,
        };
        assert!(is_contributing(
            edge(PolyType::Subject, 1, -1),
            ClipType::Union,
            positive
        ));
        assert!(!is_contributing(
            edge(PolyType::Subject, -1, 0),
            ClipType::Union,
            positive
        ));
        assert!(!is_contributing(
            edge(PolyType::Subject, 1, 1),
            ClipType::Union,
            positive
        ));

        let negative = FillRules {
            subject: PolyFillType::Negative,
            clip: PolyFillType::Negative,
        };
        assert!(is_contributing(
            edge(PolyType::Subject, -1, 0),
            ClipType::Union,
            negative
        ));
        assert!(!is_contributing(
            edge(PolyType::Subject, -1, -1),
            ClipType::Union,
            negative
        ));
    }

    #[test]
    fn open_subject_lines() {
        let open = WindState {
            poly_type: PolyType::Subject,
            wind_delta: 0,
            wind_cnt: 1,
            wind_cnt2: 1,
        };
        assert!(is_contributing(open, ClipType::Intersection, EVEN_ODD));
        assert!(!is_contributing(open, ClipType::Xor, EVEN_ODD));
        let inside_subject = WindState { wind_cnt: 0, ..open };
        assert!(!is_contributing(
            inside_subject,
            ClipType::Intersection,
            EVEN_ODD
        ));
    }

    #[test]
    fn effective_winding() {
        assert_eq!(PolyFillType::Positive.effective(-2), -2);
        assert_eq!(PolyFillType::Negative.effective(-2), 2);
        assert_eq!(PolyFillType::NonZero.effective(-2), 2);
        assert_eq!(PolyFillType::EvenOdd.effective(3), 3);
    }
}
