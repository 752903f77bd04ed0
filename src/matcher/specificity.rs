//! Specificity ranking for candidate disambiguation.
//!
//! When several routes structurally match the same path, the most concrete
//! one wins. Concreteness is a property of the matched *shape*, never of
//! the bound values: each consumed template segment contributes a rank,
//! and candidates compare by their rank vectors.

use std::cmp::Ordering;

/// Rank of one matched segment, most specific first.
///
/// Composite segments share [`SegmentRank::Constrained`]: their literal
/// delimiters narrow the value space below a bare parameter, but they are
/// less specific than a pure literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SegmentRank {
    /// Literal segment matched exactly
    Literal = 0,
    /// Constrained parameter or composite segment
    Constrained = 1,
    /// Unconstrained parameter
    Unconstrained = 2,
    /// Optional parameter with no component to bind (absent)
    OptionalAbsent = 3,
    /// Catch-all segment
    CatchAll = 4,
}

impl SegmentRank {
    /// True for the ranks that make a match shape "wildcard-ish".
    #[must_use]
    pub fn is_wildcard(self) -> bool {
        matches!(self, SegmentRank::OptionalAbsent | SegmentRank::CatchAll)
    }
}

/// Specificity score of one structural match.
///
/// Total order: rank vectors compare lexicographically (a shorter vector
/// that is a prefix of a longer one is more specific), then the count of
/// wildcard segments breaks remaining ties. Candidates that still compare
/// equal are ambiguous and must be surfaced as such, never silently
/// picked between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specificity {
    ranks: Vec<SegmentRank>,
    wildcards: usize,
}

impl Specificity {
    #[must_use]
    pub fn new(ranks: Vec<SegmentRank>) -> Self {
        let wildcards = ranks.iter().filter(|r| r.is_wildcard()).count();
        Specificity { ranks, wildcards }
    }

    #[must_use]
    pub fn ranks(&self) -> &[SegmentRank] {
        &self.ranks
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ranks
            .cmp(&other.ranks)
            .then(self.wildcards.cmp(&other.wildcards))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
