//! Sequence sets for message ranges.

use super::SeqNum;

/// Set of message sequence numbers sent with FETCH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceSet {
    /// One message.
    Single(SeqNum),
    /// Inclusive range `first:last`.
    Range(SeqNum, SeqNum),
}

impl SequenceSet {
    /// Creates a set for one message, `None` for 0.
    #[must_use]
    pub fn single(n: u32) -> Option<Self> {
        SeqNum::new(n).map(Self::Single)
    }

    /// Creates the inclusive range `first:last`.
    ///
    /// Returns `None` if either bound is 0. A range with equal bounds
    /// collapses to [`SequenceSet::Single`].
    #[must_use]
    pub fn range(first: u32, last: u32) -> Option<Self> {
        let first = SeqNum::new(first)?;
        let last = SeqNum::new(last)?;
        if first == last {
            Some(Self::Single(first))
        } else {
            Some(Self::Range(first, last))
        }
    }

    /// Number of messages covered by the set.
    #[must_use]
    pub fn len(&self) -> u32 {
        match self {
            Self::Single(_) => 1,
            Self::Range(a, b) => a.get().abs_diff(b.get()) + 1,
        }
    }

    /// A sequence set always names at least one message.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl std::fmt::Display for SequenceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(n) => write!(f, "{n}"),
            Self::Range(first, last) => write!(f, "{first}:{last}"),
        }
    }
}
