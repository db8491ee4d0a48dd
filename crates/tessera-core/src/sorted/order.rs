//! Module: sorted::order
//! Responsibility: direction tag and comparator policy for sorted iterators.
//! Does not own: iterator traversal mechanics or position bookkeeping.
//! Boundary: centralizes ASC/DESC comparison behavior for every combinator.

use derive_more::Display;
use std::cmp::Ordering;

///
/// Order
///
/// Traversal direction of a sorted iterator. Combinators stay
/// comparator-driven through `compare` instead of branching on the
/// direction at each call site.
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
pub enum Order {
    #[default]
    #[display("ASC")]
    Asc,
    #[display("DESC")]
    Desc,
}

impl Order {
    /// Compare two values under this direction: `Less` means `left` is
    /// produced before `right`.
    #[must_use]
    pub fn compare<T: Ord + ?Sized>(self, left: &T, right: &T) -> Ordering {
        match self {
            Self::Asc => left.cmp(right),
            Self::Desc => right.cmp(left),
        }
    }

    /// Whether `next` may legally follow `prev` in a stream of this order.
    /// Equal values are valid successors.
    #[must_use]
    pub fn is_valid_next<T: Ord + ?Sized>(self, prev: &T, next: &T) -> bool {
        !self.compare(prev, next).is_gt()
    }

    /// Whether `left` is produced strictly before `right`.
    #[must_use]
    pub fn is_before<T: Ord + ?Sized>(self, left: &T, right: &T) -> bool {
        self.compare(left, right).is_lt()
    }

    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    #[must_use]
    pub const fn is_ascending(self) -> bool {
        matches!(self, Self::Asc)
    }
}
