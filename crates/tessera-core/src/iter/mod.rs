//! Module: iter
//! Responsibility: base (unsorted) iterator algebra over `std::iter::Iterator`.
//! Does not own: ordering guarantees (see `sorted`).
//! Boundary: constructors, composition and terminal consumers shared by the
//! production engine and callers.

mod combinatorics;
mod distinct;
mod generate;
mod link;


pub use combinatorics::{Cartesian, Permutations, cartesian, permutation};
pub use distinct::{Distinct, DistinctShared, SharedSeen};
pub use generate::{Looping, Tree, looping, tree};
pub use link::{Linked, link};

use std::{cmp::Ordering, collections::HashSet, hash::Hash, iter};

///
/// IteratorExt
///

pub trait IteratorExt: Iterator + Sized {
    fn distinct(self) -> Distinct<Self>
    where
        Self::Item: Hash + Eq + Clone,
    {
        Distinct::new(self)
    }

    /// De-duplicate against a set shared with other iterators, possibly on
    /// other threads.
    fn distinct_shared(self, seen: SharedSeen<Self::Item>) -> DistinctShared<Self>
    where
        Self::Item: Hash + Eq + Clone,
    {
        DistinctShared::new(self, seen)
    }

    fn link<'a, I>(self, other: I) -> Linked<'a, Self::Item>
    where
        Self: 'a,
        I: IntoIterator<Item = Self::Item>,
        I::IntoIter: 'a,
    {
        Linked::new([Box::new(self) as Box<dyn Iterator<Item = Self::Item> + 'a>]).then(other)
    }

    fn to_list(self) -> Vec<Self::Item> {
        self.collect()
    }

    fn to_set(self) -> HashSet<Self::Item>
    where
        Self::Item: Hash + Eq,
    {
        self.collect()
    }

    /// Compare the remaining length with `n`, pulling at most `n + 1` items.
    fn compare_size(self, n: usize) -> Ordering {
        let seen = self.take(n.saturating_add(1)).count();
        seen.cmp(&n)
    }
}

impl<I: Iterator> IteratorExt for I {}

/// Iterate any collection.
pub fn iterate<C: IntoIterator>(collection: C) -> C::IntoIter {
    collection.into_iter()
}

#[must_use]
pub fn single<T>(item: T) -> iter::Once<T> {
    iter::once(item)
}

#[must_use]
pub const fn empty<T>() -> iter::Empty<T> {
    iter::empty()
}
