use crate::obs::sink::{MetricsEvent, record};
use dashmap::DashSet;
use std::{collections::HashSet, hash::Hash, sync::Arc};

///
/// Distinct
///
/// Unsorted de-duplication: remembers every emitted value in a local set.
///

pub struct Distinct<I: Iterator> {
    inner: I,
    seen: HashSet<I::Item>,
}

impl<I> Distinct<I>
where
    I: Iterator,
    I::Item: Hash + Eq + Clone,
{
    pub(crate) fn new(inner: I) -> Self {
        Self {
            inner,
            seen: HashSet::new(),
        }
    }
}

impl<I> Iterator for Distinct<I>
where
    I: Iterator,
    I::Item: Hash + Eq + Clone,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        let seen = &mut self.seen;
        self.inner.find(|item| seen.insert(item.clone()))
    }
}

///
/// SharedSeen
///
/// Concurrent set of already-emitted values, shared by every iterator that
/// de-duplicates against it. Cloning shares the set. Sharded, so workers
/// inserting different values rarely contend.
///

pub struct SharedSeen<T> {
    seen: Arc<DashSet<T>>,
}

impl<T> Clone for SharedSeen<T> {
    fn clone(&self) -> Self {
        Self {
            seen: Arc::clone(&self.seen),
        }
    }
}

impl<T: Hash + Eq> Default for SharedSeen<T> {
    fn default() -> Self {
        Self {
            seen: Arc::new(DashSet::new()),
        }
    }
}

impl<T> SharedSeen<T>
where
    T: Hash + Eq + Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value`; returns `false` when it was already recorded.
    pub fn insert(&self, value: &T) -> bool {
        if self.seen.contains(value) {
            return false;
        }

        // Another worker may insert between the two calls; `insert` decides.
        self.seen.insert(value.clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

///
/// DistinctShared
///

pub struct DistinctShared<I: Iterator> {
    inner: I,
    seen: SharedSeen<I::Item>,
}

impl<I> DistinctShared<I>
where
    I: Iterator,
    I::Item: Hash + Eq + Clone,
{
    pub(crate) const fn new(inner: I, seen: SharedSeen<I::Item>) -> Self {
        Self { inner, seen }
    }
}

impl<I> Iterator for DistinctShared<I>
where
    I: Iterator,
    I::Item: Hash + Eq + Clone,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        for item in self.inner.by_ref() {
            if self.seen.insert(&item) {
                return Some(item);
            }
            record(MetricsEvent::SharedDuplicateDropped);
        }

        None
    }
}
