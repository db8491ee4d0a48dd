use crate::{
    error::InternalError,
    sorted::{
        DistinctSorted, FilteredSorted, FinaliseSorted, MappedSorted, MergeSorted, Order,
        Seekable, SeekableBox, SortedIterator,
    },
};
use std::collections::BTreeSet;

///
/// SortedIteratorExt
///
/// Lazy composition over any sorted iterator. Every combinator wraps
/// `self` without pulling from it.
///

pub trait SortedIteratorExt: SortedIterator + Sized {
    fn distinct(self) -> DistinctSorted<Self>
    where
        Self::Item: Ord + Clone,
    {
        DistinctSorted::new(self)
    }

    fn filter<P>(self, predicate: P) -> FilteredSorted<Self, P>
    where
        Self::Item: Ord + Clone,
        P: FnMut(&Self::Item) -> bool,
    {
        FilteredSorted::new(self, predicate)
    }

    /// Map into `order` with a forward function and its reverse, keeping the
    /// result seekable.
    fn map_sorted<F, U, R>(self, order: Order, map: F, reverse: R) -> MappedSorted<Self, F, U, R>
    where
        F: FnMut(Self::Item) -> U,
        U: Ord + Clone,
        R: FnMut(&U) -> Self::Item,
    {
        MappedSorted::new(self, order, map, reverse)
    }

    /// Map into `order` without a reverse function; the result is not seekable.
    fn map_sorted_plain<F, U>(self, order: Order, map: F) -> MappedSorted<Self, F, U>
    where
        F: FnMut(Self::Item) -> U,
        U: Ord + Clone,
    {
        MappedSorted::new(self, order, map, ())
    }

    fn merge(self, other: Self) -> MergeSorted<Self>
    where
        Self::Item: Ord + Clone,
    {
        let order = self.order();
        MergeSorted::new(order, vec![self, other])
    }

    fn on_finalise<C>(self, callback: C) -> FinaliseSorted<Self, C>
    where
        C: FnOnce(),
    {
        FinaliseSorted::new(self, callback)
    }

    fn boxed<'a>(self) -> SeekableBox<'a, Self::Item>
    where
        Self: Seekable + Send + 'a,
    {
        Box::new(self)
    }

    /// Drain into a vector, closing the iterator once it is exhausted.
    fn to_list(mut self) -> Result<Vec<Self::Item>, InternalError> {
        let mut out = Vec::new();
        while let Some(value) = self.try_next()? {
            out.push(value);
        }
        self.close();

        Ok(out)
    }

    /// Drain into an ordered set, closing the iterator once it is exhausted.
    fn to_set(self) -> Result<BTreeSet<Self::Item>, InternalError>
    where
        Self::Item: Ord,
    {
        Ok(self.to_list()?.into_iter().collect())
    }

    /// Bridge into a std iterator of results. The bridge fuses after the
    /// first error.
    fn into_results(self) -> IntoResults<Self> {
        IntoResults {
            source: self,
            failed: false,
        }
    }
}

impl<S: SortedIterator> SortedIteratorExt for S {}

///
/// IntoResults
///

pub struct IntoResults<S> {
    source: S,
    failed: bool,
}

impl<S: SortedIterator> Iterator for IntoResults<S> {
    type Item = Result<S::Item, InternalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.source.try_next() {
            Ok(value) => value.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
