//! Module: sorted::based
//! Responsibility: leaf sorted iterators over materialized collections.
//! Does not own: storage cursors or combinator composition.
//! Boundary: entry points for `empty_sorted` and `iterate_sorted`.

use crate::{
    error::{ErrorOrigin, InternalError},
    sorted::{Order, Seekable, SortedIterator, contracts::StreamPosition},
};
use std::collections::{BTreeSet, VecDeque};

///
/// SetSorted
///
/// Seekable iterator over an ordered set. Elements are held in production
/// order so `forward` is a binary search followed by a front drain.
///

#[derive(Debug)]
pub struct SetSorted<T> {
    order: Order,
    items: VecDeque<T>,
    position: StreamPosition<T>,
}

impl<T> SetSorted<T>
where
    T: Ord + Clone,
{
    #[must_use]
    pub fn new(order: Order, set: BTreeSet<T>) -> Self {
        let items = match order {
            Order::Asc => set.into_iter().collect(),
            Order::Desc => set.into_iter().rev().collect(),
        };

        Self {
            order,
            items,
            position: StreamPosition::new(order, ErrorOrigin::Sorted),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.items.len()
    }
}

impl<T> SortedIterator for SetSorted<T>
where
    T: Ord + Clone,
{
    type Item = T;

    fn order(&self) -> Order {
        self.order
    }

    fn has_next(&mut self) -> Result<bool, InternalError> {
        Ok(!self.items.is_empty())
    }

    fn peek(&mut self) -> Result<&T, InternalError> {
        self.items
            .front()
            .ok_or_else(|| InternalError::no_such_element(ErrorOrigin::Sorted))
    }

    fn next(&mut self) -> Result<T, InternalError> {
        let item = self
            .items
            .pop_front()
            .ok_or_else(|| InternalError::no_such_element(ErrorOrigin::Sorted))?;
        self.position.advance(&item);

        Ok(item)
    }

    fn close(&mut self) {
        self.items.clear();
    }
}

impl<T> Seekable for SetSorted<T>
where
    T: Ord + Clone,
{
    fn forward(&mut self, target: &T) -> Result<(), InternalError> {
        self.position.check_forward(target)?;

        let order = self.order;
        let skip = self
            .items
            .partition_point(|item| order.is_before(item, target));
        self.items.drain(..skip);
        self.position.advance(target);

        Ok(())
    }
}

///
/// EmptySorted
///

#[derive(Debug)]
pub struct EmptySorted<T> {
    order: Order,
    position: StreamPosition<T>,
}

impl<T> EmptySorted<T>
where
    T: Ord + Clone,
{
    #[must_use]
    pub const fn new(order: Order) -> Self {
        Self {
            order,
            position: StreamPosition::new(order, ErrorOrigin::Sorted),
        }
    }
}

impl<T> SortedIterator for EmptySorted<T>
where
    T: Ord + Clone,
{
    type Item = T;

    fn order(&self) -> Order {
        self.order
    }

    fn has_next(&mut self) -> Result<bool, InternalError> {
        Ok(false)
    }

    fn peek(&mut self) -> Result<&T, InternalError> {
        Err(InternalError::no_such_element(ErrorOrigin::Sorted))
    }

    fn next(&mut self) -> Result<T, InternalError> {
        Err(InternalError::no_such_element(ErrorOrigin::Sorted))
    }
}

impl<T> Seekable for EmptySorted<T>
where
    T: Ord + Clone,
{
    fn forward(&mut self, target: &T) -> Result<(), InternalError> {
        self.position.check_forward(target)?;
        self.position.advance(target);

        Ok(())
    }
}

/// Sorted iterator with no elements.
#[must_use]
pub const fn empty_sorted<T: Ord + Clone>(order: Order) -> EmptySorted<T> {
    EmptySorted::new(order)
}

/// Sorted iterator over every element of `set`, in `order`.
#[must_use]
pub fn iterate_sorted<T: Ord + Clone>(order: Order, set: BTreeSet<T>) -> SetSorted<T> {
    SetSorted::new(order, set)
}
