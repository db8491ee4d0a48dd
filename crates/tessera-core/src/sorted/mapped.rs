//! Module: sorted::mapped
//! Responsibility: order-preserving value mapping over sorted iterators.
//! Does not own: the monotonicity of the mapping itself.
//! Boundary: translates forward targets back into source space.

use crate::{
    error::{ErrorOrigin, InternalError},
    sorted::{Order, Seekable, SortedIterator, contracts::StreamPosition},
};
use std::mem;

///
/// MappedState
///

enum MappedState<U> {
    Empty,
    Fetched(U),
    Completed,
}

///
/// MappedSorted
///
/// Applies `map` lazily to each source value. The mapping must preserve
/// `order`; debug builds assert it. `R` is the reverse mapping used by
/// `forward`, or `()` for the plain, non-seekable flavour.
///

pub struct MappedSorted<S: SortedIterator, F, U, R = ()> {
    source: S,
    order: Order,
    map: F,
    reverse: R,
    state: MappedState<U>,
    position: StreamPosition<U>,
}

impl<S, F, U, R> MappedSorted<S, F, U, R>
where
    S: SortedIterator,
    F: FnMut(S::Item) -> U,
    U: Ord + Clone,
{
    #[must_use]
    pub const fn new(source: S, order: Order, map: F, reverse: R) -> Self {
        Self {
            source,
            order,
            map,
            reverse,
            state: MappedState::Empty,
            position: StreamPosition::new(order, ErrorOrigin::Sorted),
        }
    }
}

impl<S, F, U, R> SortedIterator for MappedSorted<S, F, U, R>
where
    S: SortedIterator,
    F: FnMut(S::Item) -> U,
    U: Ord + Clone,
{
    type Item = U;

    fn order(&self) -> Order {
        self.order
    }

    fn has_next(&mut self) -> Result<bool, InternalError> {
        match self.state {
            MappedState::Fetched(_) => return Ok(true),
            MappedState::Completed => return Ok(false),
            MappedState::Empty => {}
        }

        if !self.source.has_next()? {
            self.state = MappedState::Completed;
            return Ok(false);
        }

        let mapped = (self.map)(self.source.next()?);
        debug_assert!(
            self.position
                .bound()
                .is_none_or(|bound| self.order.is_valid_next(bound, &mapped)),
            "sorted mapping must preserve {} order",
            self.order
        );
        self.state = MappedState::Fetched(mapped);

        Ok(true)
    }

    fn peek(&mut self) -> Result<&U, InternalError> {
        if !self.has_next()? {
            return Err(InternalError::no_such_element(ErrorOrigin::Sorted));
        }

        match &self.state {
            MappedState::Fetched(value) => Ok(value),
            _ => Err(InternalError::sorted_illegal_state(
                "mapped sorted stream reported a value it did not fetch",
            )),
        }
    }

    fn next(&mut self) -> Result<U, InternalError> {
        if !self.has_next()? {
            return Err(InternalError::no_such_element(ErrorOrigin::Sorted));
        }

        match mem::replace(&mut self.state, MappedState::Empty) {
            MappedState::Fetched(value) => {
                self.position.advance(&value);
                Ok(value)
            }
            other => {
                self.state = other;
                Err(InternalError::sorted_illegal_state(
                    "mapped sorted stream reported a value it did not fetch",
                ))
            }
        }
    }

    fn close(&mut self) {
        self.state = MappedState::Completed;
        self.source.close();
    }
}

impl<S, F, U, R> Seekable for MappedSorted<S, F, U, R>
where
    S: Seekable,
    F: FnMut(S::Item) -> U,
    U: Ord + Clone,
    R: FnMut(&U) -> S::Item,
{
    fn forward(&mut self, target: &U) -> Result<(), InternalError> {
        self.position.check_forward(target)?;
        self.position.advance(target);

        match &self.state {
            MappedState::Fetched(value) if !self.order.is_before(value, target) => Ok(()),
            MappedState::Completed => Ok(()),
            _ => {
                self.state = MappedState::Empty;
                let source_target = (self.reverse)(target);
                self.source.forward(&source_target)
            }
        }
    }
}
