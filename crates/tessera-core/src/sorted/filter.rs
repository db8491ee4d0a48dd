//! Module: sorted::filter
//! Responsibility: predicate adapter over sorted iterators.
//! Does not own: predicate semantics.
//! Boundary: prefetches past non-matching values without consuming matches.

use crate::{
    error::{ErrorOrigin, InternalError},
    sorted::{Order, Seekable, SortedIterator, contracts::StreamPosition},
};

///
/// FilteredSorted
///
/// Yields only the source values matching `predicate`. The matching head is
/// left unconsumed in the source, so `has_next`/`peek` never lose an element.
///

pub struct FilteredSorted<S: SortedIterator, P> {
    source: S,
    predicate: P,
    // The source head is known to match.
    matched: bool,
    // Non-matching values were consumed past the last emitted one.
    skipped: bool,
    position: StreamPosition<S::Item>,
}

impl<S, P> FilteredSorted<S, P>
where
    S: SortedIterator,
    S::Item: Ord + Clone,
    P: FnMut(&S::Item) -> bool,
{
    #[must_use]
    pub fn new(source: S, predicate: P) -> Self {
        let position = StreamPosition::new(source.order(), ErrorOrigin::Sorted);

        Self {
            source,
            predicate,
            matched: false,
            skipped: false,
            position,
        }
    }
}

impl<S, P> SortedIterator for FilteredSorted<S, P>
where
    S: SortedIterator,
    S::Item: Ord + Clone,
    P: FnMut(&S::Item) -> bool,
{
    type Item = S::Item;

    fn order(&self) -> Order {
        self.source.order()
    }

    fn has_next(&mut self) -> Result<bool, InternalError> {
        if self.matched {
            return Ok(true);
        }

        while self.source.has_next()? {
            if (self.predicate)(self.source.peek()?) {
                self.matched = true;
                return Ok(true);
            }
            self.source.next()?;
            self.skipped = true;
        }

        Ok(false)
    }

    fn peek(&mut self) -> Result<&S::Item, InternalError> {
        if !self.has_next()? {
            return Err(InternalError::no_such_element(ErrorOrigin::Sorted));
        }

        self.source.peek()
    }

    fn next(&mut self) -> Result<S::Item, InternalError> {
        if !self.has_next()? {
            return Err(InternalError::no_such_element(ErrorOrigin::Sorted));
        }

        let value = self.source.next()?;
        self.matched = false;
        self.position.advance(&value);

        Ok(value)
    }

    fn close(&mut self) {
        self.source.close();
    }
}

impl<S, P> Seekable for FilteredSorted<S, P>
where
    S: Seekable,
    S::Item: Ord + Clone,
    P: FnMut(&S::Item) -> bool,
{
    fn forward(&mut self, target: &S::Item) -> Result<(), InternalError> {
        self.position.check_forward(target)?;
        self.position.advance(target);

        // Skipped values may have moved the source past `target`; forwarding
        // it again would then regress its own position.
        if self.skipped {
            if !self.source.has_next()? {
                return Ok(());
            }
            let order = self.source.order();
            if !order.is_before(self.source.peek()?, target) {
                return Ok(());
            }
        }

        self.matched = false;
        self.skipped = false;
        self.source.forward(target)
    }
}
