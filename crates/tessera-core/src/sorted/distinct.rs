//! Module: sorted::distinct
//! Responsibility: DISTINCT-adapter over sorted iterators.
//! Does not own: upstream value generation.
//! Boundary: enforces monotonicity and suppresses adjacent duplicate values.

use crate::{
    error::{ErrorOrigin, InternalError},
    obs::sink::{MetricsEvent, record},
    sorted::{Order, Seekable, SortedIterator},
};

///
/// DistinctSorted
///
/// Sorted-iterator adapter that suppresses adjacent duplicates. Sortedness
/// keeps duplicates adjacent, so only the last emitted value is retained.
///

pub struct DistinctSorted<S: SortedIterator> {
    source: S,
    last_emitted: Option<S::Item>,
}

impl<S> DistinctSorted<S>
where
    S: SortedIterator,
    S::Item: Ord + Clone,
{
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            last_emitted: None,
        }
    }
}

impl<S> SortedIterator for DistinctSorted<S>
where
    S: SortedIterator,
    S::Item: Ord + Clone,
{
    type Item = S::Item;

    fn order(&self) -> Order {
        self.source.order()
    }

    fn has_next(&mut self) -> Result<bool, InternalError> {
        let order = self.source.order();

        loop {
            if !self.source.has_next()? {
                return Ok(false);
            }

            let Some(last) = self.last_emitted.as_ref() else {
                return Ok(true);
            };
            let head = self.source.peek()?;

            // Ordering comparator enforces the stream contract; exact
            // equality controls suppression.
            if order.is_before(head, last) {
                return Err(InternalError::ordering_violation(
                    ErrorOrigin::Sorted,
                    "distinct sorted stream received non-monotonic value",
                ));
            }
            if head != last {
                return Ok(true);
            }

            self.source.next()?;
            record(MetricsEvent::DuplicateSuppressed);
        }
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
        self.last_emitted = Some(value.clone());

        Ok(value)
    }

    fn close(&mut self) {
        self.source.close();
    }
}

// The source has consumed exactly up to the last emitted value, so its own
// position check is the distinct stream's position check.
impl<S> Seekable for DistinctSorted<S>
where
    S: Seekable,
    S::Item: Ord + Clone,
{
    fn forward(&mut self, target: &S::Item) -> Result<(), InternalError> {
        self.source.forward(target)
    }
}
