//! Module: sorted::merge
//! Responsibility: lazy k-way merge of same-order sorted iterators.
//! Does not own: duplicate suppression (see `sorted::distinct`).
//! Boundary: selects the extremal head and pushes forwards to every source.

use crate::{
    error::{ErrorOrigin, InternalError},
    sorted::{Order, Seekable, SortedIterator, contracts::StreamPosition},
};

///
/// MergeSorted
///
/// Merges N sources sharing the merge order. Equal heads are not collapsed;
/// among equal heads the lowest-index source is produced first.
///

pub struct MergeSorted<S: SortedIterator> {
    sources: Vec<S>,
    order: Order,
    // Index of the source whose head is the next value, once computed.
    selected: Option<usize>,
    validated: bool,
    position: StreamPosition<S::Item>,
}

impl<S> MergeSorted<S>
where
    S: SortedIterator,
    S::Item: Ord + Clone,
{
    #[must_use]
    pub const fn new(order: Order, sources: Vec<S>) -> Self {
        Self {
            sources,
            order,
            selected: None,
            validated: false,
            position: StreamPosition::new(order, ErrorOrigin::Sorted),
        }
    }

    /// Add one more source. Fails once the merge has produced or been
    /// forwarded, since the new source was not checked against that bound.
    pub fn push(&mut self, source: S) -> Result<(), InternalError> {
        if self.position.bound().is_some() {
            return Err(InternalError::sorted_illegal_state(
                "cannot add a source to a merge that has already advanced",
            ));
        }

        self.sources.push(source);
        self.validated = false;
        self.selected = None;

        Ok(())
    }

    #[must_use]
    pub const fn source_count(&self) -> usize {
        self.sources.len()
    }

    // Every source must share the merge order; a mixed-order merge has no
    // defined output order.
    fn validate(&mut self) -> Result<(), InternalError> {
        if self.validated {
            return Ok(());
        }

        if let Some(source) = self.sources.iter().find(|s| s.order() != self.order) {
            return Err(InternalError::sorted_illegal_state(format!(
                "cannot merge a {} source into a {} merge",
                source.order(),
                self.order
            )));
        }
        self.validated = true;

        Ok(())
    }

    // Locate the source holding the next value under the merge order.
    fn select(&mut self) -> Result<Option<usize>, InternalError> {
        if let Some(index) = self.selected {
            return Ok(Some(index));
        }
        self.validate()?;

        let order = self.order;
        let mut best: Option<(usize, &S::Item)> = None;
        for (index, source) in self.sources.iter_mut().enumerate() {
            if !source.has_next()? {
                continue;
            }
            let head = source.peek()?;
            match best {
                Some((_, current)) if !order.is_before(head, current) => {}
                _ => best = Some((index, head)),
            }
        }

        let Some((index, head)) = best else {
            return Ok(None);
        };
        self.position.check_produced(head)?;
        self.selected = Some(index);

        Ok(Some(index))
    }
}

impl<S> SortedIterator for MergeSorted<S>
where
    S: SortedIterator,
    S::Item: Ord + Clone,
{
    type Item = S::Item;

    fn order(&self) -> Order {
        self.order
    }

    fn has_next(&mut self) -> Result<bool, InternalError> {
        Ok(self.select()?.is_some())
    }

    fn peek(&mut self) -> Result<&S::Item, InternalError> {
        match self.select()? {
            Some(index) => self.sources[index].peek(),
            None => Err(InternalError::no_such_element(ErrorOrigin::Sorted)),
        }
    }

    fn next(&mut self) -> Result<S::Item, InternalError> {
        let Some(index) = self.select()? else {
            return Err(InternalError::no_such_element(ErrorOrigin::Sorted));
        };

        let value = self.sources[index].next()?;
        self.selected = None;
        self.position.advance(&value);

        Ok(value)
    }

    fn close(&mut self) {
        self.selected = None;
        for source in &mut self.sources {
            source.close();
        }
    }
}

impl<S> Seekable for MergeSorted<S>
where
    S: Seekable,
    S::Item: Ord + Clone,
{
    fn forward(&mut self, target: &S::Item) -> Result<(), InternalError> {
        self.position.check_forward(target)?;

        // Sources already past `target` treat the forward as a no-op.
        for source in &mut self.sources {
            source.forward(target)?;
        }
        self.selected = None;
        self.position.advance(target);

        Ok(())
    }
}

/// Merge `sources`, all sharing `order`, into one sorted iterator.
#[must_use]
pub fn merge<S>(order: Order, sources: impl IntoIterator<Item = S>) -> MergeSorted<S>
where
    S: SortedIterator,
    S::Item: Ord + Clone,
{
    MergeSorted::new(order, sources.into_iter().collect())
}
