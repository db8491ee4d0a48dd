use crate::{
    error::InternalError,
    sorted::{Order, Seekable, SortedIterator},
};

///
/// FinaliseSorted
///
/// Runs `callback` exactly once, after closing the source, when the wrapper
/// is closed or dropped (whichever happens first).
///

pub struct FinaliseSorted<S: SortedIterator, C: FnOnce()> {
    source: S,
    callback: Option<C>,
}

impl<S, C> FinaliseSorted<S, C>
where
    S: SortedIterator,
    C: FnOnce(),
{
    #[must_use]
    pub const fn new(source: S, callback: C) -> Self {
        Self {
            source,
            callback: Some(callback),
        }
    }

    #[must_use]
    pub const fn is_finalised(&self) -> bool {
        self.callback.is_none()
    }
}

impl<S, C> SortedIterator for FinaliseSorted<S, C>
where
    S: SortedIterator,
    C: FnOnce(),
{
    type Item = S::Item;

    fn order(&self) -> Order {
        self.source.order()
    }

    fn has_next(&mut self) -> Result<bool, InternalError> {
        self.source.has_next()
    }

    fn peek(&mut self) -> Result<&S::Item, InternalError> {
        self.source.peek()
    }

    fn next(&mut self) -> Result<S::Item, InternalError> {
        self.source.next()
    }

    fn close(&mut self) {
        self.source.close();
        if let Some(callback) = self.callback.take() {
            callback();
        }
    }
}

impl<S, C> Seekable for FinaliseSorted<S, C>
where
    S: Seekable,
    C: FnOnce(),
{
    fn forward(&mut self, target: &S::Item) -> Result<(), InternalError> {
        self.source.forward(target)
    }
}

impl<S, C> Drop for FinaliseSorted<S, C>
where
    S: SortedIterator,
    C: FnOnce(),
{
    fn drop(&mut self) {
        self.close();
    }
}
