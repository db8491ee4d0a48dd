use crate::{
    error::{ErrorOrigin, InternalError},
    sorted::Order,
};

///
/// SortedIterator
///
/// Pull-based contract for a lazily evaluated stream whose elements are
/// produced in `order`. `has_next` may fetch ahead into an internal buffer
/// but never skips an element; `peek` and `next` fail with `NoSuchElement`
/// once the stream is exhausted.
///

pub trait SortedIterator {
    type Item;

    fn order(&self) -> Order;

    fn has_next(&mut self) -> Result<bool, InternalError>;

    fn peek(&mut self) -> Result<&Self::Item, InternalError>;

    fn next(&mut self) -> Result<Self::Item, InternalError>;

    /// Pull the next element, mapping exhaustion to `None`.
    fn try_next(&mut self) -> Result<Option<Self::Item>, InternalError> {
        if self.has_next()? {
            self.next().map(Some)
        } else {
            Ok(None)
        }
    }

    // Release backing resources. Must be idempotent.
    fn close(&mut self) {}
}

///
/// Seekable
///
/// Sorted iterator that can jump to the first element at or past `target`
/// without materializing the skipped elements.
///

pub trait Seekable: SortedIterator {
    fn forward(&mut self, target: &Self::Item) -> Result<(), InternalError>;
}

/// Boxed, sendable seekable iterator used for heterogeneous merges.
pub type SeekableBox<'a, T> = Box<dyn Seekable<Item = T> + Send + 'a>;

impl<S> SortedIterator for Box<S>
where
    S: SortedIterator + ?Sized,
{
    type Item = S::Item;

    fn order(&self) -> Order {
        self.as_ref().order()
    }

    fn has_next(&mut self) -> Result<bool, InternalError> {
        self.as_mut().has_next()
    }

    fn peek(&mut self) -> Result<&Self::Item, InternalError> {
        self.as_mut().peek()
    }

    fn next(&mut self) -> Result<Self::Item, InternalError> {
        self.as_mut().next()
    }

    fn close(&mut self) {
        self.as_mut().close();
    }
}

impl<S> Seekable for Box<S>
where
    S: Seekable + ?Sized,
{
    fn forward(&mut self, target: &Self::Item) -> Result<(), InternalError> {
        self.as_mut().forward(target)
    }
}

impl<S> SortedIterator for &mut S
where
    S: SortedIterator + ?Sized,
{
    type Item = S::Item;

    fn order(&self) -> Order {
        (**self).order()
    }

    fn has_next(&mut self) -> Result<bool, InternalError> {
        (**self).has_next()
    }

    fn peek(&mut self) -> Result<&Self::Item, InternalError> {
        (**self).peek()
    }

    fn next(&mut self) -> Result<Self::Item, InternalError> {
        (**self).next()
    }

    fn close(&mut self) {
        (**self).close();
    }
}

impl<S> Seekable for &mut S
where
    S: Seekable + ?Sized,
{
    fn forward(&mut self, target: &Self::Item) -> Result<(), InternalError> {
        (**self).forward(target)
    }
}

///
/// StreamPosition
///
/// Monotonic bound of one stream: the later (under the stream order) of the
/// last produced value and the last forward target. Used only to reject
/// regressing forwards and out-of-order production.
///

#[derive(Clone, Debug)]
pub(crate) struct StreamPosition<T> {
    order: Order,
    origin: ErrorOrigin,
    bound: Option<T>,
}

impl<T> StreamPosition<T>
where
    T: Ord + Clone,
{
    #[must_use]
    pub(crate) const fn new(order: Order, origin: ErrorOrigin) -> Self {
        Self {
            order,
            origin,
            bound: None,
        }
    }

    // Fail when `target` lies strictly before the current bound.
    pub(crate) fn check_forward(&self, target: &T) -> Result<(), InternalError> {
        match self.bound.as_ref() {
            Some(bound) if self.order.is_before(target, bound) => {
                Err(InternalError::ordering_violation(
                    self.origin,
                    format!(
                        "{} forward target regresses past the {} stream position",
                        self.origin, self.order
                    ),
                ))
            }
            _ => Ok(()),
        }
    }

    // Fail when a freshly produced value lies strictly before the bound.
    pub(crate) fn check_produced(&self, value: &T) -> Result<(), InternalError> {
        match self.bound.as_ref() {
            Some(bound) if self.order.is_before(value, bound) => {
                Err(InternalError::ordering_violation(
                    self.origin,
                    format!(
                        "{} source produced a value out of {} order",
                        self.origin, self.order
                    ),
                ))
            }
            _ => Ok(()),
        }
    }

    // Move the bound to `value` if it lies past the current bound.
    pub(crate) fn advance(&mut self, value: &T) {
        let moves = self
            .bound
            .as_ref()
            .is_none_or(|bound| self.order.is_before(bound, value));
        if moves {
            self.bound = Some(value.clone());
        }
    }

    #[must_use]
    pub(crate) const fn bound(&self) -> Option<&T> {
        self.bound.as_ref()
    }
}
