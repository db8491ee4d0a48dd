use crate::produce::{ElementIter, IteratorSource};
use std::{collections::VecDeque, iter::Peekable};

pub(crate) type PooledIter<T> = Peekable<ElementIter<T>>;

///
/// IteratorPool
///
/// Iterators waiting to be drained. Reserving an iterator moves it out of
/// the pool, so a reserved iterator is owned by exactly one worker until it
/// is released back. Available iterators are preferred over pulling a fresh
/// one from the lazy source.
///

pub(crate) struct IteratorPool<T> {
    source: Option<Peekable<IteratorSource<T>>>,
    available: VecDeque<PooledIter<T>>,
    reserved: usize,
    recycled: bool,
}

impl<T: Send + 'static> IteratorPool<T> {
    pub(crate) fn new(source: IteratorSource<T>) -> Self {
        Self {
            source: Some(source.peekable()),
            available: VecDeque::new(),
            reserved: 0,
            recycled: false,
        }
    }

    /// Whether `reserve` would hand out an iterator. May pull one iterator
    /// from the source ahead of time.
    pub(crate) fn has_iterator(&mut self) -> bool {
        !self.available.is_empty()
            || self
                .source
                .as_mut()
                .is_some_and(|source| source.peek().is_some())
    }

    pub(crate) fn reserve(&mut self) -> Option<PooledIter<T>> {
        let iter = match self.available.pop_front() {
            Some(iter) => iter,
            None => self.source.as_mut()?.next()?.peekable(),
        };
        self.reserved += 1;

        Some(iter)
    }

    /// Hand a reserved iterator back; it is dropped unless `has_more`.
    pub(crate) fn release(&mut self, iter: PooledIter<T>, has_more: bool) {
        self.reserved = self.reserved.saturating_sub(1);
        if has_more && !self.recycled {
            self.available.push_back(iter);
        }
    }

    /// Drop every iterator not currently reserved and stop accepting
    /// releases.
    pub(crate) fn recycle(&mut self) {
        self.recycled = true;
        self.available.clear();
        self.source = None;
    }

    #[must_use]
    pub(crate) const fn reserved(&self) -> usize {
        self.reserved
    }

    /// Take everything not reserved as one source, available iterators first.
    pub(crate) fn take_source(&mut self) -> IteratorSource<T> {
        let available = std::mem::take(&mut self.available)
            .into_iter()
            .map(|iter| Box::new(iter) as ElementIter<T>);
        let rest = self.source.take().into_iter().flatten();

        Box::new(available.chain(rest))
    }
}
