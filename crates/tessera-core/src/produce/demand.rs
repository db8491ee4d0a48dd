use std::{collections::VecDeque, num::NonZeroUsize};

///
/// Demand
/// One pending (or batched) request: who asked, and for how many elements.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Demand<H> {
    pub(crate) handle: H,
    pub(crate) count: usize,
}

///
/// DemandQueue
///
/// FIFO of outstanding requests plus their running total. Batches are a
/// proportional share of the total so many consumers are served fairly.
///

#[derive(Debug)]
pub(crate) struct DemandQueue<H> {
    pending: VecDeque<Demand<H>>,
    total: usize,
}

impl<H: Clone> DemandQueue<H> {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            total: 0,
        }
    }

    /// Append a request. Empty requests carry no demand.
    pub(crate) fn push(&mut self, handle: H, count: usize) {
        if count == 0 {
            return;
        }
        self.total = self.total.saturating_add(count);
        self.pending.push_back(Demand { handle, count });
    }

    /// Return unserved demand to the head of the queue.
    pub(crate) fn push_front(&mut self, handle: H, count: usize) {
        if count == 0 {
            return;
        }
        self.total = self.total.saturating_add(count);
        self.pending.push_front(Demand { handle, count });
    }

    /// Take the next batch: `max(1, total / parallelism)` elements of the
    /// oldest request, which is served whole when it fits.
    pub(crate) fn take_batch(&mut self, parallelism: NonZeroUsize) -> Option<Demand<H>> {
        let mut oldest = self.pending.pop_front()?;
        let batch = (self.total / parallelism.get()).max(1);

        if oldest.count <= batch {
            self.total = self.total.saturating_sub(oldest.count);
            return Some(oldest);
        }

        oldest.count -= batch;
        self.total = self.total.saturating_sub(batch);
        let served = Demand {
            handle: oldest.handle.clone(),
            count: batch,
        };
        self.pending.push_front(oldest);

        Some(served)
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
        self.total = 0;
    }

    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub(crate) const fn total(&self) -> usize {
        self.total
    }
}
