//! Module: produce
//! Responsibility: concurrent production engine draining many iterators
//! into consumer queues.
//! Does not own: cross-iterator ordering (see `sorted::merge`).
//! Boundary: callers hand over an iterator source and pull from queues.

mod async_producer;
mod demand;
mod executor;
mod pool;
mod queue;


pub use async_producer::AsyncProducer;
pub use executor::{Executor, InlineExecutor, Job, ThreadPool};
pub use queue::{ChannelQueue, Delivery, Queue, QueueReceiver, channel_queue};

use std::sync::Arc;

/// One drainable element iterator, owned by at most one worker at a time.
pub type ElementIter<T> = Box<dyn Iterator<Item = T> + Send>;

/// Lazy supply of element iterators, pulled only when a worker needs one.
pub type IteratorSource<T> = Box<dyn Iterator<Item = ElementIter<T>> + Send>;

///
/// Producer
///
/// Serves batched pull requests. Exhausting the supply before a request is
/// met is normal termination: the queue gets what exists, then `done`.
///

pub trait Producer<T>: Send + Sync {
    /// Register a request for `count` elements into `queue`. Never blocks
    /// on element delivery; workers run on `executor`.
    fn produce(&self, queue: Arc<dyn Queue<T>>, count: usize, executor: Arc<dyn Executor>);

    /// Cooperative, idempotent cancellation. In-flight workers stop at
    /// their next element; nothing waits for them.
    fn recycle(&self);
}
