//! Module: produce::async_producer
//! Responsibility: fan-out of a lazy iterator source across bounded workers.
//! Does not own: job scheduling (see `Executor`) or element ordering.
//! Boundary: consumers register demand through `Producer::produce`.

use crate::{
    config::ProducerConfig,
    error::InternalError,
    iter::{IteratorExt, SharedSeen},
    obs::sink::{MetricsEvent, record},
    produce::{
        ElementIter, Executor, IteratorSource, Job, Producer, Queue,
        demand::DemandQueue,
        pool::{IteratorPool, PooledIter},
    },
};
use parking_lot::Mutex;
use std::{
    hash::Hash,
    mem,
    num::NonZeroUsize,
    ptr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tracing::debug;

///
/// AsyncProducer
///
/// Drains a lazily supplied sequence of iterators with at most
/// `parallelism` concurrent workers, serving batched requests from any
/// number of consumer queues. Elements of one source iterator keep their
/// order; nothing is ordered across iterators.
///
/// Waiting queues are told `done` once the source is exhausted and no
/// worker is left running; a queue handed over after that, or after
/// `recycle`, is told at once. The producer keeps a queue only until it
/// has been told, and relies on `Queue::done` ignoring repeats.
///

pub struct AsyncProducer<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> AsyncProducer<T> {
    #[must_use]
    pub fn new<S, I>(source: S, parallelism: NonZeroUsize) -> Self
    where
        S: IntoIterator<Item = I>,
        S::IntoIter: Send + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        let source = source
            .into_iter()
            .map(|iter| Box::new(iter.into_iter()) as ElementIter<T>);

        Self::from_source(Box::new(source), parallelism)
    }

    /// Build from configuration; rejects a zero parallelism.
    pub fn with_config<S, I>(source: S, config: &ProducerConfig) -> Result<Self, InternalError>
    where
        S: IntoIterator<Item = I>,
        S::IntoIter: Send + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        let parallelism = config.validate()?;

        Ok(Self::new(source, parallelism))
    }

    fn from_source(source: IteratorSource<T>, parallelism: NonZeroUsize) -> Self {
        Self {
            shared: Arc::new(Shared {
                parallelism,
                recycled: AtomicBool::new(false),
                state: Mutex::new(State {
                    workers: 0,
                    demand: DemandQueue::new(),
                    pool: IteratorPool::new(source),
                    waiting: Vec::new(),
                }),
            }),
        }
    }

    #[must_use]
    pub fn parallelism(&self) -> NonZeroUsize {
        self.shared.parallelism
    }

    /// Workers spawned and not yet finished.
    #[must_use]
    pub fn active_workers(&self) -> usize {
        self.shared.state.lock().workers
    }

    /// Requested elements not yet handed to a worker.
    #[must_use]
    pub fn pending_demand(&self) -> usize {
        self.shared.state.lock().demand.total()
    }

    #[must_use]
    pub fn is_recycled(&self) -> bool {
        self.shared.is_recycled()
    }

    /// Transform every element. The function is applied inside each source
    /// iterator, so it runs on the worker draining that iterator.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> AsyncProducer<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let f = Arc::new(f);

        self.push_down(move |iter| {
            let f = Arc::clone(&f);
            Box::new(iter.map(move |item| f(item))) as ElementIter<U>
        })
    }

    /// Keep only elements matching `pred`, filtered inside each source
    /// iterator.
    #[must_use]
    pub fn filter<F>(self, pred: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let pred = Arc::new(pred);

        self.push_down(move |iter| {
            let pred = Arc::clone(&pred);
            Box::new(iter.filter(move |item| pred(item))) as ElementIter<T>
        })
    }

    /// Drop elements already delivered by any worker. All source iterators
    /// share one concurrent set.
    #[must_use]
    pub fn distinct(self) -> Self
    where
        T: Hash + Eq + Clone + Sync,
    {
        let seen = SharedSeen::new();

        self.push_down(move |iter| Box::new(iter.distinct_shared(seen.clone())) as ElementIter<T>)
    }

    // Re-wrap every iterator not yet reserved: available ones first, then
    // the untouched remainder of the source.
    fn push_down<U, F>(self, wrap: F) -> AsyncProducer<U>
    where
        U: Send + 'static,
        F: Fn(ElementIter<T>) -> ElementIter<U> + Send + 'static,
    {
        let parallelism = self.shared.parallelism;
        let source = self.shared.state.lock().pool.take_source();

        AsyncProducer::from_source(Box::new(source.map(wrap)), parallelism)
    }
}

impl<T: Send + 'static> Producer<T> for AsyncProducer<T> {
    fn produce(&self, queue: Arc<dyn Queue<T>>, count: usize, executor: Arc<dyn Executor>) {
        let (jobs, finished) = {
            let mut state = self.shared.state.lock();

            if self.shared.is_recycled() {
                (Vec::new(), vec![queue])
            } else {
                state.wait_for_done(&queue);
                state.demand.push(Handle { queue, executor }, count);
                let jobs = spawn_workers(&self.shared, &mut state);
                let finished = if state.workers == 0 && !state.pool.has_iterator() {
                    state.exhaust()
                } else {
                    Vec::new()
                };
                (jobs, finished)
            }
        };

        signal_done(finished);
        run_jobs(jobs);
    }

    fn recycle(&self) {
        if self.shared.recycled.swap(true, Ordering::AcqRel) {
            return;
        }

        let workers = {
            let mut state = self.shared.state.lock();
            state.pool.recycle();
            state.demand.clear();
            state.waiting.clear();
            state.workers
        };

        record(MetricsEvent::ProducerRecycled);
        debug!(workers, "producer recycled");
    }
}

// Jobs to run once the producer lock is released.
type Spawned = Vec<(Arc<dyn Executor>, Job)>;

///
/// Shared
///

struct Shared<T> {
    parallelism: NonZeroUsize,
    recycled: AtomicBool,
    state: Mutex<State<T>>,
}

impl<T> Shared<T> {
    fn is_recycled(&self) -> bool {
        self.recycled.load(Ordering::Acquire)
    }
}

///
/// State
/// Everything guarded by the producer mutex.
///

struct State<T> {
    workers: usize,
    demand: DemandQueue<Handle<T>>,
    pool: IteratorPool<T>,
    // Queues not yet told `done`; emptied at exhaustion and recycle.
    waiting: Vec<Arc<dyn Queue<T>>>,
}

impl<T: Send + 'static> State<T> {
    fn wait_for_done(&mut self, queue: &Arc<dyn Queue<T>>) {
        let known = self
            .waiting
            .iter()
            .any(|waiting| ptr::addr_eq(Arc::as_ptr(waiting), Arc::as_ptr(queue)));

        if !known {
            self.waiting.push(Arc::clone(queue));
        }
    }

    // Nothing left to deliver: drop outstanding demand and hand back every
    // waiting queue.
    fn exhaust(&mut self) -> Vec<Arc<dyn Queue<T>>> {
        self.demand.clear();

        mem::take(&mut self.waiting)
    }
}

///
/// Handle
/// Where a batch goes and which executor runs the worker serving it.
///

struct Handle<T> {
    queue: Arc<dyn Queue<T>>,
    executor: Arc<dyn Executor>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            executor: Arc::clone(&self.executor),
        }
    }
}

///
/// Worker
/// One batch in flight: the request it serves and the iterator it holds.
///

struct Worker<T> {
    shared: Arc<Shared<T>>,
    handle: Handle<T>,
    remaining: usize,
    delivered: u64,
}

impl<T: Send + 'static> Worker<T> {
    fn run(mut self, mut iter: PooledIter<T>) {
        record(MetricsEvent::WorkerStarted);
        debug!(requested = self.remaining, "producer worker started");

        loop {
            self.drain(&mut iter);

            let has_more = !self.shared.is_recycled() && iter.peek().is_some();
            let mut state = self.shared.state.lock();
            state.pool.release(iter, has_more);

            if self.remaining > 0 && !self.shared.is_recycled() {
                if let Some(next) = state.pool.reserve() {
                    drop(state);
                    iter = next;
                    continue;
                }

                // Out of iterators; other workers may still hold some.
                state
                    .demand
                    .push_front(self.handle.clone(), self.remaining);
            }

            let (jobs, finished) = self.finish(&mut state);
            drop(state);

            record(MetricsEvent::WorkerFinished {
                delivered: self.delivered,
            });
            debug!(delivered = self.delivered, "producer worker finished");

            signal_done(finished);
            run_jobs(jobs);
            return;
        }
    }

    fn drain(&mut self, iter: &mut PooledIter<T>) {
        while self.remaining > 0 && !self.shared.is_recycled() {
            let Some(item) = iter.next() else {
                break;
            };
            self.handle.queue.put(item);
            self.remaining -= 1;
            self.delivered += 1;
        }
    }

    fn finish(&self, state: &mut State<T>) -> (Spawned, Vec<Arc<dyn Queue<T>>>) {
        state.workers = state.workers.saturating_sub(1);

        if self.shared.is_recycled() {
            return (Vec::new(), Vec::new());
        }

        if state.workers == 0 && !state.pool.has_iterator() {
            debug_assert_eq!(state.pool.reserved(), 0, "no worker left to hold an iterator");
            return (Vec::new(), state.exhaust());
        }

        (spawn_workers(&self.shared, state), Vec::new())
    }
}

// Hand batches to new workers while capacity, demand and iterators remain.
// Runs under the lock; the returned jobs must be executed after it is released.
fn spawn_workers<T: Send + 'static>(shared: &Arc<Shared<T>>, state: &mut State<T>) -> Spawned {
    let mut jobs = Vec::new();

    while state.workers < shared.parallelism.get() && !state.demand.is_empty() {
        let Some(iter) = state.pool.reserve() else {
            break;
        };
        let Some(batch) = state.demand.take_batch(shared.parallelism) else {
            state.pool.release(iter, true);
            break;
        };

        state.workers += 1;
        let executor = Arc::clone(&batch.handle.executor);
        let worker = Worker {
            shared: Arc::clone(shared),
            handle: batch.handle,
            remaining: batch.count,
            delivered: 0,
        };
        jobs.push((executor, Box::new(move || worker.run(iter)) as Job));
    }

    jobs
}

fn run_jobs(jobs: Spawned) {
    for (executor, job) in jobs {
        executor.execute(job);
    }
}

fn signal_done<T>(queues: Vec<Arc<dyn Queue<T>>>) {
    for queue in queues {
        if queue.done() {
            record(MetricsEvent::QueueDone);
            debug!("producer queue done");
        }
    }
}
