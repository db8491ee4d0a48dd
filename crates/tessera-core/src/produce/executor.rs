use crossbeam_channel::{SendError, Sender};
use std::{
    num::NonZeroUsize,
    thread::{self, JoinHandle},
};

/// One unit of producer work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

///
/// Executor
///
/// Runs producer jobs. Each job runs to completion without suspending.
///

pub trait Executor: Send + Sync {
    fn execute(&self, job: Job);
}

///
/// InlineExecutor
/// Runs every job on the calling thread.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, job: Job) {
        job();
    }
}

///
/// ThreadPool
///
/// Fixed set of worker threads fed from one job channel. Dropping the pool
/// lets queued jobs finish, then joins every thread.
///

pub struct ThreadPool {
    sender: Option<Sender<Job>>,
    threads: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    #[must_use]
    pub fn new(size: NonZeroUsize) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let threads = (0..size.get())
            .map(|_| {
                let receiver = receiver.clone();
                thread::spawn(move || {
                    for job in receiver {
                        job();
                    }
                })
            })
            .collect();

        Self {
            sender: Some(sender),
            threads,
        }
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.threads.len()
    }
}

impl Executor for ThreadPool {
    fn execute(&self, job: Job) {
        let Some(sender) = self.sender.as_ref() else {
            job();
            return;
        };

        // Every worker thread is gone; run the job here rather than lose it.
        if let Err(SendError(job)) = sender.send(job) {
            job();
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        drop(self.sender.take());

        // The last handle may be released by a job on one of our own threads.
        let current = thread::current().id();
        for handle in self.threads.drain(..) {
            if handle.thread().id() != current {
                let _ = handle.join();
            }
        }
    }
}
