use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

///
/// Queue
///
/// Consumer-side sink for produced elements. `done` means no further
/// element will ever be put for this consumer. A queue may be handed to a
/// producer more than once, so `done` after the first one must be a no-op.
///

pub trait Queue<T>: Send + Sync {
    fn put(&self, item: T);

    /// Signal the end of delivery; returns `false` when already signalled.
    fn done(&self) -> bool;
}

///
/// Delivery
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Delivery<T> {
    Item(T),
    Done,
}

///
/// ChannelQueue
///
/// Producer half of a crossbeam channel. A bounded channel blocks `put`
/// until the consumer makes room. Clones share one channel and one done
/// flag, so the channel carries at most one `Done`.
///

pub struct ChannelQueue<T> {
    sender: Sender<Delivery<T>>,
    done: Arc<AtomicBool>,
    done_signals: Arc<AtomicUsize>,
}

impl<T> Clone for ChannelQueue<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            done: Arc::clone(&self.done),
            done_signals: Arc::clone(&self.done_signals),
        }
    }
}

impl<T: Send> Queue<T> for ChannelQueue<T> {
    fn put(&self, item: T) {
        // A disconnected receiver discards the element.
        let _ = self.sender.send(Delivery::Item(item));
    }

    fn done(&self) -> bool {
        if self.done.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.done_signals.fetch_add(1, Ordering::AcqRel);
        let _ = self.sender.send(Delivery::Done);

        true
    }
}

///
/// QueueReceiver
///

pub struct QueueReceiver<T> {
    receiver: Receiver<Delivery<T>>,
    done_signals: Arc<AtomicUsize>,
}

impl<T> QueueReceiver<T> {
    /// Block for the next delivery; `None` once every sender is gone.
    #[must_use]
    pub fn recv(&self) -> Option<Delivery<T>> {
        self.receiver.recv().ok()
    }

    /// Block up to `timeout`; `None` on timeout or disconnect.
    #[must_use]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Delivery<T>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(delivery) => Some(delivery),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    #[must_use]
    pub fn try_recv(&self) -> Option<Delivery<T>> {
        match self.receiver.try_recv() {
            Ok(delivery) => Some(delivery),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Collect items until `done` arrives. Returns `None` when `timeout`
    /// elapses between two deliveries first.
    #[must_use]
    pub fn drain_until_done(&self, timeout: Duration) -> Option<Vec<T>> {
        let mut items = Vec::new();
        loop {
            match self.recv_timeout(timeout)? {
                Delivery::Item(item) => items.push(item),
                Delivery::Done => return Some(items),
            }
        }
    }

    /// Number of `done` signals delivered to this queue; never above one.
    #[must_use]
    pub fn done_signals(&self) -> usize {
        self.done_signals.load(Ordering::Acquire)
    }
}

/// Create a consumer queue; `capacity` bounds it, `None` leaves it unbounded.
#[must_use]
pub fn channel_queue<T>(capacity: Option<usize>) -> (ChannelQueue<T>, QueueReceiver<T>) {
    let (sender, receiver) = match capacity {
        Some(capacity) => crossbeam_channel::bounded(capacity),
        None => crossbeam_channel::unbounded(),
    };
    let done_signals = Arc::new(AtomicUsize::new(0));

    (
        ChannelQueue {
            sender,
            done: Arc::new(AtomicBool::new(false)),
            done_signals: Arc::clone(&done_signals),
        },
        QueueReceiver {
            receiver,
            done_signals,
        },
    )
}
