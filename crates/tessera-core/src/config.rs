//! Module: config
//! Responsibility: production engine settings and their validation.
//! Does not own: where settings come from (callers deserialise them).
//! Boundary: an invalid setting fails here, never inside a running engine.

use crate::{
    error::InternalError,
    produce::{ChannelQueue, QueueReceiver, channel_queue},
};
use serde::{Deserialize, Serialize};
use std::{num::NonZeroUsize, thread};

///
/// ProducerConfig
///
/// Parallelism of a production engine and the capacity of the consumer
/// queues built for it. `queue_capacity = None` means unbounded.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProducerConfig {
    pub parallelism: usize,
    pub queue_capacity: Option<usize>,
}

impl ProducerConfig {
    #[must_use]
    pub const fn new(parallelism: usize) -> Self {
        Self {
            parallelism,
            queue_capacity: None,
        }
    }

    #[must_use]
    pub const fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Parallelism as a checked count.
    pub fn validate(&self) -> Result<NonZeroUsize, InternalError> {
        let parallelism = NonZeroUsize::new(self.parallelism)
            .ok_or_else(|| InternalError::config_invalid("parallelism must be at least 1"))?;

        if self.queue_capacity == Some(0) {
            return Err(InternalError::config_invalid(
                "queue_capacity must be at least 1 when set",
            ));
        }

        Ok(parallelism)
    }

    /// Consumer queue honouring the configured capacity.
    #[must_use]
    pub fn channel_queue<T>(&self) -> (ChannelQueue<T>, QueueReceiver<T>) {
        channel_queue(self.queue_capacity)
    }
}

impl Default for ProducerConfig {
    fn default() -> Self {
        let parallelism = thread::available_parallelism().map_or(1, NonZeroUsize::get);

        Self::new(parallelism)
    }
}

///
/// TESTS
///
