//! Metrics sink boundary.
//!
//! Iterator and producer logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between traversal logic
//! and the global metrics state.
use crate::{obs::metrics, sorted::Order};
use std::{cell::RefCell, sync::Arc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Arc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    ScanOpened { order: Order },
    ScanForwarded,
    ScanClosed { rows_read: u64 },
    DuplicateSuppressed,
    WorkerStarted,
    WorkerFinished { delivered: u64 },
    QueueDone,
    ProducerRecycled,
    SharedDuplicateDropped,
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default process-wide sink that writes into global metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ScanOpened { order } => metrics::with_state_mut(|m| match order {
                Order::Asc => m.scans.opened_asc = m.scans.opened_asc.saturating_add(1),
                Order::Desc => m.scans.opened_desc = m.scans.opened_desc.saturating_add(1),
            }),

            MetricsEvent::ScanForwarded => metrics::with_state_mut(|m| {
                m.scans.forwarded = m.scans.forwarded.saturating_add(1);
            }),

            MetricsEvent::ScanClosed { rows_read } => metrics::with_state_mut(|m| {
                m.scans.closed = m.scans.closed.saturating_add(1);
                m.scans.rows_read = m.scans.rows_read.saturating_add(rows_read);
            }),

            MetricsEvent::DuplicateSuppressed => metrics::with_state_mut(|m| {
                m.sorted.duplicates_suppressed = m.sorted.duplicates_suppressed.saturating_add(1);
            }),

            MetricsEvent::WorkerStarted => metrics::with_state_mut(|m| {
                m.producer.workers_started = m.producer.workers_started.saturating_add(1);
            }),

            MetricsEvent::WorkerFinished { delivered } => metrics::with_state_mut(|m| {
                m.producer.workers_finished = m.producer.workers_finished.saturating_add(1);
                m.producer.elements_delivered =
                    m.producer.elements_delivered.saturating_add(delivered);
            }),

            MetricsEvent::QueueDone => metrics::with_state_mut(|m| {
                m.producer.queues_done = m.producer.queues_done.saturating_add(1);
            }),

            MetricsEvent::ProducerRecycled => metrics::with_state_mut(|m| {
                m.producer.recycles = m.producer.recycles.saturating_add(1);
            }),

            MetricsEvent::SharedDuplicateDropped => metrics::with_state_mut(|m| {
                m.producer.shared_duplicates_dropped =
                    m.producer.shared_duplicates_dropped.saturating_add(1);
            }),
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
///
/// The override is scoped to the calling thread; events recorded by worker
/// threads spawned inside `f` still reach the global sink.
pub fn with_metrics_sink<T>(sink: Arc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Arc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct CaptureSink {
        events: Mutex<Vec<MetricsEvent>>,
    }

    impl MetricsSink for CaptureSink {
        fn record(&self, event: MetricsEvent) {
            self.events.lock().push(event);
        }
    }

    #[test]
    fn override_captures_events_and_restores_on_exit() {
        let outer = Arc::new(CaptureSink::default());
        let inner = Arc::new(CaptureSink::default());

        with_metrics_sink(outer.clone(), || {
            record(MetricsEvent::ScanForwarded);
            with_metrics_sink(inner.clone(), || record(MetricsEvent::QueueDone));
            record(MetricsEvent::ProducerRecycled);
        });

        assert_eq!(
            *outer.events.lock(),
            vec![MetricsEvent::ScanForwarded, MetricsEvent::ProducerRecycled],
            "outer sink must see events before and after the nested scope"
        );
        assert_eq!(*inner.events.lock(), vec![MetricsEvent::QueueDone]);
    }

    #[test]
    fn override_is_restored_after_panic() {
        let sink = Arc::new(CaptureSink::default());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            with_metrics_sink(sink.clone(), || panic!("scope exits by unwinding"));
        }));
        assert!(result.is_err());

        let restored = SINK_OVERRIDE.with(|cell| cell.borrow().is_none());
        assert!(restored, "unwinding must restore the previous override slot");
    }
}
