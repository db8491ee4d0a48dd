//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Iterator and producer code never touches `obs::metrics` directly; every
//! counter update flows through `MetricsEvent` and `MetricsSink`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventReport, EventState, ProducerCounters, ScanCounters, SortedCounters};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
