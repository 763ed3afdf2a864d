//! Observability: operation metrics and the sink they flow through.
//!
//! Execution code never touches counters directly; it emits
//! `MetricsEvent`s into the `MetricsSink` held by the database.

pub(crate) mod metrics;
pub(crate) mod sink;

pub use metrics::{EntityCounters, MetricsRecorder, MetricsReport, OpCounters};
pub use sink::{ExecKind, MetricsEvent, MetricsSink, NoopSink};

pub(crate) use sink::Span;
