//! Metrics sink boundary.
//!
//! All instrumentation flows through `MetricsEvent` and `MetricsSink`.

use std::fmt;

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Read,
    Write,
    Delete,
    Aggregate,
}

impl ExecKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
            Self::Aggregate => "aggregate",
        }
    }
}

impl fmt::Display for ExecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent<'a> {
    ExecStart {
        kind: ExecKind,
        entity: &'a str,
    },
    ExecFinish {
        kind: ExecKind,
        entity: &'a str,
        rows_touched: u64,
    },
    ExecFailed {
        kind: ExecKind,
        entity: &'a str,
    },
    RowsScanned {
        entity: &'a str,
        rows_scanned: u64,
    },
    ConstraintViolation {
        entity: &'a str,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

///
/// NoopSink
/// Discards every event.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record(&self, _: MetricsEvent<'_>) {}
}

///
/// Span
/// RAII guard that emits start/finish events for one delegate call.
/// A span dropped without `finish` records a failure.
///

pub(crate) struct Span<'a> {
    sink: &'a dyn MetricsSink,
    kind: ExecKind,
    entity: &'a str,
    finished: bool,
}

impl<'a> Span<'a> {
    pub(crate) fn new(sink: &'a dyn MetricsSink, kind: ExecKind, entity: &'a str) -> Self {
        sink.record(MetricsEvent::ExecStart { kind, entity });

        Self {
            sink,
            kind,
            entity,
            finished: false,
        }
    }

    pub(crate) fn finish(mut self, rows_touched: u64) {
        self.finished = true;
        self.sink.record(MetricsEvent::ExecFinish {
            kind: self.kind,
            entity: self.entity,
            rows_touched,
        });
    }
}

impl Drop for Span<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.sink.record(MetricsEvent::ExecFailed {
                kind: self.kind,
                entity: self.entity,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct CapturingSink {
        events: RefCell<Vec<String>>,
    }

    impl MetricsSink for CapturingSink {
        fn record(&self, event: MetricsEvent<'_>) {
            let label = match event {
                MetricsEvent::ExecStart { kind, .. } => format!("start:{kind}"),
                MetricsEvent::ExecFinish { rows_touched, .. } => format!("finish:{rows_touched}"),
                MetricsEvent::ExecFailed { .. } => "failed".to_string(),
                MetricsEvent::RowsScanned { .. } => "scanned".to_string(),
                MetricsEvent::ConstraintViolation { .. } => "violation".to_string(),
            };
            self.events.borrow_mut().push(label);
        }
    }

    #[test]
    fn finished_span_records_start_and_finish() {
        let sink = CapturingSink::default();
        Span::new(&sink, ExecKind::Read, "Trip").finish(3);

        assert_eq!(*sink.events.borrow(), ["start:read", "finish:3"]);
    }

    #[test]
    fn dropped_span_records_failure() {
        let sink = CapturingSink::default();
        {
            let _span = Span::new(&sink, ExecKind::Write, "Trip");
        }

        assert_eq!(*sink.events.borrow(), ["start:write", "failed"]);
    }
}
