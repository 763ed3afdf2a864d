use crate::obs::sink::{ExecKind, MetricsEvent, MetricsSink};
use serde::Serialize;
use std::{cell::RefCell, collections::BTreeMap};

///
/// OpCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct OpCounters {
    // Delegate entrypoints
    pub read_calls: u64,
    pub write_calls: u64,
    pub delete_calls: u64,
    pub aggregate_calls: u64,
    pub failed_calls: u64,

    // Rows touched
    pub rows_returned: u64,
    pub rows_written: u64,
    pub rows_deleted: u64,
    pub rows_scanned: u64,

    pub constraint_violations: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EntityCounters {
    pub calls: u64,
    pub failed_calls: u64,
    pub rows_touched: u64,
    pub rows_scanned: u64,
    pub constraint_violations: u64,
}

///
/// MetricsReport
/// Point-in-time copy of the recorder's counters.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct MetricsReport {
    pub ops: OpCounters,
    pub entities: BTreeMap<String, EntityCounters>,
}

impl MetricsReport {
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityCounters> {
        self.entities.get(name)
    }
}

///
/// MetricsRecorder
///
/// Default sink: in-memory counters, global and per entity. Counters
/// saturate instead of wrapping.
///

#[derive(Debug, Default)]
pub struct MetricsRecorder {
    state: RefCell<MetricsReport>,
}

impl MetricsRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsReport {
        self.state.borrow().clone()
    }

    pub fn reset(&self) {
        *self.state.borrow_mut() = MetricsReport::default();
    }

    fn with_entity(&self, entity: &str, f: impl FnOnce(&mut OpCounters, &mut EntityCounters)) {
        let mut state = self.state.borrow_mut();
        let MetricsReport { ops, entities } = &mut *state;
        let entry = entities.entry(entity.to_string()).or_default();

        f(ops, entry);
    }
}

impl MetricsSink for MetricsRecorder {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::ExecStart { kind, entity } => self.with_entity(entity, |ops, e| {
                let calls = match kind {
                    ExecKind::Read => &mut ops.read_calls,
                    ExecKind::Write => &mut ops.write_calls,
                    ExecKind::Delete => &mut ops.delete_calls,
                    ExecKind::Aggregate => &mut ops.aggregate_calls,
                };
                *calls = calls.saturating_add(1);
                e.calls = e.calls.saturating_add(1);
            }),

            MetricsEvent::ExecFinish {
                kind,
                entity,
                rows_touched,
            } => self.with_entity(entity, |ops, e| {
                let rows = match kind {
                    ExecKind::Read | ExecKind::Aggregate => &mut ops.rows_returned,
                    ExecKind::Write => &mut ops.rows_written,
                    ExecKind::Delete => &mut ops.rows_deleted,
                };
                *rows = rows.saturating_add(rows_touched);
                e.rows_touched = e.rows_touched.saturating_add(rows_touched);
            }),

            MetricsEvent::ExecFailed { entity, .. } => self.with_entity(entity, |ops, e| {
                ops.failed_calls = ops.failed_calls.saturating_add(1);
                e.failed_calls = e.failed_calls.saturating_add(1);
            }),

            MetricsEvent::RowsScanned {
                entity,
                rows_scanned,
            } => self.with_entity(entity, |ops, e| {
                ops.rows_scanned = ops.rows_scanned.saturating_add(rows_scanned);
                e.rows_scanned = e.rows_scanned.saturating_add(rows_scanned);
            }),

            MetricsEvent::ConstraintViolation { entity } => self.with_entity(entity, |ops, e| {
                ops.constraint_violations = ops.constraint_violations.saturating_add(1);
                e.constraint_violations = e.constraint_violations.saturating_add(1);
            }),
        }
    }
}
