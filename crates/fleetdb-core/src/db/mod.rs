pub mod aggregate;
pub mod delegate;
pub mod predicate;
pub mod query;
pub mod relation;
pub mod response;
pub mod store;
pub mod write;


use crate::{
    config::DbConfig,
    db::{query::QueryError, store::Store},
    error::Error,
    model::Schema,
    obs::{MetricsEvent, MetricsRecorder, MetricsReport, MetricsSink},
};
use std::cell::RefCell;

pub use delegate::Delegate;

///
/// Db
///
/// In-memory database for one schema: the row store, query limits and the
/// metrics sink. Entry point for every operation through [`Db::delegate`].
///
/// The handle uses interior mutability and is not `Sync`; operations on it
/// run one at a time.
///

pub struct Db {
    schema: Schema,
    store: RefCell<Store>,
    config: DbConfig,
    obs: DbObs,
}

impl Db {
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        let store = RefCell::new(Store::new(&schema));

        Self {
            schema,
            store,
            config: DbConfig::default(),
            obs: DbObs::default(),
        }
    }

    /// Database with explicit query limits; the config is validated first.
    pub fn with_config(schema: Schema, config: DbConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            config,
            ..Self::new(schema)
        })
    }

    /// Forward metrics events to `sink` in addition to the built-in counters.
    #[must_use]
    pub fn with_metrics_sink(mut self, sink: impl MetricsSink + 'static) -> Self {
        self.obs.extra = Some(Box::new(sink));
        self
    }

    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub const fn config(&self) -> &DbConfig {
        &self.config
    }

    /// CRUD surface for one entity.
    pub fn delegate(&self, entity: &str) -> Result<Delegate<'_>, Error> {
        let model = self
            .schema
            .entity(entity)
            .ok_or_else(|| QueryError::UnknownEntity(entity.to_string()))?;

        Ok(Delegate::new(self, model))
    }

    /// Run `f` as one unit: every write it made is undone if it fails.
    pub fn transaction<T, E>(&self, f: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E> {
        let savepoint = self.store.borrow_mut().savepoint();

        let out = f(self);
        let mut store = self.store.borrow_mut();
        match &out {
            Ok(_) => store.release(savepoint),
            Err(_) => {
                store.rollback_to(savepoint);
                tracing::debug!("transaction rolled back");
            }
        }

        out
    }

    /// Number of stored rows of `entity`.
    pub fn row_count(&self, entity: &str) -> Result<usize, Error> {
        Ok(self.store.borrow().table(entity)?.len())
    }

    #[must_use]
    pub fn metrics_report(&self) -> MetricsReport {
        self.obs.recorder.snapshot()
    }

    pub fn metrics_reset(&self) {
        self.obs.recorder.reset();
    }

    pub(crate) const fn store(&self) -> &RefCell<Store> {
        &self.store
    }

    pub(crate) fn sink(&self) -> &dyn MetricsSink {
        &self.obs
    }
}

///
/// DbObs
/// Built-in counters plus an optional caller-provided sink.
///

#[derive(Default)]
struct DbObs {
    recorder: MetricsRecorder,
    extra: Option<Box<dyn MetricsSink>>,
}

impl MetricsSink for DbObs {
    fn record(&self, event: MetricsEvent<'_>) {
        self.recorder.record(event);
        if let Some(extra) = &self.extra {
            extra.record(event);
        }
    }
}
