use crate::{
    db::{
        Db,
        aggregate::{self, AggregateArgs, GroupByArgs},
        query::{
            CountArgs, FindManyArgs, FindUniqueArgs, QueryError, RecordView, Selection, WhereUnique,
            find_first_row, find_many_rows,
        },
        relation::{ReadCtx, RowRef},
        response::{AggregateResult, BatchPayload, CountResult, GroupRow},
        store::RowKey,
        write::{
            CreateArgs, CreateManyArgs, DeleteArgs, DeleteManyArgs, UpdateArgs, UpdateManyArgs,
            UpsertArgs, WriteExecutor,
        },
    },
    error::Error,
    model::EntityModel,
    obs::{ExecKind, MetricsEvent, Span},
};

///
/// Delegate
///
/// Per-entity CRUD surface. Reads project rows through a `Selection`;
/// writes run atomically and return the written row's view.
///

#[derive(Clone, Copy)]
pub struct Delegate<'db> {
    db: &'db Db,
    entity: &'db EntityModel,
}

impl<'db> Delegate<'db> {
    pub(crate) const fn new(db: &'db Db, entity: &'db EntityModel) -> Self {
        Self { db, entity }
    }

    #[must_use]
    pub const fn entity(&self) -> &'db EntityModel {
        self.entity
    }

    ///
    /// READS
    ///

    pub fn find_unique(&self, args: &FindUniqueArgs) -> Result<Option<RecordView>, Error> {
        let found = |v: &Option<RecordView>| u64::from(v.is_some());
        self.run(ExecKind::Read, "find_unique", found, || {
            let select = self.prepare_select(&args.select)?;
            let store = self.db.store().borrow();
            let ctx = ReadCtx::new(self.db.schema(), &store);
            let row = args.filter.find(ctx, self.entity)?;

            Ok(row.map(|row| self.project(&select, &row)))
        })
    }

    pub fn find_unique_or_throw(&self, args: &FindUniqueArgs) -> Result<RecordView, Error> {
        self.find_unique(args)?
            .ok_or_else(|| QueryError::not_found(self.entity).into())
    }

    pub fn find_first(&self, args: &FindManyArgs) -> Result<Option<RecordView>, Error> {
        let found = |v: &Option<RecordView>| u64::from(v.is_some());
        self.run(ExecKind::Read, "find_first", found, || {
            let select = self.prepare_select(&args.select)?;
            let store = self.db.store().borrow();
            let ctx = ReadCtx::new(self.db.schema(), &store);
            let row = find_first_row(ctx, self.entity, &args.scope)?;

            Ok(row.map(|row| self.project(&select, &row)))
        })
    }

    pub fn find_first_or_throw(&self, args: &FindManyArgs) -> Result<RecordView, Error> {
        self.find_first(args)?
            .ok_or_else(|| QueryError::not_found(self.entity).into())
    }

    pub fn find_many(&self, args: &FindManyArgs) -> Result<Vec<RecordView>, Error> {
        self.run(ExecKind::Read, "find_many", |v: &Vec<RecordView>| v.len() as u64, || {
            let select = self.prepare_select(&args.select)?;
            let store = self.db.store().borrow();
            let ctx = ReadCtx::new(self.db.schema(), &store);
            let rows = find_many_rows(ctx, self.entity, &args.scope, &self.db.config().query)?;

            Ok(rows.iter().map(|row| self.project(&select, row)).collect())
        })
    }

    ///
    /// AGGREGATES
    ///

    pub fn count(&self, args: &CountArgs) -> Result<CountResult, Error> {
        self.run(ExecKind::Aggregate, "count", |_| 1, || {
            let store = self.db.store().borrow();
            let ctx = ReadCtx::new(self.db.schema(), &store);

            Ok(aggregate::count(ctx, self.entity, args)?)
        })
    }

    pub fn aggregate(&self, args: &AggregateArgs) -> Result<AggregateResult, Error> {
        self.run(ExecKind::Aggregate, "aggregate", |_| 1, || {
            let store = self.db.store().borrow();
            let ctx = ReadCtx::new(self.db.schema(), &store);

            Ok(aggregate::aggregate(ctx, self.entity, args)?)
        })
    }

    pub fn group_by(&self, args: &GroupByArgs) -> Result<Vec<GroupRow>, Error> {
        self.run(ExecKind::Aggregate, "group_by", |v: &Vec<GroupRow>| v.len() as u64, || {
            let store = self.db.store().borrow();
            let ctx = ReadCtx::new(self.db.schema(), &store);

            Ok(aggregate::group_by(ctx, self.entity, args)?)
        })
    }

    ///
    /// WRITES
    ///

    pub fn create(&self, args: &CreateArgs) -> Result<RecordView, Error> {
        self.run(ExecKind::Write, "create", |_| 1, || {
            let select = self.prepare_select(&args.select)?;
            let mut store = self.db.store().borrow_mut();
            let key = WriteExecutor::new(self.db.schema(), &mut store)
                .create(self.entity, &args.data)?;
            drop(store);

            self.view(&key, &select)
        })
    }

    pub fn create_many(&self, args: &CreateManyArgs) -> Result<BatchPayload, Error> {
        self.run(ExecKind::Write, "create_many", |p: &BatchPayload| p.count, || {
            let mut store = self.db.store().borrow_mut();
            let count =
                WriteExecutor::new(self.db.schema(), &mut store).create_many(self.entity, args)?;

            Ok(BatchPayload { count })
        })
    }

    pub fn update(&self, args: &UpdateArgs) -> Result<RecordView, Error> {
        self.run(ExecKind::Write, "update", |_| 1, || {
            let select = self.prepare_select(&args.select)?;
            let mut store = self.db.store().borrow_mut();
            let key = WriteExecutor::new(self.db.schema(), &mut store).update(
                self.entity,
                &args.filter,
                &args.data,
            )?;
            drop(store);

            self.view(&key, &select)
        })
    }

    pub fn update_many(&self, args: &UpdateManyArgs) -> Result<BatchPayload, Error> {
        self.run(ExecKind::Write, "update_many", |p: &BatchPayload| p.count, || {
            let mut store = self.db.store().borrow_mut();
            let count = WriteExecutor::new(self.db.schema(), &mut store).update_many(
                self.entity,
                args.filter.as_ref(),
                &args.data,
            )?;

            Ok(BatchPayload { count })
        })
    }

    pub fn upsert(&self, args: &UpsertArgs) -> Result<RecordView, Error> {
        self.run(ExecKind::Write, "upsert", |_| 1, || {
            let select = self.prepare_select(&args.select)?;
            let mut store = self.db.store().borrow_mut();
            let key = WriteExecutor::new(self.db.schema(), &mut store).upsert(
                self.entity,
                &args.filter,
                &args.create,
                &args.update,
            )?;
            drop(store);

            self.view(&key, &select)
        })
    }

    /// Delete one row and return its view as it was before deletion.
    pub fn delete(&self, args: &DeleteArgs) -> Result<RecordView, Error> {
        self.run(ExecKind::Delete, "delete", |_| 1, || {
            let select = self.prepare_select(&args.select)?;
            let view = self.view_unique(&args.filter, &select)?;

            let mut store = self.db.store().borrow_mut();
            WriteExecutor::new(self.db.schema(), &mut store).delete(self.entity, &args.filter)?;

            Ok(view)
        })
    }

    pub fn delete_many(&self, args: &DeleteManyArgs) -> Result<BatchPayload, Error> {
        self.run(ExecKind::Delete, "delete_many", |p: &BatchPayload| p.count, || {
            let mut store = self.db.store().borrow_mut();
            let count = WriteExecutor::new(self.db.schema(), &mut store)
                .delete_many(self.entity, args.filter.as_ref())?;

            Ok(BatchPayload { count })
        })
    }

    ///
    /// HELPERS
    ///

    fn prepare_select(&self, select: &Selection) -> Result<Selection, Error> {
        let max_depth = self.db.config().query.max_include_depth;

        Ok(select.prepare(self.db.schema(), self.entity, 0, max_depth)?)
    }

    fn project(&self, select: &Selection, row: &RowRef<'_>) -> RecordView {
        select.project(row, &self.db.config().query)
    }

    fn view(&self, key: &RowKey, select: &Selection) -> Result<RecordView, Error> {
        let store = self.db.store().borrow();
        let ctx = ReadCtx::new(self.db.schema(), &store);
        let record = store
            .get(&self.entity.name, key)
            .ok_or_else(|| QueryError::not_found(self.entity))?;

        Ok(self.project(select, &RowRef::new(ctx, self.entity, record)))
    }

    fn view_unique(&self, filter: &WhereUnique, select: &Selection) -> Result<RecordView, Error> {
        let store = self.db.store().borrow();
        let ctx = ReadCtx::new(self.db.schema(), &store);
        let row = filter
            .find(ctx, self.entity)?
            .ok_or_else(|| QueryError::not_found(self.entity))?;

        Ok(self.project(select, &row))
    }

    /// Wrap one operation with a metrics span and boundary logging.
    fn run<T>(
        &self,
        kind: ExecKind,
        op: &'static str,
        rows: impl FnOnce(&T) -> u64,
        f: impl FnOnce() -> Result<T, Error>,
    ) -> Result<T, Error> {
        let entity = self.entity.name.as_str();
        let span = Span::new(self.db.sink(), kind, entity);

        match f() {
            Ok(out) => {
                let rows = rows(&out);
                if matches!(kind, ExecKind::Read | ExecKind::Aggregate) {
                    self.record_scan();
                }
                tracing::debug!(entity, op, rows, "operation finished");
                span.finish(rows);

                Ok(out)
            }
            Err(err) => {
                if err.is_conflict() {
                    self.db
                        .sink()
                        .record(MetricsEvent::ConstraintViolation { entity });
                }
                tracing::warn!(entity, op, class = %err.class, error = %err, "operation failed");

                Err(err)
            }
        }
    }

    fn record_scan(&self) {
        let Ok(len) = self.db.row_count(&self.entity.name) else {
            return;
        };
        self.db.sink().record(MetricsEvent::RowsScanned {
            entity: &self.entity.name,
            rows_scanned: len as u64,
        });
    }
}
