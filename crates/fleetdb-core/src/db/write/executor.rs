use crate::{
    db::{
        predicate::{Predicate, compare_eq, matches, prepare},
        query::WhereUnique,
        relation::ReadCtx,
        store::{Record, RowKey, Store},
        write::{
            CreateInput, CreateManyArgs, RelationWrite, UpdateInput, WriteError,
            check::{check_create, check_update},
            ops::{apply_op, coerce_value},
        },
    },
    model::{EntityModel, FieldDefault, FieldModel, ReferentialAction, RelationModel, Schema},
    value::{TextMode, Value},
};
use chrono::Utc;
use std::collections::BTreeMap;
use ulid::Ulid;

///
/// WriteExecutor
///
/// Applies mutations to the store. Every public operation runs inside a
/// savepoint and is rolled back as a whole when any step fails.
///

pub(crate) struct WriteExecutor<'a> {
    schema: &'a Schema,
    store: &'a mut Store,
}

impl<'a> WriteExecutor<'a> {
    pub const fn new(schema: &'a Schema, store: &'a mut Store) -> Self {
        Self { schema, store }
    }

    fn ctx(&self) -> ReadCtx<'_> {
        ReadCtx::new(self.schema, &*self.store)
    }

    /// Run `f` atomically: its writes are kept on success and undone on error.
    fn atomic<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, WriteError>,
    ) -> Result<T, WriteError> {
        let savepoint = self.store.savepoint();
        let out = f(self);
        match &out {
            Ok(_) => self.store.release(savepoint),
            Err(_) => self.store.rollback_to(savepoint),
        }

        out
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    pub fn create(
        &mut self,
        entity: &'a EntityModel,
        input: &CreateInput,
    ) -> Result<RowKey, WriteError> {
        check_create(self.schema, entity, input, true)?;

        self.atomic(|w| w.insert(entity, input))
    }

    pub fn create_many(
        &mut self,
        entity: &'a EntityModel,
        args: &CreateManyArgs,
    ) -> Result<u64, WriteError> {
        for input in &args.data {
            check_create(self.schema, entity, input, false)?;
        }

        self.atomic(|w| {
            let mut count = 0;
            for input in &args.data {
                if !args.skip_duplicates {
                    w.insert(entity, input)?;
                    count += 1;
                    continue;
                }

                let savepoint = w.store.savepoint();
                match w.insert(entity, input) {
                    Ok(_) => {
                        w.store.release(savepoint);
                        count += 1;
                    }
                    Err(WriteError::UniqueViolation { .. }) => w.store.rollback_to(savepoint),
                    Err(err) => {
                        w.store.rollback_to(savepoint);
                        return Err(err);
                    }
                }
            }

            Ok(count)
        })
    }

    pub fn update(
        &mut self,
        entity: &'a EntityModel,
        filter: &WhereUnique,
        input: &UpdateInput,
    ) -> Result<RowKey, WriteError> {
        check_update(self.schema, entity, input, true)?;
        let key = self
            .find_unique_key(entity, filter)?
            .ok_or_else(|| WriteError::not_found(&entity.name))?;

        self.atomic(|w| w.update_row(entity, &key, input))
    }

    pub fn update_many(
        &mut self,
        entity: &'a EntityModel,
        filter: Option<&Predicate>,
        input: &UpdateInput,
    ) -> Result<u64, WriteError> {
        check_update(self.schema, entity, input, false)?;
        let keys = self.matching_keys(entity, filter)?;

        self.atomic(|w| {
            for key in &keys {
                w.update_row(entity, key, input)?;
            }
            Ok(keys.len() as u64)
        })
    }

    pub fn upsert(
        &mut self,
        entity: &'a EntityModel,
        filter: &WhereUnique,
        create: &CreateInput,
        update: &UpdateInput,
    ) -> Result<RowKey, WriteError> {
        check_create(self.schema, entity, create, true)?;
        check_update(self.schema, entity, update, true)?;

        match self.find_unique_key(entity, filter)? {
            Some(key) => self.atomic(|w| w.update_row(entity, &key, update)),
            None => self.atomic(|w| w.insert(entity, create)),
        }
    }

    pub fn delete(
        &mut self,
        entity: &'a EntityModel,
        filter: &WhereUnique,
    ) -> Result<RowKey, WriteError> {
        let key = self
            .find_unique_key(entity, filter)?
            .ok_or_else(|| WriteError::not_found(&entity.name))?;
        self.atomic(|w| w.delete_row(entity, &key))?;

        Ok(key)
    }

    pub fn delete_many(
        &mut self,
        entity: &'a EntityModel,
        filter: Option<&Predicate>,
    ) -> Result<u64, WriteError> {
        let keys = self.matching_keys(entity, filter)?;

        self.atomic(|w| {
            let mut count = 0;
            for key in &keys {
                // a cascade may already have removed a later row
                if w.delete_row(entity, key)? {
                    count += 1;
                }
            }
            Ok(count)
        })
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    pub fn find_unique_key(
        &self,
        entity: &EntityModel,
        filter: &WhereUnique,
    ) -> Result<Option<RowKey>, WriteError> {
        Ok(filter.find(self.ctx(), entity)?.map(|row| row.key()))
    }

    fn matching_keys(
        &self,
        entity: &EntityModel,
        filter: Option<&Predicate>,
    ) -> Result<Vec<RowKey>, WriteError> {
        let filter = filter
            .map(|f| prepare(self.schema, entity, f))
            .transpose()?;

        Ok(self
            .ctx()
            .rows(entity)
            .filter(|row| filter.as_ref().is_none_or(|f| matches(row, f)))
            .map(|row| row.key())
            .collect())
    }

    fn record(&self, entity: &EntityModel, key: &RowKey) -> Result<&Record, WriteError> {
        self.store
            .get(&entity.name, key)
            .ok_or_else(|| WriteError::not_found(&entity.name))
    }

    fn target(&self, relation: &RelationModel) -> Result<&'a EntityModel, WriteError> {
        let schema: &'a Schema = self.schema;

        schema
            .relation_target(relation)
            .ok_or_else(|| WriteError::unknown_relation(&relation.target, &relation.name))
    }

    /// Primary keys of the rows `relation` resolves to from `key`.
    fn related_keys(
        &self,
        entity: &EntityModel,
        key: &RowKey,
        relation: &RelationModel,
    ) -> Result<Vec<RowKey>, WriteError> {
        let target = self.target(relation)?;
        let record = self.record(entity, key)?;

        Ok(self
            .ctx()
            .related(relation, record)
            .into_iter()
            .map(|r| RowKey::new(r.value(&target.primary_key).clone()))
            .collect())
    }

    /// Related row selected by `filter`, if it is related to `key`.
    fn find_related(
        &self,
        entity: &EntityModel,
        key: &RowKey,
        relation: &RelationModel,
        filter: &WhereUnique,
    ) -> Result<Option<RowKey>, WriteError> {
        let target = self.target(relation)?;
        let related = self.related_keys(entity, key, relation)?;

        Ok(self
            .find_unique_key(target, filter)?
            .filter(|candidate| related.contains(candidate)))
    }

    /// Rows of `owner` whose `relation` foreign key equals `referenced`.
    fn referencing_keys(
        &self,
        owner: &EntityModel,
        relation: &RelationModel,
        referenced: &Value,
    ) -> Vec<RowKey> {
        self.ctx()
            .rows(owner)
            .filter(|row| {
                compare_eq(row.value(&relation.local_field), referenced, TextMode::Cs) == Some(true)
            })
            .map(|row| row.key())
            .collect()
    }

    // ------------------------------------------------------------------
    // Row writes
    // ------------------------------------------------------------------

    fn insert(
        &mut self,
        entity: &'a EntityModel,
        input: &CreateInput,
    ) -> Result<RowKey, WriteError> {
        // Phase 1: owner-side relations resolve the foreign keys this row holds.
        let mut provided: BTreeMap<String, Value> = input.values.iter().cloned().collect();
        for (name, write) in &input.relations {
            let relation = self.relation(entity, name)?;
            if relation.is_owner() {
                let fk = self.resolve_owner_target(relation, write)?;
                provided.insert(relation.local_field.clone(), fk);
            }
        }

        // Phase 2: explicit values, then defaults.
        let mut record = Record::new();
        for field in &entity.fields {
            let value = match provided.remove(&field.name) {
                Some(value) => coerce_value(&entity.name, field, &value)?,
                None => self.default_value(entity, field)?,
            };
            record.set(field.name.clone(), value);
        }

        // Phase 3: integrity, then store.
        self.check_foreign_keys(entity, &record, None)?;
        self.check_unique(entity, &record, None)?;
        let key = RowKey::new(record.value(&entity.primary_key).clone());
        self.store.put(&entity.name, key.clone(), record)?;

        // Phase 4: inverse-side relations point their rows at this one.
        for (name, write) in &input.relations {
            let relation = self.relation(entity, name)?;
            if !relation.is_owner() {
                self.write_inverse(entity, &key, relation, write)?;
            }
        }

        Ok(key)
    }

    fn update_row(
        &mut self,
        entity: &'a EntityModel,
        key: &RowKey,
        input: &UpdateInput,
    ) -> Result<RowKey, WriteError> {
        let current = self.record(entity, key)?.clone();
        let mut next = current.clone();

        // Phase 1: owner-side relation writes rewrite this row's foreign keys.
        for (name, write) in &input.relations {
            let relation = self.relation(entity, name)?;
            if relation.is_owner() {
                self.write_owner(entity, key, relation, write, &mut next)?;
            }
        }

        // Phase 2: scalar operations.
        for (name, op) in &input.ops {
            let field = entity
                .get_field(name)
                .ok_or_else(|| WriteError::unknown_field(&entity.name, name))?;
            let value = apply_op(&entity.name, field, next.value(name), op)?;
            next.set(name.clone(), value);
        }
        for field in &entity.fields {
            if field.default == Some(FieldDefault::UpdatedAt) && !input.sets(&field.name) {
                next.set(field.name.clone(), Value::Timestamp(Utc::now()));
            }
        }

        // Phase 3: integrity, then store.
        let new_key = self.replace_row(entity, key, &current, next)?;

        // Phase 4: inverse-side relation writes.
        for (name, write) in &input.relations {
            let relation = self.relation(entity, name)?;
            if !relation.is_owner() {
                self.write_inverse(entity, &new_key, relation, write)?;
            }
        }

        Ok(new_key)
    }

    /// Check and store `next` in place of `current`, moving the row if its
    /// primary key changed.
    fn replace_row(
        &mut self,
        entity: &EntityModel,
        key: &RowKey,
        current: &Record,
        next: Record,
    ) -> Result<RowKey, WriteError> {
        self.check_key_changes(entity, current, &next)?;
        self.check_foreign_keys(entity, &next, Some(current))?;
        self.check_unique(entity, &next, Some(key))?;

        let new_key = RowKey::new(next.value(&entity.primary_key).clone());
        if new_key != *key {
            self.store.remove(&entity.name, key)?;
        }
        self.store.put(&entity.name, new_key.clone(), next)?;

        Ok(new_key)
    }

    fn set_field(
        &mut self,
        entity: &EntityModel,
        key: &RowKey,
        field: &str,
        value: Value,
    ) -> Result<(), WriteError> {
        let current = self.record(entity, key)?.clone();
        let next = current.clone().with(field, value);
        self.replace_row(entity, key, &current, next)?;

        Ok(())
    }

    /// Delete a row and apply every referential action pointing at it.
    /// Returns false if the row was already gone.
    fn delete_row(&mut self, entity: &EntityModel, key: &RowKey) -> Result<bool, WriteError> {
        let Some(record) = self.store.remove(&entity.name, key)? else {
            return Ok(false);
        };

        let schema = self.schema;
        for (owner, relation) in schema.referencing_relations(&entity.name) {
            let referenced = record.value(&relation.foreign_field);
            if referenced.is_null() {
                continue;
            }
            let dependents = self.referencing_keys(owner, relation, referenced);
            if dependents.is_empty() {
                continue;
            }

            match schema.delete_action(owner, relation) {
                ReferentialAction::Restrict => {
                    return Err(WriteError::RestrictViolation {
                        entity: owner.name.clone(),
                        relation: relation.name.clone(),
                    });
                }
                ReferentialAction::Cascade => {
                    for dependent in &dependents {
                        self.delete_row(owner, dependent)?;
                    }
                }
                ReferentialAction::SetNull => {
                    for dependent in dependents {
                        let cleared = self
                            .record(owner, &dependent)?
                            .clone()
                            .with(relation.local_field.clone(), Value::Null);
                        self.store.put(&owner.name, dependent, cleared)?;
                    }
                }
            }
        }

        Ok(true)
    }

    // ------------------------------------------------------------------
    // Nested relation writes
    // ------------------------------------------------------------------

    fn relation(
        &self,
        entity: &'a EntityModel,
        name: &str,
    ) -> Result<&'a RelationModel, WriteError> {
        entity
            .get_relation(name)
            .ok_or_else(|| WriteError::unknown_relation(&entity.name, name))
    }

    /// Foreign key value an owner-side create, connect or connect-or-create
    /// resolves to.
    fn resolve_owner_target(
        &mut self,
        relation: &RelationModel,
        write: &RelationWrite,
    ) -> Result<Value, WriteError> {
        let target = self.target(relation)?;
        let target_key = match write {
            RelationWrite::Create(input) => self.insert(target, input)?,
            RelationWrite::Connect(filter) => self
                .find_unique_key(target, filter)?
                .ok_or_else(|| related_not_found(relation))?,
            RelationWrite::ConnectOrCreate { filter, create } => {
                match self.find_unique_key(target, filter)? {
                    Some(key) => key,
                    None => self.insert(target, create)?,
                }
            }
            other => return Err(not_allowed(relation, other)),
        };

        Ok(self
            .record(target, &target_key)?
            .value(&relation.foreign_field)
            .clone())
    }

    /// Apply an owner-side write during update; foreign key changes land in
    /// `next`.
    fn write_owner(
        &mut self,
        entity: &'a EntityModel,
        key: &RowKey,
        relation: &'a RelationModel,
        write: &RelationWrite,
        next: &mut Record,
    ) -> Result<(), WriteError> {
        let target = self.target(relation)?;
        let current = self.related_keys(entity, key, relation)?.into_iter().next();

        match write {
            RelationWrite::Create(_)
            | RelationWrite::Connect(_)
            | RelationWrite::ConnectOrCreate { .. } => {
                let fk = self.resolve_owner_target(relation, write)?;
                next.set(relation.local_field.clone(), fk);
            }
            RelationWrite::Disconnect(None) => {
                next.set(relation.local_field.clone(), Value::Null);
            }
            RelationWrite::Delete(None) => {
                let related = current.ok_or_else(|| related_not_found(relation))?;
                // detach first so the delete does not act on this row
                self.set_field(entity, key, &relation.local_field, Value::Null)?;
                next.set(relation.local_field.clone(), Value::Null);
                self.delete_row(target, &related)?;
            }
            RelationWrite::Update { filter: None, data } => {
                let related = current.ok_or_else(|| related_not_found(relation))?;
                self.update_row(target, &related, data)?;
            }
            RelationWrite::Upsert {
                filter: None,
                create,
                update,
            } => match current {
                Some(related) => {
                    self.update_row(target, &related, update)?;
                }
                None => {
                    let created = self.insert(target, create)?;
                    let fk = self
                        .record(target, &created)?
                        .value(&relation.foreign_field)
                        .clone();
                    next.set(relation.local_field.clone(), fk);
                }
            },
            other => return Err(not_allowed(relation, other)),
        }

        Ok(())
    }

    /// Apply an inverse-side write for the stored row at `key`.
    fn write_inverse(
        &mut self,
        entity: &'a EntityModel,
        key: &RowKey,
        relation: &'a RelationModel,
        write: &RelationWrite,
    ) -> Result<(), WriteError> {
        let target = self.target(relation)?;
        let local = self.record(entity, key)?.value(&relation.local_field).clone();
        let fk = relation.foreign_field.as_str();

        match write {
            RelationWrite::Create(input) => {
                self.insert(target, &input.clone().set(fk, local))?;
            }
            RelationWrite::Connect(filter) => {
                let related = self
                    .find_unique_key(target, filter)?
                    .ok_or_else(|| related_not_found(relation))?;
                self.connect_inverse(entity, key, relation, &related, local)?;
            }
            RelationWrite::ConnectOrCreate { filter, create } => {
                match self.find_unique_key(target, filter)? {
                    Some(related) => self.connect_inverse(entity, key, relation, &related, local)?,
                    None => {
                        self.insert(target, &create.clone().set(fk, local))?;
                    }
                }
            }
            RelationWrite::Disconnect(filter) => {
                let related = self.select_related(entity, key, relation, filter.as_ref())?;
                for row in related {
                    self.set_field(target, &row, fk, Value::Null)?;
                }
            }
            RelationWrite::Set(filters) => {
                let mut wanted = Vec::with_capacity(filters.len());
                for filter in filters {
                    wanted.push(
                        self.find_unique_key(target, filter)?
                            .ok_or_else(|| related_not_found(relation))?,
                    );
                }
                for row in self.related_keys(entity, key, relation)? {
                    if !wanted.contains(&row) {
                        self.set_field(target, &row, fk, Value::Null)?;
                    }
                }
                for row in &wanted {
                    self.set_field(target, row, fk, local.clone())?;
                }
            }
            RelationWrite::Delete(filter) => {
                let related = self.select_related(entity, key, relation, filter.as_ref())?;
                if related.is_empty() {
                    return Err(related_not_found(relation));
                }
                for row in &related {
                    self.delete_row(target, row)?;
                }
            }
            RelationWrite::Update { filter, data } => {
                let related = self.select_related(entity, key, relation, filter.as_ref())?;
                if related.is_empty() {
                    return Err(related_not_found(relation));
                }
                for row in &related {
                    self.update_row(target, row, data)?;
                }
            }
            RelationWrite::UpdateMany { filter, data } => {
                for row in self.related_matching(entity, key, relation, filter)? {
                    self.update_row(target, &row, data)?;
                }
            }
            RelationWrite::DeleteMany(filter) => {
                for row in self.related_matching(entity, key, relation, filter)? {
                    self.delete_row(target, &row)?;
                }
            }
            RelationWrite::Upsert {
                filter,
                create,
                update,
            } => {
                let related = self.select_related(entity, key, relation, filter.as_ref())?;
                match related.first() {
                    Some(row) => {
                        self.update_row(target, row, update)?;
                    }
                    None => {
                        self.insert(target, &create.clone().set(fk, local))?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Point `related` at this row. A to-one relation first releases the
    /// row it currently holds.
    fn connect_inverse(
        &mut self,
        entity: &EntityModel,
        key: &RowKey,
        relation: &RelationModel,
        related: &RowKey,
        local: Value,
    ) -> Result<(), WriteError> {
        let target = self.target(relation)?;
        if !relation.is_many() {
            for held in self.related_keys(entity, key, relation)? {
                if held == *related {
                    continue;
                }
                let nullable = target
                    .get_field(&relation.foreign_field)
                    .is_some_and(|f| f.nullable);
                if !nullable {
                    return Err(WriteError::RequiredRelation {
                        entity: entity.name.clone(),
                        relation: relation.name.clone(),
                    });
                }
                self.set_field(target, &held, &relation.foreign_field, Value::Null)?;
            }
        }

        self.set_field(target, related, &relation.foreign_field, local)
    }

    /// Related rows named by `filter`, or the single to-one row.
    fn select_related(
        &self,
        entity: &EntityModel,
        key: &RowKey,
        relation: &RelationModel,
        filter: Option<&WhereUnique>,
    ) -> Result<Vec<RowKey>, WriteError> {
        match filter {
            Some(filter) => Ok(self
                .find_related(entity, key, relation, filter)?
                .into_iter()
                .collect()),
            None => self.related_keys(entity, key, relation),
        }
    }

    fn related_matching(
        &self,
        entity: &EntityModel,
        key: &RowKey,
        relation: &RelationModel,
        filter: &Predicate,
    ) -> Result<Vec<RowKey>, WriteError> {
        let target = self.target(relation)?;
        let filter = prepare(self.schema, target, filter)?;
        let record = self.record(entity, key)?;

        Ok(self
            .ctx()
            .related_rows(relation, record)
            .into_iter()
            .filter(|row| matches(row, &filter))
            .map(|row| row.key())
            .collect())
    }

    // ------------------------------------------------------------------
    // Integrity
    // ------------------------------------------------------------------

    fn default_value(
        &mut self,
        entity: &EntityModel,
        field: &FieldModel,
    ) -> Result<Value, WriteError> {
        let missing = || WriteError::MissingField {
            entity: entity.name.clone(),
            field: field.name.clone(),
        };

        match &field.default {
            Some(FieldDefault::Autoincrement) => {
                let next = self.store.next_sequence(&entity.name, &field.name)?;
                field
                    .kind
                    .coerce(&Value::Uint(next))
                    .ok_or_else(|| WriteError::Overflow {
                        field: field.name.clone(),
                        op: "autoincrement",
                    })
            }
            Some(FieldDefault::Now | FieldDefault::UpdatedAt) => Ok(Value::Timestamp(Utc::now())),
            Some(FieldDefault::GeneratedUlid) => Ok(Value::Ulid(Ulid::new())),
            Some(FieldDefault::Value(value)) => coerce_value(&entity.name, field, value),
            None if field.nullable => Ok(Value::Null),
            None => Err(missing()),
        }
    }

    /// Every changed, non-null owner-side foreign key must reference a row.
    fn check_foreign_keys(
        &self,
        entity: &EntityModel,
        record: &Record,
        previous: Option<&Record>,
    ) -> Result<(), WriteError> {
        for relation in entity.relations.iter().filter(|r| r.is_owner()) {
            let value = record.value(&relation.local_field);
            let unchanged = previous.is_some_and(|p| p.value(&relation.local_field) == value);
            if value.is_null() || unchanged {
                continue;
            }
            if self.ctx().related(relation, record).is_empty() {
                return Err(WriteError::ForeignKeyViolation {
                    entity: entity.name.clone(),
                    relation: relation.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// No other row may hold the same values for any unique constraint.
    /// Constraints with a null member are not enforced.
    fn check_unique(
        &self,
        entity: &EntityModel,
        record: &Record,
        own_key: Option<&RowKey>,
    ) -> Result<(), WriteError> {
        for constraint in entity.unique_constraints() {
            let values: Vec<&Value> = constraint.iter().map(|f| record.value(f)).collect();
            if values.iter().any(|v| v.is_null()) {
                continue;
            }

            let taken = self.ctx().rows(entity).any(|row| {
                own_key.is_none_or(|own| row.key() != *own)
                    && constraint
                        .iter()
                        .zip(&values)
                        .all(|(field, value)| row.value(field) == *value)
            });
            if taken {
                return Err(WriteError::UniqueViolation {
                    entity: entity.name.clone(),
                    fields: constraint,
                });
            }
        }

        Ok(())
    }

    /// A referenced key column may only change while nothing references it.
    fn check_key_changes(
        &self,
        entity: &EntityModel,
        current: &Record,
        next: &Record,
    ) -> Result<(), WriteError> {
        for (owner, relation) in self.schema.referencing_relations(&entity.name) {
            let before = current.value(&relation.foreign_field);
            if before.is_null() || before == next.value(&relation.foreign_field) {
                continue;
            }
            if !self.referencing_keys(owner, relation, before).is_empty() {
                return Err(WriteError::KeyInUse {
                    entity: entity.name.clone(),
                    field: relation.foreign_field.clone(),
                });
            }
        }

        Ok(())
    }
}

fn related_not_found(relation: &RelationModel) -> WriteError {
    WriteError::RelatedNotFound {
        relation: relation.name.clone(),
    }
}

fn not_allowed(relation: &RelationModel, write: &RelationWrite) -> WriteError {
    WriteError::NestedOpNotAllowed {
        relation: relation.name.clone(),
        op: write.label(),
    }
}
