use crate::{
    db::{
        predicate::{FieldPresence, Row, compare_eq},
        store::{Record, RowKey, Store},
    },
    model::{EntityModel, RelationModel, Schema},
    value::{TextMode, Value},
};

///
/// ReadCtx
///
/// Borrowed view over the schema and the store used by every read path.
///

#[derive(Clone, Copy, Debug)]
pub struct ReadCtx<'a> {
    pub schema: &'a Schema,
    pub store: &'a Store,
}

impl<'a> ReadCtx<'a> {
    #[must_use]
    pub const fn new(schema: &'a Schema, store: &'a Store) -> Self {
        Self { schema, store }
    }

    /// Target rows of `relation`: those whose foreign field equals the
    /// source row's local field. A null local value relates to nothing.
    #[must_use]
    pub fn related(&self, relation: &RelationModel, record: &Record) -> Vec<&'a Record> {
        let local = record.value(&relation.local_field);
        if local.is_null() {
            return Vec::new();
        }
        let Some(target) = self.schema.relation_target(relation) else {
            return Vec::new();
        };

        // foreign key points at the target primary key: direct lookup
        if relation.foreign_field == target.primary_key {
            let key = target
                .pk_field()
                .and_then(|pk| pk.kind.coerce(local))
                .unwrap_or_else(|| local.clone());

            return self
                .store
                .get(&target.name, &RowKey::new(key))
                .into_iter()
                .collect();
        }

        let Ok(table) = self.store.table(&target.name) else {
            return Vec::new();
        };
        table
            .records()
            .filter(|candidate| {
                compare_eq(candidate.value(&relation.foreign_field), local, TextMode::Cs)
                    == Some(true)
            })
            .collect()
    }

    /// Related rows wrapped for predicate evaluation.
    #[must_use]
    pub fn related_rows(&self, relation: &RelationModel, record: &Record) -> Vec<RowRef<'a>> {
        let Some(target) = self.schema.relation_target(relation) else {
            return Vec::new();
        };

        self.related(relation, record)
            .into_iter()
            .map(|related| RowRef::new(*self, target, related))
            .collect()
    }

    /// Every row of `entity` wrapped for evaluation, in primary key order.
    pub fn rows(self, entity: &'a EntityModel) -> impl Iterator<Item = RowRef<'a>> + 'a {
        self.store
            .table(&entity.name)
            .into_iter()
            .flat_map(|table| table.records())
            .map(move |record| RowRef::new(self, entity, record))
    }
}

///
/// RowRef
///
/// A stored record bound to its entity model. Relations resolve lazily
/// through the store, so nested relation filters recurse naturally.
///

#[derive(Clone, Copy, Debug)]
pub struct RowRef<'a> {
    pub ctx: ReadCtx<'a>,
    pub entity: &'a EntityModel,
    pub record: &'a Record,
}

impl<'a> RowRef<'a> {
    #[must_use]
    pub const fn new(ctx: ReadCtx<'a>, entity: &'a EntityModel, record: &'a Record) -> Self {
        Self {
            ctx,
            entity,
            record,
        }
    }

    #[must_use]
    pub fn value(&self, field: &str) -> &'a Value {
        self.record.value(field)
    }

    /// Primary key of this row.
    #[must_use]
    pub fn key(&self) -> RowKey {
        RowKey::new(self.value(&self.entity.primary_key).clone())
    }

    /// Rows reachable through `relation`, or `None` if it is not declared.
    #[must_use]
    pub fn relation(&self, relation: &str) -> Option<Vec<Self>> {
        let model = self.entity.get_relation(relation)?;

        Some(self.ctx.related_rows(model, self.record))
    }
}

impl Row for RowRef<'_> {
    fn field(&self, name: &str) -> FieldPresence {
        if self.entity.get_field(name).is_some() {
            FieldPresence::Present(self.value(name).clone())
        } else {
            FieldPresence::Missing
        }
    }

    fn related(&self, relation: &str) -> Option<Vec<Self>> {
        self.relation(relation)
    }
}
