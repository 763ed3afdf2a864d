use crate::{
    db::{
        predicate::{Predicate, matches, prepare},
        query::QueryError,
        relation::{ReadCtx, RowRef},
        store::RowKey,
    },
    model::EntityModel,
    value::Value,
};

///
/// WhereUnique
///
/// Selects at most one row: values for exactly one unique constraint
/// (primary key, a unique field or a compound unique), optionally narrowed
/// by an extra filter.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WhereUnique {
    pub fields: Vec<(String, Value)>,
    pub filter: Option<Predicate>,
}

impl WhereUnique {
    #[must_use]
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            fields: vec![(field.into(), value.into())],
            filter: None,
        }
    }

    /// Add another field of a compound unique constraint.
    #[must_use]
    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((field.into(), value.into()));
        self
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(predicate);
        self
    }

    /// Check the field set and coerce every value to its field kind.
    pub(crate) fn resolve(
        &self,
        ctx: ReadCtx<'_>,
        entity: &EntityModel,
    ) -> Result<ResolvedUnique, QueryError> {
        let names: Vec<&str> = self.fields.iter().map(|(f, _)| f.as_str()).collect();
        if !entity.is_unique_key(&names) {
            return Err(QueryError::NotUniqueWhere {
                entity: entity.name.clone(),
                fields: names.iter().map(ToString::to_string).collect(),
            });
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            let model = entity
                .get_field(name)
                .ok_or_else(|| QueryError::unknown_field(entity, name))?;
            let coerced = model
                .kind
                .coerce(value)
                .ok_or_else(|| QueryError::InvalidUniqueValue {
                    field: name.clone(),
                    message: format!("expected {}, found {}", model.kind, value.kind_label()),
                })?;
            fields.push((name.clone(), coerced));
        }

        let filter = self
            .filter
            .as_ref()
            .map(|filter| prepare(ctx.schema, entity, filter))
            .transpose()?;

        Ok(ResolvedUnique { fields, filter })
    }

    /// Locate the selected row, if any.
    pub(crate) fn find<'a>(
        &self,
        ctx: ReadCtx<'a>,
        entity: &'a EntityModel,
    ) -> Result<Option<RowRef<'a>>, QueryError> {
        Ok(self.resolve(ctx, entity)?.find(ctx, entity))
    }
}

///
/// ResolvedUnique
///

#[derive(Clone, Debug)]
pub(crate) struct ResolvedUnique {
    fields: Vec<(String, Value)>,
    filter: Option<Predicate>,
}

impl ResolvedUnique {
    pub fn find<'a>(&self, ctx: ReadCtx<'a>, entity: &'a EntityModel) -> Option<RowRef<'a>> {
        let row = match self.fields.as_slice() {
            [(field, value)] if *field == entity.primary_key => {
                let key = RowKey::new(value.clone());
                ctx.store
                    .get(&entity.name, &key)
                    .map(|record| RowRef::new(ctx, entity, record))
            }
            _ => ctx.rows(entity).find(|row| {
                self.fields
                    .iter()
                    .all(|(field, value)| row.value(field) == value)
            }),
        }?;

        match &self.filter {
            Some(filter) if !matches(&row, filter) => None,
            _ => Some(row),
        }
    }
}
