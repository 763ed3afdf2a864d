use crate::{
    db::{query::QueryError, relation::RowRef},
    model::{EntityModel, Schema},
    value::Value,
};
use std::cmp::Ordering;

///
/// SortOrder
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

///
/// NullsOrder
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NullsOrder {
    First,
    Last,
}

///
/// OrderTarget
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OrderTarget {
    Field(String),
    /// Scalar field of a to-one related row.
    RelationField { relation: String, field: String },
    /// Number of rows behind a relation.
    RelationCount(String),
}

///
/// OrderBy
///
/// One ordering term. When `nulls` is unset, nulls sort last ascending and
/// first descending.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderBy {
    pub target: OrderTarget,
    pub direction: SortOrder,
    pub nulls: Option<NullsOrder>,
}

impl OrderBy {
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self::field(field, SortOrder::Asc)
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self::field(field, SortOrder::Desc)
    }

    #[must_use]
    pub fn field(field: impl Into<String>, direction: SortOrder) -> Self {
        Self {
            target: OrderTarget::Field(field.into()),
            direction,
            nulls: None,
        }
    }

    #[must_use]
    pub fn relation(
        relation: impl Into<String>,
        field: impl Into<String>,
        direction: SortOrder,
    ) -> Self {
        Self {
            target: OrderTarget::RelationField {
                relation: relation.into(),
                field: field.into(),
            },
            direction,
            nulls: None,
        }
    }

    #[must_use]
    pub fn count(relation: impl Into<String>, direction: SortOrder) -> Self {
        Self {
            target: OrderTarget::RelationCount(relation.into()),
            direction,
            nulls: None,
        }
    }

    #[must_use]
    pub const fn nulls(mut self, nulls: NullsOrder) -> Self {
        self.nulls = Some(nulls);
        self
    }

    const fn effective_nulls(&self) -> NullsOrder {
        match (self.nulls, self.direction) {
            (Some(nulls), _) => nulls,
            (None, SortOrder::Asc) => NullsOrder::Last,
            (None, SortOrder::Desc) => NullsOrder::First,
        }
    }

    /// Check the term against `entity`.
    pub(crate) fn validate(
        &self,
        schema: &Schema,
        entity: &EntityModel,
    ) -> Result<(), QueryError> {
        match &self.target {
            OrderTarget::Field(field) => ensure_orderable(entity, field),
            OrderTarget::RelationField { relation, field } => {
                let model = entity
                    .get_relation(relation)
                    .ok_or_else(|| QueryError::unknown_relation(entity, relation))?;
                if model.is_many() {
                    return Err(QueryError::OrderThroughToMany {
                        relation: relation.clone(),
                    });
                }
                let target = schema
                    .relation_target(model)
                    .ok_or_else(|| QueryError::unknown_relation(entity, relation))?;

                ensure_orderable(target, field)
            }
            OrderTarget::RelationCount(relation) => entity
                .get_relation(relation)
                .map(|_| ())
                .ok_or_else(|| QueryError::unknown_relation(entity, relation)),
        }
    }

    /// Sort key of `row` for this term.
    pub(crate) fn key(&self, row: &RowRef<'_>) -> Value {
        match &self.target {
            OrderTarget::Field(field) => row.value(field).clone(),
            OrderTarget::RelationField { relation, field } => row
                .relation(relation)
                .and_then(|related| related.first().map(|r| r.value(field).clone()))
                .unwrap_or(Value::Null),
            OrderTarget::RelationCount(relation) => {
                let count = row.relation(relation).map_or(0, |related| related.len());
                Value::Uint(count as u64)
            }
        }
    }

    /// Compare two sort keys under this term's direction and null placement.
    pub(crate) fn compare(&self, left: &Value, right: &Value) -> Ordering {
        match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => match self.effective_nulls() {
                NullsOrder::First => Ordering::Less,
                NullsOrder::Last => Ordering::Greater,
            },
            (false, true) => match self.effective_nulls() {
                NullsOrder::First => Ordering::Greater,
                NullsOrder::Last => Ordering::Less,
            },
            (false, false) => {
                let ord = Value::canonical_cmp(left, right);
                match self.direction {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            }
        }
    }
}

fn ensure_orderable(entity: &EntityModel, field: &str) -> Result<(), QueryError> {
    let model = entity
        .get_field(field)
        .ok_or_else(|| QueryError::unknown_field(entity, field))?;
    if !model.kind.is_orderable() {
        return Err(QueryError::NotOrderable {
            entity: entity.name.clone(),
            field: field.to_string(),
        });
    }

    Ok(())
}

///
/// RowOrder
///
/// Resolved ordering: the requested terms plus the primary key ascending
/// as the final tiebreaker.
///

#[derive(Clone, Debug)]
pub(crate) struct RowOrder {
    terms: Vec<OrderBy>,
}

impl RowOrder {
    pub fn new(entity: &EntityModel, terms: &[OrderBy]) -> Self {
        let mut terms = terms.to_vec();
        let pk_listed = terms
            .iter()
            .any(|t| matches!(&t.target, OrderTarget::Field(f) if *f == entity.primary_key));
        if !pk_listed {
            terms.push(OrderBy::asc(entity.primary_key.clone()));
        }

        Self { terms }
    }

    pub fn keys(&self, row: &RowRef<'_>) -> Vec<Value> {
        self.terms.iter().map(|term| term.key(row)).collect()
    }

    pub fn compare_keys(&self, left: &[Value], right: &[Value]) -> Ordering {
        self.terms
            .iter()
            .zip(left.iter().zip(right))
            .map(|(term, (l, r))| term.compare(l, r))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Stable sort of `rows` by this order.
    pub fn sort<'a>(&self, rows: Vec<RowRef<'a>>) -> Vec<(Vec<Value>, RowRef<'a>)> {
        let mut keyed: Vec<_> = rows.into_iter().map(|row| (self.keys(&row), row)).collect();
        keyed.sort_by(|(a, _), (b, _)| self.compare_keys(a, b));

        keyed
    }
}
