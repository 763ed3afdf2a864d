use crate::{
    config::QueryConfig,
    db::{
        predicate::{Predicate, matches, prepare},
        query::{
            QueryError,
            order::{OrderBy, RowOrder},
            page::Window,
        },
        relation::RowRef,
    },
    model::{EntityModel, RelationModel, Schema},
    value::Value,
};
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::collections::BTreeMap;

///
/// Selection
///
/// Shape of each returned record: scalar fields (all when unset), included
/// relations and per-relation counts.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    pub fields: Option<Vec<String>>,
    pub include: BTreeMap<String, Include>,
    pub count: BTreeMap<String, Option<Predicate>>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn include(mut self, relation: impl Into<String>, include: Include) -> Self {
        self.include.insert(relation.into(), include);
        self
    }

    /// Attach the number of related rows under `_count`.
    #[must_use]
    pub fn count(mut self, relation: impl Into<String>) -> Self {
        self.count.insert(relation.into(), None);
        self
    }

    /// Attach the number of related rows matching `filter` under `_count`.
    #[must_use]
    pub fn count_where(mut self, relation: impl Into<String>, filter: Predicate) -> Self {
        self.count.insert(relation.into(), Some(filter));
        self
    }

    /// Check names, include depth and nested filters; returns the prepared
    /// form used for projection.
    pub(crate) fn prepare(
        &self,
        schema: &Schema,
        entity: &EntityModel,
        depth: u8,
        max_depth: u8,
    ) -> Result<Self, QueryError> {
        if let Some(fields) = &self.fields {
            for field in fields {
                if entity.get_field(field).is_none() {
                    return Err(QueryError::unknown_field(entity, field));
                }
            }
        }

        if !self.include.is_empty() && depth >= max_depth {
            return Err(QueryError::IncludeTooDeep { max: max_depth });
        }

        let mut include = BTreeMap::new();
        for (name, args) in &self.include {
            let (relation, target) = resolve_relation(schema, entity, name)?;
            let prepared = args.prepare(schema, target, relation.is_many(), depth + 1, max_depth)?;
            include.insert(name.clone(), prepared);
        }

        let mut count = BTreeMap::new();
        for (name, filter) in &self.count {
            let (_, target) = resolve_relation(schema, entity, name)?;
            let filter = filter
                .as_ref()
                .map(|f| prepare(schema, target, f))
                .transpose()?;
            count.insert(name.clone(), filter);
        }

        Ok(Self {
            fields: self.fields.clone(),
            include,
            count,
        })
    }

    /// Build the result view of `row`.
    pub(crate) fn project(&self, row: &RowRef<'_>, config: &QueryConfig) -> RecordView {
        let fields = row
            .entity
            .fields
            .iter()
            .filter(|f| {
                self.fields
                    .as_ref()
                    .is_none_or(|selected| selected.contains(&f.name))
            })
            .map(|f| (f.name.clone(), row.value(&f.name).clone()))
            .collect();

        let relations = self
            .include
            .iter()
            .map(|(name, include)| {
                let related = row.relation(name).unwrap_or_default();
                let view = if include.many {
                    RelationView::Many(include.project_many(related, config))
                } else {
                    RelationView::One(
                        related
                            .first()
                            .map(|r| Box::new(include.select.project(r, config))),
                    )
                };
                (name.clone(), view)
            })
            .collect();

        let counts = self
            .count
            .iter()
            .map(|(name, filter)| {
                let related = row.relation(name).unwrap_or_default();
                let n = match filter {
                    Some(filter) => related.iter().filter(|r| matches(*r, filter)).count(),
                    None => related.len(),
                };
                (name.clone(), n as u64)
            })
            .collect();

        RecordView {
            fields,
            relations,
            counts,
        }
    }
}

fn resolve_relation<'s>(
    schema: &'s Schema,
    entity: &'s EntityModel,
    name: &str,
) -> Result<(&'s RelationModel, &'s EntityModel), QueryError> {
    let relation = entity
        .get_relation(name)
        .ok_or_else(|| QueryError::unknown_relation(entity, name))?;
    let target = schema
        .relation_target(relation)
        .ok_or_else(|| QueryError::unknown_relation(entity, name))?;

    Ok((relation, target))
}

///
/// Include
///
/// Arguments for one included relation. Filtering, ordering and paging
/// apply to to-many relations only.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Include {
    pub filter: Option<Predicate>,
    pub order_by: Vec<OrderBy>,
    pub skip: usize,
    pub take: Option<i64>,
    pub select: Selection,
    many: bool,
}

impl Include {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(predicate);
        self
    }

    #[must_use]
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    #[must_use]
    pub const fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub const fn take(mut self, take: i64) -> Self {
        self.take = Some(take);
        self
    }

    #[must_use]
    pub fn select(mut self, select: Selection) -> Self {
        self.select = select;
        self
    }

    fn prepare(
        &self,
        schema: &Schema,
        target: &EntityModel,
        many: bool,
        depth: u8,
        max_depth: u8,
    ) -> Result<Self, QueryError> {
        let filter = self
            .filter
            .as_ref()
            .map(|f| prepare(schema, target, f))
            .transpose()?;
        for term in &self.order_by {
            term.validate(schema, target)?;
        }

        Ok(Self {
            filter,
            order_by: self.order_by.clone(),
            skip: self.skip,
            take: self.take,
            select: self.select.prepare(schema, target, depth, max_depth)?,
            many,
        })
    }

    fn project_many(&self, related: Vec<RowRef<'_>>, config: &QueryConfig) -> Vec<RecordView> {
        let Some(first) = related.first() else {
            return Vec::new();
        };
        let order = RowOrder::new(first.entity, &self.order_by);

        let rows: Vec<_> = related
            .into_iter()
            .filter(|row| self.filter.as_ref().is_none_or(|f| matches(row, f)))
            .collect();
        let window = Window {
            cursor: None,
            skip: self.skip,
            take: Window::resolve_take(self.take, config),
        };

        window
            .apply(&order, order.sort(rows))
            .iter()
            .map(|row| self.select.project(row, config))
            .collect()
    }
}

///
/// RelationView
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RelationView {
    One(Option<Box<RecordView>>),
    Many(Vec<RecordView>),
}

impl RelationView {
    #[must_use]
    pub fn as_one(&self) -> Option<&RecordView> {
        match self {
            Self::One(view) => view.as_deref(),
            Self::Many(_) => None,
        }
    }

    #[must_use]
    pub fn as_many(&self) -> &[RecordView] {
        match self {
            Self::Many(views) => views,
            Self::One(_) => &[],
        }
    }
}

///
/// RecordView
///
/// One returned record. Serializes as a map: scalar fields in declaration
/// order, then included relations, then `_count`.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordView {
    fields: Vec<(String, Value)>,
    relations: BTreeMap<String, RelationView>,
    counts: BTreeMap<String, u64>,
}

impl RecordView {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(f, _)| f == field).map(|(_, v)| v)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(f, v)| (f.as_str(), v))
    }

    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&RelationView> {
        self.relations.get(name)
    }

    #[must_use]
    pub fn count(&self, relation: &str) -> Option<u64> {
        self.counts.get(relation).copied()
    }
}

impl Serialize for RecordView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(!self.counts.is_empty());
        let mut map =
            serializer.serialize_map(Some(self.fields.len() + self.relations.len() + extra))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        for (name, view) in &self.relations {
            map.serialize_entry(name, view)?;
        }
        if !self.counts.is_empty() {
            map.serialize_entry("_count", &self.counts)?;
        }

        map.end()
    }
}
