use crate::{
    db::{
        aggregate::{
            AggregateArgs, GroupByArgs, GroupError,
            accumulate::accumulate,
            validate::{plan_group_by, validate_spec},
        },
        predicate::{FieldPresence, Row, matches},
        query::{CountArgs, OrderTarget, QueryError, select_rows},
        relation::{ReadCtx, RowRef},
        response::{AggregateResult, CountResult, GroupRow},
        store::RowKey,
    },
    model::EntityModel,
    value::Value,
};
use std::{cmp::Ordering, collections::BTreeMap};

/// Aggregates over the rows addressed by `args.scope`.
pub(crate) fn aggregate(
    ctx: ReadCtx<'_>,
    entity: &EntityModel,
    args: &AggregateArgs,
) -> Result<AggregateResult, GroupError> {
    let kinds = args
        .aggregates
        .iter()
        .map(|spec| validate_spec(entity, spec))
        .collect::<Result<Vec<_>, _>>()?;
    let rows = select_rows(ctx, entity, &args.scope, args.scope.take)?;

    let mut result = AggregateResult::default();
    for (spec, kind) in args.aggregates.iter().zip(kinds) {
        result.insert(spec.clone(), accumulate(spec, kind, &rows)?);
    }

    Ok(result)
}

/// Row count plus non-null counts of `args.fields`.
pub(crate) fn count(
    ctx: ReadCtx<'_>,
    entity: &EntityModel,
    args: &CountArgs,
) -> Result<CountResult, GroupError> {
    for field in &args.fields {
        if entity.get_field(field).is_none() {
            return Err(QueryError::unknown_field(entity, field).into());
        }
    }
    let rows = select_rows(ctx, entity, &args.scope, args.scope.take)?;

    let fields = args
        .fields
        .iter()
        .map(|field| {
            let n = rows.iter().filter(|row| !row.value(field).is_null()).count();
            (field.clone(), n as u64)
        })
        .collect();

    Ok(CountResult {
        all: rows.len() as u64,
        fields,
    })
}

/// Group the filtered rows by `args.by`, filter groups by `having`, then
/// order and page the groups.
pub(crate) fn group_by(
    ctx: ReadCtx<'_>,
    entity: &EntityModel,
    args: &GroupByArgs,
) -> Result<Vec<GroupRow>, GroupError> {
    let plan = plan_group_by(ctx.schema, entity, args)?;

    // null keys compare equal, so they share one group
    let mut groups: BTreeMap<Vec<RowKey>, Vec<RowRef<'_>>> = BTreeMap::new();
    for row in ctx.rows(entity) {
        if plan.filter.as_ref().is_some_and(|f| !matches(&row, f)) {
            continue;
        }
        let key = plan
            .by
            .iter()
            .map(|field| RowKey::new(row.value(field).clone()))
            .collect();
        groups.entry(key).or_default().push(row);
    }

    let mut evaluated = Vec::with_capacity(groups.len());
    for (key, members) in groups {
        let mut values: BTreeMap<String, Value> = plan
            .by
            .iter()
            .cloned()
            .zip(key.into_iter().map(|k| k.value().clone()))
            .collect();
        for spec in &plan.evaluated {
            let kind = spec
                .field
                .as_deref()
                .and_then(|f| entity.get_field(f))
                .map(|f| &f.kind);
            values.insert(spec.key(), accumulate(spec, kind, &members)?);
        }

        if let Some(having) = &plan.having
            && !matches(&GroupValues(&values), having)
        {
            continue;
        }
        evaluated.push(values);
    }

    evaluated.sort_by(|a, b| {
        plan.order_by
            .iter()
            .map(|term| {
                let OrderTarget::Field(name) = &term.target else {
                    return Ordering::Equal;
                };
                term.compare(group_value(a, name), group_value(b, name))
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    });

    Ok(evaluated
        .into_iter()
        .skip(plan.skip)
        .take(plan.take.unwrap_or(usize::MAX))
        .map(|mut values| {
            let key = plan
                .by
                .iter()
                .map(|field| (field.clone(), values.remove(field).unwrap_or(Value::Null)))
                .collect();
            let mut aggregates = AggregateResult::default();
            for spec in &plan.returned {
                let value = values.remove(&spec.key()).unwrap_or(Value::Null);
                aggregates.insert(spec.clone(), value);
            }

            GroupRow { key, aggregates }
        })
        .collect())
}

fn group_value<'v>(values: &'v BTreeMap<String, Value>, name: &str) -> &'v Value {
    const NULL: &Value = &Value::Null;

    values.get(name).unwrap_or(NULL)
}

///
/// GroupValues
///
/// One evaluated group exposed to the having filter.
///

struct GroupValues<'a>(&'a BTreeMap<String, Value>);

impl Row for GroupValues<'_> {
    fn field(&self, name: &str) -> FieldPresence {
        self.0
            .get(name)
            .map_or(FieldPresence::Missing, |v| FieldPresence::Present(v.clone()))
    }

    fn related(&self, _relation: &str) -> Option<Vec<Self>> {
        None
    }
}
