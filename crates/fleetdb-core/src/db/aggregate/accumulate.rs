use crate::{
    db::{
        aggregate::{AggregateOp, AggregateSpec, GroupError},
        relation::RowRef,
    },
    model::FieldKind,
    value::{Float64, Value},
};
use rust_decimal::Decimal;
use std::cmp::Ordering;

///
/// Aggregate folding
///
/// Nulls are skipped by every terminal except `_count._all`. Empty inputs
/// fold to `Null` for sum, avg, min and max.
///

/// Fold one aggregate over `rows`. `kind` is the target field's kind.
pub(crate) fn accumulate(
    spec: &AggregateSpec,
    kind: Option<&FieldKind>,
    rows: &[RowRef<'_>],
) -> Result<Value, GroupError> {
    let Some(field) = spec.field.as_deref() else {
        return Ok(Value::Uint(rows.len() as u64));
    };
    let values: Vec<&Value> = rows
        .iter()
        .map(|row| row.value(field))
        .filter(|v| !v.is_null())
        .collect();
    let overflow = || GroupError::Overflow {
        op: spec.op,
        field: field.to_string(),
    };

    match spec.op {
        AggregateOp::Count => Ok(Value::Uint(values.len() as u64)),
        AggregateOp::Min => Ok(extreme(&values, |ord| ord.is_lt())),
        AggregateOp::Max => Ok(extreme(&values, |ord| ord.is_gt())),
        AggregateOp::Sum if values.is_empty() => Ok(Value::Null),
        AggregateOp::Sum => sum(kind, &values).ok_or_else(overflow),
        AggregateOp::Avg if values.is_empty() => Ok(Value::Null),
        AggregateOp::Avg => avg(kind, &values).ok_or_else(overflow),
    }
}

fn extreme(values: &[&Value], wins: fn(Ordering) -> bool) -> Value {
    values
        .iter()
        .copied()
        .reduce(|best, v| {
            if wins(Value::canonical_cmp(v, best)) {
                v
            } else {
                best
            }
        })
        .cloned()
        .unwrap_or(Value::Null)
}

// None on overflow
fn sum(kind: Option<&FieldKind>, values: &[&Value]) -> Option<Value> {
    match kind {
        Some(FieldKind::Int) => values
            .iter()
            .try_fold(0i64, |acc, v| acc.checked_add(v.as_i64()?))
            .map(Value::Int),
        Some(FieldKind::Uint) => values
            .iter()
            .try_fold(0u64, |acc, v| match v {
                Value::Uint(u) => acc.checked_add(*u),
                _ => None,
            })
            .map(Value::Uint),
        Some(FieldKind::Decimal) => decimal_sum(values).map(Value::Decimal),
        _ => float_sum(values).map(Value::Float64),
    }
}

#[expect(clippy::cast_precision_loss)]
fn avg(kind: Option<&FieldKind>, values: &[&Value]) -> Option<Value> {
    if matches!(kind, Some(FieldKind::Decimal)) {
        let total = decimal_sum(values)?;
        return total
            .checked_div(Decimal::from(values.len() as u64))
            .map(Value::Decimal);
    }

    let total: f64 = values.iter().filter_map(|v| v.to_f64()).sum();
    Float64::try_new(total / values.len() as f64)
        .ok()
        .map(Value::Float64)
}

fn decimal_sum(values: &[&Value]) -> Option<Decimal> {
    values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v.to_decimal()?))
}

fn float_sum(values: &[&Value]) -> Option<Float64> {
    let total: f64 = values.iter().filter_map(|v| v.to_f64()).sum();

    Float64::try_new(total).ok()
}
