use crate::{
    db::write::{FieldOp, WriteError},
    model::{FieldKind, FieldModel},
    value::{Float64, Value},
};
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// Coerce a written value into the field's kind. Null needs a nullable field.
pub(crate) fn coerce_value(
    entity: &str,
    field: &FieldModel,
    value: &Value,
) -> Result<Value, WriteError> {
    if value.is_null() {
        if field.nullable {
            return Ok(Value::Null);
        }
        return Err(WriteError::NullValue {
            entity: entity.to_string(),
            field: field.name.clone(),
        });
    }

    field
        .kind
        .coerce(value)
        .ok_or_else(|| WriteError::InvalidValue {
            field: field.name.clone(),
            message: format!("expected {}, found {}", field.kind, value.kind_label()),
        })
}

/// Check that `op` is valid for `field` without applying it.
pub(crate) fn check_op(entity: &str, field: &FieldModel, op: &FieldOp) -> Result<(), WriteError> {
    let invalid = || WriteError::InvalidOperation {
        field: field.name.clone(),
        op: op.label(),
    };

    match op {
        FieldOp::Set(value) => coerce_value(entity, field, value).map(|_| ()),
        FieldOp::Push(value) => {
            let element = field.kind.element().ok_or_else(invalid)?;
            push_items(field, element, value).map(|_| ())
        }
        FieldOp::Increment(value)
        | FieldOp::Decrement(value)
        | FieldOp::Multiply(value)
        | FieldOp::Divide(value) => {
            if !field.kind.is_numeric() {
                return Err(invalid());
            }
            operand(field, value).map(|_| ())
        }
    }
}

/// New value of `field` after applying `op` to `current`.
pub(crate) fn apply_op(
    entity: &str,
    field: &FieldModel,
    current: &Value,
    op: &FieldOp,
) -> Result<Value, WriteError> {
    check_op(entity, field, op)?;

    match op {
        FieldOp::Set(value) => coerce_value(entity, field, value),
        FieldOp::Push(value) => {
            let element = field.kind.element().ok_or_else(|| WriteError::InvalidOperation {
                field: field.name.clone(),
                op: op.label(),
            })?;
            let mut items = current.as_list().map(<[Value]>::to_vec).unwrap_or_default();
            items.extend(push_items(field, element, value)?);

            Ok(Value::List(items))
        }
        _ if current.is_null() => Ok(Value::Null),
        FieldOp::Increment(value)
        | FieldOp::Decrement(value)
        | FieldOp::Multiply(value)
        | FieldOp::Divide(value) => arithmetic(field, current, op, &operand(field, value)?),
    }
}

fn operand(field: &FieldModel, value: &Value) -> Result<Value, WriteError> {
    field
        .kind
        .coerce(value)
        .ok_or_else(|| WriteError::InvalidValue {
            field: field.name.clone(),
            message: format!("expected {}, found {}", field.kind, value.kind_label()),
        })
}

fn push_items(
    field: &FieldModel,
    element: &FieldKind,
    value: &Value,
) -> Result<Vec<Value>, WriteError> {
    let items = match value {
        Value::List(items) => items.clone(),
        other => vec![other.clone()],
    };

    items
        .iter()
        .map(|item| {
            element.coerce(item).ok_or_else(|| WriteError::InvalidValue {
                field: field.name.clone(),
                message: format!("expected {element}, found {}", item.kind_label()),
            })
        })
        .collect()
}

fn arithmetic(
    field: &FieldModel,
    current: &Value,
    op: &FieldOp,
    rhs: &Value,
) -> Result<Value, WriteError> {
    let overflow = || WriteError::Overflow {
        field: field.name.clone(),
        op: op.label(),
    };
    let zero = rhs.cmp_numeric(&Value::Int(0)).is_some_and(Ordering::is_eq);
    if matches!(op, FieldOp::Divide(_)) && zero {
        return Err(WriteError::DivideByZero {
            field: field.name.clone(),
        });
    }

    let result = match (current, rhs) {
        (Value::Int(a), Value::Int(b)) => match op {
            FieldOp::Increment(_) => a.checked_add(*b),
            FieldOp::Decrement(_) => a.checked_sub(*b),
            FieldOp::Multiply(_) => a.checked_mul(*b),
            _ => a.checked_div(*b),
        }
        .map(Value::Int),
        (Value::Uint(a), Value::Uint(b)) => match op {
            FieldOp::Increment(_) => a.checked_add(*b),
            FieldOp::Decrement(_) => a.checked_sub(*b),
            FieldOp::Multiply(_) => a.checked_mul(*b),
            _ => a.checked_div(*b),
        }
        .map(Value::Uint),
        (Value::Decimal(a), Value::Decimal(b)) => decimal_op(*a, *b, op).map(Value::Decimal),
        (Value::Float64(a), Value::Float64(b)) => {
            let (a, b) = (a.get(), b.get());
            let out = match op {
                FieldOp::Increment(_) => a + b,
                FieldOp::Decrement(_) => a - b,
                FieldOp::Multiply(_) => a * b,
                _ => a / b,
            };
            Float64::try_new(out).ok().map(Value::Float64)
        }
        _ => None,
    };

    result.ok_or_else(overflow)
}

fn decimal_op(a: Decimal, b: Decimal, op: &FieldOp) -> Option<Decimal> {
    match op {
        FieldOp::Increment(_) => a.checked_add(b),
        FieldOp::Decrement(_) => a.checked_sub(b),
        FieldOp::Multiply(_) => a.checked_mul(b),
        _ => a.checked_div(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(kind: FieldKind) -> FieldModel {
        FieldModel::optional("n", kind)
    }

    #[test]
    fn increment_widens_operand_to_field_kind() {
        let out = apply_op(
            "T",
            &field(FieldKind::Decimal),
            &Value::Decimal(Decimal::new(150, 1)),
            &FieldOp::Increment(Value::Int(2)),
        )
        .unwrap();

        assert_eq!(out, Value::Decimal(Decimal::new(170, 1)));
    }

    #[test]
    fn arithmetic_on_null_stays_null() {
        let multiply = FieldOp::Multiply(3.into());
        let out = apply_op("T", &field(FieldKind::Int), &Value::Null, &multiply).unwrap();

        assert_eq!(out, Value::Null);
    }

    #[test]
    fn uint_decrement_below_zero_overflows() {
        let decrement = FieldOp::Decrement(2u64.into());
        let err = apply_op("T", &field(FieldKind::Uint), &Value::Uint(1), &decrement).unwrap_err();

        assert!(matches!(err, WriteError::Overflow { op: "decrement", .. }));
    }

    #[test]
    fn divide_by_zero_is_rejected() {
        let divide = FieldOp::Divide(0.into());
        let err =
            apply_op("T", &field(FieldKind::Float64), &Value::from(3.0), &divide).unwrap_err();

        assert!(matches!(err, WriteError::DivideByZero { .. }));
    }

    #[test]
    fn push_appends_elements_and_lists() {
        let kind = FieldKind::list(FieldKind::Text);
        let current = Value::from(vec!["hazmat"]);

        let push_one = FieldOp::Push("reefer".into());
        let push_many = FieldOp::Push(vec!["a", "b"].into());
        let one = apply_op("T", &field(kind.clone()), &current, &push_one).unwrap();
        let many = apply_op("T", &field(kind), &Value::Null, &push_many).unwrap();

        assert_eq!(one, Value::from(vec!["hazmat", "reefer"]));
        assert_eq!(many, Value::from(vec!["a", "b"]));
    }

    #[test]
    fn increment_rejects_text_fields() {
        let increment = FieldOp::Increment(1.into());
        let err = check_op("T", &field(FieldKind::Text), &increment).unwrap_err();

        assert!(matches!(err, WriteError::InvalidOperation { op: "increment", .. }));
    }

    #[test]
    fn set_null_on_required_field_is_rejected() {
        let required = FieldModel::required("n", FieldKind::Int);
        let err = check_op("T", &required, &FieldOp::Set(Value::Null)).unwrap_err();

        assert!(matches!(err, WriteError::NullValue { .. }));
    }
}
