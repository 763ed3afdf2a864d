use crate::value::{TextMode, Value};
use std::{cmp::Ordering, mem::discriminant};

///
/// Predicate comparison semantics
///
/// Defines which runtime value comparisons are permitted and how they
/// behave under a text mode. Numeric variants always widen against each
/// other; text honors the mode; every other pair must share a variant.
/// This module is schema-agnostic and operates purely on runtime `Value`s.
///

///
/// TextOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextOp {
    Contains,
    StartsWith,
    EndsWith,
}

/// Perform equality comparison under a text mode.
///
/// Returns `None` if the comparison is not defined for the given values.
#[must_use]
pub fn compare_eq(left: &Value, right: &Value, mode: TextMode) -> Option<bool> {
    if left.is_text() && right.is_text() {
        return left.text_eq(right, mode);
    }
    if left.is_numeric() && right.is_numeric() {
        return left.cmp_numeric(right).map(Ordering::is_eq);
    }
    if let (Value::List(a), Value::List(b)) = (left, right) {
        return list_eq(a, b, mode);
    }

    same_variant(left, right).then(|| left == right)
}

/// Perform ordering comparison under a text mode.
///
/// Returns `None` if ordering is undefined for the given values.
#[must_use]
pub fn compare_order(left: &Value, right: &Value, mode: TextMode) -> Option<Ordering> {
    if left.is_text() && right.is_text() {
        return left.text_cmp(right, mode);
    }

    Value::partial_cmp_value(left, right)
}

/// Perform text-specific match operations.
///
/// Returns `None` when either side is not text.
#[must_use]
pub fn compare_text(left: &Value, right: &Value, mode: TextMode, op: TextOp) -> Option<bool> {
    match op {
        TextOp::Contains => left.text_contains(right, mode),
        TextOp::StartsWith => left.text_starts_with(right, mode),
        TextOp::EndsWith => left.text_ends_with(right, mode),
    }
}

fn list_eq(left: &[Value], right: &[Value], mode: TextMode) -> Option<bool> {
    if left.len() != right.len() {
        return Some(false);
    }

    for (a, b) in left.iter().zip(right) {
        if !compare_eq(a, b, mode)? {
            return Some(false);
        }
    }

    Some(true)
}

fn same_variant(left: &Value, right: &Value) -> bool {
    discriminant(left) == discriminant(right)
}
