use crate::{
    db::predicate::{
        ast::{CompareOp, ComparePredicate, Predicate, RelationFilter, RelationPredicate},
        coercion::{TextOp, compare_eq, compare_order, compare_text},
    },
    value::{TextMode, Value},
};
use std::cmp::Ordering;

///
/// Truth
///
/// Three-valued logic result. Comparisons involving a null field value are
/// `Unknown`; a row matches only when its predicate is `True`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    #[must_use]
    pub const fn from_bool(b: bool) -> Self {
        if b { Self::True } else { Self::False }
    }

    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }

    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Unknown => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::True, Self::True) => Self::True,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::False, Self::False) => Self::False,
            _ => Self::Unknown,
        }
    }
}

///
/// FieldPresence
///
/// Result of attempting to read a field from a row during predicate
/// evaluation. This distinguishes between a missing field and a
/// present field whose value may be `Value::Null`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldPresence {
    /// Field exists and has a value (including `Value::Null`).
    Present(Value),
    /// Field is not present on the row.
    Missing,
}

///
/// Row
///
/// Abstraction over a record that can expose fields by name and resolve
/// relations to other rows. This decouples predicate evaluation from the
/// store.
///

pub trait Row: Sized {
    fn field(&self, name: &str) -> FieldPresence;

    /// Rows reachable through `relation`; `None` when the relation is unknown.
    fn related(&self, relation: &str) -> Option<Vec<Self>>;
}

/// Evaluate a predicate and report whether the row matches.
#[must_use]
pub fn matches<R: Row>(row: &R, predicate: &Predicate) -> bool {
    eval(row, predicate).is_true()
}

///
/// Evaluate a predicate against a single row.
///
/// This function performs pure runtime evaluation:
/// - no schema access
/// - no validation
///
/// Unsupported comparisons evaluate to `False`.
/// CONTRACT: predicates must be validated before evaluation.
///
#[must_use]
pub fn eval<R: Row>(row: &R, predicate: &Predicate) -> Truth {
    match predicate {
        Predicate::True => Truth::True,
        Predicate::False => Truth::False,

        Predicate::And(children) => {
            let mut out = Truth::True;
            for child in children {
                out = out.and(eval(row, child));
                if out == Truth::False {
                    break;
                }
            }
            out
        }
        Predicate::Or(children) => {
            let mut out = Truth::False;
            for child in children {
                out = out.or(eval(row, child));
                if out == Truth::True {
                    break;
                }
            }
            out
        }
        Predicate::Not(inner) => eval(row, inner).negate(),

        Predicate::Compare(cmp) => eval_compare(row, cmp),

        Predicate::IsNull { field } => match row.field(field) {
            FieldPresence::Present(value) => Truth::from_bool(value.is_null()),
            FieldPresence::Missing => Truth::False,
        },
        Predicate::IsNotNull { field } => match row.field(field) {
            FieldPresence::Present(value) => Truth::from_bool(!value.is_null()),
            FieldPresence::Missing => Truth::False,
        },
        Predicate::IsEmpty { field } => match row.field(field) {
            FieldPresence::Present(Value::List(items)) => Truth::from_bool(items.is_empty()),
            FieldPresence::Present(Value::Null) => Truth::Unknown,
            _ => Truth::False,
        },

        Predicate::Relation(rel) => Truth::from_bool(eval_relation(row, rel)),
    }
}

// Relation quantifiers are two-valued: a related row counts only when its
// sub-predicate is True.
fn eval_relation<R: Row>(row: &R, rel: &RelationPredicate) -> bool {
    let Some(related) = row.related(&rel.relation) else {
        return false;
    };
    let holds = |p: &Predicate| related.iter().filter(|r| matches(*r, p)).count();

    match &rel.filter {
        RelationFilter::Some(p) => holds(p.as_ref()) > 0,
        RelationFilter::None(p) => holds(p.as_ref()) == 0,
        RelationFilter::Every(p) => holds(p.as_ref()) == related.len(),
        RelationFilter::Is(None) => related.is_empty(),
        RelationFilter::IsNot(None) => !related.is_empty(),
        RelationFilter::Is(Some(p)) => related.first().is_some_and(|r| matches(r, p)),
        RelationFilter::IsNot(Some(p)) => related.first().is_none_or(|r| !matches(r, p)),
    }
}

///
/// Evaluate a single comparison predicate against a row.
///
/// - missing field → `False`
/// - literal null with `Eq`/`Ne` → IS NULL / IS NOT NULL
/// - null field value otherwise → `Unknown`
/// - comparison undefined for the value pair → `False`
///
fn eval_compare<R: Row>(row: &R, cmp: &ComparePredicate) -> Truth {
    let ComparePredicate {
        field,
        op,
        value,
        mode,
    } = cmp;
    let mode = mode.text_mode();

    let FieldPresence::Present(actual) = row.field(field) else {
        return Truth::False;
    };

    match (op, value) {
        (CompareOp::Eq, Value::Null) => return Truth::from_bool(actual.is_null()),
        (CompareOp::Ne, Value::Null) => return Truth::from_bool(!actual.is_null()),
        _ => {}
    }
    if actual.is_null() {
        return Truth::Unknown;
    }

    let defined = |r: Option<bool>| r.map_or(Truth::False, Truth::from_bool);
    let ordered = |f: fn(Ordering) -> bool| defined(compare_order(&actual, value, mode).map(f));

    match op {
        CompareOp::Eq => defined(compare_eq(&actual, value, mode)),
        CompareOp::Ne => defined(compare_eq(&actual, value, mode).map(|eq| !eq)),

        CompareOp::Lt => ordered(Ordering::is_lt),
        CompareOp::Lte => ordered(Ordering::is_le),
        CompareOp::Gt => ordered(Ordering::is_gt),
        CompareOp::Gte => ordered(Ordering::is_ge),

        CompareOp::In => in_list(&actual, value, mode),
        CompareOp::NotIn => in_list(&actual, value, mode).negate(),

        CompareOp::Contains => defined(compare_text(&actual, value, mode, TextOp::Contains)),
        CompareOp::StartsWith => defined(compare_text(&actual, value, mode, TextOp::StartsWith)),
        CompareOp::EndsWith => defined(compare_text(&actual, value, mode, TextOp::EndsWith)),

        CompareOp::Has => defined(list_has(&actual, value, mode)),
        CompareOp::HasEvery => defined(list_has_all(&actual, value, mode, true)),
        CompareOp::HasSome => defined(list_has_all(&actual, value, mode, false)),
    }
}

///
/// SQL `IN` semantics: a match is `True`; no match with a null literal
/// element is `Unknown`; otherwise `False`.
///
fn in_list(actual: &Value, list: &Value, mode: TextMode) -> Truth {
    let Value::List(items) = list else {
        return Truth::False;
    };

    let mut saw_null = false;
    for item in items {
        if item.is_null() {
            saw_null = true;
            continue;
        }
        if compare_eq(actual, item, mode) == Some(true) {
            return Truth::True;
        }
    }

    if saw_null { Truth::Unknown } else { Truth::False }
}

fn list_has(actual: &Value, needle: &Value, mode: TextMode) -> Option<bool> {
    let items = actual.as_list()?;

    Some(
        items
            .iter()
            .any(|item| compare_eq(item, needle, mode).unwrap_or(false)),
    )
}

fn list_has_all(actual: &Value, needles: &Value, mode: TextMode, every: bool) -> Option<bool> {
    let needles = needles.as_list()?;
    let mut hits = needles.iter().map(|n| list_has(actual, n, mode));

    if every {
        hits.try_fold(true, |acc, hit| hit.map(|h| acc && h))
    } else {
        hits.try_fold(false, |acc, hit| hit.map(|h| acc || h))
    }
}
