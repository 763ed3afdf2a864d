use crate::{
    db::predicate::ast::{
        CompareOp, ComparePredicate, Predicate, QueryMode, RelationFilter, RelationPredicate,
    },
    model::{EntityModel, FieldKind, Schema},
    value::Value,
};

///
/// Normalize a predicate into a canonical, deterministic form.
///
/// Normalization guarantees:
/// - Logical equivalence is preserved (under three-valued logic)
/// - Nested AND / OR nodes are flattened
/// - Neutral elements are removed (True / False)
/// - Double negation is eliminated
/// - `Eq null` / `Ne null` become `IsNull` / `IsNotNull`
/// - Child predicates are deterministically ordered
///
#[must_use]
pub fn normalize(predicate: &Predicate) -> Predicate {
    match predicate {
        Predicate::True => Predicate::True,
        Predicate::False => Predicate::False,

        Predicate::And(children) => normalize_and(children),
        Predicate::Or(children) => normalize_or(children),
        Predicate::Not(inner) => normalize_not(inner),

        Predicate::Compare(cmp) => normalize_compare(cmp),

        Predicate::IsNull { .. } | Predicate::IsNotNull { .. } | Predicate::IsEmpty { .. } => {
            predicate.clone()
        }
        Predicate::Relation(rel) => Predicate::Relation(RelationPredicate {
            relation: rel.relation.clone(),
            filter: normalize_relation_filter(&rel.filter),
        }),
    }
}

fn normalize_compare(cmp: &ComparePredicate) -> Predicate {
    match (cmp.op, &cmp.value) {
        (CompareOp::Eq, Value::Null) => Predicate::IsNull {
            field: cmp.field.clone(),
        },
        (CompareOp::Ne, Value::Null) => Predicate::IsNotNull {
            field: cmp.field.clone(),
        },
        _ => Predicate::Compare(cmp.clone()),
    }
}

fn normalize_relation_filter(filter: &RelationFilter) -> RelationFilter {
    let boxed = |p: &Predicate| Box::new(normalize(p));

    match filter {
        RelationFilter::Some(p) => RelationFilter::Some(boxed(p)),
        RelationFilter::None(p) => RelationFilter::None(boxed(p)),
        RelationFilter::Every(p) => RelationFilter::Every(boxed(p)),
        RelationFilter::Is(p) => RelationFilter::Is(p.as_deref().map(boxed)),
        RelationFilter::IsNot(p) => RelationFilter::IsNot(p.as_deref().map(boxed)),
    }
}

///
/// Normalize a NOT expression.
///
/// Eliminates double negation:
///     NOT (NOT x)  →  x
///
fn normalize_not(inner: &Predicate) -> Predicate {
    match normalize(inner) {
        Predicate::Not(double) => *double,
        Predicate::True => Predicate::False,
        Predicate::False => Predicate::True,
        other => Predicate::Not(Box::new(other)),
    }
}

///
/// Normalize an AND expression.
///
/// Rules:
/// - AND(True, x)        → x
/// - AND(False, x)       → False
/// - AND(AND(a, b), c)   → AND(a, b, c)
/// - AND()               → True
/// - AND(x)              → x
///
fn normalize_and(children: &[Predicate]) -> Predicate {
    let mut out = Vec::new();

    for child in children {
        match normalize(child) {
            Predicate::True => {}
            Predicate::False => return Predicate::False,
            Predicate::And(grandchildren) => out.extend(grandchildren),
            other => out.push(other),
        }
    }

    out.sort_by_cached_key(sort_key);
    out.dedup();

    match out.len() {
        0 => Predicate::True,
        1 => out.remove(0),
        _ => Predicate::And(out),
    }
}

///
/// Normalize an OR expression.
///
/// Rules:
/// - OR(False, x)       → x
/// - OR(True, x)        → True
/// - OR(OR(a, b), c)    → OR(a, b, c)
/// - OR()               → False
/// - OR(x)              → x
///
fn normalize_or(children: &[Predicate]) -> Predicate {
    let mut out = Vec::new();

    for child in children {
        match normalize(child) {
            Predicate::False => {}
            Predicate::True => return Predicate::True,
            Predicate::Or(grandchildren) => out.extend(grandchildren),
            other => out.push(other),
        }
    }

    out.sort_by_cached_key(sort_key);
    out.dedup();

    match out.len() {
        0 => Predicate::False,
        1 => out.remove(0),
        _ => Predicate::Or(out),
    }
}

///
/// Generate a deterministic, length-prefixed key for a predicate.
///
/// This key is used only for sorting, not for display.
///
fn sort_key(predicate: &Predicate) -> Vec<u8> {
    let mut out = Vec::new();
    encode_predicate_key(&mut out, predicate);
    out
}

const PRED_TRUE: u8 = 0x00;
const PRED_FALSE: u8 = 0x01;
const PRED_AND: u8 = 0x02;
const PRED_OR: u8 = 0x03;
const PRED_NOT: u8 = 0x04;
const PRED_COMPARE: u8 = 0x05;
const PRED_IS_NULL: u8 = 0x06;
const PRED_IS_NOT_NULL: u8 = 0x07;
const PRED_IS_EMPTY: u8 = 0x08;
const PRED_RELATION: u8 = 0x09;

// Encode predicate keys with length-prefixed segments to avoid collisions.
fn encode_predicate_key(out: &mut Vec<u8>, predicate: &Predicate) {
    match predicate {
        Predicate::True => out.push(PRED_TRUE),
        Predicate::False => out.push(PRED_FALSE),
        Predicate::And(children) | Predicate::Or(children) => {
            out.push(if matches!(predicate, Predicate::And(_)) {
                PRED_AND
            } else {
                PRED_OR
            });
            push_len(out, children.len());
            for child in children {
                encode_predicate_key(out, child);
            }
        }
        Predicate::Not(inner) => {
            out.push(PRED_NOT);
            encode_predicate_key(out, inner);
        }
        Predicate::Compare(cmp) => {
            out.push(PRED_COMPARE);
            push_str(out, &cmp.field);
            out.push(cmp.op.tag());
            push_str(out, cmp.value.kind_label());
            push_str(out, &cmp.value.to_string());
            out.push(u8::from(cmp.mode == QueryMode::Insensitive));
        }
        Predicate::IsNull { field } => {
            out.push(PRED_IS_NULL);
            push_str(out, field);
        }
        Predicate::IsNotNull { field } => {
            out.push(PRED_IS_NOT_NULL);
            push_str(out, field);
        }
        Predicate::IsEmpty { field } => {
            out.push(PRED_IS_EMPTY);
            push_str(out, field);
        }
        Predicate::Relation(rel) => {
            out.push(PRED_RELATION);
            push_str(out, &rel.relation);
            push_str(out, rel.filter.label());
            match rel.filter.inner() {
                Some(inner) => {
                    out.push(1);
                    encode_predicate_key(out, inner);
                }
                None => out.push(0),
            }
        }
    }
}

fn push_len(out: &mut Vec<u8>, len: usize) {
    out.extend_from_slice(&(len as u64).to_be_bytes());
}

fn push_str(out: &mut Vec<u8>, s: &str) {
    push_len(out, s.len());
    out.extend_from_slice(s.as_bytes());
}

///
/// Coerce comparison literals into the canonical variant of the field kind.
///
/// Runs after validation, so every literal is known to fit; literals that do
/// not coerce are left untouched. Recurses through relation sub-predicates
/// with the target entity.
///
#[must_use]
pub fn normalize_literals(
    schema: &Schema,
    entity: &EntityModel,
    predicate: &Predicate,
) -> Predicate {
    match predicate {
        Predicate::And(children) => Predicate::And(
            children
                .iter()
                .map(|c| normalize_literals(schema, entity, c))
                .collect(),
        ),
        Predicate::Or(children) => Predicate::Or(
            children
                .iter()
                .map(|c| normalize_literals(schema, entity, c))
                .collect(),
        ),
        Predicate::Not(inner) => {
            Predicate::Not(Box::new(normalize_literals(schema, entity, inner)))
        }
        Predicate::Compare(cmp) => {
            let mut cmp = cmp.clone();
            if let Some(field) = entity.get_field(&cmp.field) {
                let kind = match cmp.op {
                    CompareOp::Has => field.kind.element().unwrap_or(&field.kind),
                    _ => &field.kind,
                };
                cmp.value = coerce_literal(kind, cmp.op, &cmp.value);
            }
            Predicate::Compare(cmp)
        }
        Predicate::Relation(rel) => {
            let target = entity
                .get_relation(&rel.relation)
                .and_then(|r| schema.relation_target(r));
            let Some(target) = target else {
                return predicate.clone();
            };
            let inner = |p: &Predicate| Box::new(normalize_literals(schema, target, p));
            let filter = match &rel.filter {
                RelationFilter::Some(p) => RelationFilter::Some(inner(p)),
                RelationFilter::None(p) => RelationFilter::None(inner(p)),
                RelationFilter::Every(p) => RelationFilter::Every(inner(p)),
                RelationFilter::Is(p) => RelationFilter::Is(p.as_deref().map(inner)),
                RelationFilter::IsNot(p) => RelationFilter::IsNot(p.as_deref().map(inner)),
            };
            Predicate::Relation(RelationPredicate {
                relation: rel.relation.clone(),
                filter,
            })
        }
        Predicate::True
        | Predicate::False
        | Predicate::IsNull { .. }
        | Predicate::IsNotNull { .. }
        | Predicate::IsEmpty { .. } => predicate.clone(),
    }
}

fn coerce_literal(kind: &FieldKind, op: CompareOp, value: &Value) -> Value {
    if value.is_null() {
        return Value::Null;
    }

    let coerced = match (op, value) {
        // IN lists coerce element-wise against the scalar kind
        (CompareOp::In | CompareOp::NotIn, Value::List(items)) => items
            .iter()
            .map(|item| {
                if item.is_null() {
                    Some(Value::Null)
                } else {
                    kind.coerce(item)
                }
            })
            .collect::<Option<Vec<_>>>()
            .map(Value::List),
        _ => kind.coerce(value),
    };

    coerced.unwrap_or_else(|| value.clone())
}
