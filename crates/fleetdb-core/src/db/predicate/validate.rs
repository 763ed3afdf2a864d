use crate::{
    db::predicate::ast::{CompareOp, ComparePredicate, Predicate, QueryMode, RelationPredicate},
    model::{EntityModel, FieldKind, FieldModel, Schema},
    value::Value,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// ValidateError
///
/// Schema-aware rejection of a where-input. Raised before any row is read.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValidateError {
    #[error("unknown field '{entity}.{field}'")]
    UnknownField { entity: String, field: String },

    #[error("unknown relation '{entity}.{relation}'")]
    UnknownRelation { entity: String, relation: String },

    #[error("operator {op} is not valid for field '{field}'")]
    InvalidOperator { field: String, op: String },

    #[error("invalid literal for field '{field}': {message}")]
    InvalidLiteral { field: String, message: String },

    #[error("insensitive mode is only valid on text fields, not '{field}'")]
    InvalidMode { field: String },

    #[error("quantifier '{quantifier}' is not valid on relation '{relation}'")]
    InvalidQuantifier {
        relation: String,
        quantifier: &'static str,
    },
}

impl ValidateError {
    pub(crate) fn invalid_operator(field: &str, op: impl fmt::Display) -> Self {
        Self::InvalidOperator {
            field: field.to_string(),
            op: op.to_string(),
        }
    }

    pub(crate) fn invalid_literal(field: &str, msg: impl Into<String>) -> Self {
        Self::InvalidLiteral {
            field: field.to_string(),
            message: msg.into(),
        }
    }
}

/// Validate a predicate against `entity`, recursing through relations.
pub fn validate(
    schema: &Schema,
    entity: &EntityModel,
    predicate: &Predicate,
) -> Result<(), ValidateError> {
    match predicate {
        Predicate::True | Predicate::False => Ok(()),
        Predicate::And(children) | Predicate::Or(children) => {
            for child in children {
                validate(schema, entity, child)?;
            }
            Ok(())
        }
        Predicate::Not(inner) => validate(schema, entity, inner),
        Predicate::Compare(cmp) => validate_compare(entity, cmp),
        Predicate::IsNull { field } | Predicate::IsNotNull { field } => {
            let model = ensure_field(entity, field)?;
            if model.nullable {
                Ok(())
            } else {
                Err(ValidateError::invalid_operator(field, "is_null"))
            }
        }
        Predicate::IsEmpty { field } => {
            let model = ensure_field(entity, field)?;
            if model.kind.is_list() {
                Ok(())
            } else {
                Err(ValidateError::invalid_operator(field, "is_empty"))
            }
        }
        Predicate::Relation(rel) => validate_relation(schema, entity, rel),
    }
}

fn validate_relation(
    schema: &Schema,
    entity: &EntityModel,
    rel: &RelationPredicate,
) -> Result<(), ValidateError> {
    let unknown = || ValidateError::UnknownRelation {
        entity: entity.name.clone(),
        relation: rel.relation.clone(),
    };
    let relation = entity.get_relation(&rel.relation).ok_or_else(unknown)?;
    let target = schema.relation_target(relation).ok_or_else(unknown)?;

    if rel.filter.is_to_one_only() && relation.is_many() {
        return Err(ValidateError::InvalidQuantifier {
            relation: rel.relation.clone(),
            quantifier: rel.filter.label(),
        });
    }

    match rel.filter.inner() {
        Some(inner) => validate(schema, target, inner),
        None => Ok(()),
    }
}

fn validate_compare(entity: &EntityModel, cmp: &ComparePredicate) -> Result<(), ValidateError> {
    let field = ensure_field(entity, &cmp.field)?;
    let kind = &field.kind;

    if cmp.mode == QueryMode::Insensitive && !is_text_like(kind) {
        return Err(ValidateError::InvalidMode {
            field: cmp.field.clone(),
        });
    }

    match cmp.op {
        CompareOp::Eq | CompareOp::Ne => validate_eq_ne(field, &cmp.value),
        CompareOp::Lt | CompareOp::Lte | CompareOp::Gt | CompareOp::Gte => {
            if !kind.supports_range() {
                return Err(ValidateError::invalid_operator(&field.name, op_label(cmp.op)));
            }
            ensure_literal(&field.name, kind, &cmp.value)
        }
        CompareOp::In | CompareOp::NotIn => {
            if kind.is_list() {
                return Err(ValidateError::invalid_operator(&field.name, op_label(cmp.op)));
            }
            ensure_list_literal(&field.name, kind, &cmp.value)
        }
        CompareOp::Contains | CompareOp::StartsWith | CompareOp::EndsWith => {
            if !kind.is_text() {
                return Err(ValidateError::invalid_operator(&field.name, op_label(cmp.op)));
            }
            ensure_literal(&field.name, kind, &cmp.value)
        }
        CompareOp::Has => {
            let element = list_element(field, cmp.op)?;
            ensure_literal(&field.name, element, &cmp.value)
        }
        CompareOp::HasEvery | CompareOp::HasSome => {
            let element = list_element(field, cmp.op)?;
            ensure_list_literal(&field.name, element, &cmp.value)
        }
    }
}

// A null literal with Eq/Ne is an IS NULL test; only nullable fields allow it.
fn validate_eq_ne(field: &FieldModel, value: &Value) -> Result<(), ValidateError> {
    if value.is_null() {
        if field.nullable {
            return Ok(());
        }
        return Err(ValidateError::invalid_literal(
            &field.name,
            "null literal requires a nullable field",
        ));
    }

    ensure_literal(&field.name, &field.kind, value)
}

fn ensure_field<'a>(entity: &'a EntityModel, field: &str) -> Result<&'a FieldModel, ValidateError> {
    entity
        .get_field(field)
        .ok_or_else(|| ValidateError::UnknownField {
            entity: entity.name.clone(),
            field: field.to_string(),
        })
}

fn ensure_literal(field: &str, kind: &FieldKind, value: &Value) -> Result<(), ValidateError> {
    if value.is_null() {
        return Err(ValidateError::invalid_literal(
            field,
            "null literal is only valid with equals / not",
        ));
    }
    if !kind.accepts(value) {
        return Err(ValidateError::invalid_literal(
            field,
            format!("expected {kind}, found {}", value.kind_label()),
        ));
    }

    Ok(())
}

fn ensure_list_literal(field: &str, kind: &FieldKind, value: &Value) -> Result<(), ValidateError> {
    let Value::List(items) = value else {
        return Err(ValidateError::invalid_literal(field, "expected list literal"));
    };
    for item in items {
        ensure_literal(field, kind, item)?;
    }

    Ok(())
}

fn list_element(field: &FieldModel, op: CompareOp) -> Result<&FieldKind, ValidateError> {
    field
        .kind
        .element()
        .ok_or_else(|| ValidateError::invalid_operator(&field.name, op_label(op)))
}

fn is_text_like(kind: &FieldKind) -> bool {
    kind.is_text() || kind.element().is_some_and(FieldKind::is_text)
}

const fn op_label(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "equals",
        CompareOp::Ne => "not",
        CompareOp::Lt => "lt",
        CompareOp::Lte => "lte",
        CompareOp::Gt => "gt",
        CompareOp::Gte => "gte",
        CompareOp::In => "in",
        CompareOp::NotIn => "not_in",
        CompareOp::Contains => "contains",
        CompareOp::StartsWith => "starts_with",
        CompareOp::EndsWith => "ends_with",
        CompareOp::Has => "has",
        CompareOp::HasEvery => "has_every",
        CompareOp::HasSome => "has_some",
    }
}
