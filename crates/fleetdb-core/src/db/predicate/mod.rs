//! Where-input predicates: AST, schema validation, normalization and
//! three-valued evaluation.

mod ast;
mod coercion;
mod eval;
mod normalize;
mod validate;

#[cfg(test)]
mod tests;

use crate::model::{EntityModel, Schema};

pub use ast::{
    CompareOp, ComparePredicate, Predicate, QueryMode, RelationFilter, RelationPredicate,
};
pub use coercion::{TextOp, compare_eq, compare_order, compare_text};
pub use eval::{FieldPresence, Row, Truth, eval, matches};
pub use normalize::{normalize, normalize_literals};
pub use validate::{ValidateError, validate};

/// Validate a where-input against `entity` and bring it into evaluation form.
pub fn prepare(
    schema: &Schema,
    entity: &EntityModel,
    predicate: &Predicate,
) -> Result<Predicate, ValidateError> {
    validate(schema, entity, predicate)?;

    Ok(normalize(&normalize_literals(schema, entity, predicate)))
}
