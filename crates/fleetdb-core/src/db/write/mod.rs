//! Mutations: create, update, upsert and delete with nested relation
//! writes and referential actions. Each public operation is atomic.

mod check;
mod executor;
mod input;
mod ops;


pub use input::{
    CreateArgs, CreateInput, CreateManyArgs, DeleteArgs, DeleteManyArgs, FieldOp, RelationWrite,
    UpdateArgs, UpdateInput, UpdateManyArgs, UpsertArgs,
};

pub(crate) use executor::WriteExecutor;

use crate::{
    db::{predicate::ValidateError, query::QueryError, store::StoreError},
    error::ErrorClass,
};
use thiserror::Error as ThisError;

///
/// WriteError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum WriteError {
    #[error("unknown field '{entity}.{field}'")]
    UnknownField { entity: String, field: String },

    #[error("unknown relation '{entity}.{relation}'")]
    UnknownRelation { entity: String, relation: String },

    #[error("missing required field '{entity}.{field}'")]
    MissingField { entity: String, field: String },

    #[error("field '{entity}.{field}' is not nullable")]
    NullValue { entity: String, field: String },

    #[error("invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("field '{field}' is given both directly and through relation '{relation}'")]
    ConflictingInput { field: String, relation: String },

    #[error("{op} is not valid for field '{field}'")]
    InvalidOperation { field: String, op: &'static str },

    #[error("nested {op} is not allowed on relation '{relation}' here")]
    NestedOpNotAllowed { relation: String, op: &'static str },

    #[error("unique constraint {fields:?} on '{entity}' already holds this value")]
    UniqueViolation { entity: String, fields: Vec<String> },

    #[error("relation '{entity}.{relation}' references a missing row")]
    ForeignKeyViolation { entity: String, relation: String },

    #[error("rows of '{entity}' still reference this row through '{relation}'")]
    RestrictViolation { entity: String, relation: String },

    #[error("field '{entity}.{field}' is referenced by other rows and cannot change")]
    KeyInUse { entity: String, field: String },

    #[error("relation '{entity}.{relation}' is required and cannot be cleared")]
    RequiredRelation { entity: String, relation: String },

    #[error("no related row found through '{relation}'")]
    RelatedNotFound { relation: String },

    #[error("no '{entity}' record found")]
    NotFound { entity: String },

    #[error("{op} on field '{field}' overflowed")]
    Overflow { field: String, op: &'static str },

    #[error("division by zero on field '{field}'")]
    DivideByZero { field: String },

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Predicate(#[from] ValidateError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WriteError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::UniqueViolation { .. }
            | Self::ForeignKeyViolation { .. }
            | Self::RestrictViolation { .. }
            | Self::KeyInUse { .. } => ErrorClass::Conflict,
            Self::RelatedNotFound { .. } | Self::NotFound { .. } => ErrorClass::NotFound,
            Self::Overflow { .. } => ErrorClass::Unsupported,
            Self::Store(_) => ErrorClass::Internal,
            Self::Query(err) => err.class(),
            _ => ErrorClass::Validation,
        }
    }

    pub(crate) fn unknown_field(entity: &str, field: &str) -> Self {
        Self::UnknownField {
            entity: entity.to_string(),
            field: field.to_string(),
        }
    }

    pub(crate) fn unknown_relation(entity: &str, relation: &str) -> Self {
        Self::UnknownRelation {
            entity: entity.to_string(),
            relation: relation.to_string(),
        }
    }

    pub(crate) fn not_found(entity: &str) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
        }
    }
}
