//! Read path: where-unique lookups, ordering, pagination, selection and the
//! find pipeline shared by every read delegate.

mod args;
mod builder;
mod exec;
mod order;
mod page;
mod select;
mod unique;


pub use args::{CountArgs, FindManyArgs, FindUniqueArgs, Scope};
pub use builder::{FieldRef, RelationRef, field, relation};
pub use order::{NullsOrder, OrderBy, OrderTarget, SortOrder};
pub use select::{Include, RecordView, RelationView, Selection};
pub use unique::WhereUnique;

pub(crate) use args::impl_scope_builder;
pub(crate) use exec::{find_first_row, find_many_rows, select_rows};

use crate::{db::predicate::ValidateError, error::ErrorClass, model::EntityModel};
use thiserror::Error as ThisError;

///
/// QueryError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("unknown field '{entity}.{field}'")]
    UnknownField { entity: String, field: String },

    #[error("unknown relation '{entity}.{relation}'")]
    UnknownRelation { entity: String, relation: String },

    #[error("field '{entity}.{field}' cannot be ordered")]
    NotOrderable { entity: String, field: String },

    #[error("cannot order through to-many relation '{relation}'")]
    OrderThroughToMany { relation: String },

    #[error("fields {fields:?} do not form a unique constraint of '{entity}'")]
    NotUniqueWhere { entity: String, fields: Vec<String> },

    #[error("invalid unique value for field '{field}': {message}")]
    InvalidUniqueValue { field: String, message: String },

    #[error("includes nest deeper than {max} levels")]
    IncludeTooDeep { max: u8 },

    #[error(transparent)]
    Predicate(#[from] ValidateError),

    #[error("no '{entity}' record found")]
    NotFound { entity: String },
}

impl QueryError {
    pub(crate) fn unknown_field(entity: &EntityModel, field: &str) -> Self {
        Self::UnknownField {
            entity: entity.name.clone(),
            field: field.to_string(),
        }
    }

    pub(crate) fn unknown_relation(entity: &EntityModel, relation: &str) -> Self {
        Self::UnknownRelation {
            entity: entity.name.clone(),
            relation: relation.to_string(),
        }
    }

    pub(crate) fn not_found(entity: &EntityModel) -> Self {
        Self::NotFound {
            entity: entity.name.clone(),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound { .. } => ErrorClass::NotFound,
            _ => ErrorClass::Validation,
        }
    }
}
