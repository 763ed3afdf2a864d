use crate::{
    config::ConfigError,
    db::{
        aggregate::GroupError, predicate::ValidateError, query::QueryError, store::StoreError,
        write::WriteError,
    },
    model::SchemaError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Classified error returned by every public operation. The typed layer
/// error that produced it is kept in `detail`.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
    pub detail: ErrorDetail,
}

impl Error {
    fn new(class: ErrorClass, origin: ErrorOrigin, detail: ErrorDetail) -> Self {
        Self {
            class,
            origin,
            message: detail.to_string(),
            detail,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self.class, ErrorClass::Conflict)
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.class, ErrorClass::Validation)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Origin-specific error carried by [`Error`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Schema(SchemaError),

    #[error("{0}")]
    Validate(ValidateError),

    #[error("{0}")]
    Query(QueryError),

    #[error("{0}")]
    Group(GroupError),

    #[error("{0}")]
    Write(WriteError),

    #[error("{0}")]
    Store(StoreError),

    #[error("{0}")]
    Config(ConfigError),
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Self::new(
            ErrorClass::Validation,
            ErrorOrigin::Schema,
            ErrorDetail::Schema(err),
        )
    }
}

impl From<ValidateError> for Error {
    fn from(err: ValidateError) -> Self {
        Self::new(
            ErrorClass::Validation,
            ErrorOrigin::Query,
            ErrorDetail::Validate(err),
        )
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Self::new(err.class(), ErrorOrigin::Query, ErrorDetail::Query(err))
    }
}

impl From<GroupError> for Error {
    fn from(err: GroupError) -> Self {
        Self::new(err.class(), ErrorOrigin::Aggregate, ErrorDetail::Group(err))
    }
}

impl From<WriteError> for Error {
    fn from(err: WriteError) -> Self {
        Self::new(err.class(), ErrorOrigin::Write, ErrorDetail::Write(err))
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Store, ErrorDetail::Store(err))
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(
            ErrorClass::Validation,
            ErrorOrigin::Config,
            ErrorDetail::Config(err),
        )
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    Conflict,
    Validation,
    Unsupported,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::Unsupported => "unsupported",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Schema,
    Query,
    Aggregate,
    Write,
    Store,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Schema => "schema",
            Self::Query => "query",
            Self::Aggregate => "aggregate",
            Self::Write => "write",
            Self::Store => "store",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}
