//! Aggregation over a filtered row set and group-by with having filters.

mod accumulate;
mod args;
mod exec;
mod validate;


pub use args::{AggregateArgs, GroupByArgs};

pub(crate) use exec::{aggregate, count, group_by};

use crate::{
    db::{
        predicate::{CompareOp, ComparePredicate, Predicate, ValidateError},
        query::QueryError,
    },
    error::ErrorClass,
    value::Value,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// GroupError
///
/// Aggregate and group-by failures. Everything except arithmetic overflow
/// is raised before any row is read.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum GroupError {
    #[error("group by requires at least one field")]
    EmptyBy,

    #[error("unknown field '{entity}.{field}'")]
    UnknownField { entity: String, field: String },

    #[error("group by field '{field}' must be a scalar field")]
    UngroupableField { field: String },

    #[error("{op} requires a field")]
    MissingAggregateField { op: AggregateOp },

    #[error("{op} requires a numeric field, '{field}' is not numeric")]
    NotNumeric { op: AggregateOp, field: String },

    #[error("{op} requires an orderable field, '{field}' is not orderable")]
    NotOrderable { op: AggregateOp, field: String },

    #[error("having references '{field}', which is not in the group by list")]
    HavingFieldNotGrouped { field: String },

    #[error("having cannot filter on relation '{relation}'")]
    RelationInHaving { relation: String },

    #[error("group order_by references '{field}', which is neither grouped nor aggregated")]
    OrderFieldNotGrouped { field: String },

    #[error("group take/skip requires an explicit order_by")]
    UnorderedPagination,

    #[error("{op} over '{field}' overflowed")]
    Overflow { op: AggregateOp, field: String },

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Predicate(#[from] ValidateError),
}

impl GroupError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Overflow { .. } => ErrorClass::Unsupported,
            Self::Query(err) => err.class(),
            _ => ErrorClass::Validation,
        }
    }
}

///
/// AggregateOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AggregateOp {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateOp {
    /// Result key prefix (`_count`, `_sum`, ...).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Count => "_count",
            Self::Sum => "_sum",
            Self::Avg => "_avg",
            Self::Min => "_min",
            Self::Max => "_max",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "_count" => Some(Self::Count),
            "_sum" => Some(Self::Sum),
            "_avg" => Some(Self::Avg),
            "_min" => Some(Self::Min),
            "_max" => Some(Self::Max),
            _ => None,
        }
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

///
/// AggregateSpec
///
/// One aggregate terminal. `field` is `None` only for `_count._all`.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AggregateSpec {
    pub op: AggregateOp,
    pub field: Option<String>,
}

impl AggregateSpec {
    const ALL: &'static str = "_all";

    /// Number of rows.
    #[must_use]
    pub const fn count_all() -> Self {
        Self {
            op: AggregateOp::Count,
            field: None,
        }
    }

    /// Number of non-null values of `field`.
    #[must_use]
    pub fn count(field: impl Into<String>) -> Self {
        Self::of(AggregateOp::Count, field)
    }

    #[must_use]
    pub fn sum(field: impl Into<String>) -> Self {
        Self::of(AggregateOp::Sum, field)
    }

    #[must_use]
    pub fn avg(field: impl Into<String>) -> Self {
        Self::of(AggregateOp::Avg, field)
    }

    #[must_use]
    pub fn min(field: impl Into<String>) -> Self {
        Self::of(AggregateOp::Min, field)
    }

    #[must_use]
    pub fn max(field: impl Into<String>) -> Self {
        Self::of(AggregateOp::Max, field)
    }

    #[must_use]
    pub fn of(op: AggregateOp, field: impl Into<String>) -> Self {
        Self {
            op,
            field: Some(field.into()),
        }
    }

    /// Field label inside the result group: the field name or `_all`.
    #[must_use]
    pub fn field_label(&self) -> &str {
        self.field.as_deref().unwrap_or(Self::ALL)
    }

    /// Dotted key naming this aggregate in having filters and group
    /// ordering, e.g. `_avg.rating` or `_count._all`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}.{}", self.op.label(), self.field_label())
    }

    /// Inverse of [`Self::key`].
    #[must_use]
    pub fn parse_key(key: &str) -> Option<Self> {
        let (op, field) = key.split_once('.')?;
        let op = AggregateOp::from_label(op)?;

        match (op, field) {
            (AggregateOp::Count, Self::ALL) => Some(Self::count_all()),
            (_, Self::ALL | "") => None,
            (op, field) => Some(Self::of(op, field)),
        }
    }

    fn compare(&self, op: CompareOp, value: Value) -> Predicate {
        Predicate::Compare(ComparePredicate::new(self.key(), op, value))
    }

    ///
    /// HAVING BUILDERS
    ///

    #[must_use]
    pub fn eq(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Eq, value.into())
    }

    #[must_use]
    pub fn ne(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Ne, value.into())
    }

    #[must_use]
    pub fn lt(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Lt, value.into())
    }

    #[must_use]
    pub fn lte(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Lte, value.into())
    }

    #[must_use]
    pub fn gt(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Gt, value.into())
    }

    #[must_use]
    pub fn gte(&self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Gte, value.into())
    }
}
