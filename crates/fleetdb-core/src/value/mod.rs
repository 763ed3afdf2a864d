mod compare;
mod float;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use serde::Serialize;
use std::{borrow::Cow, cmp::Ordering, fmt};
use ulid::Ulid;

// re-exports
pub use float::{Float64, FloatError};

///
/// TextMode
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TextMode {
    #[default]
    Cs, // case-sensitive
    Ci, // case-insensitive
}

///
/// NumericRepr
///

enum NumericRepr {
    Decimal(Decimal),
    F64(f64),
    None,
}

impl NumericRepr {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Decimal(d) => d.to_f64(),
            Self::F64(f) => Some(*f),
            Self::None => None,
        }
    }
}

///
/// Value
/// can be used in WHERE statements, row storage and result views
///
/// Null        → the field holds no value (SQL NULL).
/// List        → ordered values; scalar list fields and IN literals.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float64(Float64),
    Decimal(Decimal),
    Text(String),
    Timestamp(DateTime<Utc>),
    Ulid(Ulid),
    /// Enum variant name; the owning field declares the allowed variants.
    Enum(String),
    List(Vec<Self>),
}

impl Value {
    ///
    /// CONSTRUCTION
    ///

    /// Build a `Value::List` from owned items.
    pub fn from_list<T>(items: Vec<T>) -> Self
    where
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build an enum value from its variant name.
    #[must_use]
    pub fn enum_variant(variant: impl Into<String>) -> Self {
        Self::Enum(variant.into())
    }

    ///
    /// TYPES
    ///

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for variants that take part in numeric widening.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int(_) | Self::Uint(_) | Self::Float64(_) | Self::Decimal(_)
        )
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_))
    }

    /// Short variant label used in diagnostics.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float64(_) => "float64",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
            Self::Timestamp(_) => "timestamp",
            Self::Ulid(_) => "ulid",
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
        }
    }

    ///
    /// CONVERSION
    ///

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&[Self]> {
        if let Self::List(xs) = self {
            Some(xs.as_slice())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        if let Self::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// Lossless integer view of `Int` and in-range `Uint` values.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Uint(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Int(i) => Some(Decimal::from(*i)),
            Self::Uint(u) => Some(Decimal::from(*u)),
            Self::Decimal(d) => Some(*d),
            Self::Float64(f) => Decimal::from_f64(f.get()),
            _ => None,
        }
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Uint(u) => Some(*u as f64),
            Self::Decimal(d) => d.to_f64(),
            Self::Float64(f) => Some(f.get()),
            _ => None,
        }
    }

    fn numeric_repr(&self) -> NumericRepr {
        if !self.is_numeric() {
            return NumericRepr::None;
        }
        if let Some(d) = self.to_decimal() {
            return NumericRepr::Decimal(d);
        }
        if let Some(f) = self.to_f64() {
            return NumericRepr::F64(f);
        }

        NumericRepr::None
    }

    /// Cross-variant numeric comparison; returns None if either side is non-numeric.
    #[must_use]
    pub fn cmp_numeric(&self, other: &Self) -> Option<Ordering> {
        match (self.numeric_repr(), other.numeric_repr()) {
            (NumericRepr::Decimal(a), NumericRepr::Decimal(b)) => Some(a.cmp(&b)),
            (NumericRepr::None, _) | (_, NumericRepr::None) => None,
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }

    ///
    /// ORDERING
    ///

    /// Total canonical comparator used by ORDER BY, group keys and normalization.
    #[must_use]
    pub fn canonical_cmp(left: &Self, right: &Self) -> Ordering {
        compare::canonical_cmp(left, right)
    }

    /// Comparator for predicate evaluation.
    ///
    /// Numeric variants widen; other variants must match. Returns `None`
    /// when the pair has no defined ordering.
    #[must_use]
    pub fn partial_cmp_value(left: &Self, right: &Self) -> Option<Ordering> {
        if left.is_numeric() && right.is_numeric() {
            return left.cmp_numeric(right);
        }

        compare::strict_order_cmp(left, right)
    }

    ///
    /// TEXT COMPARISON
    ///

    fn fold_ci(s: &str) -> Cow<'_, str> {
        if s.is_ascii() {
            return Cow::Owned(s.to_ascii_lowercase());
        }

        Cow::Owned(s.to_lowercase())
    }

    fn text_with_mode(s: &'_ str, mode: TextMode) -> Cow<'_, str> {
        match mode {
            TextMode::Cs => Cow::Borrowed(s),
            TextMode::Ci => Self::fold_ci(s),
        }
    }

    fn text_op<T>(&self, other: &Self, mode: TextMode, f: impl Fn(&str, &str) -> T) -> Option<T> {
        let (a, b) = (self.as_text()?, other.as_text()?);
        let a = Self::text_with_mode(a, mode);
        let b = Self::text_with_mode(b, mode);

        Some(f(&a, &b))
    }

    /// Case-sensitive/insensitive equality check for text values.
    #[must_use]
    pub fn text_eq(&self, other: &Self, mode: TextMode) -> Option<bool> {
        self.text_op(other, mode, |a, b| a == b)
    }

    /// Ordering of two text values under the given text mode.
    #[must_use]
    pub fn text_cmp(&self, other: &Self, mode: TextMode) -> Option<Ordering> {
        self.text_op(other, mode, |a, b| a.cmp(b))
    }

    /// Check whether `needle` is a substring of `self` under the given text mode.
    #[must_use]
    pub fn text_contains(&self, needle: &Self, mode: TextMode) -> Option<bool> {
        self.text_op(needle, mode, |a, b| a.contains(b))
    }

    /// Check whether `self` starts with `needle` under the given text mode.
    #[must_use]
    pub fn text_starts_with(&self, needle: &Self, mode: TextMode) -> Option<bool> {
        self.text_op(needle, mode, |a, b| a.starts_with(b))
    }

    /// Check whether `self` ends with `needle` under the given text mode.
    #[must_use]
    pub fn text_ends_with(&self, needle: &Self, mode: TextMode) -> Option<bool> {
        self.text_op(needle, mode, |a, b| a.ends_with(b))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Ulid(v) => write!(f, "{v}"),
            Self::Enum(v) => write!(f, "{v}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

///
/// From impls
///

macro_rules! impl_value_from {
    ( $( $ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_value_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    Decimal => Decimal,
    Float64 => Float64,
    String => Text,
    &str => Text,
    DateTime<Utc> => Timestamp,
    Ulid => Ulid,
}

/// Non-finite floats have no total order and convert to `Null`.
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Float64::try_new(v).map_or(Self::Null, Self::Float64)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::from_list(v)
    }
}
