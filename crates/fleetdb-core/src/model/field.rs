use crate::value::{Float64, Value};
use std::fmt;

///
/// FieldKind
///
/// Runtime type shape of one scalar or scalar-list column.
/// Aligned with `Value` variants.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Bool,
    Int,
    Uint,
    Float64,
    Decimal,
    Text,
    Timestamp,
    Ulid,
    Enum { name: String, variants: Vec<String> },
    List(Box<Self>),
}

impl FieldKind {
    /// Build an enum kind from its name and allowed variants.
    #[must_use]
    pub fn enumeration(name: impl Into<String>, variants: &[&str]) -> Self {
        Self::Enum {
            name: name.into(),
            variants: variants.iter().map(ToString::to_string).collect(),
        }
    }

    #[must_use]
    pub fn list(inner: Self) -> Self {
        Self::List(Box::new(inner))
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Uint | Self::Float64 | Self::Decimal)
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }

    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Scalar kinds that accept `lt`/`lte`/`gt`/`gte` filters.
    #[must_use]
    pub const fn supports_range(&self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Uint
                | Self::Float64
                | Self::Decimal
                | Self::Text
                | Self::Timestamp
                | Self::Ulid
        )
    }

    /// Kinds with a canonical order usable by ORDER BY and min/max.
    #[must_use]
    pub const fn is_orderable(&self) -> bool {
        !self.is_list()
    }

    /// Element kind for list fields.
    #[must_use]
    pub fn element(&self) -> Option<&Self> {
        match self {
            Self::List(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns true if a non-null literal can be stored or compared in this kind.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        self.coerce(value).is_some()
    }

    /// Convert a literal into this kind's canonical value variant.
    ///
    /// Numeric literals widen or narrow when lossless; enum variants may be
    /// given as text. Returns `None` when the literal does not fit.
    #[must_use]
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::Bool, Value::Bool(_))
            | (Self::Text, Value::Text(_))
            | (Self::Timestamp, Value::Timestamp(_))
            | (Self::Ulid, Value::Ulid(_)) => Some(value.clone()),

            (Self::Int, Value::Int(_) | Value::Uint(_)) => value.as_i64().map(Value::Int),
            (Self::Uint, Value::Uint(_)) => Some(value.clone()),
            (Self::Uint, Value::Int(i)) => u64::try_from(*i).ok().map(Value::Uint),
            (Self::Float64, v) if v.is_numeric() => v
                .to_f64()
                .and_then(|f| Float64::try_new(f).ok())
                .map(Value::Float64),
            (Self::Decimal, v) if v.is_numeric() => v.to_decimal().map(Value::Decimal),

            (Self::Enum { variants, .. }, Value::Enum(variant) | Value::Text(variant)) => variants
                .iter()
                .any(|v| v == variant)
                .then(|| Value::Enum(variant.clone())),

            (Self::List(inner), Value::List(items)) => items
                .iter()
                .map(|item| inner.coerce(item))
                .collect::<Option<Vec<_>>>()
                .map(Value::List),

            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "Bool"),
            Self::Int => write!(f, "Int"),
            Self::Uint => write!(f, "Uint"),
            Self::Float64 => write!(f, "Float64"),
            Self::Decimal => write!(f, "Decimal"),
            Self::Text => write!(f, "Text"),
            Self::Timestamp => write!(f, "Timestamp"),
            Self::Ulid => write!(f, "Ulid"),
            Self::Enum { name, .. } => write!(f, "Enum({name})"),
            Self::List(inner) => write!(f, "List<{inner}>"),
        }
    }
}

///
/// FieldDefault
///
/// Value source applied when a create input omits the field.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldDefault {
    /// Next integer after the highest stored value (starting at 1).
    Autoincrement,
    /// Current time on create.
    Now,
    /// Current time on create and on every update.
    UpdatedAt,
    /// Freshly generated ULID.
    GeneratedUlid,
    Value(Value),
}

///
/// FieldModel
/// Runtime field metadata used by validation, writes and planning.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldModel {
    pub name: String,
    pub kind: FieldKind,
    pub nullable: bool,
    pub unique: bool,
    pub default: Option<FieldDefault>,
}

impl FieldModel {
    /// A non-nullable field.
    #[must_use]
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            unique: false,
            default: None,
        }
    }

    /// A nullable field.
    #[must_use]
    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            nullable: true,
            ..Self::required(name, kind)
        }
    }

    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub fn default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn default_value(self, value: impl Into<Value>) -> Self {
        self.default(FieldDefault::Value(value.into()))
    }
}
