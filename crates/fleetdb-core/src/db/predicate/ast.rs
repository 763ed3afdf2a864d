use crate::value::{TextMode, Value};
use std::ops::{BitAnd, BitOr, Not};

///
/// Predicate AST
///
/// Pure, schema-agnostic representation of where-inputs.
/// This layer contains no type validation or execution semantics.
/// All interpretation occurs in later passes:
///
/// - validation (schema-aware)
/// - normalization
/// - evaluation
///

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum CompareOp {
    Eq = 0x01,
    Ne = 0x02,
    Lt = 0x03,
    Lte = 0x04,
    Gt = 0x05,
    Gte = 0x06,
    In = 0x07,
    NotIn = 0x08,
    Contains = 0x09,
    StartsWith = 0x0a,
    EndsWith = 0x0b,
    /// List field contains the literal element.
    Has = 0x0c,
    /// List field contains every element of the literal list.
    HasEvery = 0x0d,
    /// List field contains at least one element of the literal list.
    HasSome = 0x0e,
}

impl CompareOp {
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(self, Self::Lt | Self::Lte | Self::Gt | Self::Gte)
    }

    #[must_use]
    pub const fn is_text_match(self) -> bool {
        matches!(self, Self::Contains | Self::StartsWith | Self::EndsWith)
    }

    #[must_use]
    pub const fn is_list_op(self) -> bool {
        matches!(self, Self::Has | Self::HasEvery | Self::HasSome)
    }
}

///
/// QueryMode
///
/// Case-sensitivity for string operators. Applies uniformly to every text
/// comparison in one `ComparePredicate`.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum QueryMode {
    #[default]
    Default,
    Insensitive,
}

impl QueryMode {
    #[must_use]
    pub const fn text_mode(self) -> TextMode {
        match self {
            Self::Default => TextMode::Cs,
            Self::Insensitive => TextMode::Ci,
        }
    }
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComparePredicate {
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
    pub mode: QueryMode,
}

impl ComparePredicate {
    #[must_use]
    pub fn new(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
            mode: QueryMode::Default,
        }
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: QueryMode) -> Self {
        self.mode = mode;
        self
    }
}

///
/// RelationFilter
///
/// Quantified sub-predicate over the rows a relation resolves to.
/// `Is`/`IsNot` are to-one only; `None` inside them tests presence.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RelationFilter {
    Some(Box<Predicate>),
    None(Box<Predicate>),
    Every(Box<Predicate>),
    Is(Option<Box<Predicate>>),
    IsNot(Option<Box<Predicate>>),
}

impl RelationFilter {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Some(_) => "some",
            Self::None(_) => "none",
            Self::Every(_) => "every",
            Self::Is(_) => "is",
            Self::IsNot(_) => "is_not",
        }
    }

    #[must_use]
    pub fn inner(&self) -> Option<&Predicate> {
        match self {
            Self::Some(p) | Self::None(p) | Self::Every(p) => Some(p),
            Self::Is(p) | Self::IsNot(p) => p.as_deref(),
        }
    }

    #[must_use]
    pub const fn is_to_one_only(&self) -> bool {
        matches!(self, Self::Is(_) | Self::IsNot(_))
    }
}

///
/// RelationPredicate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelationPredicate {
    pub relation: String,
    pub filter: RelationFilter,
}

///
/// Predicate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Predicate {
    True,
    False,
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare(ComparePredicate),
    IsNull { field: String },
    IsNotNull { field: String },
    /// List field holds no elements.
    IsEmpty { field: String },
    Relation(RelationPredicate),
}

impl Predicate {
    #[must_use]
    pub const fn and(preds: Vec<Self>) -> Self {
        Self::And(preds)
    }

    #[must_use]
    pub const fn or(preds: Vec<Self>) -> Self {
        Self::Or(preds)
    }

    #[expect(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(pred: Self) -> Self {
        Self::Not(Box::new(pred))
    }

    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Compare(ComparePredicate::new(field, CompareOp::Eq, value))
    }

    #[must_use]
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Compare(ComparePredicate::new(field, CompareOp::Ne, value))
    }

    #[must_use]
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Compare(ComparePredicate::new(field, CompareOp::Lt, value))
    }

    #[must_use]
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Compare(ComparePredicate::new(field, CompareOp::Lte, value))
    }

    #[must_use]
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Compare(ComparePredicate::new(field, CompareOp::Gt, value))
    }

    #[must_use]
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Compare(ComparePredicate::new(field, CompareOp::Gte, value))
    }

    #[must_use]
    pub fn in_<V: Into<Value>>(field: impl Into<String>, values: Vec<V>) -> Self {
        Self::Compare(ComparePredicate::new(
            field,
            CompareOp::In,
            Value::from_list(values),
        ))
    }

    #[must_use]
    pub fn not_in<V: Into<Value>>(field: impl Into<String>, values: Vec<V>) -> Self {
        Self::Compare(ComparePredicate::new(
            field,
            CompareOp::NotIn,
            Value::from_list(values),
        ))
    }

    #[must_use]
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::IsNull {
            field: field.into(),
        }
    }

    #[must_use]
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::IsNotNull {
            field: field.into(),
        }
    }

    #[must_use]
    pub fn relation(relation: impl Into<String>, filter: RelationFilter) -> Self {
        Self::Relation(RelationPredicate {
            relation: relation.into(),
            filter,
        })
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitAnd for &Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Self) -> Self::Output {
        Predicate::And(vec![self.clone(), rhs.clone()])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}

impl BitOr for &Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Self) -> Self::Output {
        Predicate::Or(vec![self.clone(), rhs.clone()])
    }
}

impl Not for Predicate {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}
