use crate::{
    db::predicate::{CompareOp, ComparePredicate, Predicate, QueryMode, RelationFilter},
    value::Value,
};

/// Start a predicate on a scalar field.
#[must_use]
pub const fn field(name: &'static str) -> FieldRef {
    FieldRef::new(name)
}

/// Start a quantified predicate on a relation.
#[must_use]
pub const fn relation(name: &'static str) -> RelationRef {
    RelationRef::new(name)
}

fn list<I, V>(values: I) -> Value
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Value::List(values.into_iter().map(Into::into).collect())
}

///
/// FieldRef
///
/// Static field name plus the text mode applied by every operator built
/// from it. `field("email").insensitive().ends_with("@acme.io")`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldRef {
    name: &'static str,
    mode: QueryMode,
}

impl FieldRef {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            mode: QueryMode::Default,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.name
    }

    /// Compare text case-insensitively.
    #[must_use]
    pub const fn insensitive(mut self) -> Self {
        self.mode = QueryMode::Insensitive;
        self
    }

    fn compare(self, op: CompareOp, value: Value) -> Predicate {
        Predicate::Compare(ComparePredicate::new(self.name, op, value).with_mode(self.mode))
    }

    // ------------------------------------------------------------------
    // Comparison predicates
    // ------------------------------------------------------------------

    /// Equality; a null literal tests IS NULL.
    #[must_use]
    pub fn eq(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Eq, value.into())
    }

    /// Inequality; a null literal tests IS NOT NULL.
    #[must_use]
    pub fn ne(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Ne, value.into())
    }

    #[must_use]
    pub fn lt(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Lt, value.into())
    }

    #[must_use]
    pub fn lte(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Lte, value.into())
    }

    #[must_use]
    pub fn gt(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Gt, value.into())
    }

    #[must_use]
    pub fn gte(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Gte, value.into())
    }

    #[must_use]
    pub fn in_list<I, V>(self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.compare(CompareOp::In, list(values))
    }

    #[must_use]
    pub fn not_in<I, V>(self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.compare(CompareOp::NotIn, list(values))
    }

    // ------------------------------------------------------------------
    // Text predicates
    // ------------------------------------------------------------------

    #[must_use]
    pub fn contains(self, value: impl Into<String>) -> Predicate {
        self.compare(CompareOp::Contains, Value::Text(value.into()))
    }

    #[must_use]
    pub fn starts_with(self, value: impl Into<String>) -> Predicate {
        self.compare(CompareOp::StartsWith, Value::Text(value.into()))
    }

    #[must_use]
    pub fn ends_with(self, value: impl Into<String>) -> Predicate {
        self.compare(CompareOp::EndsWith, Value::Text(value.into()))
    }

    // ------------------------------------------------------------------
    // List predicates
    // ------------------------------------------------------------------

    #[must_use]
    pub fn has(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Has, value.into())
    }

    #[must_use]
    pub fn has_every<I, V>(self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.compare(CompareOp::HasEvery, list(values))
    }

    #[must_use]
    pub fn has_some<I, V>(self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.compare(CompareOp::HasSome, list(values))
    }

    #[must_use]
    pub fn is_empty(self) -> Predicate {
        Predicate::IsEmpty {
            field: self.name.to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Structural predicates
    // ------------------------------------------------------------------

    #[must_use]
    pub fn is_null(self) -> Predicate {
        Predicate::is_null(self.name)
    }

    #[must_use]
    pub fn is_not_null(self) -> Predicate {
        Predicate::is_not_null(self.name)
    }
}

///
/// RelationRef
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RelationRef(&'static str);

impl RelationRef {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    fn quantify(self, filter: RelationFilter) -> Predicate {
        Predicate::relation(self.0, filter)
    }

    /// At least one related row matches.
    #[must_use]
    pub fn some(self, predicate: Predicate) -> Predicate {
        self.quantify(RelationFilter::Some(Box::new(predicate)))
    }

    /// No related row matches.
    #[must_use]
    pub fn none(self, predicate: Predicate) -> Predicate {
        self.quantify(RelationFilter::None(Box::new(predicate)))
    }

    /// Every related row matches; true when there are none.
    #[must_use]
    pub fn every(self, predicate: Predicate) -> Predicate {
        self.quantify(RelationFilter::Every(Box::new(predicate)))
    }

    /// The to-one related row exists and matches.
    #[must_use]
    pub fn is(self, predicate: Predicate) -> Predicate {
        self.quantify(RelationFilter::Is(Some(Box::new(predicate))))
    }

    /// The to-one related row is absent or does not match.
    #[must_use]
    pub fn is_not(self, predicate: Predicate) -> Predicate {
        self.quantify(RelationFilter::IsNot(Some(Box::new(predicate))))
    }

    #[must_use]
    pub fn absent(self) -> Predicate {
        self.quantify(RelationFilter::Is(None))
    }

    #[must_use]
    pub fn present(self) -> Predicate {
        self.quantify(RelationFilter::IsNot(None))
    }
}
