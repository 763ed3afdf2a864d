use crate::value::Value;
use derive_more::{Deref, DerefMut, IntoIterator};
use std::{cmp::Ordering, collections::BTreeMap, fmt};

///
/// RowKey
///
/// Primary key value of a stored row, ordered canonically.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RowKey(Value);

impl RowKey {
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.0
    }
}

impl Ord for RowKey {
    fn cmp(&self, other: &Self) -> Ordering {
        Value::canonical_cmp(&self.0, &other.0)
    }
}

impl PartialOrd for RowKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

///
/// Record
///
/// One stored row: every declared field mapped to its value.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Eq, IntoIterator, PartialEq)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Field value, `Null` when absent.
    #[must_use]
    pub fn value(&self, field: &str) -> &Value {
        const NULL: &Value = &Value::Null;

        self.0.get(field).unwrap_or(NULL)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
