use crate::{db::aggregate::AggregateSpec, value::Value};
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::collections::BTreeMap;

///
/// BatchPayload
///
/// Row count affected by a batch write.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct BatchPayload {
    pub count: u64,
}

///
/// CountResult
///
/// `_all` row count plus non-null counts for requested fields.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct CountResult {
    #[serde(rename = "_all")]
    pub all: u64,
    #[serde(flatten)]
    pub fields: BTreeMap<String, u64>,
}

impl CountResult {
    #[must_use]
    pub fn field(&self, field: &str) -> Option<u64> {
        self.fields.get(field).copied()
    }
}

///
/// AggregateResult
///
/// Aggregate values keyed by terminal. Serializes grouped by operation:
/// `{"_count": {"_all": 3}, "_avg": {"rating": 4.5}}`.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AggregateResult {
    values: BTreeMap<AggregateSpec, Value>,
}

impl AggregateResult {
    pub(crate) fn insert(&mut self, spec: AggregateSpec, value: Value) {
        self.values.insert(spec, value);
    }

    #[must_use]
    pub fn get(&self, spec: &AggregateSpec) -> Option<&Value> {
        self.values.get(spec)
    }

    /// `_count._all`, when requested.
    #[must_use]
    pub fn count_all(&self) -> Option<u64> {
        match self.get(&AggregateSpec::count_all()) {
            Some(Value::Uint(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AggregateSpec, &Value)> {
        self.values.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn nested(&self) -> BTreeMap<&'static str, BTreeMap<&str, &Value>> {
        let mut out: BTreeMap<_, BTreeMap<_, _>> = BTreeMap::new();
        for (spec, value) in &self.values {
            out.entry(spec.op.label())
                .or_default()
                .insert(spec.field_label(), value);
        }

        out
    }
}

impl Serialize for AggregateResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.nested().serialize(serializer)
    }
}

///
/// GroupRow
///
/// One group: the grouped field values and the requested aggregates.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GroupRow {
    pub key: Vec<(String, Value)>,
    pub aggregates: AggregateResult,
}

impl GroupRow {
    /// Grouped value of `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.key.iter().find(|(f, _)| f == field).map(|(_, v)| v)
    }
}

impl Serialize for GroupRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let nested = self.aggregates.nested();
        let mut map = serializer.serialize_map(Some(self.key.len() + nested.len()))?;
        for (field, value) in &self.key {
            map.serialize_entry(field, value)?;
        }
        for (op, values) in &nested {
            map.serialize_entry(op, values)?;
        }

        map.end()
    }
}
