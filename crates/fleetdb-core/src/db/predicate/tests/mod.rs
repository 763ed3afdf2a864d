mod runtime;

use crate::{
    db::predicate::{FieldPresence, Row},
    value::Value,
};
use std::collections::BTreeMap;

///
/// TestRow
///
/// Map-backed row with pre-resolved relations.
///

#[derive(Clone, Debug, Default)]
pub(super) struct TestRow {
    pub fields: BTreeMap<String, Value>,
    pub related: BTreeMap<String, Vec<Self>>,
}

impl TestRow {
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    pub fn relate(mut self, relation: &str, rows: Vec<Self>) -> Self {
        self.related.insert(relation.to_string(), rows);
        self
    }
}

impl Row for TestRow {
    fn field(&self, name: &str) -> FieldPresence {
        match self.fields.get(name) {
            Some(value) => FieldPresence::Present(value.clone()),
            None => FieldPresence::Missing,
        }
    }

    fn related(&self, relation: &str) -> Option<Vec<Self>> {
        self.related.get(relation).cloned()
    }
}
