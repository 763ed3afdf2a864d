mod journal;
mod record;


pub use journal::Savepoint;
pub use record::{Record, RowKey};

use crate::{model::Schema, value::Value};
use journal::Journal;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// StoreError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreError {
    #[error("no table registered for entity '{0}'")]
    UnknownEntity(String),

    #[error("sequence for '{entity}.{field}' is exhausted")]
    SequenceExhausted { entity: String, field: String },
}

///
/// Table
///
/// Rows of one entity keyed by primary key, plus the high-water marks of its
/// autoincrement fields.
///

#[derive(Debug, Default)]
pub struct Table {
    rows: BTreeMap<RowKey, Record>,
    sequences: BTreeMap<String, u64>,
}

impl Table {
    #[must_use]
    pub fn get(&self, key: &RowKey) -> Option<&Record> {
        self.rows.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RowKey, &Record)> {
        self.rows.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.rows.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

///
/// Store
///
/// In-memory row storage for every entity in a schema. Each write records
/// the row's prior state in the undo journal so a savepoint can be rolled
/// back. Sequences are not journaled: a rolled-back insert still consumes
/// its autoincrement value.
///

#[derive(Debug, Default)]
pub struct Store {
    tables: BTreeMap<String, Table>,
    journal: Journal,
}

impl Store {
    #[must_use]
    pub fn new(schema: &Schema) -> Self {
        let tables = schema
            .entities()
            .map(|entity| (entity.name.clone(), Table::default()))
            .collect();

        Self {
            tables,
            journal: Journal::default(),
        }
    }

    pub fn table(&self, entity: &str) -> Result<&Table, StoreError> {
        self.tables
            .get(entity)
            .ok_or_else(|| StoreError::UnknownEntity(entity.to_string()))
    }

    fn table_mut(&mut self, entity: &str) -> Result<&mut Table, StoreError> {
        self.tables
            .get_mut(entity)
            .ok_or_else(|| StoreError::UnknownEntity(entity.to_string()))
    }

    #[must_use]
    pub fn get(&self, entity: &str, key: &RowKey) -> Option<&Record> {
        self.tables.get(entity).and_then(|table| table.get(key))
    }

    ///
    /// WRITES
    ///

    /// Insert or replace the row at `key`.
    pub fn put(&mut self, entity: &str, key: RowKey, record: Record) -> Result<(), StoreError> {
        let table = self.table_mut(entity)?;
        let prior = table.rows.insert(key.clone(), record);
        self.journal.record(entity, key, prior);

        Ok(())
    }

    /// Remove the row at `key`, returning it if it existed.
    pub fn remove(&mut self, entity: &str, key: &RowKey) -> Result<Option<Record>, StoreError> {
        let table = self.table_mut(entity)?;
        let prior = table.rows.remove(key);
        if prior.is_some() {
            self.journal.record(entity, key.clone(), prior.clone());
        }

        Ok(prior)
    }

    /// Next autoincrement value for `entity.field`.
    ///
    /// Starts above both the stored maximum and every value handed out before.
    pub fn next_sequence(&mut self, entity: &str, field: &str) -> Result<u64, StoreError> {
        let table = self.table_mut(entity)?;
        let stored_max = table
            .records()
            .filter_map(|record| match record.value(field) {
                Value::Int(i) => u64::try_from(*i).ok(),
                Value::Uint(u) => Some(*u),
                _ => None,
            })
            .max()
            .unwrap_or(0);

        let mark = table.sequences.entry(field.to_string()).or_insert(0);
        let next = (*mark).max(stored_max).checked_add(1).ok_or_else(|| {
            StoreError::SequenceExhausted {
                entity: entity.to_string(),
                field: field.to_string(),
            }
        })?;
        *mark = next;

        Ok(next)
    }

    ///
    /// JOURNAL
    ///

    /// Open a savepoint. Every savepoint must be closed by exactly one
    /// `rollback_to` or `release`, innermost first.
    pub fn savepoint(&mut self) -> Savepoint {
        self.journal.savepoint()
    }

    /// Undo every write made after `savepoint`.
    pub fn rollback_to(&mut self, savepoint: Savepoint) {
        for entry in self.journal.unwind(savepoint) {
            let Some(table) = self.tables.get_mut(&entry.entity) else {
                continue;
            };
            match entry.prior {
                Some(record) => {
                    table.rows.insert(entry.key, record);
                }
                None => {
                    table.rows.remove(&entry.key);
                }
            }
        }
    }

    /// Keep writes made after `savepoint`.
    pub fn release(&mut self, savepoint: Savepoint) {
        self.journal.release(savepoint);
    }

    #[must_use]
    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }

    /// Number of savepoints currently open.
    #[must_use]
    pub const fn savepoint_depth(&self) -> usize {
        self.journal.depth()
    }
}
