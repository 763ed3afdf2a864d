use crate::db::store::{Record, RowKey};

///
/// JournalEntry
///
/// Prior state of one row, captured before the store overwrote it.
/// `None` means the row did not exist.
///

#[derive(Clone, Debug)]
pub(crate) struct JournalEntry {
    pub entity: String,
    pub key: RowKey,
    pub prior: Option<Record>,
}

///
/// Savepoint
///
/// Journal position returned by `Store::savepoint`.
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Savepoint(usize);

///
/// Journal
///
/// Undo log for the in-memory store. Entries are restored in reverse write
/// order on rollback. Only writes made while a savepoint is open are
/// recorded, and entries are dropped when the outermost savepoint closes.
///

#[derive(Debug, Default)]
pub(crate) struct Journal {
    entries: Vec<JournalEntry>,
    open: usize,
}

impl Journal {
    pub fn savepoint(&mut self) -> Savepoint {
        self.open += 1;

        Savepoint(self.entries.len())
    }

    pub fn record(&mut self, entity: &str, key: RowKey, prior: Option<Record>) {
        if self.open == 0 {
            return;
        }
        self.entries.push(JournalEntry {
            entity: entity.to_string(),
            key,
            prior,
        });
    }

    /// Close `savepoint`, removing and returning the entries written after
    /// it, newest first.
    pub fn unwind(&mut self, savepoint: Savepoint) -> Vec<JournalEntry> {
        let at = savepoint.0.min(self.entries.len());
        let mut undone = self.entries.split_off(at);
        undone.reverse();
        self.close();

        undone
    }

    /// Close `savepoint`, keeping its entries for any enclosing savepoint.
    pub fn release(&mut self, _savepoint: Savepoint) {
        self.close();
    }

    fn close(&mut self) {
        self.open = self.open.saturating_sub(1);
        if self.open == 0 {
            self.entries.clear();
        }
    }

    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    pub const fn depth(&self) -> usize {
        self.open
    }
}
