use crate::{
    config::QueryConfig,
    db::{query::order::RowOrder, relation::RowRef, store::RowKey},
    value::Value,
};
use std::collections::BTreeSet;

///
/// Window
///
/// Resolved pagination window over an ordered row set.
/// Negative `take` reads backwards from the cursor (or the end) and still
/// returns rows in order.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct Window {
    pub cursor: Option<Vec<Value>>,
    pub skip: usize,
    pub take: Option<i64>,
}

impl Window {
    /// Apply config defaults and clamp `take` to the configured maximum.
    pub fn resolve_take(take: Option<i64>, config: &QueryConfig) -> Option<i64> {
        let max = i64::from(config.max_take);

        take.or_else(|| config.default_take.map(i64::from))
            .map(|t| t.clamp(-max, max))
    }

    pub fn apply<'a>(
        &self,
        order: &RowOrder,
        rows: Vec<(Vec<Value>, RowRef<'a>)>,
    ) -> Vec<RowRef<'a>> {
        let backwards = self.take.is_some_and(|t| t < 0);

        let window: Vec<_> = match (&self.cursor, backwards) {
            (None, _) => rows,
            (Some(cursor), false) => {
                let start =
                    rows.partition_point(|(keys, _)| order.compare_keys(keys, cursor).is_lt());
                rows.into_iter().skip(start).collect()
            }
            (Some(cursor), true) => {
                let end =
                    rows.partition_point(|(keys, _)| order.compare_keys(keys, cursor).is_le());
                rows.into_iter().take(end).collect()
            }
        };
        let mut window: Vec<RowRef<'a>> = window.into_iter().map(|(_, row)| row).collect();

        if backwards {
            let end = window.len().saturating_sub(self.skip);
            window.truncate(end);
            let count = self
                .take
                .map_or(0, |t| usize::try_from(t.unsigned_abs()).unwrap_or(usize::MAX));
            let start = window.len().saturating_sub(count);

            return window.split_off(start);
        }

        let take = self
            .take
            .map_or(usize::MAX, |t| usize::try_from(t).unwrap_or(usize::MAX));

        window.into_iter().skip(self.skip).take(take).collect()
    }
}

/// Keep the first row for each distinct tuple of `fields`.
pub(crate) fn distinct<'a>(
    rows: Vec<(Vec<Value>, RowRef<'a>)>,
    fields: &[String],
) -> Vec<(Vec<Value>, RowRef<'a>)> {
    if fields.is_empty() {
        return rows;
    }

    let mut seen = BTreeSet::new();
    rows.into_iter()
        .filter(|(_, row)| {
            let tuple: Vec<RowKey> = fields
                .iter()
                .map(|field| RowKey::new(row.value(field).clone()))
                .collect();
            seen.insert(tuple)
        })
        .collect()
}
