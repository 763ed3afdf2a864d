use crate::db::{
    predicate::Predicate,
    query::{
        order::OrderBy,
        select::{Include, Selection},
        unique::WhereUnique,
    },
};

///
/// Scope
///
/// Row set addressed by a read: filter, ordering, cursor, paging and
/// distinct fields. Shared by find, count and aggregate arguments.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scope {
    pub filter: Option<Predicate>,
    pub order_by: Vec<OrderBy>,
    pub cursor: Option<WhereUnique>,
    pub take: Option<i64>,
    pub skip: usize,
    pub distinct: Vec<String>,
}

/// Builder methods over an args struct's `scope`.
macro_rules! impl_scope_builder {
    ( $( $ty:ty ),* $(,)? ) => {
        $(
            impl $ty {
                #[must_use]
                pub fn filter(mut self, predicate: $crate::db::predicate::Predicate) -> Self {
                    self.scope.filter = Some(predicate);
                    self
                }

                #[must_use]
                pub fn order_by(mut self, order: $crate::db::query::OrderBy) -> Self {
                    self.scope.order_by.push(order);
                    self
                }

                #[must_use]
                pub fn cursor(mut self, cursor: $crate::db::query::WhereUnique) -> Self {
                    self.scope.cursor = Some(cursor);
                    self
                }

                /// Negative values read backwards from the cursor or the end.
                #[must_use]
                pub const fn take(mut self, take: i64) -> Self {
                    self.scope.take = Some(take);
                    self
                }

                #[must_use]
                pub const fn skip(mut self, skip: usize) -> Self {
                    self.scope.skip = skip;
                    self
                }

                #[must_use]
                pub fn distinct<I, S>(mut self, fields: I) -> Self
                where
                    I: IntoIterator<Item = S>,
                    S: Into<String>,
                {
                    self.scope.distinct = fields.into_iter().map(Into::into).collect();
                    self
                }
            }
        )*
    };
}

pub(crate) use impl_scope_builder;

///
/// FindManyArgs
///
/// Arguments of `find_many` and `find_first`.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindManyArgs {
    pub scope: Scope,
    pub select: Selection,
}

impl FindManyArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn select(mut self, select: Selection) -> Self {
        self.select = select;
        self
    }

    /// Shorthand for adding one include to the selection.
    #[must_use]
    pub fn include(mut self, relation: impl Into<String>, include: Include) -> Self {
        self.select = self.select.include(relation, include);
        self
    }
}

///
/// FindUniqueArgs
///

#[derive(Clone, Debug, PartialEq)]
pub struct FindUniqueArgs {
    pub filter: WhereUnique,
    pub select: Selection,
}

impl FindUniqueArgs {
    #[must_use]
    pub fn new(filter: WhereUnique) -> Self {
        Self {
            filter,
            select: Selection::default(),
        }
    }

    #[must_use]
    pub fn select(mut self, select: Selection) -> Self {
        self.select = select;
        self
    }

    #[must_use]
    pub fn include(mut self, relation: impl Into<String>, include: Include) -> Self {
        self.select = self.select.include(relation, include);
        self
    }
}

///
/// CountArgs
///
/// `fields` adds per-field non-null counts next to the row count.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CountArgs {
    pub scope: Scope,
    pub fields: Vec<String>,
}

impl CountArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }
}

impl_scope_builder!(FindManyArgs, CountArgs);
