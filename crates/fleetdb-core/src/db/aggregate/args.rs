use crate::db::{
    aggregate::AggregateSpec,
    predicate::Predicate,
    query::{OrderBy, Scope, impl_scope_builder},
};

///
/// AggregateArgs
///
/// Aggregates over the rows addressed by `scope`. Ordering and paging apply
/// before aggregation; no default page size is used.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AggregateArgs {
    pub scope: Scope,
    pub aggregates: Vec<AggregateSpec>,
}

impl AggregateArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn aggregate(mut self, spec: AggregateSpec) -> Self {
        self.aggregates.push(spec);
        self
    }

    #[must_use]
    pub fn count_all(self) -> Self {
        self.aggregate(AggregateSpec::count_all())
    }

    #[must_use]
    pub fn count(self, field: impl Into<String>) -> Self {
        self.aggregate(AggregateSpec::count(field))
    }

    #[must_use]
    pub fn sum(self, field: impl Into<String>) -> Self {
        self.aggregate(AggregateSpec::sum(field))
    }

    #[must_use]
    pub fn avg(self, field: impl Into<String>) -> Self {
        self.aggregate(AggregateSpec::avg(field))
    }

    #[must_use]
    pub fn min(self, field: impl Into<String>) -> Self {
        self.aggregate(AggregateSpec::min(field))
    }

    #[must_use]
    pub fn max(self, field: impl Into<String>) -> Self {
        self.aggregate(AggregateSpec::max(field))
    }
}

impl_scope_builder!(AggregateArgs);

///
/// GroupByArgs
///
/// `having` may compare grouped fields directly and any aggregate through
/// its key (see [`AggregateSpec::key`]). `order_by` terms name grouped
/// fields or aggregate keys.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupByArgs {
    pub by: Vec<String>,
    pub filter: Option<Predicate>,
    pub having: Option<Predicate>,
    pub aggregates: Vec<AggregateSpec>,
    pub order_by: Vec<OrderBy>,
    pub take: Option<usize>,
    pub skip: usize,
}

impl GroupByArgs {
    #[must_use]
    pub fn new<I, S>(by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            by: by.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(predicate);
        self
    }

    #[must_use]
    pub fn having(mut self, predicate: Predicate) -> Self {
        self.having = Some(predicate);
        self
    }

    #[must_use]
    pub fn aggregate(mut self, spec: AggregateSpec) -> Self {
        self.aggregates.push(spec);
        self
    }

    #[must_use]
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    #[must_use]
    pub const fn take(mut self, take: usize) -> Self {
        self.take = Some(take);
        self
    }

    #[must_use]
    pub const fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }
}
