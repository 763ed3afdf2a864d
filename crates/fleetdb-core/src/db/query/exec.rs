use crate::{
    config::QueryConfig,
    db::{
        predicate::{matches, prepare},
        query::{
            QueryError,
            args::Scope,
            order::RowOrder,
            page::{Window, distinct},
        },
        relation::{ReadCtx, RowRef},
    },
    model::EntityModel,
};

///
/// Find pipeline
///
/// validate → filter → order → distinct → cursor window → skip/take.
/// Every check runs before the first row is read.
///

/// Rows of `entity` addressed by `scope`, in result order.
///
/// `take` is passed separately so callers decide whether the configured
/// default page size applies.
pub(crate) fn select_rows<'a>(
    ctx: ReadCtx<'a>,
    entity: &'a EntityModel,
    scope: &Scope,
    take: Option<i64>,
) -> Result<Vec<RowRef<'a>>, QueryError> {
    let filter = scope
        .filter
        .as_ref()
        .map(|f| prepare(ctx.schema, entity, f))
        .transpose()?;
    for term in &scope.order_by {
        term.validate(ctx.schema, entity)?;
    }
    for field in &scope.distinct {
        if entity.get_field(field).is_none() {
            return Err(QueryError::unknown_field(entity, field));
        }
    }
    let cursor = scope
        .cursor
        .as_ref()
        .map(|cursor| cursor.resolve(ctx, entity))
        .transpose()?;

    let order = RowOrder::new(entity, &scope.order_by);

    // the cursor row positions the window by its sort keys
    let cursor_keys = match cursor {
        Some(cursor) => match cursor.find(ctx, entity) {
            Some(row) => Some(order.keys(&row)),
            None => return Ok(Vec::new()),
        },
        None => None,
    };

    let rows: Vec<_> = ctx
        .rows(entity)
        .filter(|row| filter.as_ref().is_none_or(|f| matches(row, f)))
        .collect();
    let sorted = distinct(order.sort(rows), &scope.distinct);

    let window = Window {
        cursor: cursor_keys,
        skip: scope.skip,
        take,
    };

    Ok(window.apply(&order, sorted))
}

/// First row addressed by `scope`; a negative `take` selects the last one.
pub(crate) fn find_first_row<'a>(
    ctx: ReadCtx<'a>,
    entity: &'a EntityModel,
    scope: &Scope,
) -> Result<Option<RowRef<'a>>, QueryError> {
    let take = if scope.take.is_some_and(|t| t < 0) { -1 } else { 1 };
    let mut rows = select_rows(ctx, entity, scope, Some(take))?;

    Ok(rows.pop())
}

/// Page of rows for `find_many`: config default take, clamped.
pub(crate) fn find_many_rows<'a>(
    ctx: ReadCtx<'a>,
    entity: &'a EntityModel,
    scope: &Scope,
    config: &QueryConfig,
) -> Result<Vec<RowRef<'a>>, QueryError> {
    select_rows(ctx, entity, scope, Window::resolve_take(scope.take, config))
}
