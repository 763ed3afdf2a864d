//! Core engine for fleetdb: values, schema model, predicates, queries,
//! aggregation, nested writes and the in-memory store, exposed per entity
//! through `Db::delegate`.

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use db::Db;
pub use error::Error;

///
/// CONSTANTS
///

/// Workspace version re-export for downstream tooling and tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///
/// Schema vocabulary, query builders and argument structs.
/// Stores and executors stay in their modules.
///

pub mod prelude {
    pub use crate::{
        config::{DbConfig, QueryConfig},
        db::{
            Db, Delegate,
            aggregate::{AggregateArgs, AggregateOp, AggregateSpec, GroupByArgs},
            predicate::{Predicate, QueryMode},
            query::{
                CountArgs, FindManyArgs, FindUniqueArgs, Include, NullsOrder, OrderBy, RecordView,
                RelationView, Selection, SortOrder, WhereUnique, field, relation,
            },
            response::{AggregateResult, BatchPayload, CountResult, GroupRow},
            write::{
                CreateArgs, CreateInput, CreateManyArgs, DeleteArgs, DeleteManyArgs, FieldOp,
                RelationWrite, UpdateArgs, UpdateInput, UpdateManyArgs, UpsertArgs,
            },
        },
        error::{Error, ErrorClass, ErrorOrigin},
        model::{
            EntityModel, FieldDefault, FieldKind, FieldModel, ReferentialAction, RelationModel,
            Schema,
        },
        value::Value,
    };
}
