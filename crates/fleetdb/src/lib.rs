//! ## Crate layout
//! - `core`: the engine crate, re-exported whole.
//! - `config`: TOML-loaded query limits.
//! - `db`: the database handle, delegates, predicates, queries, aggregation
//!   and writes.
//! - `model`: schema vocabulary (entities, fields, relations).
//! - `obs`: metrics events, sinks and the in-memory recorder.
//! - `value`: the runtime `Value` type.
//!
//! The `prelude` module carries everything needed to declare a schema and
//! run the CRUD surface against it.

pub use fleetdb_core as core;
pub use fleetdb_core::{Db, Error, config, db, error, model, obs, value};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// schema declaration, query builders and args in one import
///

pub mod prelude {
    pub use crate::core::prelude::*;
    pub use rust_decimal::Decimal;
    pub use serde::Serialize;
}
