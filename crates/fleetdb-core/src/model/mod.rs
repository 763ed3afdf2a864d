//! Schema model: entities, fields, relations and the validated registry.

pub mod entity;
pub mod field;
pub mod relation;
pub mod schema;


pub use entity::EntityModel;
pub use field::{FieldDefault, FieldKind, FieldModel};
pub use relation::{Cardinality, ReferentialAction, RelationModel, RelationSide};
pub use schema::{Schema, SchemaBuilder, SchemaError};
