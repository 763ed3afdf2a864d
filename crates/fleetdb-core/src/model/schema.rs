use crate::model::{
    entity::EntityModel,
    field::{FieldDefault, FieldKind},
    relation::{ReferentialAction, RelationModel},
};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;

///
/// SchemaError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("duplicate entity '{0}'")]
    DuplicateEntity(String),

    #[error("entity '{entity}' declares '{name}' more than once")]
    DuplicateMember { entity: String, name: String },

    #[error("entity '{entity}' primary key '{field}' is not a declared field")]
    MissingPrimaryKey { entity: String, field: String },

    #[error("entity '{entity}' primary key '{field}' must not be nullable")]
    NullablePrimaryKey { entity: String, field: String },

    #[error("entity '{entity}' unique constraint references unknown field '{field}'")]
    UnknownUniqueField { entity: String, field: String },

    #[error("relation '{entity}.{relation}' targets unknown entity '{target}'")]
    UnknownRelationTarget {
        entity: String,
        relation: String,
        target: String,
    },

    #[error("relation '{entity}.{relation}' references unknown field '{field}'")]
    UnknownRelationField {
        entity: String,
        relation: String,
        field: String,
    },

    #[error("relation '{entity}.{relation}' uses SetNull on non-nullable foreign key")]
    SetNullOnRequired { entity: String, relation: String },

    #[error("relation '{entity}.{relation}' on_delete is only valid on the owner side")]
    ActionOnInverse { entity: String, relation: String },

    #[error("relation '{entity}.{relation}' has no matching owner-side relation on '{target}'")]
    UnpairedInverse {
        entity: String,
        relation: String,
        target: String,
    },

    #[error("field '{entity}.{field}' default does not fit its kind")]
    InvalidDefault { entity: String, field: String },
}

///
/// Schema
///
/// Validated registry of entity models.
///

#[derive(Clone, Debug, Default)]
pub struct Schema {
    entities: BTreeMap<String, EntityModel>,
}

impl Schema {
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityModel> {
        self.entities.get(name)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityModel> {
        self.entities.values()
    }

    /// Resolve the entity a relation points at.
    #[must_use]
    pub fn relation_target(&self, relation: &RelationModel) -> Option<&EntityModel> {
        self.entities.get(&relation.target)
    }

    /// Owner-side relations (in any entity) that reference rows of `target`.
    pub fn referencing_relations<'a>(
        &'a self,
        target: &'a str,
    ) -> impl Iterator<Item = (&'a EntityModel, &'a RelationModel)> + 'a {
        self.entities.values().flat_map(move |entity| {
            entity
                .relations
                .iter()
                .filter(move |rel| rel.is_owner() && rel.target == target)
                .map(move |rel| (entity, rel))
        })
    }

    /// Effective delete action for an owner-side relation.
    #[must_use]
    pub fn delete_action(
        &self,
        owner: &EntityModel,
        relation: &RelationModel,
    ) -> ReferentialAction {
        relation.on_delete.unwrap_or_else(|| {
            let nullable = owner
                .get_field(&relation.local_field)
                .is_some_and(|f| f.nullable);
            if nullable {
                ReferentialAction::SetNull
            } else {
                ReferentialAction::Restrict
            }
        })
    }
}

///
/// SchemaBuilder
///

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    entities: Vec<EntityModel>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn entity(mut self, entity: EntityModel) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut entities = BTreeMap::new();
        for entity in self.entities {
            if entities.contains_key(&entity.name) {
                return Err(SchemaError::DuplicateEntity(entity.name));
            }
            entities.insert(entity.name.clone(), entity);
        }

        let schema = Schema { entities };
        for entity in schema.entities.values() {
            validate_entity(entity)?;
            for relation in &entity.relations {
                validate_relation(&schema, entity, relation)?;
            }
        }

        Ok(schema)
    }
}

fn validate_entity(entity: &EntityModel) -> Result<(), SchemaError> {
    let mut seen = BTreeSet::new();
    let names = entity
        .fields
        .iter()
        .map(|f| &f.name)
        .chain(entity.relations.iter().map(|r| &r.name));
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(SchemaError::DuplicateMember {
                entity: entity.name.clone(),
                name: name.clone(),
            });
        }
    }

    let Some(pk) = entity.pk_field() else {
        return Err(SchemaError::MissingPrimaryKey {
            entity: entity.name.clone(),
            field: entity.primary_key.clone(),
        });
    };
    if pk.nullable {
        return Err(SchemaError::NullablePrimaryKey {
            entity: entity.name.clone(),
            field: pk.name.clone(),
        });
    }

    for field in entity.uniques.iter().flatten() {
        if entity.get_field(field).is_none() {
            return Err(SchemaError::UnknownUniqueField {
                entity: entity.name.clone(),
                field: field.clone(),
            });
        }
    }

    for field in &entity.fields {
        let fits = match &field.default {
            Some(FieldDefault::Value(value)) => value.is_null() || field.kind.accepts(value),
            Some(FieldDefault::Autoincrement) => field.kind.is_numeric(),
            Some(FieldDefault::Now | FieldDefault::UpdatedAt) => {
                matches!(field.kind, FieldKind::Timestamp)
            }
            Some(FieldDefault::GeneratedUlid) => matches!(field.kind, FieldKind::Ulid),
            None => true,
        };
        if !fits {
            return Err(SchemaError::InvalidDefault {
                entity: entity.name.clone(),
                field: field.name.clone(),
            });
        }
    }

    Ok(())
}

fn validate_relation(
    schema: &Schema,
    entity: &EntityModel,
    relation: &RelationModel,
) -> Result<(), SchemaError> {
    let Some(target) = schema.relation_target(relation) else {
        return Err(SchemaError::UnknownRelationTarget {
            entity: entity.name.clone(),
            relation: relation.name.clone(),
            target: relation.target.clone(),
        });
    };

    let unknown = |field: &str| SchemaError::UnknownRelationField {
        entity: entity.name.clone(),
        relation: relation.name.clone(),
        field: field.to_string(),
    };
    let Some(local) = entity.get_field(&relation.local_field) else {
        return Err(unknown(&relation.local_field));
    };
    if target.get_field(&relation.foreign_field).is_none() {
        return Err(unknown(&relation.foreign_field));
    }

    if relation.is_owner() {
        if relation.on_delete == Some(ReferentialAction::SetNull) && !local.nullable {
            return Err(SchemaError::SetNullOnRequired {
                entity: entity.name.clone(),
                relation: relation.name.clone(),
            });
        }
    } else {
        if relation.on_delete.is_some() {
            return Err(SchemaError::ActionOnInverse {
                entity: entity.name.clone(),
                relation: relation.name.clone(),
            });
        }

        // the fk column lives on the target; it must be declared there as an owner relation
        let paired = target.relations.iter().any(|owner| {
            owner.is_owner()
                && owner.target == entity.name
                && owner.local_field == relation.foreign_field
                && owner.foreign_field == relation.local_field
        });
        if !paired {
            return Err(SchemaError::UnpairedInverse {
                entity: entity.name.clone(),
                relation: relation.name.clone(),
                target: target.name.clone(),
            });
        }
    }

    Ok(())
}
