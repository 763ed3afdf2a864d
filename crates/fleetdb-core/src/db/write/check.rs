use crate::{
    db::write::{
        CreateInput, RelationWrite, UpdateInput, WriteError,
        ops::{check_op, coerce_value},
    },
    model::{EntityModel, RelationModel, Schema},
};

///
/// Input checks
///
/// Structural validation of write inputs against the schema, run before
/// any row is touched: names, value kinds, operators and which nested
/// writes each relation shape accepts. Uniqueness and referential checks
/// need the store and run during the write.
///

pub(crate) fn check_create(
    schema: &Schema,
    entity: &EntityModel,
    input: &CreateInput,
    nested: bool,
) -> Result<(), WriteError> {
    for (name, value) in &input.values {
        let field = entity
            .get_field(name)
            .ok_or_else(|| WriteError::unknown_field(&entity.name, name))?;
        coerce_value(&entity.name, field, value)?;
    }

    for (name, write) in &input.relations {
        let relation = relation(entity, name)?;
        if !nested || !write.is_create_op() {
            return Err(not_allowed(name, write));
        }
        if relation.is_owner() && input.value(&relation.local_field).is_some() {
            return Err(WriteError::ConflictingInput {
                field: relation.local_field.clone(),
                relation: name.clone(),
            });
        }
        check_nested(schema, entity, relation, write)?;
    }

    Ok(())
}

pub(crate) fn check_update(
    schema: &Schema,
    entity: &EntityModel,
    input: &UpdateInput,
    nested: bool,
) -> Result<(), WriteError> {
    for (name, op) in &input.ops {
        let field = entity
            .get_field(name)
            .ok_or_else(|| WriteError::unknown_field(&entity.name, name))?;
        check_op(&entity.name, field, op)?;
    }

    for (name, write) in &input.relations {
        let relation = relation(entity, name)?;
        if !nested || !shape_allows(relation, write) {
            return Err(not_allowed(name, write));
        }
        if relation.is_owner() && input.ops.iter().any(|(f, _)| *f == relation.local_field) {
            return Err(WriteError::ConflictingInput {
                field: relation.local_field.clone(),
                relation: name.clone(),
            });
        }
        check_clearable(schema, entity, relation, write)?;
        check_nested(schema, entity, relation, write)?;
    }

    Ok(())
}

fn relation<'a>(entity: &'a EntityModel, name: &str) -> Result<&'a RelationModel, WriteError> {
    entity
        .get_relation(name)
        .ok_or_else(|| WriteError::unknown_relation(&entity.name, name))
}

fn not_allowed(relation: &str, write: &RelationWrite) -> WriteError {
    WriteError::NestedOpNotAllowed {
        relation: relation.to_string(),
        op: write.label(),
    }
}

/// To-one relations address their single row implicitly; to-many
/// relations name rows with a where-unique.
const fn shape_allows(relation: &RelationModel, write: &RelationWrite) -> bool {
    let many = relation.is_many();

    match write {
        RelationWrite::Create(_)
        | RelationWrite::Connect(_)
        | RelationWrite::ConnectOrCreate { .. } => true,
        RelationWrite::Disconnect(filter) | RelationWrite::Delete(filter) => {
            filter.is_some() == many
        }
        RelationWrite::Update { filter, .. } | RelationWrite::Upsert { filter, .. } => {
            filter.is_some() == many
        }
        RelationWrite::Set(_) | RelationWrite::UpdateMany { .. } | RelationWrite::DeleteMany(_) => {
            many
        }
    }
}

// Disconnect (and owner-side delete) clear a foreign key, which must be nullable.
fn check_clearable(
    schema: &Schema,
    entity: &EntityModel,
    relation: &RelationModel,
    write: &RelationWrite,
) -> Result<(), WriteError> {
    let clears = match write {
        RelationWrite::Disconnect(_) | RelationWrite::Set(_) => true,
        RelationWrite::Delete(_) => relation.is_owner(),
        _ => false,
    };
    if !clears {
        return Ok(());
    }

    let nullable = if relation.is_owner() {
        entity
            .get_field(&relation.local_field)
            .is_some_and(|f| f.nullable)
    } else {
        schema
            .relation_target(relation)
            .and_then(|target| target.get_field(&relation.foreign_field))
            .is_some_and(|f| f.nullable)
    };
    if nullable {
        Ok(())
    } else {
        Err(WriteError::RequiredRelation {
            entity: entity.name.clone(),
            relation: relation.name.clone(),
        })
    }
}

fn check_nested(
    schema: &Schema,
    entity: &EntityModel,
    relation: &RelationModel,
    write: &RelationWrite,
) -> Result<(), WriteError> {
    let target = schema
        .relation_target(relation)
        .ok_or_else(|| WriteError::unknown_relation(&entity.name, &relation.name))?;

    // the foreign key of an inverse-side create is filled in from this row
    let check_child_create = |input: &CreateInput| {
        if !relation.is_owner() && input.value(&relation.foreign_field).is_some() {
            return Err(WriteError::ConflictingInput {
                field: relation.foreign_field.clone(),
                relation: relation.name.clone(),
            });
        }
        check_create(schema, target, input, true)
    };

    match write {
        RelationWrite::Create(input) | RelationWrite::ConnectOrCreate { create: input, .. } => {
            check_child_create(input)
        }
        RelationWrite::Update { data, .. } => check_update(schema, target, data, true),
        RelationWrite::UpdateMany { data, .. } => check_update(schema, target, data, false),
        RelationWrite::Upsert { create, update, .. } => {
            check_child_create(create)?;
            check_update(schema, target, update, true)
        }
        RelationWrite::Connect(_)
        | RelationWrite::Disconnect(_)
        | RelationWrite::Set(_)
        | RelationWrite::Delete(_)
        | RelationWrite::DeleteMany(_) => Ok(()),
    }
}
