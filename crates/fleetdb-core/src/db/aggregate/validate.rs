use crate::{
    db::{
        aggregate::{AggregateOp, AggregateSpec, GroupByArgs, GroupError},
        predicate::{Predicate, prepare},
        query::{OrderBy, OrderTarget},
    },
    model::{EntityModel, FieldKind, FieldModel, Schema},
};

///
/// GroupPlan
///
/// Validated group-by: prepared filter and having, the aggregates to
/// return, and every aggregate that must be evaluated per group (returned,
/// filtered on or ordered by).
///

#[derive(Clone, Debug)]
pub(crate) struct GroupPlan {
    pub by: Vec<String>,
    pub filter: Option<Predicate>,
    pub having: Option<Predicate>,
    pub returned: Vec<AggregateSpec>,
    pub evaluated: Vec<AggregateSpec>,
    pub order_by: Vec<OrderBy>,
    pub take: Option<usize>,
    pub skip: usize,
}

/// Check one aggregate terminal against `entity`; returns the target
/// field's kind, if the terminal has a field.
pub(crate) fn validate_spec<'a>(
    entity: &'a EntityModel,
    spec: &AggregateSpec,
) -> Result<Option<&'a FieldKind>, GroupError> {
    let Some(field) = spec.field.as_deref() else {
        return match spec.op {
            AggregateOp::Count => Ok(None),
            op => Err(GroupError::MissingAggregateField { op }),
        };
    };
    let model = entity
        .get_field(field)
        .ok_or_else(|| GroupError::UnknownField {
            entity: entity.name.clone(),
            field: field.to_string(),
        })?;

    match spec.op {
        AggregateOp::Sum | AggregateOp::Avg if !model.kind.is_numeric() => {
            Err(GroupError::NotNumeric {
                op: spec.op,
                field: field.to_string(),
            })
        }
        AggregateOp::Min | AggregateOp::Max if !model.kind.is_orderable() => {
            Err(GroupError::NotOrderable {
                op: spec.op,
                field: field.to_string(),
            })
        }
        _ => Ok(Some(&model.kind)),
    }
}

/// Kind of the value an aggregate produces.
fn result_kind(op: AggregateOp, kind: Option<&FieldKind>) -> FieldKind {
    match (op, kind) {
        (AggregateOp::Count, _) | (_, None) => FieldKind::Uint,
        (AggregateOp::Avg, Some(FieldKind::Decimal)) => FieldKind::Decimal,
        (AggregateOp::Avg, Some(_)) => FieldKind::Float64,
        (_, Some(kind)) => kind.clone(),
    }
}

/// Validate a group-by before any row is read.
pub(crate) fn plan_group_by(
    schema: &Schema,
    entity: &EntityModel,
    args: &GroupByArgs,
) -> Result<GroupPlan, GroupError> {
    if args.by.is_empty() {
        return Err(GroupError::EmptyBy);
    }
    let mut grouped = Vec::with_capacity(args.by.len());
    for field in &args.by {
        let model = entity
            .get_field(field)
            .ok_or_else(|| GroupError::UnknownField {
                entity: entity.name.clone(),
                field: field.clone(),
            })?;
        if model.kind.is_list() {
            return Err(GroupError::UngroupableField {
                field: field.clone(),
            });
        }
        grouped.push(model.clone());
    }

    let mut evaluated = Vec::new();
    for spec in &args.aggregates {
        validate_spec(entity, spec)?;
        push_unique(&mut evaluated, spec);
    }

    // having: grouped fields or aggregate keys only
    let having = match &args.having {
        Some(having) => {
            let mut names = Vec::new();
            collect_having_fields(having, &mut names)?;
            for name in names {
                if let Some(spec) = AggregateSpec::parse_key(name) {
                    validate_spec(entity, &spec)?;
                    push_unique(&mut evaluated, &spec);
                } else if !args.by.iter().any(|b| b == name) {
                    return Err(if entity.get_field(name).is_some() {
                        GroupError::HavingFieldNotGrouped {
                            field: name.to_string(),
                        }
                    } else {
                        GroupError::UnknownField {
                            entity: entity.name.clone(),
                            field: name.to_string(),
                        }
                    });
                }
            }

            let virtual_entity = group_entity(entity, &grouped, &evaluated);
            Some(prepare(schema, &virtual_entity, having)?)
        }
        None => None,
    };

    for term in &args.order_by {
        let OrderTarget::Field(name) = &term.target else {
            return Err(GroupError::OrderFieldNotGrouped {
                field: order_label(&term.target),
            });
        };
        if let Some(spec) = AggregateSpec::parse_key(name) {
            validate_spec(entity, &spec)?;
            push_unique(&mut evaluated, &spec);
        } else if !args.by.iter().any(|b| b == name) {
            return Err(GroupError::OrderFieldNotGrouped {
                field: name.clone(),
            });
        }
    }
    if args.order_by.is_empty() && (args.take.is_some() || args.skip > 0) {
        return Err(GroupError::UnorderedPagination);
    }

    let filter = args
        .filter
        .as_ref()
        .map(|f| prepare(schema, entity, f))
        .transpose()?;

    Ok(GroupPlan {
        by: args.by.clone(),
        filter,
        having,
        returned: args.aggregates.clone(),
        evaluated,
        order_by: args.order_by.clone(),
        take: args.take,
        skip: args.skip,
    })
}

fn push_unique(specs: &mut Vec<AggregateSpec>, spec: &AggregateSpec) {
    if !specs.contains(spec) {
        specs.push(spec.clone());
    }
}

fn order_label(target: &OrderTarget) -> String {
    match target {
        OrderTarget::Field(field) => field.clone(),
        OrderTarget::RelationField { relation, field } => format!("{relation}.{field}"),
        OrderTarget::RelationCount(relation) => format!("{relation}._count"),
    }
}

fn collect_having_fields<'p>(
    predicate: &'p Predicate,
    out: &mut Vec<&'p str>,
) -> Result<(), GroupError> {
    match predicate {
        Predicate::True | Predicate::False => {}
        Predicate::And(children) | Predicate::Or(children) => {
            for child in children {
                collect_having_fields(child, out)?;
            }
        }
        Predicate::Not(inner) => collect_having_fields(inner, out)?,
        Predicate::Compare(cmp) => out.push(&cmp.field),
        Predicate::IsNull { field }
        | Predicate::IsNotNull { field }
        | Predicate::IsEmpty { field } => out.push(field),
        Predicate::Relation(rel) => {
            return Err(GroupError::RelationInHaving {
                relation: rel.relation.clone(),
            });
        }
    }

    Ok(())
}

/// Entity model of one group row: the grouped fields plus one nullable
/// field per evaluated aggregate, named by its key.
fn group_entity(
    entity: &EntityModel,
    grouped: &[FieldModel],
    evaluated: &[AggregateSpec],
) -> EntityModel {
    let mut model = EntityModel::new(format!("{}.group", entity.name), entity.primary_key.clone());
    for field in grouped {
        model = model.field(field.clone());
    }
    for spec in evaluated {
        let kind = spec
            .field
            .as_deref()
            .and_then(|f| entity.get_field(f))
            .map(|f| &f.kind);
        let field = match spec.op {
            AggregateOp::Count => FieldModel::required(spec.key(), FieldKind::Uint),
            op => FieldModel::optional(spec.key(), result_kind(op, kind)),
        };
        model = model.field(field);
    }

    model
}
