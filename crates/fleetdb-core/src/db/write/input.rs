use crate::{
    db::{
        predicate::Predicate,
        query::{Selection, WhereUnique},
    },
    value::Value,
};

///
/// FieldOp
///
/// Update operation on one scalar field. Arithmetic on a null value
/// leaves it null.
///

#[derive(Clone, Debug, PartialEq)]
pub enum FieldOp {
    Set(Value),
    Increment(Value),
    Decrement(Value),
    Multiply(Value),
    Divide(Value),
    /// Append one element (or every element of a list) to a list field.
    Push(Value),
}

impl FieldOp {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Set(_) => "set",
            Self::Increment(_) => "increment",
            Self::Decrement(_) => "decrement",
            Self::Multiply(_) => "multiply",
            Self::Divide(_) => "divide",
            Self::Push(_) => "push",
        }
    }

    #[must_use]
    pub const fn operand(&self) -> &Value {
        match self {
            Self::Set(v)
            | Self::Increment(v)
            | Self::Decrement(v)
            | Self::Multiply(v)
            | Self::Divide(v)
            | Self::Push(v) => v,
        }
    }
}

///
/// RelationWrite
///
/// Nested write through one relation. Inside a create only `Create`,
/// `Connect` and `ConnectOrCreate` are accepted. A `None` target selects
/// the to-one related row; to-many relations name rows with a where-unique.
///

#[derive(Clone, Debug, PartialEq)]
pub enum RelationWrite {
    Create(CreateInput),
    Connect(WhereUnique),
    ConnectOrCreate {
        filter: WhereUnique,
        create: CreateInput,
    },
    Disconnect(Option<WhereUnique>),
    /// Replace every related row of a to-many relation.
    Set(Vec<WhereUnique>),
    Delete(Option<WhereUnique>),
    Update {
        filter: Option<WhereUnique>,
        data: UpdateInput,
    },
    UpdateMany {
        filter: Predicate,
        data: UpdateInput,
    },
    DeleteMany(Predicate),
    Upsert {
        filter: Option<WhereUnique>,
        create: CreateInput,
        update: UpdateInput,
    },
}

impl RelationWrite {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Connect(_) => "connect",
            Self::ConnectOrCreate { .. } => "connect_or_create",
            Self::Disconnect(_) => "disconnect",
            Self::Set(_) => "set",
            Self::Delete(_) => "delete",
            Self::Update { .. } => "update",
            Self::UpdateMany { .. } => "update_many",
            Self::DeleteMany(_) => "delete_many",
            Self::Upsert { .. } => "upsert",
        }
    }

    /// Accepted inside a create input.
    #[must_use]
    pub const fn is_create_op(&self) -> bool {
        matches!(
            self,
            Self::Create(_) | Self::Connect(_) | Self::ConnectOrCreate { .. }
        )
    }
}

///
/// CreateInput
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CreateInput {
    pub values: Vec<(String, Value)>,
    pub relations: Vec<(String, RelationWrite)>,
}

impl CreateInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((field.into(), value.into()));
        self
    }

    #[must_use]
    pub fn relation(mut self, relation: impl Into<String>, write: RelationWrite) -> Self {
        self.relations.push((relation.into(), write));
        self
    }

    #[must_use]
    pub fn create(self, relation: impl Into<String>, input: Self) -> Self {
        self.relation(relation, RelationWrite::Create(input))
    }

    #[must_use]
    pub fn connect(self, relation: impl Into<String>, filter: WhereUnique) -> Self {
        self.relation(relation, RelationWrite::Connect(filter))
    }

    #[must_use]
    pub fn connect_or_create(
        self,
        relation: impl Into<String>,
        filter: WhereUnique,
        create: Self,
    ) -> Self {
        self.relation(relation, RelationWrite::ConnectOrCreate { filter, create })
    }

    pub(crate) fn value(&self, field: &str) -> Option<&Value> {
        self.values.iter().find(|(f, _)| f == field).map(|(_, v)| v)
    }
}

///
/// UpdateInput
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateInput {
    pub ops: Vec<(String, FieldOp)>,
    pub relations: Vec<(String, RelationWrite)>,
}

impl UpdateInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn op(mut self, field: impl Into<String>, op: FieldOp) -> Self {
        self.ops.push((field.into(), op));
        self
    }

    #[must_use]
    pub fn set(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.op(field, FieldOp::Set(value.into()))
    }

    #[must_use]
    pub fn increment(self, field: impl Into<String>, by: impl Into<Value>) -> Self {
        self.op(field, FieldOp::Increment(by.into()))
    }

    #[must_use]
    pub fn decrement(self, field: impl Into<String>, by: impl Into<Value>) -> Self {
        self.op(field, FieldOp::Decrement(by.into()))
    }

    #[must_use]
    pub fn multiply(self, field: impl Into<String>, by: impl Into<Value>) -> Self {
        self.op(field, FieldOp::Multiply(by.into()))
    }

    #[must_use]
    pub fn divide(self, field: impl Into<String>, by: impl Into<Value>) -> Self {
        self.op(field, FieldOp::Divide(by.into()))
    }

    #[must_use]
    pub fn push(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.op(field, FieldOp::Push(value.into()))
    }

    #[must_use]
    pub fn relation(mut self, relation: impl Into<String>, write: RelationWrite) -> Self {
        self.relations.push((relation.into(), write));
        self
    }

    pub(crate) fn sets(&self, field: &str) -> bool {
        self.ops
            .iter()
            .any(|(f, op)| f == field && matches!(op, FieldOp::Set(_)))
    }
}

///
/// CreateArgs
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CreateArgs {
    pub data: CreateInput,
    pub select: Selection,
}

impl CreateArgs {
    #[must_use]
    pub fn new(data: CreateInput) -> Self {
        Self {
            data,
            select: Selection::default(),
        }
    }

    #[must_use]
    pub fn select(mut self, select: Selection) -> Self {
        self.select = select;
        self
    }
}

///
/// CreateManyArgs
///
/// Flat inserts; nested relation writes are rejected.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CreateManyArgs {
    pub data: Vec<CreateInput>,
    /// Skip rows that collide with an existing unique value.
    pub skip_duplicates: bool,
}

impl CreateManyArgs {
    #[must_use]
    pub const fn new(data: Vec<CreateInput>) -> Self {
        Self {
            data,
            skip_duplicates: false,
        }
    }

    #[must_use]
    pub const fn skip_duplicates(mut self) -> Self {
        self.skip_duplicates = true;
        self
    }
}

///
/// UpdateArgs
///

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateArgs {
    pub filter: WhereUnique,
    pub data: UpdateInput,
    pub select: Selection,
}

impl UpdateArgs {
    #[must_use]
    pub fn new(filter: WhereUnique, data: UpdateInput) -> Self {
        Self {
            filter,
            data,
            select: Selection::default(),
        }
    }

    #[must_use]
    pub fn select(mut self, select: Selection) -> Self {
        self.select = select;
        self
    }
}

///
/// UpdateManyArgs
///
/// Scalar updates only; nested relation writes are rejected.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateManyArgs {
    pub filter: Option<Predicate>,
    pub data: UpdateInput,
}

impl UpdateManyArgs {
    #[must_use]
    pub fn new(data: UpdateInput) -> Self {
        Self { filter: None, data }
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(predicate);
        self
    }
}

///
/// UpsertArgs
///

#[derive(Clone, Debug, PartialEq)]
pub struct UpsertArgs {
    pub filter: WhereUnique,
    pub create: CreateInput,
    pub update: UpdateInput,
    pub select: Selection,
}

impl UpsertArgs {
    #[must_use]
    pub fn new(filter: WhereUnique, create: CreateInput, update: UpdateInput) -> Self {
        Self {
            filter,
            create,
            update,
            select: Selection::default(),
        }
    }

    #[must_use]
    pub fn select(mut self, select: Selection) -> Self {
        self.select = select;
        self
    }
}

///
/// DeleteArgs
///

#[derive(Clone, Debug, PartialEq)]
pub struct DeleteArgs {
    pub filter: WhereUnique,
    pub select: Selection,
}

impl DeleteArgs {
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
}

///
/// DeleteManyArgs
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeleteManyArgs {
    pub filter: Option<Predicate>,
}

impl DeleteManyArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(predicate);
        self
    }
}
