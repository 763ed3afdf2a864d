///
/// Cardinality
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cardinality {
    One,
    Many,
}

///
/// RelationSide
///
/// `Owner` stores the foreign key column; `Inverse` is referenced by the
/// target entity's foreign key.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RelationSide {
    Owner,
    Inverse,
}

///
/// ReferentialAction
///
/// Applied to owner-side rows when the row they reference is deleted.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReferentialAction {
    Restrict,
    Cascade,
    SetNull,
}

///
/// RelationModel
///
/// Related rows are the target rows where `target.foreign_field` equals
/// `self.local_field`, regardless of side.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelationModel {
    pub name: String,
    pub target: String,
    pub cardinality: Cardinality,
    pub side: RelationSide,
    pub local_field: String,
    pub foreign_field: String,
    /// Only meaningful on the owner side. `None` resolves to `SetNull` for
    /// nullable foreign keys and `Restrict` otherwise.
    pub on_delete: Option<ReferentialAction>,
}

impl RelationModel {
    /// Owner-side to-one relation: `local_fk` references `target.target_key`.
    #[must_use]
    pub fn belongs_to(
        name: impl Into<String>,
        target: impl Into<String>,
        local_fk: impl Into<String>,
        target_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::One,
            side: RelationSide::Owner,
            local_field: local_fk.into(),
            foreign_field: target_key.into(),
            on_delete: None,
        }
    }

    /// Inverse-side to-one relation: `target.target_fk` references `local_key`.
    #[must_use]
    pub fn has_one(
        name: impl Into<String>,
        target: impl Into<String>,
        target_fk: impl Into<String>,
        local_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::One,
            side: RelationSide::Inverse,
            local_field: local_key.into(),
            foreign_field: target_fk.into(),
            on_delete: None,
        }
    }

    /// Inverse-side to-many relation: `target.target_fk` references `local_key`.
    #[must_use]
    pub fn has_many(
        name: impl Into<String>,
        target: impl Into<String>,
        target_fk: impl Into<String>,
        local_key: impl Into<String>,
    ) -> Self {
        Self {
            cardinality: Cardinality::Many,
            ..Self::has_one(name, target, target_fk, local_key)
        }
    }

    #[must_use]
    pub const fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    #[must_use]
    pub const fn is_many(&self) -> bool {
        matches!(self.cardinality, Cardinality::Many)
    }

    #[must_use]
    pub const fn is_owner(&self) -> bool {
        matches!(self.side, RelationSide::Owner)
    }
}
