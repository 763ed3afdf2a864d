use crate::model::{field::FieldModel, relation::RelationModel};

///
/// EntityModel
/// Runtime model for one entity (table).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntityModel {
    /// Stable external name used for delegate routing.
    pub name: String,
    /// Primary key field (points at an entry in `fields`).
    pub primary_key: String,
    /// Ordered field list; result views keep this order.
    pub fields: Vec<FieldModel>,
    pub relations: Vec<RelationModel>,
    /// Compound unique constraints (field order is significant for lookups only).
    pub uniques: Vec<Vec<String>>,
}

impl EntityModel {
    #[must_use]
    pub fn new(name: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: primary_key.into(),
            fields: Vec::new(),
            relations: Vec::new(),
            uniques: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldModel) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn relation(mut self, relation: RelationModel) -> Self {
        self.relations.push(relation);
        self
    }

    #[must_use]
    pub fn unique_together(mut self, fields: &[&str]) -> Self {
        self.uniques
            .push(fields.iter().map(ToString::to_string).collect());
        self
    }

    ///
    /// LOOKUP
    ///

    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn get_relation(&self, name: &str) -> Option<&RelationModel> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Primary key field model; presence is checked when the schema is built.
    #[must_use]
    pub fn pk_field(&self) -> Option<&FieldModel> {
        self.get_field(&self.primary_key)
    }

    /// Every unique constraint: primary key, single unique fields, compounds.
    #[must_use]
    pub fn unique_constraints(&self) -> Vec<Vec<String>> {
        let mut out = vec![vec![self.primary_key.clone()]];
        out.extend(
            self.fields
                .iter()
                .filter(|f| f.unique && f.name != self.primary_key)
                .map(|f| vec![f.name.clone()]),
        );
        out.extend(self.uniques.iter().cloned());

        out
    }

    /// Returns true if `fields` (in any order) is exactly one unique constraint.
    #[must_use]
    pub fn is_unique_key(&self, fields: &[&str]) -> bool {
        self.unique_constraints().iter().any(|constraint| {
            constraint.len() == fields.len()
                && constraint.iter().all(|c| fields.contains(&c.as_str()))
        })
    }
}
