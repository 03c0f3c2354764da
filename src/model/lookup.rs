//! Join-field lookup building and validation.
//!
//! A [`FieldsLookup`] pairs columns of two same-kind relations (both tables
//! or both views) for use by query filters. Table pairings must stay
//! index-compatible: after every `add` the full left field sequence must be
//! a prefix of some index on the left table, and likewise on the right.
//! View pairings carry no index constraint.

use std::rc::Rc;

use super::error::{DefinitionError, LookupError, StructuralError};
use super::table::Table;
use super::view::View;

/// A lookup side: a table or a finalized view.
#[derive(Clone, Copy)]
pub enum Relation<'s> {
    Table(&'s Table),
    View(&'s View),
}

impl<'s> Relation<'s> {
    pub fn name(&self) -> &str {
        match self {
            Relation::Table(t) => t.name(),
            Relation::View(v) => v.name(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Relation::Table(_) => "table",
            Relation::View(_) => "view",
        }
    }

    fn is_table(&self) -> bool {
        matches!(self, Relation::Table(_))
    }

    fn has_column(&self, name: &str) -> bool {
        match self {
            Relation::Table(t) => t.column(name).is_some(),
            Relation::View(v) => v.columns().contains_key(name),
        }
    }
}

/// Invoked after every successful mutation of a lookup.
pub type ChangeCallback<'s> = Rc<dyn Fn() + 's>;
/// Invoked with every lookup created by chaining.
pub type ChainCallback<'s> = Rc<dyn Fn(&FieldsLookup<'s>) + 's>;

/// A transient builder/validator of column pairings between two relations.
pub struct FieldsLookup<'s> {
    left: Relation<'s>,
    right: Relation<'s>,
    left_fields: Vec<String>,
    right_fields: Vec<String>,
    on_change: ChangeCallback<'s>,
    on_chain: ChainCallback<'s>,
}

impl<'s> std::fmt::Debug for FieldsLookup<'s> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldsLookup")
            .field("left", &self.left.name())
            .field("right", &self.right.name())
            .field("left_fields", &self.left_fields)
            .field("right_fields", &self.right_fields)
            .finish_non_exhaustive()
    }
}

impl<'s> FieldsLookup<'s> {
    /// Creates a lookup for a pair of relations of the same kind.
    pub fn new(
        left: Relation<'s>,
        right: Relation<'s>,
        on_change: ChangeCallback<'s>,
        on_chain: ChainCallback<'s>,
    ) -> Result<Self, StructuralError> {
        if left.is_table() != right.is_table() {
            return Err(StructuralError::RelationKindMismatch {
                left_kind: left.kind_name(),
                left: left.name().to_string(),
                right_kind: right.kind_name(),
                right: right.name().to_string(),
            });
        }
        Ok(Self {
            left,
            right,
            left_fields: Vec::new(),
            right_fields: Vec::new(),
            on_change,
            on_chain,
        })
    }

    pub fn left(&self) -> Relation<'s> {
        self.left
    }

    pub fn right(&self) -> Relation<'s> {
        self.right
    }

    /// Field pairings added so far, left side parallel to right side.
    pub fn fields(&self) -> (&[String], &[String]) {
        (&self.left_fields, &self.right_fields)
    }

    /// Pairs a left field with a right field.
    ///
    /// Both names must exist in their relation's column set (definition
    /// error otherwise). For table pairs the extended field sequences must
    /// prefix-match some index on each side; a structural failure commits
    /// nothing. Every committed pairing invokes the change callback.
    pub fn add(&mut self, left_field: &str, right_field: &str) -> Result<(), LookupError> {
        self.check_field(self.left, left_field)?;
        self.check_field(self.right, right_field)?;

        if let (Relation::Table(lt), Relation::Table(rt)) = (self.left, self.right) {
            let mut left_fields = self.left_fields.clone();
            left_fields.push(left_field.to_string());
            let mut right_fields = self.right_fields.clone();
            right_fields.push(right_field.to_string());
            Self::check_index_prefix(lt, &left_fields)?;
            Self::check_index_prefix(rt, &right_fields)?;
        }

        self.left_fields.push(left_field.to_string());
        self.right_fields.push(right_field.to_string());
        (self.on_change)();
        Ok(())
    }

    /// Chains the lookup: produces a new, independently validated lookup
    /// between the current right relation and `other`, which must be of the
    /// same kind as the original pair.
    pub fn and(&self, other: Relation<'s>) -> Result<FieldsLookup<'s>, StructuralError> {
        if other.is_table() != self.left.is_table() {
            return Err(StructuralError::RelationKindMismatch {
                left_kind: self.left.kind_name(),
                left: self.left.name().to_string(),
                right_kind: other.kind_name(),
                right: other.name().to_string(),
            });
        }
        let chained = FieldsLookup::new(
            self.right,
            other,
            Rc::clone(&self.on_change),
            Rc::clone(&self.on_chain),
        )?;
        (self.on_chain)(&chained);
        Ok(chained)
    }

    fn check_field(&self, relation: Relation<'s>, field: &str) -> Result<(), DefinitionError> {
        if !relation.has_column(field) {
            return Err(DefinitionError::LookupFieldNotFound {
                kind: relation.kind_name(),
                relation: relation.name().to_string(),
                field: field.to_string(),
            });
        }
        Ok(())
    }

    fn check_index_prefix(table: &Table, fields: &[String]) -> Result<(), StructuralError> {
        let covered = table.indices().values().any(|i| i.covers_prefix(fields));
        if !covered {
            return Err(StructuralError::IndexMismatch {
                table: table.name().to_string(),
                fields: fields.join(", "),
            });
        }
        Ok(())
    }
}
