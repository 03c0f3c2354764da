//! The schema data model: grains of tables, views and indices.
//!
//! A [`Grain`] is a named, insertion-ordered namespace. Tables and views
//! share the name space (join targets are referenced by name), index names
//! are unique across the whole grain. Elements leave a grain only through
//! explicit removal, which system grains refuse.

pub mod column;
pub mod error;
pub mod expr;
pub mod lookup;
pub mod table;
pub mod view;

pub use column::{Column, ColumnKind, ColumnType};
pub use error::{DefinitionError, LookupError, StructuralError};
pub use expr::{AggregateFunc, Expr, FieldRef, LogicalOp, RelOp, TermOp, ViewColumnType};
pub use lookup::{FieldsLookup, Relation};
pub use table::{Index, Table};
pub use view::{JoinType, TableRef, View, ViewBuilder};

use indexmap::IndexMap;

/// A named namespace owning tables and views.
#[derive(Debug)]
pub struct Grain {
    name: String,
    system: bool,
    tables: IndexMap<String, Table>,
    views: IndexMap<String, View>,
}

impl Grain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system: false,
            tables: IndexMap::new(),
            views: IndexMap::new(),
        }
    }

    /// Creates a protected grain whose elements cannot be removed.
    pub fn new_system(name: impl Into<String>) -> Self {
        Self {
            system: true,
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_system(&self) -> bool {
        self.system
    }

    fn check_name_free(&self, name: &str) -> Result<(), DefinitionError> {
        if self.tables.contains_key(name) || self.views.contains_key(name) {
            return Err(DefinitionError::DuplicateName {
                grain: self.name.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn modifiable(&self) -> Result<(), StructuralError> {
        if self.system {
            return Err(StructuralError::SystemGrain {
                grain: self.name.clone(),
            });
        }
        Ok(())
    }

    // === Tables ===

    /// Creates an empty table, failing if the name is taken by any element.
    pub fn add_table(&mut self, name: impl Into<String>) -> Result<&mut Table, DefinitionError> {
        let name = name.into();
        self.check_name_free(&name)?;
        let table = Table::new(name.clone());
        Ok(self.tables.entry(name).or_insert(table))
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    pub fn tables(&self) -> &IndexMap<String, Table> {
        &self.tables
    }

    /// Removes a table and detaches it from the grain.
    pub fn remove_table(&mut self, name: &str) -> Result<Table, StructuralError> {
        self.modifiable()?;
        self.tables
            .shift_remove(name)
            .ok_or_else(|| StructuralError::ElementNotFound {
                grain: self.name.clone(),
                name: name.to_string(),
            })
    }

    // === Indices ===

    /// Creates an index on a table. Index names are unique across the grain.
    pub fn add_index(
        &mut self,
        table: &str,
        name: impl Into<String>,
        columns: Vec<String>,
    ) -> Result<(), DefinitionError> {
        let name = name.into();
        let duplicate = self
            .tables
            .values()
            .any(|t| t.indices().contains_key(&name));
        if duplicate {
            return Err(DefinitionError::DuplicateIndex {
                grain: self.name.clone(),
                name,
            });
        }
        let t = self
            .tables
            .get_mut(table)
            .ok_or_else(|| DefinitionError::UnknownRelation {
                grain: self.name.clone(),
                name: table.to_string(),
            })?;
        t.add_index(Index::new(name, columns))
    }

    // === Views ===

    /// Builds a view from definition text and adds it to the grain.
    ///
    /// Parsing, resolution and type checking all happen before the view is
    /// inserted, so a failure leaves the grain exactly as it was.
    pub fn create_view(&mut self, name: &str, sql: &str) -> Result<&View, DefinitionError> {
        self.check_name_free(name)?;
        let view = crate::dsl::build_view(self, name, sql)?;
        Ok(self.views.entry(name.to_string()).or_insert(view))
    }

    /// Adds an already-finalized view, failing on a name collision.
    pub fn add_view(&mut self, view: View) -> Result<&View, DefinitionError> {
        self.check_name_free(view.name())?;
        let name = view.name().to_string();
        Ok(self.views.entry(name).or_insert(view))
    }

    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.get(name)
    }

    pub fn views(&self) -> &IndexMap<String, View> {
        &self.views
    }

    /// Removes a view so that subsequent lookups by name fail.
    pub fn remove_view(&mut self, name: &str) -> Result<View, StructuralError> {
        self.modifiable()?;
        self.views
            .shift_remove(name)
            .ok_or_else(|| StructuralError::ElementNotFound {
                grain: self.name.clone(),
                name: name.to_string(),
            })
    }

    /// Builds a FROM entry for a table or view of this grain, snapshotting
    /// the target's column metadata.
    pub fn table_ref(&self, relation: &str, alias: &str) -> Result<TableRef, DefinitionError> {
        if let Some(t) = self.tables.get(relation) {
            return Ok(TableRef::new(
                self.name.clone(),
                relation,
                alias,
                t.column_metas(),
            ));
        }
        if let Some(v) = self.views.get(relation) {
            return Ok(TableRef::new(
                self.name.clone(),
                relation,
                alias,
                v.columns().clone(),
            ));
        }
        Err(DefinitionError::UnknownRelation {
            grain: self.name.clone(),
            name: relation.to_string(),
        })
    }
}
