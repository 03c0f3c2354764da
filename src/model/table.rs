//! Tables and their indices.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::column::{Column, ColumnType};
use super::error::DefinitionError;
use super::expr::ViewColumnType;

/// An ordered sequence of distinct column names of the owning table.
///
/// Order is significant: it defines prefix matchability for field lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    name: String,
    columns: Vec<String>,
}

impl Index {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether `fields` matches the leading columns of this index, in order.
    pub fn covers_prefix(&self, fields: &[String]) -> bool {
        fields.len() <= self.columns.len() && self.columns[..fields.len()] == *fields
    }
}

/// A table: an ordered set of named columns plus its indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: IndexMap<String, Column>,
    indices: IndexMap<String, Index>,
}

impl Table {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
            indices: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a new column, failing if the name is already taken.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        column_type: ColumnType,
    ) -> Result<&mut Column, DefinitionError> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(DefinitionError::DuplicateColumn {
                table: self.name.clone(),
                name,
            });
        }
        let column = Column::new(name.clone(), column_type);
        Ok(self.columns.entry(name).or_insert(column))
    }

    /// Assigns a default value to a column, enforcing the at-most-one
    /// identity column rule at assignment time.
    pub fn set_column_default(
        &mut self,
        column: &str,
        lexvalue: Option<&str>,
    ) -> Result<(), DefinitionError> {
        if !self.columns.contains_key(column) {
            return Err(DefinitionError::UnknownColumn {
                table: self.name.clone(),
                column: column.to_string(),
            });
        }
        if matches!(lexvalue, Some(lex) if lex.eq_ignore_ascii_case("identity")) {
            let another = self
                .columns
                .values()
                .any(|c| c.name() != column && c.is_identity());
            if another {
                return Err(DefinitionError::MultipleIdentity {
                    table: self.name.clone(),
                });
            }
        }
        // Checked above, entry is present.
        let col = self
            .columns
            .get_mut(column)
            .ok_or_else(|| DefinitionError::UnknownColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })?;
        col.set_default(lexvalue)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Columns in insertion order.
    pub fn columns(&self) -> &IndexMap<String, Column> {
        &self.columns
    }

    pub fn indices(&self) -> &IndexMap<String, Index> {
        &self.indices
    }

    /// Column name → semantic type, in column order. Snapshot used by view
    /// FROM entries and the interchange exporter.
    pub fn column_metas(&self) -> IndexMap<String, ViewColumnType> {
        self.columns
            .iter()
            .map(|(name, col)| (name.clone(), col.meta()))
            .collect()
    }

    /// Attaches an index after checking its columns exist and are distinct.
    /// Grain-wide name uniqueness is checked by the owning grain.
    pub(crate) fn add_index(&mut self, index: Index) -> Result<(), DefinitionError> {
        for (i, column) in index.columns().iter().enumerate() {
            let repeated = index.columns()[..i].contains(column);
            if repeated || !self.columns.contains_key(column) {
                return Err(DefinitionError::BadIndexColumn {
                    index: index.name().to_string(),
                    table: self.name.clone(),
                    column: column.clone(),
                });
            }
        }
        self.indices.insert(index.name().to_string(), index);
        Ok(())
    }
}
