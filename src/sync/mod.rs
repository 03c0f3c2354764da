//! Schema export and import.
//!
//! A grain serializes to a single JSON document: tables with their columns
//! and indices, plus views captured as their canonical definition text.
//! Importing re-parses the view definitions, so an imported grain carries
//! fully resolved, type-checked views rather than opaque strings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ColumnType, DefinitionError, Grain, StructuralError};

/// An error raised while exporting or importing a schema document.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Structural(#[from] StructuralError),
}

// ============================================================================
// Document types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct GrainDoc {
    grain: String,
    tables: Vec<TableDoc>,
    views: Vec<ViewDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TableDoc {
    name: String,
    columns: Vec<ColumnDoc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    indices: Vec<IndexDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ColumnDoc {
    name: String,
    #[serde(rename = "type")]
    column_type: ColumnType,
    /// Lexical default, including the IDENTITY and GETDATE markers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexDoc {
    name: String,
    columns: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ViewDoc {
    name: String,
    query: String,
}

// ============================================================================
// Export
// ============================================================================

/// Serializes a grain to its JSON schema document.
pub fn export_model(grain: &Grain) -> Result<serde_json::Value, SyncError> {
    let tables = grain
        .tables()
        .values()
        .map(|table| TableDoc {
            name: table.name().to_string(),
            columns: table
                .columns()
                .values()
                .map(|column| ColumnDoc {
                    name: column.name().to_string(),
                    column_type: column.column_type(),
                    default: column.default_lexical(),
                })
                .collect(),
            indices: table
                .indices()
                .values()
                .map(|index| IndexDoc {
                    name: index.name().to_string(),
                    columns: index.columns().to_vec(),
                })
                .collect(),
        })
        .collect();

    let views = grain
        .views()
        .values()
        .map(|view| ViewDoc {
            name: view.name().to_string(),
            query: view.definition().to_string(),
        })
        .collect();

    let doc = GrainDoc {
        grain: grain.name().to_string(),
        tables,
        views,
    };
    Ok(serde_json::to_value(&doc)?)
}

// ============================================================================
// Import
// ============================================================================

/// Applies a JSON schema document to a grain.
///
/// With `overwrite` set, same-named elements are replaced; otherwise a name
/// collision fails the import. Tables land before views so that imported
/// views can resolve against them.
pub fn import_model(
    doc: &serde_json::Value,
    grain: &mut Grain,
    overwrite: bool,
) -> Result<(), SyncError> {
    let doc: GrainDoc = serde_json::from_value(doc.clone())?;

    for table_doc in &doc.tables {
        if overwrite && grain.table(&table_doc.name).is_some() {
            grain.remove_table(&table_doc.name)?;
        }
        let table = grain.add_table(&table_doc.name)?;
        for column_doc in &table_doc.columns {
            table.add_column(&column_doc.name, column_doc.column_type)?;
            table.set_column_default(&column_doc.name, column_doc.default.as_deref())?;
        }
        // Index names are checked grain-wide, so they go through the grain.
        let index_docs: Vec<(String, Vec<String>)> = table_doc
            .indices
            .iter()
            .map(|i| (i.name.clone(), i.columns.clone()))
            .collect();
        for (name, columns) in index_docs {
            grain.add_index(&table_doc.name, &name, columns)?;
        }
    }

    for view_doc in &doc.views {
        if overwrite && grain.view(&view_doc.name).is_some() {
            grain.remove_view(&view_doc.name)?;
        }
        grain.create_view(&view_doc.name, &view_doc.query)?;
    }

    Ok(())
}

/// Compares two exported documents, returning the names of elements that
/// differ. Both documents are expected to describe the same grain.
pub fn diff_documents(
    left: &serde_json::Value,
    right: &serde_json::Value,
) -> Result<Vec<String>, SyncError> {
    let left: GrainDoc = serde_json::from_value(left.clone())?;
    let right: GrainDoc = serde_json::from_value(right.clone())?;

    let mut changed = Vec::new();

    let left_tables: IndexMap<&str, &TableDoc> =
        left.tables.iter().map(|t| (t.name.as_str(), t)).collect();
    let right_tables: IndexMap<&str, &TableDoc> =
        right.tables.iter().map(|t| (t.name.as_str(), t)).collect();
    for (name, table) in &left_tables {
        match right_tables.get(name) {
            Some(other) => {
                let same = serde_json::to_value(table)? == serde_json::to_value(other)?;
                if !same {
                    changed.push(name.to_string());
                }
            }
            None => changed.push(name.to_string()),
        }
    }
    for name in right_tables.keys() {
        if !left_tables.contains_key(name) {
            changed.push(name.to_string());
        }
    }

    let left_views: IndexMap<&str, &str> = left
        .views
        .iter()
        .map(|v| (v.name.as_str(), v.query.as_str()))
        .collect();
    let right_views: IndexMap<&str, &str> = right
        .views
        .iter()
        .map(|v| (v.name.as_str(), v.query.as_str()))
        .collect();
    for (name, query) in &left_views {
        match right_views.get(name) {
            Some(other) if other == query => {}
            _ => changed.push(name.to_string()),
        }
    }
    for name in right_views.keys() {
        if !left_views.contains_key(name) {
            changed.push(name.to_string());
        }
    }

    Ok(changed)
}
