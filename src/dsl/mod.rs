//! The view-definition language front end.
//!
//! Turning definition text into a finished [`View`](crate::model::View) is a
//! three-step pipeline:
//!
//! 1. [`lexer`] tokenizes the source,
//! 2. [`parser`] builds a [`SelectStmt`](parser::SelectStmt) syntax tree,
//! 3. [`build_view`] replays the statement into a
//!    [`ViewBuilder`](crate::model::ViewBuilder), which resolves field
//!    references against the grain and type-checks every expression.
//!
//! Any failure along the way surfaces as a [`DefinitionError`] and leaves
//! the grain untouched.

pub mod lexer;
pub mod parser;

use crate::model::expr::{Expr, FieldRef};
use crate::model::view::View;
use crate::model::{DefinitionError, Grain, ViewBuilder};

/// Parse a view definition and resolve it against the given grain.
///
/// Clauses are replayed into the builder in document order, so errors point
/// at the first offending construct. A FROM target may carry a grain
/// qualifier, but only the owning grain's name is accepted; joins across
/// grains are assembled programmatically instead.
pub fn build_view(grain: &Grain, name: &str, source: &str) -> Result<View, DefinitionError> {
    let syntax = |message: String| DefinitionError::Syntax {
        view: name.to_string(),
        message,
    };

    let tokens = lexer::lex(source).map_err(|errs| {
        let message = errs
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        syntax(message)
    })?;
    let stmt = parser::parse(&tokens, source.len()).map_err(|e| syntax(e.to_string()))?;

    let mut builder = ViewBuilder::new(grain.name(), name);
    builder.set_distinct(stmt.distinct);

    let mut has_aggregate = false;
    let mut columns = Vec::with_capacity(stmt.columns.len());
    for item in stmt.columns {
        // A bare field reference names its own column; anything else
        // requires an explicit alias.
        let alias = match item.alias {
            Some(alias) => alias,
            None => match &item.expr {
                Expr::FieldRef(fr) => fr.column_name.clone(),
                _ => {
                    return Err(DefinitionError::UndefinedColumnAlias {
                        view: name.to_string(),
                    })
                }
            },
        };
        has_aggregate |= item.expr.is_aggregate();
        columns.push((alias, item.expr));
    }
    builder.set_aggregate(has_aggregate);
    for (alias, expr) in columns {
        builder.add_column(&alias, expr)?;
    }

    for entry in stmt.from {
        if let Some(qualifier) = &entry.grain {
            if qualifier != grain.name() {
                return Err(DefinitionError::UnknownRelation {
                    grain: qualifier.clone(),
                    name: entry.relation.clone(),
                });
            }
        }
        let alias = entry.alias.as_deref().unwrap_or(&entry.relation);
        let tref = grain
            .table_ref(&entry.relation, alias)?
            .with_join(entry.join_type, entry.on);
        builder.add_from_table_ref(tref)?;
    }

    if let Some(condition) = stmt.where_condition {
        builder.set_where_condition(condition)?;
    }

    for item in stmt.group_by {
        builder.add_group_by_column(FieldRef::new(item.table_alias, item.column_name))?;
    }

    builder.finalize()
}
