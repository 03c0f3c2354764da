//! Views and the view-construction state machine.
//!
//! A [`ViewBuilder`] consumes a linear event sequence (add column, add FROM
//! entry, set WHERE, ...) in document order - normally replayed from the DSL
//! front end, but usable with any producer. [`ViewBuilder::finalize`] runs
//! the resolution and type-checking passes and yields an immutable [`View`].
//! A failed finalize consumes the builder, so a grain never observes a
//! half-built view.

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use super::error::DefinitionError;
use super::expr::{Expr, FieldRef, ViewColumnType};
use crate::sql::{self, SqlGenerator};

/// Join type of a FROM entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

impl std::fmt::Display for JoinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinType::Inner => write!(f, "inner"),
            JoinType::Left => write!(f, "left"),
            JoinType::Right => write!(f, "right"),
        }
    }
}

/// A FROM-clause entry: an aliased reference to a table or view, with an
/// optional join condition.
///
/// The target relation's name, owning grain and column metadata are
/// snapshotted when the ref is created; under the single-threaded
/// construction model the snapshot stays valid for the life of the view.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    grain_name: String,
    relation_name: String,
    alias: String,
    join_type: JoinType,
    on: Option<Expr>,
    columns: IndexMap<String, ViewColumnType>,
}

impl TableRef {
    pub fn new(
        grain_name: impl Into<String>,
        relation_name: impl Into<String>,
        alias: impl Into<String>,
        columns: IndexMap<String, ViewColumnType>,
    ) -> Self {
        Self {
            grain_name: grain_name.into(),
            relation_name: relation_name.into(),
            alias: alias.into(),
            join_type: JoinType::Inner,
            on: None,
            columns,
        }
    }

    /// Sets the join type and ON condition for a non-leading FROM entry.
    pub fn with_join(mut self, join_type: JoinType, on: Option<Expr>) -> Self {
        self.join_type = join_type;
        self.on = on;
        self
    }

    pub fn grain_name(&self) -> &str {
        &self.grain_name
    }

    pub fn relation_name(&self) -> &str {
        &self.relation_name
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    pub fn on_condition(&self) -> Option<&Expr> {
        self.on.as_ref()
    }

    /// Column name → semantic type of the target relation, in column order.
    pub fn columns(&self) -> &IndexMap<String, ViewColumnType> {
        &self.columns
    }
}

/// A finalized, immutable view.
///
/// Once built, a view behaves like a table for the purposes of being a FROM
/// target in another view: [`View::columns`] yields its alias → type map.
#[derive(Debug)]
pub struct View {
    grain_name: String,
    name: String,
    distinct: bool,
    aggregate: bool,
    select: IndexMap<String, Expr>,
    group_by: IndexMap<String, FieldRef>,
    tables: IndexMap<String, TableRef>,
    where_condition: Option<Expr>,
    // Frozen after first computation; the view is immutable by then.
    column_metas: OnceCell<IndexMap<String, ViewColumnType>>,
    definition: OnceCell<String>,
}

impl View {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grain_name(&self) -> &str {
        &self.grain_name
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn is_aggregate(&self) -> bool {
        self.aggregate
    }

    /// Output alias → expression, in declaration order.
    pub fn select_columns(&self) -> &IndexMap<String, Expr> {
        &self.select
    }

    /// GROUP BY alias → field reference, in declaration order.
    pub fn group_by(&self) -> &IndexMap<String, FieldRef> {
        &self.group_by
    }

    /// FROM entries keyed by alias, in declaration order.
    pub fn table_refs(&self) -> &IndexMap<String, TableRef> {
        &self.tables
    }

    pub fn where_condition(&self) -> Option<&Expr> {
        self.where_condition.as_ref()
    }

    /// Output alias → semantic type. Lazily computed on first call and
    /// frozen thereafter.
    pub fn columns(&self) -> &IndexMap<String, ViewColumnType> {
        self.column_metas.get_or_init(|| {
            self.select
                .iter()
                .map(|(alias, expr)| (alias.clone(), expr.meta()))
                .collect()
        })
    }

    /// The canonical definition text (select script) this view round-trips
    /// through. Memoized after the first computation.
    pub fn definition(&self) -> &str {
        self.definition
            .get_or_init(|| sql::select_script(self, &sql::dialect::Canonical))
    }

    /// Renders the `CREATE VIEW` script for the given dialect.
    pub fn create_view_script(&self, gen: &dyn SqlGenerator) -> String {
        sql::create_view_script(self, gen)
    }

    /// Renders the persisted canonical form: the create-view script
    /// terminated by `;` and a blank line.
    pub fn save_script(&self) -> String {
        let mut s = self.create_view_script(&sql::dialect::Canonical);
        s.push_str(";\n\n");
        s
    }
}

/// Builder state machine: `Empty → Parsing → Finalized`.
///
/// Every mutating call may fail with a [`DefinitionError`]; dropping the
/// builder is the failure path, leaving no trace in any grain.
#[derive(Debug)]
pub struct ViewBuilder {
    grain_name: String,
    name: String,
    distinct: bool,
    aggregate: bool,
    select: IndexMap<String, Expr>,
    group_by: IndexMap<String, FieldRef>,
    tables: IndexMap<String, TableRef>,
    where_condition: Option<Expr>,
}

impl ViewBuilder {
    pub fn new(grain_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            grain_name: grain_name.into(),
            name: name.into(),
            distinct: false,
            aggregate: false,
            select: IndexMap::new(),
            group_by: IndexMap::new(),
            tables: IndexMap::new(),
            where_condition: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_distinct(&mut self, distinct: bool) {
        self.distinct = distinct;
    }

    pub fn set_aggregate(&mut self, aggregate: bool) {
        self.aggregate = aggregate;
    }

    /// Declares an output column under a unique, non-empty alias.
    pub fn add_column(&mut self, alias: &str, expr: Expr) -> Result<(), DefinitionError> {
        if alias.is_empty() {
            return Err(DefinitionError::UndefinedColumnAlias {
                view: self.name.clone(),
            });
        }
        if self.select.contains_key(alias) {
            return Err(DefinitionError::DuplicateColumnAlias {
                view: self.name.clone(),
                alias: alias.to_string(),
            });
        }
        self.select.insert(alias.to_string(), expr);
        Ok(())
    }

    /// Registers a FROM entry. An ON condition is resolved and type-checked
    /// immediately, against the entries registered so far (including this
    /// one) - a join condition may only reference previously declared tables.
    pub fn add_from_table_ref(&mut self, mut tref: TableRef) -> Result<(), DefinitionError> {
        if tref.alias().is_empty() {
            return Err(DefinitionError::UndefinedTableAlias {
                view: self.name.clone(),
            });
        }
        if self.tables.contains_key(tref.alias()) {
            return Err(DefinitionError::DuplicateTableAlias {
                view: self.name.clone(),
                alias: tref.alias().to_string(),
            });
        }
        if let Some(mut on) = tref.on.take() {
            let mut refs: Vec<&TableRef> = self.tables.values().collect();
            refs.push(&tref);
            on.resolve_field_refs(&refs)?;
            on.validate_types()?;
            tref.on = Some(on);
        }
        self.tables.insert(tref.alias().to_string(), tref);
        Ok(())
    }

    /// Adds a GROUP BY entry; it must name an already-declared output alias.
    pub fn add_group_by_column(&mut self, field_ref: FieldRef) -> Result<(), DefinitionError> {
        let alias = field_ref.column_name.clone();
        if self.group_by.contains_key(&alias) {
            return Err(DefinitionError::DuplicateGroupByAlias {
                view: self.name.clone(),
                alias,
            });
        }
        if !self.select.contains_key(&alias) {
            return Err(DefinitionError::GroupByAliasNotSelected {
                view: self.name.clone(),
                alias,
            });
        }
        self.group_by.insert(alias, field_ref);
        Ok(())
    }

    /// Sets the WHERE condition, resolving it against the FROM entries
    /// registered so far and requiring the logical type.
    pub fn set_where_condition(&mut self, mut condition: Expr) -> Result<(), DefinitionError> {
        let refs: Vec<&TableRef> = self.tables.values().collect();
        condition.resolve_field_refs(&refs)?;
        condition.validate_types()?;
        condition.assert_type(ViewColumnType::Logic)?;
        self.where_condition = Some(condition);
        Ok(())
    }

    /// Resolves and type-checks every SELECT expression and the WHERE
    /// condition against the full FROM set, checks aggregate / GROUP BY
    /// consistency, and yields the finalized view.
    pub fn finalize(mut self) -> Result<View, DefinitionError> {
        {
            let refs: Vec<&TableRef> = self.tables.values().collect();
            for expr in self.select.values_mut() {
                expr.resolve_field_refs(&refs)?;
                expr.validate_types()?;
            }
            if let Some(cond) = self.where_condition.as_mut() {
                cond.resolve_field_refs(&refs)?;
                cond.validate_types()?;
                cond.assert_type(ViewColumnType::Logic)?;
            }
        }

        // An aggregate view with several output columns needs exactly one
        // aggregate column; every other alias must appear in GROUP BY.
        if self.aggregate && self.select.len() > 1 {
            let aggregate_aliases: Vec<&String> = self
                .select
                .iter()
                .filter(|(_, e)| e.is_aggregate())
                .map(|(a, _)| a)
                .collect();
            let covered = aggregate_aliases.len() == 1
                && self
                    .select
                    .keys()
                    .filter(|a| *a != aggregate_aliases[0])
                    .all(|a| self.group_by.contains_key(a));
            if !covered {
                return Err(DefinitionError::AggregateCoverage {
                    view: self.name.clone(),
                });
            }
        }

        Ok(View {
            grain_name: self.grain_name,
            name: self.name,
            distinct: self.distinct,
            aggregate: self.aggregate,
            select: self.select,
            group_by: self.group_by,
            tables: self.tables,
            where_condition: self.where_condition,
            column_metas: OnceCell::new(),
            definition: OnceCell::new(),
        })
    }
}
