//! Error types for schema definition and validation.
//!
//! Two kinds of failures exist in the model layer:
//!
//! - [`DefinitionError`] - a syntax or semantic problem in definition text
//!   or schema-building calls (duplicate alias, unresolved field reference,
//!   type mismatch, ...). Recoverable by the caller; a failed text-driven
//!   view construction leaves the grain untouched.
//! - [`StructuralError`] - a caller-code logic error (index-incompatible
//!   lookup pairing, mixed relation kinds, modification of a system grain).
//!
//! [`LookupError`] is the union surfaced by the fields-lookup validator,
//! which can fail either way and whose callers need to tell the two apart.

use thiserror::Error;

/// Semantic type of a view column expression.
pub use super::expr::ViewColumnType;

/// A syntax or semantic error in a schema definition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    #[error("Syntax error in view '{view}': {message}")]
    Syntax { view: String, message: String },

    #[error("Grain '{grain}' already contains an element with name '{name}'")]
    DuplicateName { grain: String, name: String },

    #[error("Table '{table}' already contains a column with name '{name}'")]
    DuplicateColumn { table: String, name: String },

    #[error("Grain '{grain}' already contains an index with name '{name}'")]
    DuplicateIndex { grain: String, name: String },

    #[error("Index '{index}' refers to column '{column}' which is missing or repeated in table '{table}'")]
    BadIndexColumn {
        index: String,
        table: String,
        column: String,
    },

    #[error("Table or view '{name}' not found in grain '{grain}'")]
    UnknownRelation { grain: String, name: String },

    #[error("Column '{column}' not found in table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("Invalid default value '{value}' for column '{column}': {message}")]
    BadDefault {
        column: String,
        value: String,
        message: String,
    },

    #[error("More than one identity column defined in table '{table}'")]
    MultipleIdentity { table: String },

    #[error("View '{view}' contains a column with undefined alias")]
    UndefinedColumnAlias { view: String },

    #[error("View '{view}' already contains column with name or alias '{alias}'. Use unique aliases for view columns.")]
    DuplicateColumnAlias { view: String, alias: String },

    #[error("View '{view}' contains a table with undefined alias")]
    UndefinedTableAlias { view: String },

    #[error("View '{view}' already contains table with name or alias '{alias}'. Use unique aliases for view tables.")]
    DuplicateTableAlias { view: String, alias: String },

    #[error("View '{view}' already contains column '{alias}' in GROUP BY expression. Use unique aliases.")]
    DuplicateGroupByAlias { view: String, alias: String },

    #[error("View '{view}' doesn't contain a column with alias '{alias}' defined in GROUP BY expression")]
    GroupByAliasNotSelected { view: String, alias: String },

    #[error("Field '{field}' cannot be resolved against the FROM clause")]
    FieldNotFound { field: String },

    #[error("Field '{field}' is ambiguous: more than one FROM entry defines it")]
    AmbiguousField { field: String },

    #[error("Type mismatch: operator '{op}' cannot combine {left:?} and {right:?}")]
    OperatorTypeMismatch {
        op: String,
        left: ViewColumnType,
        right: ViewColumnType,
    },

    #[error("Aggregate '{func}' cannot be applied to an operand of type {operand:?}")]
    AggregateTypeMismatch {
        func: String,
        operand: ViewColumnType,
    },

    #[error("Expression of type {actual:?} found where {expected:?} was expected")]
    UnexpectedType {
        expected: ViewColumnType,
        actual: ViewColumnType,
    },

    #[error("View '{view}' contains a column which was not specified in aggregate function and GROUP BY expression")]
    AggregateCoverage { view: String },

    #[error("Field '{field}' not found in {kind} '{relation}'")]
    LookupFieldNotFound {
        kind: &'static str,
        relation: String,
        field: String,
    },
}

/// A structural failure signalling a caller-code logic error rather than
/// malformed definition text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralError {
    #[error("Cannot pair {left_kind} '{left}' with {right_kind} '{right}': both relations must be tables or both must be views")]
    RelationKindMismatch {
        left_kind: &'static str,
        left: String,
        right_kind: &'static str,
        right: String,
    },

    #[error("There is no index on table '{table}' covering fields [{fields}] as a prefix")]
    IndexMismatch { table: String, fields: String },

    #[error("Grain '{grain}' is a system grain and cannot be modified")]
    SystemGrain { grain: String },

    #[error("Element '{name}' does not belong to grain '{grain}'")]
    ElementNotFound { grain: String, name: String },
}

/// Failure of a fields-lookup operation.
///
/// Keeps the two kinds distinguishable: a missing field is a definition
/// mistake the caller can recover from, an index or kind mismatch is not.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
}
