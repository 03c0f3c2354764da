//! Typed column variants and their default-value semantics.
//!
//! Columns form a closed sum type over the supported kinds. Each variant
//! parses its own default-value grammar and exposes two rendering-facing
//! capabilities: the value used when no default is given, and the
//! driver-facing typed accessor tag.

use serde::{Deserialize, Serialize};

use super::error::DefinitionError;
use super::expr::ViewColumnType;

/// Tag naming a column kind, used when declaring columns and in the
/// interchange documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Boolean,
    DateTime,
    Binary,
}

/// Kind-specific state of a column: its parsed default value and, for
/// integer columns, the identity marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnKind {
    Integer { default: Option<i64>, identity: bool },
    Float { default: Option<f64> },
    String { default: Option<String> },
    Boolean { default: Option<bool> },
    /// `getdate` marks a DEFAULT GETDATE() column; otherwise the literal is
    /// kept verbatim.
    DateTime { default: Option<String>, getdate: bool },
    Binary { default: Option<String> },
}

impl ColumnKind {
    fn new(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Integer => ColumnKind::Integer {
                default: None,
                identity: false,
            },
            ColumnType::Float => ColumnKind::Float { default: None },
            ColumnType::String => ColumnKind::String { default: None },
            ColumnType::Boolean => ColumnKind::Boolean { default: None },
            ColumnType::DateTime => ColumnKind::DateTime {
                default: None,
                getdate: false,
            },
            ColumnType::Binary => ColumnKind::Binary { default: None },
        }
    }
}

/// A column of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    kind: ColumnKind,
}

impl Column {
    pub(crate) fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::new(column_type),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ColumnKind {
        &self.kind
    }

    /// The kind tag of this column.
    pub fn column_type(&self) -> ColumnType {
        match self.kind {
            ColumnKind::Integer { .. } => ColumnType::Integer,
            ColumnKind::Float { .. } => ColumnType::Float,
            ColumnKind::String { .. } => ColumnType::String,
            ColumnKind::Boolean { .. } => ColumnType::Boolean,
            ColumnKind::DateTime { .. } => ColumnType::DateTime,
            ColumnKind::Binary { .. } => ColumnType::Binary,
        }
    }

    /// Semantic type of the column when referenced from a view expression.
    pub fn meta(&self) -> ViewColumnType {
        match self.kind {
            ColumnKind::Integer { .. } => ViewColumnType::Int,
            ColumnKind::Float { .. } => ViewColumnType::Real,
            ColumnKind::String { .. } => ViewColumnType::Text,
            ColumnKind::Boolean { .. } => ViewColumnType::Bit,
            ColumnKind::DateTime { .. } => ViewColumnType::Date,
            ColumnKind::Binary { .. } => ViewColumnType::Blob,
        }
    }

    /// Whether this is an integer column marked as the table's identity.
    pub fn is_identity(&self) -> bool {
        matches!(
            self.kind,
            ColumnKind::Integer { identity: true, .. }
        )
    }

    /// The value used when no explicit default is given. A rendering
    /// concern, not a validation one.
    pub fn default_default(&self) -> &'static str {
        match self.kind {
            ColumnKind::Integer { .. } => "0",
            ColumnKind::Float { .. } => "0.0",
            ColumnKind::String { .. } => "''",
            ColumnKind::Boolean { .. } => "false",
            ColumnKind::DateTime { .. } => "getdate()",
            ColumnKind::Binary { .. } => "null",
        }
    }

    /// Driver-facing typed getter tag for this column kind.
    pub fn accessor(&self) -> &'static str {
        match self.kind {
            ColumnKind::Integer { .. } => "get_int",
            ColumnKind::Float { .. } => "get_float",
            ColumnKind::String { .. } => "get_string",
            ColumnKind::Boolean { .. } => "get_bool",
            ColumnKind::DateTime { .. } => "get_datetime",
            ColumnKind::Binary { .. } => "get_blob",
        }
    }

    /// The default value rendered back to its lexical form, for persistence.
    pub fn default_lexical(&self) -> Option<String> {
        match &self.kind {
            ColumnKind::Integer { identity: true, .. } => Some("IDENTITY".to_string()),
            ColumnKind::Integer { default, .. } => default.map(|v| v.to_string()),
            ColumnKind::Float { default } => default.map(|v| v.to_string()),
            ColumnKind::String { default } => default.clone(),
            ColumnKind::Boolean { default } => default.map(|v| v.to_string()),
            ColumnKind::DateTime { getdate: true, .. } => Some("GETDATE".to_string()),
            ColumnKind::DateTime { default, .. } => default.clone(),
            ColumnKind::Binary { default } => default.clone(),
        }
    }

    /// Parses and stores a default value in the variant's own grammar.
    ///
    /// `None` clears the default. The one-identity-per-table rule is
    /// enforced by [`super::table::Table::set_column_default`], which is the
    /// public entry point.
    pub(crate) fn set_default(&mut self, lexvalue: Option<&str>) -> Result<(), DefinitionError> {
        match &mut self.kind {
            ColumnKind::Integer { default, identity } => match lexvalue {
                None => {
                    *default = None;
                    *identity = false;
                }
                Some(lex) if lex.eq_ignore_ascii_case("identity") => {
                    *default = None;
                    *identity = true;
                }
                Some(lex) => {
                    let value = lex.parse::<i64>().map_err(|e| DefinitionError::BadDefault {
                        column: self.name.clone(),
                        value: lex.to_string(),
                        message: e.to_string(),
                    })?;
                    *default = Some(value);
                    *identity = false;
                }
            },
            ColumnKind::Float { default } => match lexvalue {
                None => *default = None,
                Some(lex) => {
                    let value = lex.parse::<f64>().map_err(|e| DefinitionError::BadDefault {
                        column: self.name.clone(),
                        value: lex.to_string(),
                        message: e.to_string(),
                    })?;
                    *default = Some(value);
                }
            },
            ColumnKind::String { default } => {
                *default = lexvalue.map(str::to_string);
            }
            ColumnKind::Boolean { default } => match lexvalue {
                None => *default = None,
                Some(lex) if lex.eq_ignore_ascii_case("true") => *default = Some(true),
                Some(lex) if lex.eq_ignore_ascii_case("false") => *default = Some(false),
                Some(lex) => {
                    return Err(DefinitionError::BadDefault {
                        column: self.name.clone(),
                        value: lex.to_string(),
                        message: "expected true or false".to_string(),
                    })
                }
            },
            ColumnKind::DateTime { default, getdate } => match lexvalue {
                None => {
                    *default = None;
                    *getdate = false;
                }
                Some(lex) if lex.eq_ignore_ascii_case("getdate") => {
                    *default = None;
                    *getdate = true;
                }
                Some(lex) => {
                    *default = Some(lex.to_string());
                    *getdate = false;
                }
            },
            ColumnKind::Binary { default } => {
                *default = lexvalue.map(str::to_string);
            }
        }
        Ok(())
    }
}
