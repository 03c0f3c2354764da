//! Expression AST for view definitions.
//!
//! The tree is built unresolved by the DSL front end (field references hold
//! only textual alias/column pairs) and is then run through two passes, always
//! in this order:
//!
//! 1. [`Expr::resolve_field_refs`] binds every field reference to a concrete
//!    source column of one of the supplied FROM entries.
//! 2. [`Expr::validate_types`] checks operator and aggregate compatibility
//!    bottom-up.
//!
//! After both passes succeed the tree is treated as immutable and
//! [`Expr::meta`] yields the computed semantic type of any node.

use serde::{Deserialize, Serialize};

use super::error::DefinitionError;
use super::view::TableRef;

/// Semantic type of a view column or expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewColumnType {
    /// Result of a comparison or logical connective.
    Logic,
    Int,
    Real,
    Text,
    Date,
    Bit,
    Blob,
    /// Not yet resolved.
    Undefined,
}

impl ViewColumnType {
    /// Whether arithmetic may be applied to a value of this type.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ViewColumnType::Int | ViewColumnType::Real)
    }

    /// Whether the type may appear as an operand of AND/OR/NOT.
    pub fn is_logical(&self) -> bool {
        matches!(self, ViewColumnType::Logic | ViewColumnType::Bit)
    }

    /// Whether two types may be compared with a relational operator.
    fn comparable_with(&self, other: &ViewColumnType) -> bool {
        if self.is_numeric() && other.is_numeric() {
            return true;
        }
        matches!(
            (self, other),
            (ViewColumnType::Text, ViewColumnType::Text)
                | (ViewColumnType::Date, ViewColumnType::Date)
                | (ViewColumnType::Bit, ViewColumnType::Bit)
        )
    }
}

/// Arithmetic and string-concatenation operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermOp {
    Add,
    Sub,
    Mul,
    Div,
    Concat,
}

impl TermOp {
    /// The operator as it appears in definition text.
    pub fn symbol(&self) -> &'static str {
        match self {
            TermOp::Add => "+",
            TermOp::Sub => "-",
            TermOp::Mul => "*",
            TermOp::Div => "/",
            TermOp::Concat => "||",
        }
    }
}

/// Relational (comparison) operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Like,
}

impl RelOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            RelOp::Eq => "=",
            RelOp::Ne => "<>",
            RelOp::Lt => "<",
            RelOp::Gt => ">",
            RelOp::Le => "<=",
            RelOp::Ge => ">=",
            RelOp::Like => "like",
        }
    }
}

/// Logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
        }
    }
}

/// Aggregate functions usable in view columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateFunc {
    /// COUNT(*) - takes no operand.
    Count,
    Sum,
    Min,
    Max,
}

impl AggregateFunc {
    pub fn symbol(&self) -> &'static str {
        match self {
            AggregateFunc::Count => "count",
            AggregateFunc::Sum => "sum",
            AggregateFunc::Min => "min",
            AggregateFunc::Max => "max",
        }
    }
}

/// A reference to a column of a FROM entry.
///
/// Holds only text until [`Expr::resolve_field_refs`] binds it to a concrete
/// source column; the bound semantic type is then frozen in `meta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRef {
    /// FROM-entry alias, when the reference is qualified (`alias.column`).
    pub table_alias: Option<String>,
    pub column_name: String,
    meta: Option<ViewColumnType>,
}

impl FieldRef {
    pub fn new(table_alias: Option<String>, column_name: impl Into<String>) -> Self {
        Self {
            table_alias,
            column_name: column_name.into(),
            meta: None,
        }
    }

    /// The reference as written in definition text.
    pub fn display_name(&self) -> String {
        match &self.table_alias {
            Some(t) => format!("{}.{}", t, self.column_name),
            None => self.column_name.clone(),
        }
    }

    fn resolve(&mut self, table_refs: &[&TableRef]) -> Result<(), DefinitionError> {
        match &self.table_alias {
            Some(alias) => {
                let meta = table_refs
                    .iter()
                    .find(|r| r.alias() == alias)
                    .and_then(|r| r.columns().get(self.column_name.as_str()))
                    .copied();
                match meta {
                    Some(m) => {
                        self.meta = Some(m);
                        Ok(())
                    }
                    None => Err(DefinitionError::FieldNotFound {
                        field: self.display_name(),
                    }),
                }
            }
            None => {
                let mut found = None;
                for r in table_refs {
                    if let Some(m) = r.columns().get(self.column_name.as_str()) {
                        if found.is_some() {
                            return Err(DefinitionError::AmbiguousField {
                                field: self.column_name.clone(),
                            });
                        }
                        found = Some(*m);
                    }
                }
                match found {
                    Some(m) => {
                        self.meta = Some(m);
                        Ok(())
                    }
                    None => Err(DefinitionError::FieldNotFound {
                        field: self.column_name.clone(),
                    }),
                }
            }
        }
    }
}

/// A node of the view-definition expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    FieldRef(FieldRef),
    IntLiteral(i64),
    RealLiteral(f64),
    TextLiteral(String),
    /// Unary numeric negation.
    Neg(Box<Expr>),
    /// Logical NOT.
    Not(Box<Expr>),
    /// Arithmetic or concatenation.
    Binary {
        op: TermOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Comparison, yields Logic.
    Relop {
        op: RelOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// AND/OR, yields Logic.
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Aggregate call; `Count` carries no operand.
    Aggregate {
        func: AggregateFunc,
        operand: Option<Box<Expr>>,
    },
    /// Explicit parentheses, kept for faithful round-tripping.
    Parens(Box<Expr>),
}

impl Expr {
    // === Constructors ===

    pub fn field(column: impl Into<String>) -> Self {
        Expr::FieldRef(FieldRef::new(None, column))
    }

    pub fn qualified_field(table: impl Into<String>, column: impl Into<String>) -> Self {
        Expr::FieldRef(FieldRef::new(Some(table.into()), column))
    }

    pub fn int(value: i64) -> Self {
        Expr::IntLiteral(value)
    }

    pub fn real(value: f64) -> Self {
        Expr::RealLiteral(value)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Expr::TextLiteral(value.into())
    }

    pub fn binary(op: TermOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn relop(op: RelOp, left: Expr, right: Expr) -> Self {
        Expr::Relop {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn logical(op: LogicalOp, left: Expr, right: Expr) -> Self {
        Expr::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn aggregate(func: AggregateFunc, operand: Option<Expr>) -> Self {
        Expr::Aggregate {
            func,
            operand: operand.map(Box::new),
        }
    }

    /// expr = other
    pub fn eq(self, other: Expr) -> Self {
        Self::relop(RelOp::Eq, self, other)
    }

    /// expr AND other
    pub fn and(self, other: Expr) -> Self {
        Self::logical(LogicalOp::And, self, other)
    }

    // === Queries ===

    /// Whether the node is an aggregate call (top level only, matching the
    /// GROUP BY coverage rule).
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Expr::Aggregate { .. })
    }

    /// The computed semantic type of this node, bottom-up.
    ///
    /// Meaningful only after the tree has been resolved and validated;
    /// unresolved field references report [`ViewColumnType::Undefined`].
    pub fn meta(&self) -> ViewColumnType {
        match self {
            Expr::FieldRef(fr) => fr.meta.unwrap_or(ViewColumnType::Undefined),
            Expr::IntLiteral(_) => ViewColumnType::Int,
            Expr::RealLiteral(_) => ViewColumnType::Real,
            Expr::TextLiteral(_) => ViewColumnType::Text,
            Expr::Neg(e) => e.meta(),
            Expr::Not(_) | Expr::Relop { .. } | Expr::Logical { .. } => ViewColumnType::Logic,
            Expr::Binary { op, left, right } => match op {
                TermOp::Concat => ViewColumnType::Text,
                _ => {
                    if left.meta() == ViewColumnType::Real || right.meta() == ViewColumnType::Real {
                        ViewColumnType::Real
                    } else {
                        ViewColumnType::Int
                    }
                }
            },
            Expr::Aggregate { func, operand } => match func {
                AggregateFunc::Count => ViewColumnType::Int,
                _ => operand
                    .as_ref()
                    .map(|e| e.meta())
                    .unwrap_or(ViewColumnType::Undefined),
            },
            Expr::Parens(e) => e.meta(),
        }
    }

    // === Passes ===

    /// Binds every field reference in the tree against the supplied ordered
    /// FROM entries.
    ///
    /// A qualified reference must name an existing alias/column pair; an
    /// unqualified one must match exactly one FROM entry.
    pub fn resolve_field_refs(&mut self, table_refs: &[&TableRef]) -> Result<(), DefinitionError> {
        match self {
            Expr::FieldRef(fr) => fr.resolve(table_refs),
            Expr::IntLiteral(_) | Expr::RealLiteral(_) | Expr::TextLiteral(_) => Ok(()),
            Expr::Neg(e) | Expr::Not(e) | Expr::Parens(e) => e.resolve_field_refs(table_refs),
            Expr::Binary { left, right, .. }
            | Expr::Relop { left, right, .. }
            | Expr::Logical { left, right, .. } => {
                left.resolve_field_refs(table_refs)?;
                right.resolve_field_refs(table_refs)
            }
            Expr::Aggregate { operand, .. } => match operand {
                Some(e) => e.resolve_field_refs(table_refs),
                None => Ok(()),
            },
        }
    }

    /// Checks operator and aggregate type compatibility bottom-up.
    ///
    /// Must run after [`Expr::resolve_field_refs`].
    pub fn validate_types(&self) -> Result<(), DefinitionError> {
        match self {
            Expr::FieldRef(fr) => {
                if fr.meta.is_none() {
                    return Err(DefinitionError::FieldNotFound {
                        field: fr.display_name(),
                    });
                }
                Ok(())
            }
            Expr::IntLiteral(_) | Expr::RealLiteral(_) | Expr::TextLiteral(_) => Ok(()),
            Expr::Neg(e) => {
                e.validate_types()?;
                if !e.meta().is_numeric() {
                    return Err(DefinitionError::UnexpectedType {
                        expected: ViewColumnType::Int,
                        actual: e.meta(),
                    });
                }
                Ok(())
            }
            Expr::Not(e) => {
                e.validate_types()?;
                if !e.meta().is_logical() {
                    return Err(DefinitionError::UnexpectedType {
                        expected: ViewColumnType::Logic,
                        actual: e.meta(),
                    });
                }
                Ok(())
            }
            Expr::Binary { op, left, right } => {
                left.validate_types()?;
                right.validate_types()?;
                let (l, r) = (left.meta(), right.meta());
                let ok = match op {
                    TermOp::Concat => l == ViewColumnType::Text && r == ViewColumnType::Text,
                    _ => l.is_numeric() && r.is_numeric(),
                };
                if !ok {
                    return Err(DefinitionError::OperatorTypeMismatch {
                        op: op.symbol().to_string(),
                        left: l,
                        right: r,
                    });
                }
                Ok(())
            }
            Expr::Relop { op, left, right } => {
                left.validate_types()?;
                right.validate_types()?;
                let (l, r) = (left.meta(), right.meta());
                let ok = match op {
                    RelOp::Like => l == ViewColumnType::Text && r == ViewColumnType::Text,
                    _ => l.comparable_with(&r),
                };
                if !ok {
                    return Err(DefinitionError::OperatorTypeMismatch {
                        op: op.symbol().to_string(),
                        left: l,
                        right: r,
                    });
                }
                Ok(())
            }
            Expr::Logical { op, left, right } => {
                left.validate_types()?;
                right.validate_types()?;
                let (l, r) = (left.meta(), right.meta());
                if !l.is_logical() || !r.is_logical() {
                    return Err(DefinitionError::OperatorTypeMismatch {
                        op: op.symbol().to_string(),
                        left: l,
                        right: r,
                    });
                }
                Ok(())
            }
            Expr::Aggregate { func, operand } => {
                if let Some(e) = operand {
                    e.validate_types()?;
                    let m = e.meta();
                    let ok = match func {
                        AggregateFunc::Count => true,
                        AggregateFunc::Sum => m.is_numeric(),
                        AggregateFunc::Min | AggregateFunc::Max => matches!(
                            m,
                            ViewColumnType::Int
                                | ViewColumnType::Real
                                | ViewColumnType::Text
                                | ViewColumnType::Date
                        ),
                    };
                    if !ok {
                        return Err(DefinitionError::AggregateTypeMismatch {
                            func: func.symbol().to_string(),
                            operand: m,
                        });
                    }
                }
                Ok(())
            }
            Expr::Parens(e) => e.validate_types(),
        }
    }

    /// Asserts that the (validated) expression has the expected type.
    ///
    /// Used for the top-level WHERE condition, which must yield Logic.
    pub fn assert_type(&self, expected: ViewColumnType) -> Result<(), DefinitionError> {
        let actual = self.meta();
        if actual != expected {
            return Err(DefinitionError::UnexpectedType { expected, actual });
        }
        Ok(())
    }
}
