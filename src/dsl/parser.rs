//! Recursive-descent parser over the lexed token stream.
//!
//! Produces a [`SelectStmt`] syntax tree with unresolved field references;
//! binding and type checking happen later, when the statement is replayed
//! into a view builder.

use chumsky::span::SimpleSpan;
use thiserror::Error;

use crate::dsl::lexer::Token;
use crate::model::expr::{AggregateFunc, Expr, LogicalOp, RelOp, TermOp};
use crate::model::view::JoinType;

/// A syntax error with the byte offset it was detected at.
#[derive(Debug, Clone, Error)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

/// One item of the select list: optional alias plus its expression.
#[derive(Debug, Clone)]
pub struct SelectItem {
    pub alias: Option<String>,
    pub expr: Expr,
}

/// One FROM target, with its join kind and ON condition when joined.
#[derive(Debug, Clone)]
pub struct FromEntry {
    /// Optional grain qualifier before the relation name.
    pub grain: Option<String>,
    pub relation: String,
    pub alias: Option<String>,
    pub join_type: JoinType,
    pub on: Option<Expr>,
}

/// An unqualified or alias-qualified name in a GROUP BY list.
#[derive(Debug, Clone)]
pub struct GroupByItem {
    pub table_alias: Option<String>,
    pub column_name: String,
}

/// A parsed view definition, before name resolution.
#[derive(Debug, Clone)]
pub struct SelectStmt {
    pub distinct: bool,
    pub columns: Vec<SelectItem>,
    pub from: Vec<FromEntry>,
    pub where_condition: Option<Expr>,
    pub group_by: Vec<GroupByItem>,
}

/// Parse a lexed token stream into a select statement.
pub fn parse(tokens: &[(Token<'_>, SimpleSpan)], source_len: usize) -> Result<SelectStmt, ParseError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        source_len,
    };
    let stmt = parser.select_stmt()?;
    parser.expect_eof()?;
    Ok(stmt)
}

struct Parser<'a, 'src> {
    tokens: &'a [(Token<'src>, SimpleSpan)],
    pos: usize,
    source_len: usize,
}

impl<'a, 'src> Parser<'a, 'src> {
    // ========================================================================
    // Token stream helpers
    // ========================================================================

    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.start)
            .unwrap_or(self.source_len)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            offset: self.offset(),
        }
    }

    fn error_found(&self, expected: &str) -> ParseError {
        let found = match self.peek() {
            Some(tok) => format!("found '{}'", tok),
            None => "found end of input".to_string(),
        };
        self.error(format!("expected {}, {}", expected, found))
    }

    /// Consume the next token if it matches, returning whether it did.
    fn eat(&mut self, token: Token<'src>) -> bool {
        if self.peek() == Some(&token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token<'src>, what: &str) -> Result<(), ParseError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error_found(what))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.to_string();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.error_found(what)),
        }
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(self.error_found("end of statement"))
        }
    }

    // ========================================================================
    // Statement structure
    // ========================================================================

    fn select_stmt(&mut self) -> Result<SelectStmt, ParseError> {
        self.expect(Token::Select, "'select'")?;
        let distinct = self.eat(Token::Distinct);

        let mut columns = vec![self.select_item()?];
        while self.eat(Token::Comma) {
            columns.push(self.select_item()?);
        }

        self.expect(Token::From, "'from'")?;
        let mut from = vec![self.from_entry()?];
        while let Some(entry) = self.join_entry()? {
            from.push(entry);
        }

        let where_condition = if self.eat(Token::Where) {
            Some(self.or_expr()?)
        } else {
            None
        };

        let mut group_by = Vec::new();
        if self.eat(Token::Group) {
            self.expect(Token::By, "'by'")?;
            group_by.push(self.group_by_item()?);
            while self.eat(Token::Comma) {
                group_by.push(self.group_by_item()?);
            }
        }

        Ok(SelectStmt {
            distinct,
            columns,
            from,
            where_condition,
            group_by,
        })
    }

    fn select_item(&mut self) -> Result<SelectItem, ParseError> {
        let expr = self.or_expr()?;
        let alias = if self.eat(Token::As) {
            Some(self.expect_ident("a column alias")?)
        } else {
            None
        };
        Ok(SelectItem { alias, expr })
    }

    /// The first FROM target: `[grain.]relation [as alias]`.
    fn from_entry(&mut self) -> Result<FromEntry, ParseError> {
        let (grain, relation) = self.relation_name()?;
        let alias = self.relation_alias()?;
        Ok(FromEntry {
            grain,
            relation,
            alias,
            join_type: JoinType::Inner,
            on: None,
        })
    }

    /// A subsequent join: `[inner|left|right] join target on condition`.
    fn join_entry(&mut self) -> Result<Option<FromEntry>, ParseError> {
        let join_type = match self.peek() {
            Some(Token::Inner) => {
                self.pos += 1;
                JoinType::Inner
            }
            Some(Token::Left) => {
                self.pos += 1;
                JoinType::Left
            }
            Some(Token::Right) => {
                self.pos += 1;
                JoinType::Right
            }
            Some(Token::Join) => JoinType::Inner,
            _ => return Ok(None),
        };
        self.expect(Token::Join, "'join'")?;

        let (grain, relation) = self.relation_name()?;
        let alias = self.relation_alias()?;
        self.expect(Token::On, "'on'")?;
        let on = self.or_expr()?;

        Ok(Some(FromEntry {
            grain,
            relation,
            alias,
            join_type,
            on: Some(on),
        }))
    }

    fn relation_name(&mut self) -> Result<(Option<String>, String), ParseError> {
        let first = self.expect_ident("a table or view name")?;
        if self.eat(Token::Dot) {
            let second = self.expect_ident("a table or view name")?;
            Ok((Some(first), second))
        } else {
            Ok((None, first))
        }
    }

    fn relation_alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.eat(Token::As) {
            Ok(Some(self.expect_ident("a table alias")?))
        } else {
            Ok(None)
        }
    }

    fn group_by_item(&mut self) -> Result<GroupByItem, ParseError> {
        let first = self.expect_ident("a column name")?;
        if self.eat(Token::Dot) {
            let second = self.expect_ident("a column name")?;
            Ok(GroupByItem {
                table_alias: Some(first),
                column_name: second,
            })
        } else {
            Ok(GroupByItem {
                table_alias: None,
                column_name: first,
            })
        }
    }

    // ========================================================================
    // Expressions, loosest-binding first
    // ========================================================================

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.and_expr()?;
        while self.eat(Token::Or) {
            let right = self.and_expr()?;
            left = Expr::logical(LogicalOp::Or, left, right);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.not_expr()?;
        while self.eat(Token::And) {
            let right = self.not_expr()?;
            left = Expr::logical(LogicalOp::And, left, right);
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr, ParseError> {
        if self.eat(Token::Not) {
            let operand = self.not_expr()?;
            Ok(Expr::Not(Box::new(operand)))
        } else {
            self.rel_expr()
        }
    }

    fn rel_expr(&mut self) -> Result<Expr, ParseError> {
        let left = self.term_expr()?;
        let op = match self.peek() {
            Some(Token::Eq) => RelOp::Eq,
            Some(Token::Ne) => RelOp::Ne,
            Some(Token::Lt) => RelOp::Lt,
            Some(Token::Gt) => RelOp::Gt,
            Some(Token::Le) => RelOp::Le,
            Some(Token::Ge) => RelOp::Ge,
            Some(Token::Like) => RelOp::Like,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.term_expr()?;
        Ok(Expr::relop(op, left, right))
    }

    fn term_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.factor_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => TermOp::Add,
                Some(Token::Minus) => TermOp::Sub,
                Some(Token::Concat) => TermOp::Concat,
                _ => break,
            };
            self.pos += 1;
            let right = self.factor_expr()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn factor_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.unary_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => TermOp::Mul,
                Some(Token::Slash) => TermOp::Div,
                _ => break,
            };
            self.pos += 1;
            let right = self.unary_expr()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn unary_expr(&mut self) -> Result<Expr, ParseError> {
        if self.eat(Token::Minus) {
            let operand = self.unary_expr()?;
            Ok(Expr::Neg(Box::new(operand)))
        } else {
            self.primary_expr()
        }
    }

    fn primary_expr(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Some(Token::Number(text)) => {
                let text = *text;
                self.pos += 1;
                if text.contains('.') {
                    let value: f64 = text
                        .parse()
                        .map_err(|_| self.error(format!("invalid number '{}'", text)))?;
                    Ok(Expr::real(value))
                } else {
                    let value: i64 = text
                        .parse()
                        .map_err(|_| self.error(format!("invalid number '{}'", text)))?;
                    Ok(Expr::int(value))
                }
            }
            Some(Token::StringLit(raw)) => {
                let value = raw.replace("''", "'");
                self.pos += 1;
                Ok(Expr::text(value))
            }
            Some(Token::Count) => {
                self.pos += 1;
                self.expect(Token::LParen, "'('")?;
                self.expect(Token::Star, "'*'")?;
                self.expect(Token::RParen, "')'")?;
                Ok(Expr::aggregate(AggregateFunc::Count, None))
            }
            Some(Token::Sum) | Some(Token::Min) | Some(Token::Max) => {
                let func = match self.peek() {
                    Some(Token::Sum) => AggregateFunc::Sum,
                    Some(Token::Min) => AggregateFunc::Min,
                    _ => AggregateFunc::Max,
                };
                self.pos += 1;
                self.expect(Token::LParen, "'('")?;
                let operand = self.or_expr()?;
                self.expect(Token::RParen, "')'")?;
                Ok(Expr::aggregate(func, Some(operand)))
            }
            Some(Token::Ident(_)) => {
                let first = self.expect_ident("a column name")?;
                if self.eat(Token::Dot) {
                    let second = self.expect_ident("a column name")?;
                    Ok(Expr::qualified_field(first, second))
                } else {
                    Ok(Expr::field(first))
                }
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.or_expr()?;
                self.expect(Token::RParen, "')'")?;
                Ok(Expr::Parens(Box::new(inner)))
            }
            _ => Err(self.error_found("an expression")),
        }
    }
}
