//! Lexer for the view-definition language.
//!
//! Tokenizes definition text into a sequence of tokens with span
//! information. Keywords are case-insensitive, as usual for SQL-like
//! languages; anything else alphanumeric is an identifier.

use chumsky::prelude::*;

/// A token of the view-definition language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // ========================================================================
    // Keywords
    // ========================================================================
    Select,
    Distinct,
    As,
    From,
    Inner,
    Left,
    Right,
    Join,
    On,
    Where,
    Group,
    By,
    And,
    Or,
    Not,
    Like,

    // ========================================================================
    // Aggregate functions
    // ========================================================================
    Count,
    Sum,
    Min,
    Max,

    // ========================================================================
    // Literals
    // ========================================================================
    /// An identifier (not a keyword).
    Ident(&'src str),
    /// A string literal (contents without quotes, `''` escapes kept).
    StringLit(&'src str),
    /// A number (integer or decimal).
    Number(&'src str),

    // ========================================================================
    // Symbols
    // ========================================================================
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `||`
    Concat,
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `>`
    Gt,
}

impl<'src> std::fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Select => write!(f, "select"),
            Token::Distinct => write!(f, "distinct"),
            Token::As => write!(f, "as"),
            Token::From => write!(f, "from"),
            Token::Inner => write!(f, "inner"),
            Token::Left => write!(f, "left"),
            Token::Right => write!(f, "right"),
            Token::Join => write!(f, "join"),
            Token::On => write!(f, "on"),
            Token::Where => write!(f, "where"),
            Token::Group => write!(f, "group"),
            Token::By => write!(f, "by"),
            Token::And => write!(f, "and"),
            Token::Or => write!(f, "or"),
            Token::Not => write!(f, "not"),
            Token::Like => write!(f, "like"),
            Token::Count => write!(f, "count"),
            Token::Sum => write!(f, "sum"),
            Token::Min => write!(f, "min"),
            Token::Max => write!(f, "max"),
            Token::Ident(s) => write!(f, "{}", s),
            Token::StringLit(s) => write!(f, "'{}'", s),
            Token::Number(s) => write!(f, "{}", s),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Concat => write!(f, "||"),
            Token::Eq => write!(f, "="),
            Token::Ne => write!(f, "<>"),
            Token::Le => write!(f, "<="),
            Token::Ge => write!(f, ">="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
        }
    }
}

/// Map an identifier to its keyword token, case-insensitively.
fn keyword_or_ident(s: &str) -> Token<'_> {
    match s.to_ascii_lowercase().as_str() {
        "select" => Token::Select,
        "distinct" => Token::Distinct,
        "as" => Token::As,
        "from" => Token::From,
        "inner" => Token::Inner,
        "left" => Token::Left,
        "right" => Token::Right,
        "join" => Token::Join,
        "on" => Token::On,
        "where" => Token::Where,
        "group" => Token::Group,
        "by" => Token::By,
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "like" => Token::Like,
        "count" => Token::Count,
        "sum" => Token::Sum,
        "min" => Token::Min,
        "max" => Token::Max,

        // Not a keyword - return as identifier
        _ => Token::Ident(s),
    }
}

/// Create a lexer for the view-definition language.
///
/// Returns a parser that tokenizes the input string into a sequence of
/// tokens with span information, skipping whitespace and comments.
pub fn lexer<'src>(
) -> impl Parser<'src, &'src str, Vec<(Token<'src>, SimpleSpan)>, extra::Err<Rich<'src, char>>> {
    // Identifiers and keywords
    let ident = text::ident().map(keyword_or_ident);

    // String literals: '...' with '' escaping, contents kept raw
    let string_lit = just('\'')
        .ignore_then(
            choice((just("''").ignored(), none_of('\'').ignored()))
                .repeated()
                .to_slice(),
        )
        .then_ignore(just('\''))
        .map(Token::StringLit);

    // Numbers: integers and decimals
    let number = text::digits(10)
        .then(just('.').then(text::digits(10)).or_not())
        .to_slice()
        .map(Token::Number);

    // Symbols (multi-char first, then single-char)
    let symbol = choice((
        just("||").to(Token::Concat),
        just("<=").to(Token::Le),
        just(">=").to(Token::Ge),
        just("<>").to(Token::Ne),
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just(',').to(Token::Comma),
        just('.').to(Token::Dot),
        just('*').to(Token::Star),
        just('/').to(Token::Slash),
        just('+').to(Token::Plus),
        just('-').to(Token::Minus),
        just('=').to(Token::Eq),
        just('<').to(Token::Lt),
        just('>').to(Token::Gt),
    ));

    // Single-line comments: -- ... until newline
    let comment = just("--")
        .then(any().and_is(just('\n').not()).repeated())
        .ignored();

    // A single token with span
    let token = choice((ident, string_lit, number, symbol)).map_with(|tok, e| (tok, e.span()));

    // Tokens separated by whitespace and comments, then expect end of input
    token
        .padded_by(comment.clone().padded().repeated())
        .padded()
        .repeated()
        .collect()
        .padded_by(comment.padded().repeated())
        .padded()
        .then_ignore(end())
}

/// Lex a source string into tokens.
///
/// Returns Ok with the token list on success, or Err with the lex errors.
pub fn lex(source: &str) -> Result<Vec<(Token<'_>, SimpleSpan)>, Vec<Rich<'_, char>>> {
    let (tokens, errs) = lexer().parse(source).into_output_errors();
    if errs.is_empty() {
        Ok(tokens.unwrap_or_default())
    } else {
        Err(errs)
    }
}
