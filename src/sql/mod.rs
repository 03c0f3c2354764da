//! Dialect-specific rendering of views to SQL text.
//!
//! One shared algorithm walks a finalized view; everything a dialect can
//! disagree on goes through the [`SqlGenerator`] hooks. Two consumers reuse
//! it: persisting a view back to canonical definition text, and emitting
//! `CREATE VIEW` DDL for a target database.

pub mod dialect;

use crate::model::expr::{AggregateFunc, Expr};
use crate::model::view::{TableRef, View};

/// Soft wrap width of the select list.
const LINE_SIZE: usize = 80;
/// Continuation indent after a wrap.
const PADDING: &str = "    ";

/// Dialect hooks consumed by the shared rendering algorithm.
pub trait SqlGenerator {
    /// The `CREATE VIEW ... AS` header.
    fn preamble(&self, view: &View) -> String;

    /// How the view itself is named in the preamble.
    fn view_name(&self, view: &View) -> String;

    /// How a FROM entry is rendered, including cross-grain qualification
    /// when the target belongs to a different grain than the view.
    fn table_name(&self, view: &View, tref: &TableRef) -> String;

    /// Whether output column aliases are quoted.
    fn quote_names(&self) -> bool;

    /// Expression rendering; the default walk suits every dialect here.
    fn generate_sql(&self, expr: &Expr) -> String {
        render_expr(expr)
    }
}

/// Renders an expression tree to SQL text.
pub fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::FieldRef(fr) => fr.display_name(),
        Expr::IntLiteral(v) => v.to_string(),
        // Keep a decimal point so the literal re-parses as a real.
        Expr::RealLiteral(v) => {
            if v.fract() == 0.0 {
                format!("{:.1}", v)
            } else {
                v.to_string()
            }
        }
        Expr::TextLiteral(s) => format!("'{}'", s.replace('\'', "''")),
        Expr::Neg(e) => format!("-{}", render_expr(e)),
        Expr::Not(e) => format!("not {}", render_expr(e)),
        Expr::Binary { op, left, right } => format!(
            "{} {} {}",
            render_expr(left),
            op.symbol(),
            render_expr(right)
        ),
        Expr::Relop { op, left, right } => format!(
            "{} {} {}",
            render_expr(left),
            op.symbol(),
            render_expr(right)
        ),
        Expr::Logical { op, left, right } => format!(
            "{} {} {}",
            render_expr(left),
            op.symbol(),
            render_expr(right)
        ),
        Expr::Aggregate { func, operand } => match (func, operand) {
            (AggregateFunc::Count, _) => "count(*)".to_string(),
            (_, Some(e)) => format!("{}({})", func.symbol(), render_expr(e)),
            (_, None) => format!("{}()", func.symbol()),
        },
        Expr::Parens(e) => format!("({})", render_expr(e)),
    }
}

/// Select-list writer with automatic line breaks.
struct WrapWriter {
    out: String,
    line_len: usize,
}

impl WrapWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            line_len: 0,
        }
    }

    fn append(&mut self, s: &str) {
        self.out.push_str(s);
        self.line_len += s.len();
        if self.line_len >= LINE_SIZE {
            self.out.push('\n');
            self.out.push_str(PADDING);
            self.line_len = PADDING.len();
        }
    }
}

/// The shared select-script algorithm:
/// `select [distinct] expr as alias, ...` / `from` entries with join lines /
/// optional `where` / optional `group by`.
pub fn select_script(view: &View, gen: &dyn SqlGenerator) -> String {
    let mut ww = WrapWriter::new();

    ww.append("  select ");
    if view.is_distinct() {
        ww.append("distinct ");
    }
    let mut cont = false;
    for (alias, expr) in view.select_columns() {
        if cont {
            ww.append(", ");
        }
        let mut st = gen.generate_sql(expr);
        st.push_str(" as ");
        if gen.quote_names() {
            st.push('"');
            st.push_str(alias);
            st.push('"');
        } else {
            st.push_str(alias);
        }
        ww.append(&st);
        cont = true;
    }

    let mut out = ww.out;
    out.push('\n');
    out.push_str("  from ");
    cont = false;
    for tref in view.table_refs().values() {
        if cont {
            out.push('\n');
            out.push_str(&format!("    {} join ", tref.join_type()));
        }
        out.push_str(&gen.table_name(view, tref));
        if cont {
            if let Some(on) = tref.on_condition() {
                out.push_str(" on ");
                out.push_str(&gen.generate_sql(on));
            }
        }
        cont = true;
    }

    if let Some(cond) = view.where_condition() {
        out.push('\n');
        out.push_str("  where ");
        out.push_str(&gen.generate_sql(cond));
    }

    if !view.group_by().is_empty() {
        out.push('\n');
        out.push_str(" group by ");
        let aliases: Vec<&str> = view.group_by().keys().map(String::as_str).collect();
        out.push_str(&aliases.join(", "));
    }

    out
}

/// The `CREATE VIEW` script: dialect preamble plus the shared select script.
pub fn create_view_script(view: &View, gen: &dyn SqlGenerator) -> String {
    let mut out = gen.preamble(view);
    out.push('\n');
    out.push_str(&select_script(view, gen));
    out
}
