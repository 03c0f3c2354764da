//! PostgreSQL dialect: ANSI double quoting, grain rendered as a schema.

use crate::model::view::{TableRef, View};
use crate::sql::SqlGenerator;

#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlGenerator for Postgres {
    fn preamble(&self, view: &View) -> String {
        format!("create or replace view {} as", self.view_name(view))
    }

    fn view_name(&self, view: &View) -> String {
        format!("\"{}\".\"{}\"", view.grain_name(), view.name())
    }

    fn table_name(&self, _view: &View, tref: &TableRef) -> String {
        format!(
            "\"{}\".\"{}\" as \"{}\"",
            tref.grain_name(),
            tref.relation_name(),
            tref.alias()
        )
    }

    fn quote_names(&self) -> bool {
        true
    }
}
