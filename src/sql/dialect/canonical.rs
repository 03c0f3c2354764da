//! The canonical definition-language generator.

use crate::model::view::{TableRef, View};
use crate::sql::SqlGenerator;

/// Renders a view back to the definition language it was parsed from.
///
/// Names are unquoted; a FROM target in another grain is qualified with the
/// grain name.
#[derive(Debug, Clone, Copy)]
pub struct Canonical;

impl SqlGenerator for Canonical {
    fn preamble(&self, view: &View) -> String {
        format!("create view {} as", self.view_name(view))
    }

    fn view_name(&self, view: &View) -> String {
        view.name().to_string()
    }

    fn table_name(&self, view: &View, tref: &TableRef) -> String {
        if tref.grain_name() == view.grain_name() {
            format!("{} as {}", tref.relation_name(), tref.alias())
        } else {
            format!(
                "{}.{} as {}",
                tref.grain_name(),
                tref.relation_name(),
                tref.alias()
            )
        }
    }

    fn quote_names(&self) -> bool {
        false
    }
}
