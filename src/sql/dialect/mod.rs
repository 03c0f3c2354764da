//! Concrete SQL dialects.
//!
//! Each dialect is a small stateless strategy plugged into the shared
//! rendering algorithm of [`crate::sql`]:
//!
//! - [`Canonical`] - the definition language itself; what views persist and
//!   round-trip through.
//! - [`Postgres`] - ANSI double-quoted identifiers, schema-qualified names.
//! - [`TSql`] - bracketed object names.

mod canonical;
mod postgres;
mod tsql;

pub use canonical::Canonical;
pub use postgres::Postgres;
pub use tsql::TSql;
