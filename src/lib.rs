//! # granary
//!
//! Schema metadata engine for a relational persistence framework. Database
//! objects are grouped into named grains; each grain owns tables (with typed
//! columns and indices) and views written in a restricted SQL-like
//! definition language.
//!
//! ## Architecture
//!
//! ```text
//! definition text
//!       |
//!       v
//!   dsl::lexer  ->  dsl::parser  ->  dsl::build_view
//!                                         |
//!                                         v
//!                                 model::ViewBuilder
//!                          (resolution + type checking)
//!                                         |
//!                                         v
//!                                   model::View
//!                                         |
//!                     +-------------------+------------------+
//!                     v                                      v
//!           sql (dialect scripts)                 sync (JSON documents)
//! ```
//!
//! - [`model`] - grains, tables, columns, the expression tree, views and
//!   the [`FieldsLookup`](model::FieldsLookup) join validator.
//! - [`dsl`] - the definition-language front end.
//! - [`sql`] - rendering views to dialect-specific scripts.
//! - [`sync`] - schema export/import as JSON documents.
//!
//! ## Example
//!
//! ```
//! use granary::model::{ColumnType, Grain};
//!
//! let mut grain = Grain::new("shop");
//! let orders = grain.add_table("orders").unwrap();
//! orders.add_column("id", ColumnType::Integer).unwrap();
//! orders.add_column("total", ColumnType::Float).unwrap();
//!
//! let view = grain
//!     .create_view("big_orders", "select id, total from orders where total > 100")
//!     .unwrap();
//! assert!(view.definition().contains("select"));
//! ```

pub mod dsl;
pub mod model;
pub mod sql;
pub mod sync;

pub use model::{DefinitionError, Grain, LookupError, StructuralError};
