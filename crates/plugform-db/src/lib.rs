//! # plugform-db
//!
//! Storage layer for plugform. Editor-authored plugin rows live in
//! relational tables, one per plugin type; this crate describes those
//! tables, moves values in and out of them, and compiles the projections
//! that merge heterogeneous tables into one result set.
//!
//! ## Module Overview
//!
//! - [`value`] - The backend-agnostic [`Value`](value::Value) enum
//! - [`row`] - Result rows and typed column access
//! - [`schema`] - Table and column definitions
//! - [`query`] - Values projections and `UNION ALL` compilation
//! - [`executor`] - The [`DatabaseBackend`](executor::DatabaseBackend) trait

pub mod executor;
pub mod query;
pub mod row;
pub mod schema;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use executor::DatabaseBackend;
pub use query::{Projection, UnionQuery, ValuesQuery};
pub use row::{FromValue, Row};
pub use schema::{ColumnDef, ColumnType, TableDef};
pub use value::Value;
