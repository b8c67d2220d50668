//! Query building and compilation.
//!
//! The engine needs exactly one shape of query: per-table projections of
//! named columns and literal values, merged across tables with
//! `UNION ALL`.
//!
//! - [`values`] - [`ValuesQuery`] projections and the [`UnionQuery`] combinator

pub mod values;

pub use values::{Projection, UnionQuery, ValuesQuery};
