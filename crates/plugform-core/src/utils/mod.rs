//! Utility types and helpers.
//!
//! - [`MultiValueDict`] - A dictionary that can hold multiple values per key
//! - [`text`] - Text helpers (truncation, random strings)

pub mod multi_value_dict;
pub mod text;

pub use multi_value_dict::MultiValueDict;
