//! # plugform-core
//!
//! Core types, settings, and error types shared by every plugform crate.
//! This crate has no framework dependencies and provides the foundation for
//! the storage, forms, and models layers.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and result aliases
//! - [`settings`] - Global configuration, including widget defaults
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration
//! - [`utils`] - Utility types (`MultiValueDict`, text and random-string helpers)

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{validation_error, PlugformError, PlugformResult, ValidationError, NON_FIELD_ERRORS};
pub use settings::{Select2Settings, Settings, SETTINGS};
