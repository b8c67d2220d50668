//! # plugform
//!
//! Forms assembled from editor-managed field plugins.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `plugform` to get everything, or depend on individual
//! crates for finer-grained control.

/// Errors, settings, logging setup and small utilities.
pub use plugform_core as core;

/// Values, rows, table definitions and the union query compiler.
pub use plugform_db as db;

/// Database backends: `SQLite`.
pub use plugform_db_backends as db_backends;

/// Form fields, widgets, validators and the bound form.
pub use plugform_forms as forms;

/// Field plugins, form types, configured forms and the form assembler.
pub use plugform_models as models;

/// The types most applications need.
pub mod prelude {
    pub use plugform_core::{PlugformError, PlugformResult, ValidationError, SETTINGS};
    pub use plugform_db::{DatabaseBackend, Value};
    #[cfg(feature = "sqlite")]
    pub use plugform_db_backends::SqliteBackend;
    pub use plugform_forms::{BaseForm, FormClass, FormFieldDef, FormFieldType, Widget, WidgetType};
    pub use plugform_models::contrib::{Duration, Honeypot};
    pub use plugform_models::simple_field::proxies;
    pub use plugform_models::{
        ConfiguredForm, ConfiguredFormMeta, FieldContext, FormField, FormFieldPlugin, FormType,
        LoadedValue, PluginBase, PluginKind, PluginMeta, Region, SimpleField, SimpleFieldType,
    };
}
