//! # plugform-models
//!
//! Form-field plugins and the machinery turning them into forms. Editors
//! build a form by attaching plugin rows to a
//! [`ConfiguredForm`](configured_form::ConfiguredForm); each row
//! contributes fields, initial values, cleaning hooks and loaders to the
//! form assembled for a submission.
//!
//! ## Module Overview
//!
//! - [`name`] - The `name` identifier every field plugin carries
//! - [`meta`] - Plugin metadata: table, class attributes, proxy tags
//! - [`plugin`] - The [`FormFieldPlugin`](plugin::FormFieldPlugin) contract
//! - [`form_field`] - Labelled-field columns shared by field plugins
//! - [`simple_field`] - The built-in primitive field kinds
//! - [`contrib`] - Date range and honeypot plugins
//! - [`symbols`] - The dotted-path symbol registry
//! - [`form_type`] - Form types and their lazily resolved attributes
//! - [`configured_form`] - The configured form row
//! - [`union`] - The form-fields union query
//! - [`loading`] - Loading plugin rows of a form
//! - [`assemble`] - Building a form and extracting submitted values

// - struct_excessive_bools: FormField stores the editor's per-field flags
// - module_name_repetitions: FormFieldPlugin, FormTypeBuilder and friends read better in full
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::result_large_err)]
#![allow(clippy::return_self_not_must_use)]

pub mod assemble;
pub mod configured_form;
pub mod contrib;
pub mod form_field;
pub mod form_type;
pub mod loading;
pub mod meta;
pub mod name;
pub mod plugin;
pub mod simple_field;
pub mod symbols;
pub mod union;

pub use assemble::{create_form, run_loaders};
pub use configured_form::{ConfiguredForm, ConfiguredFormMeta};
pub use form_field::FormField;
pub use form_type::{FormType, FormTypeBuilder, Region, RegionsSource, ValidateFn};
pub use meta::{PluginBase, PluginKind, PluginMeta};
pub use name::NameField;
pub use plugin::{FieldContext, FormFieldPlugin, LoadedValue, Loader};
pub use simple_field::{SimpleField, SimpleFieldProxy, SimpleFieldType};
pub use symbols::{import_symbol, register_symbol};
pub use union::{UnionPlan, UnionRow};
