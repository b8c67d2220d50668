//! # plugform-forms
//!
//! Forms layer for plugform. Provides form field definitions with
//! type-level cleaning, widgets, validators, and [`BaseForm`], a form whose
//! field set is supplied at runtime and whose post-field validation is a
//! list of pluggable cleaners.
//!
//! ## Module Overview
//!
//! - [`fields`] - [`FormFieldDef`] and [`FormFieldType`]
//! - [`widgets`] - [`Widget`] descriptors and HTML rendering
//! - [`validators`] - The [`Validator`] trait and built-in validators
//! - [`form`] - [`BaseForm`], [`FormClass`], and cleaners
//! - [`validation`] - The field-level cleaning pass

pub mod fields;
pub mod form;
pub mod validation;
pub mod validators;
pub mod widgets;

pub use fields::{FormFieldDef, FormFieldType};
pub use form::{BaseForm, CleanedData, Cleaner, FormClass};
pub use validators::{MaxLengthValidator, RegexValidator, Validator};
pub use widgets::{Widget, WidgetType};
