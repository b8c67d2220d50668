//! Assembling one form out of a configured form's plugin rows.
//!
//! Every row contributes its fields, initial values and cleaners, in row
//! order. The result is a [`BaseForm`] built on the form type's form class
//! whose post-field validation runs the rows' cleaners followed by the
//! form type's `validate` hook. After a successful validation the loaders
//! of all rows turn the cleaned data into output records.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use plugform_core::logging::assembly_span;
use plugform_core::{PlugformResult, ValidationError, NON_FIELD_ERRORS};
use plugform_db::Value;
use plugform_forms::form::merge_field;
use plugform_forms::{BaseForm, CleanedData, Cleaner, FormClass, FormFieldDef};

use crate::configured_form::ConfiguredForm;
use crate::form_type::ValidateFn;
use crate::plugin::{FieldContext, FormFieldPlugin, LoadedValue};

/// Turns a validation hook into a cleaner.
///
/// Errors carrying per-field entries are reported on those fields, all
/// others on the form as a whole.
pub fn validate_cleaner(validate: ValidateFn) -> Cleaner {
    Arc::new(move |form: &BaseForm| {
        let errors = validate(form);
        if errors.is_empty() {
            return Ok(form.cleaned_data().clone());
        }
        let mut field_errors: BTreeMap<String, Vec<ValidationError>> = BTreeMap::new();
        for error in errors {
            if error.has_field_errors() {
                for (field, errs) in error.field_errors {
                    field_errors.entry(field).or_default().extend(errs);
                }
            } else {
                field_errors
                    .entry(NON_FIELD_ERRORS.to_string())
                    .or_default()
                    .push(error);
            }
        }
        Err(ValidationError::with_field_errors(field_errors))
    })
}

/// Builds a form from plugin rows.
///
/// Fields keep the row order. A field named like an earlier one replaces it
/// in place; such collisions are logged, not rejected.
pub fn create_form(
    plugins: &[Box<dyn FormFieldPlugin>],
    ctx: &FieldContext,
    form_class: FormClass,
    validate: Option<ValidateFn>,
) -> PlugformResult<BaseForm> {
    let mut fields: Vec<FormFieldDef> = Vec::new();
    let mut initial: HashMap<String, Value> = HashMap::new();
    let mut cleaners: Vec<Cleaner> = Vec::new();

    for plugin in plugins {
        let plugin_label = plugin.meta().label_lower();
        for field in plugin.get_fields(ctx)? {
            let name = field.name.clone();
            if merge_field(&mut fields, field) {
                tracing::warn!(field = %name, plugin = %plugin_label, "duplicate field name replaces an earlier field");
            }
        }
        for (name, value) in plugin.get_initial() {
            if initial.contains_key(&name) {
                tracing::warn!(field = %name, plugin = %plugin_label, "duplicate initial value replaces an earlier one");
            }
            initial.insert(name, value);
        }
        cleaners.extend(plugin.get_cleaners());
    }
    if let Some(validate) = validate {
        cleaners.push(validate_cleaner(validate));
    }

    let form = form_class.instantiate(fields, initial, cleaners);
    tracing::debug!(
        form_class = form_class.name,
        plugins = plugins.len(),
        fields = form.fields().len(),
        cleaners = form.cleaner_count(),
        "assembled form"
    );
    Ok(form)
}

/// Applies every row's loaders to the cleaned data, in row order.
///
/// Fails with [`NotImplemented`](plugform_core::PlugformError::NotImplemented)
/// for a row type without loaders.
pub fn run_loaders(
    plugins: &[Box<dyn FormFieldPlugin>],
    data: &CleanedData,
) -> PlugformResult<Vec<LoadedValue>> {
    let mut records = Vec::new();
    for plugin in plugins {
        for loader in plugin.get_loaders()? {
            records.push(loader(data));
        }
    }
    Ok(records)
}

impl ConfiguredForm {
    /// Builds the form of this configured form from its plugin rows, using
    /// the form class and validation hook of its form type.
    pub fn create_form(
        &self,
        plugins: &[Box<dyn FormFieldPlugin>],
        ctx: &FieldContext,
    ) -> PlugformResult<BaseForm> {
        let span = assembly_span(self.id.unwrap_or_default(), &self.form_type);
        let _guard = span.enter();

        let form_type = self.require_type()?;
        create_form(plugins, ctx, form_type.form_class()?, Some(form_type.validate()?))
    }
}
