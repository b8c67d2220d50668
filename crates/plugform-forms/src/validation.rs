//! Validation pipeline for form processing.
//!
//! 1. Field-level validation (type coercion + per-field validators)
//! 2. Form-level validation: the form's cleaners, in registration order
//!
//! Errors accumulate rather than short-circuiting, so all validation
//! issues are reported at once.

use std::collections::HashMap;

use plugform_db::Value;

use crate::fields::{clean_field_value, FormFieldDef};
use crate::form::BaseForm;

/// Performs field-level validation for all fields.
///
/// For each field definition:
/// 1. Looks up the raw values extracted by the field's widget
/// 2. Runs [`clean_field_value`] for type coercion and field-level validation
/// 3. Populates `cleaned_data` on success or `errors` on failure
///
/// Disabled fields skip validation and take their initial value.
pub fn clean_fields(
    field_defs: &[FormFieldDef],
    raw_data: &HashMap<String, Vec<String>>,
    initial: &HashMap<String, Value>,
    cleaned_data: &mut HashMap<String, Value>,
    errors: &mut HashMap<String, Vec<String>>,
) {
    for field in field_defs {
        if field.disabled {
            let value = initial.get(&field.name).or(field.initial.as_ref());
            if let Some(value) = value {
                cleaned_data.insert(field.name.clone(), value.clone());
            }
            continue;
        }

        let raw = raw_data.get(&field.name).map_or(&[][..], Vec::as_slice);

        match clean_field_value(field, raw) {
            Ok(value) => {
                cleaned_data.insert(field.name.clone(), value);
            }
            Err(field_errors) => {
                errors.insert(field.name.clone(), field_errors);
            }
        }
    }
}

/// Performs the full validation pipeline and returns structured errors.
///
/// # Returns
///
/// - `Ok(())` if all validation passes
/// - `Err(errors)` with `(field_name, error_messages)` tuples sorted by name
pub fn full_clean(form: &mut BaseForm) -> Result<(), Vec<(String, Vec<String>)>> {
    if form.is_valid() {
        return Ok(());
    }
    let mut errors: Vec<(String, Vec<String>)> = form
        .errors()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    errors.sort_by(|a, b| a.0.cmp(&b.0));
    Err(errors)
}
