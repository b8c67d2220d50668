//! Field validators.
//!
//! Validators run after a field's type-level cleaning succeeded and check a
//! single constraint on the cleaned value. Both model-level identifiers
//! (see `NameField` in `plugform-models`) and form fields use them.

use std::fmt;

use plugform_core::ValidationError;
use plugform_db::Value;
use regex::Regex;

/// A trait for validating cleaned values.
///
/// # Examples
///
/// ```
/// use plugform_forms::validators::{MaxLengthValidator, Validator};
/// use plugform_db::Value;
///
/// let v = MaxLengthValidator::new(5);
/// assert!(v.validate(&Value::from("hi")).is_ok());
/// assert!(v.validate(&Value::from("toolong")).is_err());
/// ```
pub trait Validator: Send + Sync + fmt::Debug {
    /// Validates the given value, returning an error if invalid.
    fn validate(&self, value: &Value) -> Result<(), ValidationError>;

    /// Returns a human-readable name for this validator.
    fn name(&self) -> &'static str;
}

/// Validates that a string value does not exceed a maximum length
/// (in characters).
#[derive(Debug, Clone)]
pub struct MaxLengthValidator {
    /// The maximum allowed length.
    pub max_length: usize,
}

impl MaxLengthValidator {
    /// Creates a new `MaxLengthValidator` with the given maximum length.
    pub const fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl Validator for MaxLengthValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if let Value::String(s) = value {
            let len = s.chars().count();
            if len > self.max_length {
                return Err(ValidationError::new(
                    format!(
                        "Ensure this value has at most {} characters (it has {len}).",
                        self.max_length
                    ),
                    "max_length",
                )
                .with_param("limit_value", self.max_length.to_string()));
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "MaxLengthValidator"
    }
}

/// Validates that a string value matches a regular expression.
#[derive(Debug, Clone)]
pub struct RegexValidator {
    regex: Regex,
    message: String,
    code: String,
}

impl RegexValidator {
    /// Creates a validator from a compiled pattern and the message shown on
    /// mismatch. The error code is `invalid`.
    pub fn new(regex: Regex, message: impl Into<String>) -> Self {
        Self {
            regex,
            message: message.into(),
            code: "invalid".to_string(),
        }
    }

    /// Returns the pattern.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl Validator for RegexValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let text = value.to_string();
        if self.regex.is_match(&text) {
            Ok(())
        } else {
            Err(ValidationError::new(self.message.clone(), self.code.clone()))
        }
    }

    fn name(&self) -> &'static str {
        "RegexValidator"
    }
}
