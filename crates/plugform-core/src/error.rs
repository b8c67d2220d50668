//! Core error types for plugform.
//!
//! Two families of failures exist. [`PlugformError`] covers the fatal ones:
//! configuration mistakes (an unknown field kind, a plugin type missing part
//! of its contract, a form type declared without required keys) and storage
//! failures. [`ValidationError`] is the user-facing, recoverable family that
//! is attached to a single field or to a form as a whole and re-shown to the
//! submitter.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use thiserror::Error;

/// The key under which form-level (non-field) errors are collected.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Represents a validation error with optional field-level errors.
///
/// Validation errors can be either simple (a single message, attached to
/// whatever raised it) or compound (containing per-field error lists).
///
/// # Examples
///
/// ```
/// use plugform_core::error::ValidationError;
///
/// // Simple validation error
/// let err = ValidationError::new("This field is required.", "required");
///
/// // Field-level validation error
/// let err = ValidationError::for_field("email", "Invalid email address.", "invalid");
/// assert!(err.field_errors.contains_key("email"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The primary error message.
    pub message: String,
    /// A short code identifying the type of validation failure (e.g. "required", "invalid").
    pub code: String,
    /// Additional parameters providing context for the error message.
    pub params: HashMap<String, String>,
    /// Per-field validation errors, keyed by field name.
    pub field_errors: BTreeMap<String, Vec<Self>>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
            field_errors: BTreeMap::new(),
        }
    }

    /// Creates a `ValidationError` containing per-field errors.
    pub fn with_field_errors(field_errors: BTreeMap<String, Vec<Self>>) -> Self {
        Self {
            message: String::new(),
            code: String::new(),
            params: HashMap::new(),
            field_errors,
        }
    }

    /// Creates a `ValidationError` attached to a single field.
    pub fn for_field(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        let mut field_errors = BTreeMap::new();
        field_errors.insert(field.into(), vec![Self::new(message, code)]);
        Self::with_field_errors(field_errors)
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Returns `true` if this error carries per-field errors.
    pub fn has_field_errors(&self) -> bool {
        !self.field_errors.is_empty()
    }

    /// Flattens this error into `(field, messages)` pairs.
    ///
    /// A simple error is reported under `field` if given, otherwise under
    /// [`NON_FIELD_ERRORS`].
    pub fn into_messages(self, field: Option<&str>) -> Vec<(String, Vec<String>)> {
        if self.field_errors.is_empty() {
            let key = field.unwrap_or(NON_FIELD_ERRORS).to_string();
            return vec![(key, vec![self.message])];
        }
        self.field_errors
            .into_iter()
            .map(|(name, errors)| {
                let messages = errors.into_iter().map(|e| e.to_string()).collect();
                (name, messages)
            })
            .collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.message.is_empty() {
            write!(f, "{}", self.message)?;
        } else if !self.field_errors.is_empty() {
            let mut first = true;
            for (field, errors) in &self.field_errors {
                for error in errors {
                    if !first {
                        write!(f, "; ")?;
                    }
                    write!(f, "{field}: {error}")?;
                    first = false;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Builds a validation error for `field`, unless the field is excluded from
/// validation, in which case the error is form-level.
///
/// Model-level cleaning runs with an optional exclusion list (fields the
/// editing surface does not show). Errors for excluded fields cannot be
/// displayed next to the field, so they are raised for the whole record.
///
/// ```
/// use plugform_core::error::validation_error;
///
/// let err = validation_error("Bad default.", "default_value", None);
/// assert!(err.field_errors.contains_key("default_value"));
///
/// let err = validation_error("Bad default.", "default_value", Some(&["default_value"]));
/// assert!(err.field_errors.is_empty());
/// ```
pub fn validation_error(
    message: impl Into<String>,
    field: &str,
    exclude: Option<&[&str]>,
) -> ValidationError {
    let excluded = exclude.is_some_and(|fields| fields.contains(&field));
    if excluded {
        ValidationError::new(message, "invalid")
    } else {
        ValidationError::for_field(field, message, "invalid")
    }
}

/// The primary error type for plugform.
///
/// Configuration errors are never silently recovered: they indicate a
/// programming or setup mistake and surface immediately to the caller.
#[derive(Error, Debug)]
pub enum PlugformError {
    // ── Configuration ────────────────────────────────────────────────

    /// The system is improperly configured (unknown field kind, missing
    /// form type keys, ...).
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// A plugin type does not implement a required part of its contract.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// A settings value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Validation ───────────────────────────────────────────────────

    /// One or more fields failed validation.
    #[error("Validation error: {0}")]
    ValidationError(ValidationError),

    // ── Storage ──────────────────────────────────────────────────────

    /// Raised when a query expected exactly one result but found none.
    #[error("Object does not exist: {0}")]
    DoesNotExist(String),

    /// Raised when a query expected exactly one result but found multiple.
    #[error("Multiple objects returned when one expected: {0}")]
    MultipleObjectsReturned(String),

    /// A generic database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// An operational database error (connection failure, etc.).
    #[error("Operational error: {0}")]
    OperationalError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PlugformError {
    /// Returns `true` for errors caused by configuration mistakes rather
    /// than by user input or the storage layer.
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::ImproperlyConfigured(_) | Self::NotImplemented(_) | Self::ConfigurationError(_)
        )
    }
}

impl From<ValidationError> for PlugformError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationError(err)
    }
}

/// A convenience type alias for `Result<T, PlugformError>`.
pub type PlugformResult<T> = Result<T, PlugformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_simple() {
        let err = ValidationError::new("This field is required.", "required");
        assert_eq!(err.to_string(), "This field is required.");
    }

    #[test]
    fn test_validation_error_display_field_errors() {
        let err = ValidationError::for_field("email", "Invalid email.", "invalid");
        assert_eq!(err.to_string(), "email: Invalid email.");
    }

    #[test]
    fn test_validation_error_with_param() {
        let err = ValidationError::new("Too short.", "min_length").with_param("min", "8");
        assert_eq!(err.params.get("min").unwrap(), "8");
    }

    #[test]
    fn test_into_messages_simple_goes_to_all() {
        let err = ValidationError::new("Broken.", "invalid");
        let messages = err.into_messages(None);
        assert_eq!(messages, vec![(NON_FIELD_ERRORS.to_string(), vec!["Broken.".to_string()])]);
    }

    #[test]
    fn test_into_messages_simple_with_field() {
        let err = ValidationError::new("Broken.", "invalid");
        let messages = err.into_messages(Some("first"));
        assert_eq!(messages[0].0, "first");
    }

    #[test]
    fn test_into_messages_field_errors() {
        let mut field_errors = BTreeMap::new();
        field_errors.insert("a".to_string(), vec![ValidationError::new("A1", "x")]);
        field_errors.insert(
            "b".to_string(),
            vec![ValidationError::new("B1", "x"), ValidationError::new("B2", "x")],
        );
        let messages = ValidationError::with_field_errors(field_errors).into_messages(None);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1], ("b".to_string(), vec!["B1".to_string(), "B2".to_string()]));
    }

    #[test]
    fn test_validation_error_helper_respects_exclude() {
        let err = validation_error("x", "default_value", Some(&["choices"]));
        assert!(err.field_errors.contains_key("default_value"));
        let err = validation_error("x", "default_value", Some(&["default_value"]));
        assert!(!err.has_field_errors());
        assert_eq!(err.message, "x");
    }

    #[test]
    fn test_configuration_error_classification() {
        assert!(PlugformError::ImproperlyConfigured("x".into()).is_configuration_error());
        assert!(PlugformError::NotImplemented("x".into()).is_configuration_error());
        assert!(!PlugformError::DatabaseError("x".into()).is_configuration_error());
    }

    #[test]
    fn test_error_display() {
        let err = PlugformError::ImproperlyConfigured("bad type".into());
        assert_eq!(err.to_string(), "Improperly configured: bad type");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: PlugformError = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }
}
