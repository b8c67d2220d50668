//! The `name` identifier shared by every form-field plugin.
//!
//! A name is almost but not quite a slug: only lowercase ascii letters,
//! digits and the underscore are allowed. Names key the submitted data, so
//! an empty name is replaced by a generated `field_<random>` token instead
//! of blocking the save. Non-empty invalid names are rejected.

use std::sync::{Arc, LazyLock};

use plugform_core::utils::text::{get_random_string, RANDOM_STRING_CHARS};
use plugform_core::ValidationError;
use plugform_db::{ColumnDef, ColumnType, Value};
use plugform_forms::{FormFieldDef, FormFieldType, MaxLengthValidator, RegexValidator, Validator};
use regex::Regex;

/// Maximum length of a name.
pub const NAME_MAX_LENGTH: usize = 50;

/// The allowed character set.
pub const NAME_PATTERN: &str = r"^[a-z0-9_]+$";

/// Shown when a name contains disallowed characters.
pub const NAME_INVALID_MESSAGE: &str =
    "Enter a value consisting only of lowercase letters, numbers and the underscore.";

/// Help text of the name field.
pub const NAME_HELP_TEXT: &str = "Data is saved using this name. Changing it may result in data \
     loss. This field only allows a-z, 0-9 and _ as characters.";

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(NAME_PATTERN).expect("valid regex"));

/// Returns a fresh `field_<10 chars>` token.
pub fn generate_name() -> String {
    format!("field_{}", get_random_string(10, RANDOM_STRING_CHARS))
}

/// The model field holding a plugin's name.
///
/// # Examples
///
/// ```
/// use plugform_models::name::NameField;
///
/// let field = NameField::new();
/// assert_eq!(field.clean("first_name").unwrap(), "first_name");
/// assert!(field.clean("First Name").is_err());
/// assert!(field.clean("").unwrap().starts_with("field_"));
/// ```
#[derive(Debug, Clone)]
pub struct NameField {
    /// The column the name is stored in.
    pub column: &'static str,
    /// The maximum length.
    pub max_length: usize,
    validators: Vec<Arc<dyn Validator>>,
}

impl Default for NameField {
    fn default() -> Self {
        Self::new()
    }
}

impl NameField {
    /// Creates the field for the `name` column.
    pub fn new() -> Self {
        Self {
            column: "name",
            max_length: NAME_MAX_LENGTH,
            validators: vec![
                Arc::new(RegexValidator::new(NAME_RE.clone(), NAME_INVALID_MESSAGE)),
                Arc::new(MaxLengthValidator::new(NAME_MAX_LENGTH)),
            ],
        }
    }

    /// Normalizes a raw value. Only empty input is replaced.
    pub fn to_python(&self, value: &str) -> String {
        if value.is_empty() {
            generate_name()
        } else {
            value.to_string()
        }
    }

    /// Runs the validators against a normalized value, collecting every
    /// failure under this field's column.
    pub fn validate(&self, value: &str) -> Result<(), ValidationError> {
        let value = Value::from(value);
        let errors: Vec<ValidationError> = self
            .validators
            .iter()
            .filter_map(|v| v.validate(&value).err())
            .collect();
        if errors.is_empty() {
            return Ok(());
        }
        let mut field_errors = std::collections::BTreeMap::new();
        field_errors.insert(self.column.to_string(), errors);
        Err(ValidationError::with_field_errors(field_errors))
    }

    /// Normalizes then validates a raw value.
    pub fn clean(&self, value: &str) -> Result<String, ValidationError> {
        let value = self.to_python(value);
        self.validate(&value)?;
        Ok(value)
    }

    /// Returns the storage column.
    pub fn column_def(&self) -> ColumnDef {
        let max_length = u32::try_from(self.max_length).unwrap_or(u32::MAX);
        ColumnDef::new(self.column, ColumnType::Varchar(max_length))
    }

    /// Returns the editing form field. It is optional: leaving it blank
    /// generates a name.
    pub fn formfield(&self) -> FormFieldDef {
        let mut field = FormFieldDef::new(self.column, FormFieldType::char(Some(self.max_length)))
            .required(false)
            .label("name")
            .help_text(NAME_HELP_TEXT);
        field.validators = self.validators.clone();
        field
    }
}
