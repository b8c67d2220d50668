//! Form field definitions and type-level cleaning.
//!
//! Each [`FormFieldDef`] describes a single form field: its type, widget,
//! validators, and metadata. The [`FormFieldType`] enum defines the
//! type-specific parsing and coercion performed by [`clean_field_value`].

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use plugform_db::Value;
use regex::Regex;

use crate::validators::Validator;
use crate::widgets::{Widget, WidgetType};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid regex")
});

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("valid regex"));

/// Defines the type of a form field, including type-specific parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum FormFieldType {
    /// A character (string) field.
    Char {
        /// Minimum length (characters).
        min_length: Option<usize>,
        /// Maximum length (characters).
        max_length: Option<usize>,
        /// Whether to strip leading/trailing whitespace.
        strip: bool,
    },
    /// An integer field.
    Integer {
        /// Minimum allowed value.
        min_value: Option<i64>,
        /// Maximum allowed value.
        max_value: Option<i64>,
    },
    /// A boolean field (true/false).
    Boolean,
    /// A date field (YYYY-MM-DD).
    Date,
    /// An email address field.
    Email,
    /// A URL field.
    Url,
    /// A single-choice field.
    Choice {
        /// Available choices as `(value, display_label)` pairs.
        choices: Vec<(String, String)>,
    },
    /// A multiple-choice field.
    MultipleChoice {
        /// Available choices as `(value, display_label)` pairs.
        choices: Vec<(String, String)>,
    },
}

impl FormFieldType {
    /// A stripped character field with an optional maximum length.
    pub const fn char(max_length: Option<usize>) -> Self {
        Self::Char {
            min_length: None,
            max_length,
            strip: true,
        }
    }

    /// Returns the choices of choice-based types.
    pub fn choices(&self) -> &[(String, String)] {
        match self {
            Self::Choice { choices } | Self::MultipleChoice { choices } => choices,
            _ => &[],
        }
    }
}

/// Complete definition of a form field.
#[derive(Debug, Clone)]
pub struct FormFieldDef {
    /// The field name (HTML name attribute, cleaned-data key).
    pub name: String,
    /// The field type, controlling parsing and coercion.
    pub field_type: FormFieldType,
    /// Whether this field is required.
    pub required: bool,
    /// Default/initial value.
    pub initial: Option<Value>,
    /// Help text displayed alongside the field.
    pub help_text: String,
    /// Human-readable label.
    pub label: String,
    /// The widget used for rendering and data extraction.
    pub widget: Widget,
    /// Additional validators applied after type coercion.
    pub validators: Vec<Arc<dyn Validator>>,
    /// Custom error messages keyed by error code.
    pub error_messages: HashMap<String, String>,
    /// Whether the field is disabled (rendered but not editable).
    pub disabled: bool,
}

impl FormFieldDef {
    /// Creates a new `FormFieldDef` with sensible defaults.
    ///
    /// The field is required by default, uses the default widget for its type,
    /// and has no validators beyond the type-level validation.
    pub fn new(name: impl Into<String>, field_type: FormFieldType) -> Self {
        let name = name.into();
        let widget = Widget::new(default_widget_for_field_type(&field_type));
        let label = name.replace('_', " ");
        Self {
            name,
            field_type,
            required: true,
            initial: None,
            help_text: String::new(),
            label,
            widget,
            validators: Vec::new(),
            error_messages: HashMap::new(),
            disabled: false,
        }
    }

    /// Sets whether this field is required.
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the initial value.
    #[must_use]
    pub fn initial(mut self, value: impl Into<Value>) -> Self {
        self.initial = Some(value.into());
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the widget.
    #[must_use]
    pub fn widget(mut self, widget: Widget) -> Self {
        self.widget = widget;
        self
    }

    /// Adds a validator.
    #[must_use]
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Sets a custom error message for a given code.
    #[must_use]
    pub fn error_message(mut self, code: impl Into<String>, msg: impl Into<String>) -> Self {
        self.error_messages.insert(code.into(), msg.into());
        self
    }

    /// Sets whether this field is disabled.
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Returns the choices offered by this field (empty for non-choice types).
    pub fn choices(&self) -> &[(String, String)] {
        self.field_type.choices()
    }

    /// Renders the field's widget for the given raw values.
    pub fn render(&self, values: &[String]) -> String {
        self.widget.render(&self.name, values, self.choices())
    }

    fn message(&self, code: &str, default: impl FnOnce() -> String) -> String {
        self.error_messages.get(code).cloned().unwrap_or_else(default)
    }
}

/// Returns the default widget type for a given form field type.
pub const fn default_widget_for_field_type(field_type: &FormFieldType) -> WidgetType {
    match field_type {
        FormFieldType::Char { .. } => WidgetType::TextInput,
        FormFieldType::Integer { .. } => WidgetType::NumberInput,
        FormFieldType::Boolean => WidgetType::CheckboxInput,
        FormFieldType::Date => WidgetType::DateInput,
        FormFieldType::Email => WidgetType::EmailInput,
        FormFieldType::Url => WidgetType::UrlInput,
        FormFieldType::Choice { .. } => WidgetType::Select,
        FormFieldType::MultipleChoice { .. } => WidgetType::SelectMultiple,
    }
}

/// The value a field cleans to when nothing was submitted and the field is
/// optional.
fn empty_value(field: &FormFieldDef) -> Value {
    match field.field_type {
        FormFieldType::Char { .. } | FormFieldType::Email | FormFieldType::Url => {
            Value::String(String::new())
        }
        FormFieldType::Choice { .. } => Value::String(String::new()),
        FormFieldType::Boolean => Value::Bool(false),
        FormFieldType::MultipleChoice { .. } => Value::List(Vec::new()),
        FormFieldType::Integer { .. } | FormFieldType::Date => Value::Null,
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

/// Cleans (validates and coerces) raw submitted values into a typed `Value`.
///
/// `raw` holds every value submitted for the field; single-valued types use
/// the last one. This performs:
/// 1. Required check (if `required` and nothing meaningful was submitted)
/// 2. Type coercion (string -> i64, date, etc.)
/// 3. Type-specific constraint validation (min/max, choices)
/// 4. Custom validators
///
/// Returns the cleaned `Value` or a list of error messages.
pub fn clean_field_value(field: &FormFieldDef, raw: &[String]) -> Result<Value, Vec<String>> {
    let required_error = || {
        vec![field.message("required", || "This field is required.".to_string())]
    };

    if let FormFieldType::MultipleChoice { choices } = &field.field_type {
        let selected: Vec<&str> = raw.iter().map(String::as_str).filter(|s| !s.is_empty()).collect();
        if selected.is_empty() {
            return if field.required {
                Err(required_error())
            } else {
                Ok(empty_value(field))
            };
        }
        let mut errors = Vec::new();
        let mut values = Vec::with_capacity(selected.len());
        for s in selected {
            if choices.iter().any(|(v, _)| v == s) {
                values.push(Value::from(s));
            } else {
                errors.push(format!(
                    "Select a valid choice. {s} is not one of the available choices."
                ));
            }
        }
        return if errors.is_empty() {
            run_validators(field, Value::List(values))
        } else {
            Err(errors)
        };
    }

    let raw_str = raw.last().map_or("", String::as_str);
    let raw_str = match field.field_type {
        FormFieldType::Char { strip: false, .. } => raw_str,
        _ => raw_str.trim(),
    };

    if matches!(field.field_type, FormFieldType::Boolean) {
        let checked = is_truthy(raw_str);
        if field.required && !checked {
            return Err(required_error());
        }
        return run_validators(field, Value::Bool(checked));
    }

    if raw_str.is_empty() {
        if field.required {
            return Err(required_error());
        }
        return Ok(empty_value(field));
    }

    let mut errors = Vec::new();
    let value = match &field.field_type {
        FormFieldType::Char {
            min_length,
            max_length,
            ..
        } => {
            let len = raw_str.chars().count();
            if let Some(min) = min_length {
                if len < *min {
                    errors.push(format!(
                        "Ensure this value has at least {min} characters (it has {len})."
                    ));
                }
            }
            if let Some(max) = max_length {
                if len > *max {
                    errors.push(format!(
                        "Ensure this value has at most {max} characters (it has {len})."
                    ));
                }
            }
            Value::String(raw_str.to_string())
        }

        FormFieldType::Integer {
            min_value,
            max_value,
        } => match raw_str.parse::<i64>() {
            Ok(n) => {
                if let Some(min) = min_value {
                    if n < *min {
                        errors.push(format!(
                            "Ensure this value is greater than or equal to {min}."
                        ));
                    }
                }
                if let Some(max) = max_value {
                    if n > *max {
                        errors.push(format!("Ensure this value is less than or equal to {max}."));
                    }
                }
                Value::Int(n)
            }
            Err(_) => {
                errors.push(field.message("invalid", || "Enter a whole number.".to_string()));
                Value::Null
            }
        },

        FormFieldType::Date => match chrono::NaiveDate::parse_from_str(raw_str, "%Y-%m-%d") {
            Ok(d) => Value::Date(d),
            Err(_) => {
                errors.push(field.message("invalid", || "Enter a valid date.".to_string()));
                Value::Null
            }
        },

        FormFieldType::Email => {
            if !EMAIL_RE.is_match(raw_str) {
                errors.push(field.message("invalid", || "Enter a valid email address.".to_string()));
            }
            Value::String(raw_str.to_string())
        }

        FormFieldType::Url => {
            if !URL_RE.is_match(raw_str) {
                errors.push(field.message("invalid", || "Enter a valid URL.".to_string()));
            }
            Value::String(raw_str.to_string())
        }

        FormFieldType::Choice { choices } => {
            if !choices.iter().any(|(v, _)| v == raw_str) {
                errors.push(format!(
                    "Select a valid choice. {raw_str} is not one of the available choices."
                ));
            }
            Value::String(raw_str.to_string())
        }

        FormFieldType::Boolean => Value::Bool(is_truthy(raw_str)),
        FormFieldType::MultipleChoice { .. } => Value::List(vec![Value::from(raw_str)]),
    };

    if errors.is_empty() {
        run_validators(field, value)
    } else {
        Err(errors)
    }
}

fn run_validators(field: &FormFieldDef, value: Value) -> Result<Value, Vec<String>> {
    let errors: Vec<String> = field
        .validators
        .iter()
        .filter_map(|validator| validator.validate(&value).err())
        .map(|e| e.to_string())
        .collect();
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::MaxLengthValidator;

    fn raw(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    fn choices() -> Vec<(String, String)> {
        vec![
            ("a".to_string(), "A".to_string()),
            ("b".to_string(), "B".to_string()),
        ]
    }

    #[test]
    fn test_char_field_clean_strips() {
        let field = FormFieldDef::new("name", FormFieldType::char(Some(50)));
        assert_eq!(
            clean_field_value(&field, &raw(&["  Alice  "])).unwrap(),
            Value::from("Alice")
        );
    }

    #[test]
    fn test_char_field_too_long() {
        let field = FormFieldDef::new("name", FormFieldType::char(Some(3)));
        let errors = clean_field_value(&field, &raw(&["Hello"])).unwrap_err();
        assert!(errors[0].contains("at most 3"));
    }

    #[test]
    fn test_required_missing() {
        let field = FormFieldDef::new("name", FormFieldType::char(None));
        let errors = clean_field_value(&field, &[]).unwrap_err();
        assert_eq!(errors, vec!["This field is required.".to_string()]);
    }

    #[test]
    fn test_required_custom_message() {
        let field = FormFieldDef::new("name", FormFieldType::char(None))
            .error_message("required", "Please fill in.");
        let errors = clean_field_value(&field, &raw(&["   "])).unwrap_err();
        assert_eq!(errors, vec!["Please fill in.".to_string()]);
    }

    #[test]
    fn test_optional_empty_values() {
        let char_field = FormFieldDef::new("c", FormFieldType::char(None)).required(false);
        assert_eq!(clean_field_value(&char_field, &[]).unwrap(), Value::from(""));

        let int_field = FormFieldDef::new(
            "i",
            FormFieldType::Integer {
                min_value: None,
                max_value: None,
            },
        )
        .required(false);
        assert_eq!(clean_field_value(&int_field, &[]).unwrap(), Value::Null);

        let multi = FormFieldDef::new("m", FormFieldType::MultipleChoice { choices: choices() })
            .required(false);
        assert_eq!(clean_field_value(&multi, &[]).unwrap(), Value::List(vec![]));
    }

    #[test]
    fn test_optional_empty_ignores_initial() {
        let field = FormFieldDef::new("c", FormFieldType::char(None))
            .required(false)
            .initial("preset");
        assert_eq!(clean_field_value(&field, &raw(&[""])).unwrap(), Value::from(""));
    }

    #[test]
    fn test_integer_field() {
        let field = FormFieldDef::new(
            "age",
            FormFieldType::Integer {
                min_value: Some(0),
                max_value: Some(150),
            },
        );
        assert_eq!(clean_field_value(&field, &raw(&["25"])).unwrap(), Value::Int(25));
        assert!(clean_field_value(&field, &raw(&["abc"])).is_err());
        assert!(clean_field_value(&field, &raw(&["200"])).unwrap_err()[0].contains("less than"));
    }

    #[test]
    fn test_boolean_field() {
        let optional = FormFieldDef::new("b", FormFieldType::Boolean).required(false);
        assert_eq!(clean_field_value(&optional, &raw(&["on"])).unwrap(), Value::Bool(true));
        assert_eq!(clean_field_value(&optional, &[]).unwrap(), Value::Bool(false));

        let required = FormFieldDef::new("b", FormFieldType::Boolean);
        assert!(clean_field_value(&required, &raw(&["false"])).is_err());
    }

    #[test]
    fn test_date_field() {
        let field = FormFieldDef::new("d", FormFieldType::Date);
        assert_eq!(
            clean_field_value(&field, &raw(&["2024-01-15"])).unwrap(),
            Value::Date(chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
        assert_eq!(
            clean_field_value(&field, &raw(&["15.01.2024"])).unwrap_err(),
            vec!["Enter a valid date.".to_string()]
        );
    }

    #[test]
    fn test_email_and_url() {
        let email = FormFieldDef::new("e", FormFieldType::Email);
        assert!(clean_field_value(&email, &raw(&["a@example.com"])).is_ok());
        assert!(clean_field_value(&email, &raw(&["not-an-email"])).is_err());

        let url = FormFieldDef::new("u", FormFieldType::Url);
        assert!(clean_field_value(&url, &raw(&["https://example.com/x"])).is_ok());
        assert!(clean_field_value(&url, &raw(&["example"])).is_err());
    }

    #[test]
    fn test_choice_field() {
        let field = FormFieldDef::new("c", FormFieldType::Choice { choices: choices() });
        assert_eq!(clean_field_value(&field, &raw(&["a"])).unwrap(), Value::from("a"));
        let errors = clean_field_value(&field, &raw(&["z"])).unwrap_err();
        assert!(errors[0].contains("z is not one of the available choices"));
    }

    #[test]
    fn test_multiple_choice_field() {
        let field = FormFieldDef::new("m", FormFieldType::MultipleChoice { choices: choices() });
        assert_eq!(
            clean_field_value(&field, &raw(&["a", "b"])).unwrap(),
            Value::List(vec![Value::from("a"), Value::from("b")])
        );
        assert!(clean_field_value(&field, &raw(&["a", "x"])).is_err());
        assert!(clean_field_value(&field, &[]).is_err());
    }

    #[test]
    fn test_custom_validators_run_after_coercion() {
        let field = FormFieldDef::new("c", FormFieldType::char(None))
            .validator(MaxLengthValidator::new(2));
        let errors = clean_field_value(&field, &raw(&["abc"])).unwrap_err();
        assert!(errors[0].contains("at most 2"));
    }

    #[test]
    fn test_builder_defaults() {
        let field = FormFieldDef::new("first_name", FormFieldType::char(None));
        assert_eq!(field.label, "first name");
        assert!(field.required);
        assert_eq!(field.widget.widget_type, WidgetType::TextInput);
        let choice = FormFieldDef::new("c", FormFieldType::Choice { choices: choices() });
        assert_eq!(choice.widget.widget_type, WidgetType::Select);
        assert_eq!(choice.choices().len(), 2);
    }
}
