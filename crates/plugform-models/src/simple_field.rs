//! The built-in plugin for primitive field kinds.
//!
//! All simple fields share one table. The `type` column picks the kind of
//! form field a row produces: text, email, select and so on. Each kind is
//! registered as a proxy: a [`PluginMeta`] over the shared table whose
//! rows carry that kind's tag. The tag is written when the row is saved
//! and never changes afterwards. The zero-sized types in [`proxies`] name
//! the kinds at the type level.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use plugform_core::{validation_error, PlugformError, PlugformResult, ValidationError};
use plugform_db::{ColumnDef, ColumnType, Row, TableDef, Value};
use plugform_forms::{FormFieldDef, FormFieldType, Widget, WidgetType};
use serde::{Deserialize, Serialize};

use crate::form_field::FormField;
use crate::meta::{base_columns, PluginBase, PluginKind, PluginMeta, TYPE_COLUMN};
use crate::plugin::{FieldContext, FormFieldPlugin, Loader};

/// Label of the blank choice prepended to optional dropdowns without a
/// placeholder.
pub const BLANK_CHOICE_LABEL: &str = "---------";

/// The kinds of simple field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimpleFieldType {
    /// Single-line text.
    Text,
    /// Email address.
    Email,
    /// URL.
    Url,
    /// Date.
    Date,
    /// Integer.
    Integer,
    /// Multiline text.
    Textarea,
    /// A single checkbox.
    Checkbox,
    /// Dropdown.
    Select,
    /// Radio buttons.
    Radio,
    /// Multi-select list.
    SelectMultiple,
    /// A group of checkboxes.
    CheckboxSelectMultiple,
}

impl SimpleFieldType {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Text,
        Self::Email,
        Self::Url,
        Self::Date,
        Self::Integer,
        Self::Textarea,
        Self::Checkbox,
        Self::Select,
        Self::Radio,
        Self::SelectMultiple,
        Self::CheckboxSelectMultiple,
    ];

    /// The value stored in the `type` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Url => "url",
            Self::Date => "date",
            Self::Integer => "integer",
            Self::Textarea => "textarea",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::SelectMultiple => "select-multiple",
            Self::CheckboxSelectMultiple => "checkbox-select-multiple",
        }
    }

    /// The display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "text field",
            Self::Email => "email address field",
            Self::Url => "URL field",
            Self::Date => "date field",
            Self::Integer => "integer field",
            Self::Textarea => "multiline text field",
            Self::Checkbox => "checkbox field",
            Self::Select => "dropdown field",
            Self::Radio => "radio input field",
            Self::SelectMultiple => "select multiple",
            Self::CheckboxSelectMultiple => "multiple checkboxes",
        }
    }

    /// Returns `true` for kinds submitting several values.
    pub const fn is_multiple(self) -> bool {
        matches!(self, Self::SelectMultiple | Self::CheckboxSelectMultiple)
    }
}

impl fmt::Display for SimpleFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimpleFieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// A type-level name for one simple field kind.
pub trait SimpleFieldProxy {
    /// The kind.
    const TYPE: SimpleFieldType;
}

/// Zero-sized proxy types, one per [`SimpleFieldType`].
pub mod proxies {
    use super::{SimpleFieldProxy, SimpleFieldType};

    macro_rules! proxy {
        ($($name:ident => $variant:ident),* $(,)?) => {
            $(
                #[doc = concat!("The `", stringify!($variant), "` kind.")]
                #[derive(Debug, Clone, Copy, Default)]
                pub struct $name;

                impl SimpleFieldProxy for $name {
                    const TYPE: SimpleFieldType = SimpleFieldType::$variant;
                }
            )*
        };
    }

    proxy! {
        Text => Text,
        Email => Email,
        Url => Url,
        Date => Date,
        Integer => Integer,
        Textarea => Textarea,
        Checkbox => Checkbox,
        Select => Select,
        Radio => Radio,
        SelectMultiple => SelectMultiple,
        CheckboxSelectMultiple => CheckboxSelectMultiple,
    }
}

/// Parses the `choices` text: one choice per non-empty line, either
/// `value|label` (split on the first `|`, both parts trimmed) or a bare
/// value used untrimmed as both.
///
/// Lines end at `\n`, `\r\n`, a lone `\r` or any other Unicode line
/// boundary.
///
/// ```
/// use plugform_models::simple_field::parse_choices;
///
/// assert_eq!(
///     parse_choices("a|Label A\nsolo\n\nb | B | extra"),
///     vec![
///         ("a".to_string(), "Label A".to_string()),
///         ("solo".to_string(), "solo".to_string()),
///         ("b".to_string(), "B | extra".to_string()),
///     ]
/// );
/// ```
pub fn parse_choices(choices: &str) -> Vec<(String, String)> {
    choices
        .split(LINE_BREAKS)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once('|') {
            Some((value, label)) => (value.trim().to_string(), label.trim().to_string()),
            None => (line.to_string(), line.to_string()),
        })
        .collect()
}

const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}', '\u{2029}',
];

/// A simple field row.
#[derive(Debug, Clone)]
pub struct SimpleField {
    meta: &'static PluginMeta,
    /// Content-editor columns.
    pub base: PluginBase,
    /// Labelled-field columns.
    pub field: FormField,
    /// The raw `type` column.
    pub field_type: String,
    /// Newline-separated choices.
    pub choices: String,
    /// Placeholder text, empty for none.
    pub placeholder: String,
    /// Default value, empty for none.
    pub default_value: String,
    /// Maximum length of text input.
    pub max_length: Option<u32>,
}

impl SimpleField {
    /// Returns the shared table.
    pub fn table(db_table: impl Into<String>) -> TableDef {
        TableDef::new(db_table)
            .columns(base_columns())
            .columns(FormField::columns())
            .column(ColumnDef::new(TYPE_COLUMN, ColumnType::Varchar(1000)))
            .column(ColumnDef::new("choices", ColumnType::Text).default(""))
            .column(ColumnDef::new("placeholder", ColumnType::Varchar(1000)).default(""))
            .column(ColumnDef::new("default_value", ColumnType::Varchar(1000)).default(""))
            .column(ColumnDef::new("max_length", ColumnType::Integer).nullable())
    }

    /// Returns the metadata of the proxy for kind `P` over `db_table`.
    pub fn proxy_meta<P: SimpleFieldProxy>(app_label: &'static str, db_table: &str) -> PluginMeta {
        PluginMeta::new(app_label, "simplefield", Self::table(db_table))
            .verbose_name(P::TYPE.label())
            .proxy(P::TYPE.as_str())
            .form_field()
    }

    /// Returns the plugin kind of a proxy.
    pub fn kind(meta: &'static PluginMeta) -> PluginKind {
        PluginKind::new(meta, Self::boxed_from_row)
    }

    /// Creates an unsaved row of the proxy described by `meta`.
    pub fn new(meta: &'static PluginMeta, base: PluginBase, field: FormField) -> Self {
        Self {
            meta,
            base,
            field,
            field_type: meta.proxy_type.clone().unwrap_or_default(),
            choices: String::new(),
            placeholder: String::new(),
            default_value: String::new(),
            max_length: None,
        }
    }

    /// Sets the choices text.
    #[must_use]
    pub fn with_choices(mut self, choices: impl Into<String>) -> Self {
        self.choices = choices.into();
        self
    }

    /// Sets the placeholder.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default_value(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = default_value.into();
        self
    }

    /// Sets the maximum length.
    #[must_use]
    pub const fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Reads a row.
    pub fn from_row(meta: &'static PluginMeta, row: &Row) -> PlugformResult<Self> {
        Ok(Self {
            meta,
            base: PluginBase::from_row(row)?,
            field: FormField::from_row(row)?,
            field_type: row.get(TYPE_COLUMN)?,
            choices: row.get("choices")?,
            placeholder: row.get("placeholder")?,
            default_value: row.get("default_value")?,
            max_length: row.get("max_length")?,
        })
    }

    fn boxed_from_row(
        meta: &'static PluginMeta,
        row: &Row,
    ) -> PlugformResult<Box<dyn FormFieldPlugin>> {
        Ok(Box::new(Self::from_row(meta, row)?))
    }

    /// Returns the kind, failing for an unknown `type` value.
    pub fn get_type(&self) -> PlugformResult<SimpleFieldType> {
        self.field_type.parse().map_err(|_| {
            PlugformError::ImproperlyConfigured(format!(
                "Model <SimpleField: {}> has unhandled type '{}'",
                self.field, self.field_type
            ))
        })
    }

    /// Returns the parsed choices.
    pub fn get_choices(&self) -> Vec<(String, String)> {
        parse_choices(&self.choices)
    }

    /// Validates the stored values.
    ///
    /// A default value must be one of the choice values when choices are
    /// given. The error is reported on `default_value`, or on the whole
    /// row if `default_value` is excluded.
    pub fn clean_fields(&mut self, exclude: Option<&[&str]>) -> Result<(), ValidationError> {
        self.field.clean_fields(exclude)?;

        if !self.choices.is_empty()
            && !self.default_value.is_empty()
            && !self.get_choices().iter().any(|(v, _)| *v == self.default_value)
        {
            return Err(validation_error(
                format!(
                    "The specified default value \"{}\" isn't part of the available choices.",
                    self.default_value
                ),
                "default_value",
                exclude,
            ));
        }
        Ok(())
    }

    fn visible_field(&self, kind: SimpleFieldType, ctx: &FieldContext) -> (FormFieldType, Widget) {
        let placeholder = Some(self.placeholder.as_str()).filter(|p| !p.is_empty());
        let max_length = self.max_length.and_then(|m| usize::try_from(m).ok());
        let input = |widget_type| Widget::new(widget_type).attr_opt("placeholder", placeholder);

        match kind {
            SimpleFieldType::Text => (FormFieldType::char(max_length), input(WidgetType::TextInput)),
            SimpleFieldType::Email => (FormFieldType::Email, input(WidgetType::EmailInput)),
            SimpleFieldType::Url => (FormFieldType::Url, input(WidgetType::UrlInput)),
            SimpleFieldType::Date => (
                FormFieldType::Date,
                input(WidgetType::DateInput).attr("type", "date"),
            ),
            SimpleFieldType::Integer => (
                FormFieldType::Integer {
                    min_value: None,
                    max_value: None,
                },
                input(WidgetType::NumberInput),
            ),
            SimpleFieldType::Textarea => (
                FormFieldType::char(max_length),
                input(WidgetType::Textarea)
                    .attr_opt("maxlength", self.max_length)
                    .attr("rows", ctx.textarea_rows),
            ),
            SimpleFieldType::Checkbox => {
                (FormFieldType::Boolean, Widget::new(WidgetType::CheckboxInput))
            }
            SimpleFieldType::Select => {
                let mut choices = self.get_choices();
                if !self.field.is_required || self.default_value.is_empty() {
                    let blank = placeholder.unwrap_or(BLANK_CHOICE_LABEL);
                    choices.insert(0, (String::new(), blank.to_string()));
                }
                (FormFieldType::Choice { choices }, Widget::select2(&ctx.select2))
            }
            SimpleFieldType::Radio => (
                FormFieldType::Choice {
                    choices: self.get_choices(),
                },
                Widget::new(WidgetType::RadioSelect),
            ),
            SimpleFieldType::SelectMultiple => (
                FormFieldType::MultipleChoice {
                    choices: self.get_choices(),
                },
                Widget::new(WidgetType::SelectMultiple),
            ),
            SimpleFieldType::CheckboxSelectMultiple => (
                FormFieldType::MultipleChoice {
                    choices: self.get_choices(),
                },
                Widget::new(WidgetType::CheckboxSelectMultiple),
            ),
        }
    }
}

impl FormFieldPlugin for SimpleField {
    fn meta(&self) -> &'static PluginMeta {
        self.meta
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PluginBase {
        &mut self.base
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        let mut values = self.field.values();
        values.extend([
            (TYPE_COLUMN, Value::from(self.field_type.as_str())),
            ("choices", Value::from(self.choices.as_str())),
            ("placeholder", Value::from(self.placeholder.as_str())),
            ("default_value", Value::from(self.default_value.as_str())),
            ("max_length", Value::from(self.max_length)),
        ]);
        values
    }

    fn get_fields(&self, ctx: &FieldContext) -> PlugformResult<Vec<FormFieldDef>> {
        let kind = self.get_type()?;
        let should_show = self.field.should_show_field(ctx.is_update);
        let (field_type, widget) = self.visible_field(kind, ctx);
        let widget = match (should_show, kind.is_multiple()) {
            (true, _) => widget,
            (false, true) => Widget::new(WidgetType::MultipleHiddenInput),
            (false, false) => Widget::new(WidgetType::HiddenInput),
        };
        let field = FormFieldDef::new(self.field.name.as_str(), field_type).widget(widget);
        Ok(vec![self.field.get_field(field, should_show)])
    }

    fn get_initial(&self) -> HashMap<String, Value> {
        let mut initial = HashMap::new();
        if !self.default_value.is_empty() {
            initial.insert(
                self.field.name.clone(),
                Value::from(self.default_value.as_str()),
            );
        }
        initial
    }

    fn get_loaders(&self) -> PlugformResult<Vec<Loader>> {
        Ok(self.field.get_loaders())
    }

    fn pre_save(&mut self) {
        if let Some(tag) = &self.meta.proxy_type {
            self.field_type.clone_from(tag);
        }
    }
}

impl fmt::Display for SimpleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.field, f)
    }
}
