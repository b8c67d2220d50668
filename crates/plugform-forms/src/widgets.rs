//! Widget descriptors for rendering form elements.
//!
//! A [`Widget`] is data: a [`WidgetType`] plus its HTML attributes. It knows
//! how to read its raw value out of submitted data and how to render itself
//! for a given name, value, and choice list. Field plugins pick a widget per
//! field; the protocol between plugins does not depend on which one.

use std::collections::BTreeMap;
use std::fmt;

use plugform_core::utils::MultiValueDict;
use plugform_core::Select2Settings;

/// Enumerates all built-in widget types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum WidgetType {
    /// `<input type="text">`.
    TextInput,
    /// `<input type="number">`.
    NumberInput,
    /// `<input type="email">`.
    EmailInput,
    /// `<input type="url">`.
    UrlInput,
    /// `<input type="hidden">`.
    HiddenInput,
    /// One `<input type="hidden">` per selected value.
    MultipleHiddenInput,
    /// `<textarea>`.
    Textarea,
    /// `<input type="checkbox">`.
    CheckboxInput,
    /// `<select>`.
    Select,
    /// `<select>` enhanced by the client-side Select2 library.
    Select2,
    /// `<select multiple>`.
    SelectMultiple,
    /// A set of `<input type="radio">` elements.
    RadioSelect,
    /// A set of `<input type="checkbox">` elements.
    CheckboxSelectMultiple,
    /// A date input.
    DateInput,
}

impl WidgetType {
    /// Returns `true` for widgets that submit several values under one name.
    pub const fn allows_multiple_values(self) -> bool {
        matches!(
            self,
            Self::MultipleHiddenInput | Self::SelectMultiple | Self::CheckboxSelectMultiple
        )
    }

    /// Returns `true` for widgets that are not shown to the submitter.
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::HiddenInput | Self::MultipleHiddenInput)
    }

    const fn input_type(self) -> Option<&'static str> {
        match self {
            Self::TextInput | Self::DateInput => Some("text"),
            Self::NumberInput => Some("number"),
            Self::EmailInput => Some("email"),
            Self::UrlInput => Some("url"),
            Self::HiddenInput => Some("hidden"),
            Self::CheckboxInput => Some("checkbox"),
            _ => None,
        }
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TextInput => "TextInput",
            Self::NumberInput => "NumberInput",
            Self::EmailInput => "EmailInput",
            Self::UrlInput => "UrlInput",
            Self::HiddenInput => "HiddenInput",
            Self::MultipleHiddenInput => "MultipleHiddenInput",
            Self::Textarea => "Textarea",
            Self::CheckboxInput => "CheckboxInput",
            Self::Select => "Select",
            Self::Select2 => "Select2Widget",
            Self::SelectMultiple => "SelectMultiple",
            Self::RadioSelect => "RadioSelect",
            Self::CheckboxSelectMultiple => "CheckboxSelectMultiple",
            Self::DateInput => "DateInput",
        };
        write!(f, "{name}")
    }
}

/// A widget: its type and HTML attributes.
///
/// # Examples
///
/// ```
/// use plugform_forms::widgets::{Widget, WidgetType};
///
/// let w = Widget::new(WidgetType::TextInput)
///     .attr_opt("placeholder", None::<String>)
///     .attr("autocomplete", "off");
/// assert!(!w.attrs.contains_key("placeholder"));
/// assert_eq!(w.attrs["autocomplete"], "off");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    /// The widget type.
    pub widget_type: WidgetType,
    /// HTML attributes, rendered in key order.
    pub attrs: BTreeMap<String, String>,
}

impl Widget {
    /// Creates a widget without attributes.
    pub const fn new(widget_type: WidgetType) -> Self {
        Self {
            widget_type,
            attrs: BTreeMap::new(),
        }
    }

    /// Sets an attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attrs.insert(key.into(), value.to_string());
        self
    }

    /// Sets an attribute if a value is given; `None` omits it entirely.
    #[must_use]
    pub fn attr_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.attr(key, v),
            None => self,
        }
    }

    /// Creates the enhanced-dropdown widget configured from settings.
    pub fn select2(settings: &Select2Settings) -> Self {
        Self::new(WidgetType::Select2)
            .attr("data-minimum-input-length", settings.minimum_input_length)
            .attr("data-maximum-input-length", settings.maximum_input_length)
            .attr("data-placeholder", &settings.placeholder)
            .attr("data-close-on-select", settings.close_on_select)
            .attr("data-allow-clear", settings.allow_clear)
            .attr("data-language", &settings.language)
    }

    /// Returns `true` if the widget is hidden.
    pub const fn is_hidden(&self) -> bool {
        self.widget_type.is_hidden()
    }

    /// Returns `true` if the widget submits several values.
    pub const fn allows_multiple_values(&self) -> bool {
        self.widget_type.allows_multiple_values()
    }

    /// Extracts the raw submitted values for `name`.
    ///
    /// Single-valued widgets yield at most one value (the last submitted).
    pub fn value_from_data(&self, data: &MultiValueDict<String, String>, name: &str) -> Vec<String> {
        if self.allows_multiple_values() {
            return data.values_of(name).to_vec();
        }
        data.value(name).map(|v| vec![v.to_string()]).unwrap_or_default()
    }

    /// Renders the widget as HTML.
    pub fn render(&self, name: &str, values: &[String], choices: &[(String, String)]) -> String {
        let current = values.last().map_or("", String::as_str);
        let attrs = render_attrs(&self.attrs);
        let name = escape(name);
        match self.widget_type {
            WidgetType::Textarea => {
                format!("<textarea name=\"{name}\"{attrs}>{}</textarea>", escape(current))
            }
            WidgetType::CheckboxInput => {
                let checked = if is_truthy(current) { " checked" } else { "" };
                format!("<input type=\"checkbox\" name=\"{name}\"{attrs}{checked}>")
            }
            WidgetType::MultipleHiddenInput => values
                .iter()
                .map(|v| {
                    format!(
                        "<input type=\"hidden\" name=\"{name}\" value=\"{}\"{attrs}>",
                        escape(v)
                    )
                })
                .collect(),
            WidgetType::Select | WidgetType::Select2 | WidgetType::SelectMultiple => {
                let multiple = if self.allows_multiple_values() { " multiple" } else { "" };
                let options: String = choices
                    .iter()
                    .map(|(value, label)| {
                        let selected = if values.contains(value) { " selected" } else { "" };
                        format!(
                            "<option value=\"{}\"{selected}>{}</option>",
                            escape(value),
                            escape(label)
                        )
                    })
                    .collect();
                format!("<select name=\"{name}\"{attrs}{multiple}>{options}</select>")
            }
            WidgetType::RadioSelect | WidgetType::CheckboxSelectMultiple => {
                let input_type = if self.widget_type == WidgetType::RadioSelect {
                    "radio"
                } else {
                    "checkbox"
                };
                let items: String = choices
                    .iter()
                    .map(|(value, label)| {
                        let checked = if values.contains(value) { " checked" } else { "" };
                        format!(
                            "<label><input type=\"{input_type}\" name=\"{name}\" value=\"{}\"{attrs}{checked}> {}</label>",
                            escape(value),
                            escape(label)
                        )
                    })
                    .collect();
                format!("<div>{items}</div>")
            }
            other => {
                let input_type = other.input_type().unwrap_or("text");
                // An explicit `type` attribute (e.g. `type="date"`) wins.
                let type_attr = if self.attrs.contains_key("type") {
                    String::new()
                } else {
                    format!(" type=\"{input_type}\"")
                };
                format!(
                    "<input{type_attr} name=\"{name}\" value=\"{}\"{attrs}>",
                    escape(current)
                )
            }
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

/// Formats attributes into a string like ` key="value" key2="value2"`.
fn render_attrs(attrs: &BTreeMap<String, String>) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!(" {k}=\"{}\"", escape(v)))
        .collect()
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
