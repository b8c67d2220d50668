//! A hidden spam trap.
//!
//! Humans never see the honeypot input and leave it empty. Bots filling in
//! every input they find put something into it and fail validation.

use plugform_core::{PlugformResult, ValidationError};
use plugform_db::{Row, TableDef, Value};
use plugform_forms::{FormFieldDef, FormFieldType, Validator, Widget, WidgetType};

use crate::meta::{base_columns, PluginBase, PluginKind, PluginMeta};
use crate::plugin::{FieldContext, FormFieldPlugin, Loader};

/// Name of the honeypot form field.
pub const HONEYPOT_FIELD: &str = "honeypot";

/// Quotes a string the way Python's `repr` does.
fn quote(value: &str) -> String {
    let delimiter = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(delimiter);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

/// Rejects any non-empty value.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoneypotValidator;

impl Validator for HoneypotValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        match value {
            Value::String(s) if !s.is_empty() => Err(ValidationError::new(
                format!("Invalid honeypot value {}", quote(s)),
                "invalid",
            )),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "HoneypotValidator"
    }
}

/// The honeypot plugin row.
#[derive(Debug, Clone)]
pub struct Honeypot {
    meta: &'static PluginMeta,
    /// Content-editor columns.
    pub base: PluginBase,
}

impl Honeypot {
    /// Returns the metadata of a honeypot plugin stored in `db_table`.
    pub fn plugin_meta(app_label: &'static str, db_table: &str) -> PluginMeta {
        PluginMeta::new(app_label, "honeypot", TableDef::new(db_table).columns(base_columns()))
            .verbose_name("honeypot")
    }

    /// Returns the plugin kind for `meta`.
    pub fn kind(meta: &'static PluginMeta) -> PluginKind {
        PluginKind::new(meta, Self::boxed_from_row)
    }

    /// Creates an unsaved row.
    pub const fn new(meta: &'static PluginMeta, base: PluginBase) -> Self {
        Self { meta, base }
    }

    /// Reads a row.
    pub fn from_row(meta: &'static PluginMeta, row: &Row) -> PlugformResult<Self> {
        Ok(Self::new(meta, PluginBase::from_row(row)?))
    }

    fn boxed_from_row(
        meta: &'static PluginMeta,
        row: &Row,
    ) -> PlugformResult<Box<dyn FormFieldPlugin>> {
        Ok(Box::new(Self::from_row(meta, row)?))
    }
}

impl FormFieldPlugin for Honeypot {
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
        Vec::new()
    }

    fn get_fields(&self, _ctx: &FieldContext) -> PlugformResult<Vec<FormFieldDef>> {
        Ok(vec![FormFieldDef::new(HONEYPOT_FIELD, FormFieldType::char(None))
            .required(false)
            .widget(Widget::new(WidgetType::HiddenInput))
            .validator(HoneypotValidator)])
    }

    fn get_loaders(&self) -> PlugformResult<Vec<Loader>> {
        Ok(Vec::new())
    }
}
