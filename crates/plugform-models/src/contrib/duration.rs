//! A date range plugin.

use std::fmt;

use plugform_core::{PlugformResult, ValidationError};
use plugform_db::{ColumnDef, ColumnType, Row, TableDef, Value};
use plugform_forms::{FormFieldDef, FormFieldType, Widget, WidgetType};

use crate::meta::{base_columns, PluginBase, PluginKind, PluginMeta, NAME_COLUMN};
use crate::name::NameField;
use crate::plugin::{FieldContext, FormFieldPlugin};

/// Asks for a `from` and an `until` date.
///
/// A duration named `stay` contributes the required date fields
/// `stay_from` and `stay_until`. It does not report submitted values, so
/// processing a form containing one fails until an application supplies
/// loaders.
#[derive(Debug, Clone)]
pub struct Duration {
    meta: &'static PluginMeta,
    /// Content-editor columns.
    pub base: PluginBase,
    /// Prefix of both field names.
    pub name: String,
    /// Label of the start date.
    pub label_from: String,
    /// Label of the end date.
    pub label_until: String,
}

impl Duration {
    /// Returns the metadata of a duration plugin stored in `db_table`.
    pub fn plugin_meta(app_label: &'static str, db_table: &str) -> PluginMeta {
        let table = TableDef::new(db_table)
            .columns(base_columns())
            .column(NameField::new().column_def())
            .column(ColumnDef::new("label_from", ColumnType::Varchar(1000)))
            .column(ColumnDef::new("label_until", ColumnType::Varchar(1000)));
        PluginMeta::new(app_label, "duration", table).verbose_name("duration")
    }

    /// Returns the plugin kind for `meta`.
    pub fn kind(meta: &'static PluginMeta) -> PluginKind {
        PluginKind::new(meta, Self::boxed_from_row)
    }

    /// Creates an unsaved row.
    pub fn new(
        meta: &'static PluginMeta,
        base: PluginBase,
        name: impl Into<String>,
        label_from: impl Into<String>,
        label_until: impl Into<String>,
    ) -> Self {
        Self {
            meta,
            base,
            name: name.into(),
            label_from: label_from.into(),
            label_until: label_until.into(),
        }
    }

    /// Reads a row.
    pub fn from_row(meta: &'static PluginMeta, row: &Row) -> PlugformResult<Self> {
        Ok(Self {
            meta,
            base: PluginBase::from_row(row)?,
            name: row.get(NAME_COLUMN)?,
            label_from: row.get("label_from")?,
            label_until: row.get("label_until")?,
        })
    }

    fn boxed_from_row(
        meta: &'static PluginMeta,
        row: &Row,
    ) -> PlugformResult<Box<dyn FormFieldPlugin>> {
        Ok(Box::new(Self::from_row(meta, row)?))
    }

    /// Normalizes and validates the name.
    pub fn clean_fields(&mut self) -> Result<(), ValidationError> {
        self.name = NameField::new().clean(&self.name)?;
        Ok(())
    }

    fn date_field(name: String, label: &str) -> FormFieldDef {
        FormFieldDef::new(name, FormFieldType::Date)
            .label(label)
            .widget(Widget::new(WidgetType::DateInput).attr("type", "date"))
    }
}

impl FormFieldPlugin for Duration {
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
        vec![
            (NAME_COLUMN, Value::from(self.name.as_str())),
            ("label_from", Value::from(self.label_from.as_str())),
            ("label_until", Value::from(self.label_until.as_str())),
        ]
    }

    fn get_fields(&self, _ctx: &FieldContext) -> PlugformResult<Vec<FormFieldDef>> {
        Ok(vec![
            Self::date_field(format!("{}_from", self.name), &self.label_from),
            Self::date_field(format!("{}_until", self.name), &self.label_until),
        ])
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.label_from, self.label_until)
    }
}
