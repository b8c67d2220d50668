//! Columns and behaviour shared by labelled form-field plugins.
//!
//! [`FormField`] holds the name, label, required flag and help text of a
//! field plugin, plus the layout and visibility flags and script
//! attachments editors configure per field. Scripts are stored for an
//! external automation service and never executed here.

use std::fmt;

use plugform_core::utils::text::truncate_chars;
use plugform_core::{PlugformResult, ValidationError};
use plugform_db::{ColumnDef, ColumnType, Row, Value};
use plugform_forms::FormFieldDef;

use crate::name::NameField;
use crate::plugin::{simple_loader, Loader};

/// The labelled-field columns of a form-field plugin row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// The field name, keying the submitted data.
    pub name: String,
    /// The field label.
    pub label: String,
    /// Whether a value must be submitted.
    pub is_required: bool,
    /// Help text shown with the field.
    pub help_text: String,
    /// Shown in table views.
    pub is_table_visible: bool,
    /// Shown in modal views.
    pub is_modal_visible: bool,
    /// Shown in card views.
    pub is_card_visible: bool,
    /// Shown in modal detail views.
    pub is_modal_detail_visible: bool,
    /// Shown in the form at all.
    pub is_visible: bool,
    /// Editable after the submission was created.
    pub is_editable: bool,
    /// Must be filled in before moving on to the next stage.
    pub is_required_to_move: bool,
    /// Whether the automation script is enabled.
    pub use_script: bool,
    /// Run the script when the submission is created.
    pub execute_on_first_save: bool,
    /// Run the script on every save.
    pub execute_on_every_save: bool,
    /// Processing script for the automation service.
    pub python_script: Option<String>,
    /// Validation script for the automation service.
    pub validation_python_script: Option<String>,
}

impl Default for FormField {
    fn default() -> Self {
        Self {
            name: String::new(),
            label: String::new(),
            is_required: true,
            help_text: String::new(),
            is_table_visible: true,
            is_modal_visible: true,
            is_card_visible: false,
            is_modal_detail_visible: true,
            is_visible: true,
            is_editable: true,
            is_required_to_move: false,
            use_script: false,
            execute_on_first_save: false,
            execute_on_every_save: false,
            python_script: None,
            validation_python_script: None,
        }
    }
}

const FLAGS: [(&str, bool); 11] = [
    ("is_required", true),
    ("is_table_visible", true),
    ("is_modal_visible", true),
    ("is_card_visible", false),
    ("is_modal_detail_visible", true),
    ("is_visible", true),
    ("is_editable", true),
    ("is_required_to_move", false),
    ("use_script", false),
    ("execute_on_first_save", false),
    ("execute_on_every_save", false),
];

impl FormField {
    /// Creates a required, visible, editable field.
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    /// Returns the storage columns, `name` first.
    pub fn columns() -> Vec<ColumnDef> {
        let mut columns = vec![
            NameField::new().column_def(),
            ColumnDef::new("label", ColumnType::Varchar(1000)),
            ColumnDef::new("help_text", ColumnType::Varchar(1000)).default(""),
        ];
        columns.extend(
            FLAGS
                .iter()
                .map(|(name, default)| ColumnDef::new(*name, ColumnType::Boolean).default(*default)),
        );
        columns.push(ColumnDef::new("python_script", ColumnType::Text).nullable());
        columns.push(ColumnDef::new("validation_python_script", ColumnType::Text).nullable());
        columns
    }

    /// Reads the columns from a row.
    pub fn from_row(row: &Row) -> PlugformResult<Self> {
        Ok(Self {
            name: row.get("name")?,
            label: row.get("label")?,
            is_required: row.get("is_required")?,
            help_text: row.get("help_text")?,
            is_table_visible: row.get("is_table_visible")?,
            is_modal_visible: row.get("is_modal_visible")?,
            is_card_visible: row.get("is_card_visible")?,
            is_modal_detail_visible: row.get("is_modal_detail_visible")?,
            is_visible: row.get("is_visible")?,
            is_editable: row.get("is_editable")?,
            is_required_to_move: row.get("is_required_to_move")?,
            use_script: row.get("use_script")?,
            execute_on_first_save: row.get("execute_on_first_save")?,
            execute_on_every_save: row.get("execute_on_every_save")?,
            python_script: row.get("python_script")?,
            validation_python_script: row.get("validation_python_script")?,
        })
    }

    /// Returns the column values.
    pub fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", Value::from(self.name.as_str())),
            ("label", Value::from(self.label.as_str())),
            ("is_required", Value::Bool(self.is_required)),
            ("help_text", Value::from(self.help_text.as_str())),
            ("is_table_visible", Value::Bool(self.is_table_visible)),
            ("is_modal_visible", Value::Bool(self.is_modal_visible)),
            ("is_card_visible", Value::Bool(self.is_card_visible)),
            ("is_modal_detail_visible", Value::Bool(self.is_modal_detail_visible)),
            ("is_visible", Value::Bool(self.is_visible)),
            ("is_editable", Value::Bool(self.is_editable)),
            ("is_required_to_move", Value::Bool(self.is_required_to_move)),
            ("use_script", Value::Bool(self.use_script)),
            ("execute_on_first_save", Value::Bool(self.execute_on_first_save)),
            ("execute_on_every_save", Value::Bool(self.execute_on_every_save)),
            ("python_script", Value::from(self.python_script.clone())),
            (
                "validation_python_script",
                Value::from(self.validation_python_script.clone()),
            ),
        ]
    }

    /// Decides whether the field is shown in the form.
    ///
    /// Invisible fields are never shown. Visible editable fields always
    /// are. Visible fields that are not editable are shown when creating a
    /// submission only.
    pub const fn should_show_field(&self, is_update: bool) -> bool {
        if !self.is_visible {
            false
        } else if self.is_editable {
            true
        } else {
            !is_update
        }
    }

    /// Applies name, label, required flag and help text to a form field.
    /// Hidden fields are never required.
    pub fn get_field(&self, field: FormFieldDef, should_show: bool) -> FormFieldDef {
        let mut field = field;
        field.name.clone_from(&self.name);
        field
            .required(self.is_required && should_show)
            .label(self.label.as_str())
            .help_text(self.help_text.as_str())
    }

    /// Returns the loader reporting this field's value.
    pub fn get_loaders(&self) -> Vec<Loader> {
        vec![simple_loader(self.name.as_str(), self.label.as_str())]
    }

    /// Normalizes and validates the stored values.
    ///
    /// An empty name is replaced by a generated one. Columns listed in
    /// `exclude` are neither normalized nor validated.
    pub fn clean_fields(&mut self, exclude: Option<&[&str]>) -> Result<(), ValidationError> {
        let excluded = |column: &str| exclude.is_some_and(|e| e.contains(&column));
        let name_field = NameField::new();
        if !excluded(name_field.column) {
            self.name = name_field.to_python(&self.name);
            name_field.validate(&self.name)?;
        }
        if !excluded("label") && self.label.is_empty() {
            return Err(ValidationError::for_field(
                "label",
                "This field cannot be blank.",
                "blank",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&truncate_chars(&self.label, 50))
    }
}
