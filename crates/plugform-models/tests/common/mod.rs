//! The test application shared by the integration tests.
//!
//! A configured form aggregate with a `contact` and an `other-fields` form
//! type, the simple field proxies, a date range, a honeypot and a plain
//! text plugin that is not a form field.

#![allow(dead_code)]

use std::fmt;
use std::sync::{Arc, LazyLock, Once};

use plugform_core::{PlugformResult, ValidationError};
use plugform_db::{ColumnDef, ColumnType, DatabaseBackend, Row, TableDef, Value};
use plugform_db_backends::SqliteBackend;
use plugform_forms::{BaseForm, FormClass, FormFieldDef, FormFieldType};
use plugform_models::configured_form::{ConfiguredForm, ConfiguredFormMeta};
use plugform_models::contrib::{Duration, Honeypot};
use plugform_models::form_type::{FormType, Region};
use plugform_models::loading::create_plugin_tables;
use plugform_models::meta::{base_columns, PluginBase, PluginKind, PluginMeta};
use plugform_models::plugin::{FieldContext, FormFieldPlugin, LoadedValue, Loader};
use plugform_models::simple_field::{proxies, SimpleField};
use plugform_models::symbols::register_symbol;

pub const APP: &str = "testapp";
pub const SIMPLE_TABLE: &str = "testapp_simplefield";

/// Output of the contact form's `process` hook.
pub type ProcessFn = Arc<dyn Fn(&[LoadedValue]) -> String + Send + Sync>;

macro_rules! simple_field_proxies {
    ($($name:ident => $proxy:ident),* $(,)?) => {
        $(
            pub static $name: LazyLock<PluginMeta> =
                LazyLock::new(|| SimpleField::proxy_meta::<proxies::$proxy>(APP, SIMPLE_TABLE));
        )*
    };
}

simple_field_proxies! {
    TEXT => Text,
    EMAIL => Email,
    URL => Url,
    DATE => Date,
    INTEGER => Integer,
    TEXTAREA => Textarea,
    CHECKBOX => Checkbox,
    SELECT => Select,
    SELECT_MULTIPLE => SelectMultiple,
    CHECKBOX_SELECT_MULTIPLE => CheckboxSelectMultiple,
}

pub static RADIO: LazyLock<PluginMeta> = LazyLock::new(|| {
    SimpleField::proxy_meta::<proxies::Radio>(APP, SIMPLE_TABLE).verbose_name("Listen to the radio")
});

pub static DURATION: LazyLock<PluginMeta> =
    LazyLock::new(|| Duration::plugin_meta(APP, "testapp_duration"));

pub static HONEYPOT: LazyLock<PluginMeta> =
    LazyLock::new(|| Honeypot::plugin_meta(APP, "testapp_honeypot"));

pub static PLAIN_TEXT: LazyLock<PluginMeta> = LazyLock::new(|| {
    PluginMeta::new(
        APP,
        "plaintext",
        TableDef::new("testapp_plaintext")
            .columns(base_columns())
            .column(ColumnDef::new("text", ColumnType::Text)),
    )
    .verbose_name("text")
});

/// A text block between fields. Contributes nothing to the form.
#[derive(Debug, Clone)]
pub struct PlainText {
    pub base: PluginBase,
    pub text: String,
}

impl PlainText {
    pub fn new(base: PluginBase, text: impl Into<String>) -> Self {
        Self {
            base,
            text: text.into(),
        }
    }

    fn boxed_from_row(
        _meta: &'static PluginMeta,
        row: &Row,
    ) -> PlugformResult<Box<dyn FormFieldPlugin>> {
        Ok(Box::new(Self {
            base: PluginBase::from_row(row)?,
            text: row.get("text")?,
        }))
    }
}

impl fmt::Display for PlainText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text.chars().take(40).collect::<String>())
    }
}

impl FormFieldPlugin for PlainText {
    fn meta(&self) -> &'static PluginMeta {
        &PLAIN_TEXT
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PluginBase {
        &mut self.base
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![("text", Value::from(self.text.as_str()))]
    }

    fn get_fields(&self, _ctx: &FieldContext) -> PlugformResult<Vec<FormFieldDef>> {
        Ok(Vec::new())
    }

    fn get_loaders(&self) -> PlugformResult<Vec<Loader>> {
        Ok(Vec::new())
    }
}

/// Every plugin kind of the test application, in registration order.
pub fn plugin_kinds() -> Vec<PluginKind> {
    vec![
        PluginKind::new(&PLAIN_TEXT, PlainText::boxed_from_row),
        SimpleField::kind(&TEXT),
        SimpleField::kind(&EMAIL),
        SimpleField::kind(&URL),
        SimpleField::kind(&DATE),
        SimpleField::kind(&INTEGER),
        SimpleField::kind(&TEXTAREA),
        SimpleField::kind(&CHECKBOX),
        SimpleField::kind(&SELECT),
        SimpleField::kind(&RADIO),
        SimpleField::kind(&SELECT_MULTIPLE),
        SimpleField::kind(&CHECKBOX_SELECT_MULTIPLE),
        Duration::kind(&DURATION),
        Honeypot::kind(&HONEYPOT),
    ]
}

fn other_fields_form() -> Vec<FormFieldDef> {
    vec![FormFieldDef::new("newsletter", FormFieldType::Boolean).required(false)]
}

fn validate_contact_form(form: &BaseForm) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if form.cleaned_data().get("first") == Some(&Value::from("admin")) {
        errors.push(ValidationError::for_field("first", "This name is reserved.", "reserved"));
    }
    if form.cleaned_data().get("first") == Some(&Value::from("nobody")) {
        errors.push(ValidationError::new("Nobody may submit this form.", "invalid"));
    }
    errors
}

fn register_symbols() {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| {
        register_symbol(
            "testapp.forms.validate_contact_form",
            plugform_models::form_type::validate_fn(validate_contact_form),
        );
        let process: ProcessFn = Arc::new(|values: &[LoadedValue]| {
            values
                .iter()
                .map(|v| format!("{}: {}", v.label, v.value))
                .collect::<Vec<_>>()
                .join("\n")
        });
        register_symbol("testapp.forms.process_contact_form", process);
        register_symbol(
            "testapp.forms.OtherFieldsForm",
            FormClass::new("OtherFieldsForm", other_fields_form),
        );
    });
}

pub static FORMS: LazyLock<ConfiguredFormMeta> = LazyLock::new(|| {
    register_symbols();
    let contact = FormType::builder()
        .key("contact")
        .label("contact form")
        .regions(vec![Region::new("form", "form")])
        .attr("validate", "testapp.forms.validate_contact_form")
        .attr("process", "testapp.forms.process_contact_form")
        .build()
        .expect("contact form type");
    let other = FormType::builder()
        .key("other-fields")
        .label("other fields")
        .regions(vec![])
        .attr("form_class", "testapp.forms.OtherFieldsForm")
        .build()
        .expect("other-fields form type");
    ConfiguredFormMeta::new("testapp_configuredform", vec![contact, other])
});

/// An in-memory database with every test application table.
pub fn setup_db() -> SqliteBackend {
    let db = SqliteBackend::memory().unwrap();
    db.execute_batch(&FORMS.create_table_sql()).unwrap();
    create_plugin_tables(&db, &plugin_kinds()).unwrap();
    db
}

/// Saves a configured form of the given type.
pub fn configured_form(db: &dyn DatabaseBackend, form_type: &str) -> ConfiguredForm {
    let mut form = ConfiguredForm::new(&FORMS, "Test form", form_type);
    FORMS.save(db, &mut form).unwrap();
    form
}

/// Saves a simple field row of the given proxy.
pub fn add_simple(
    db: &dyn DatabaseBackend,
    form: &ConfiguredForm,
    meta: &'static PluginMeta,
    ordering: i64,
    name: &str,
    label: &str,
) -> SimpleField {
    let mut field = SimpleField::new(
        meta,
        PluginBase::new(form.id.unwrap(), "form", ordering),
        plugform_models::FormField::new(name, label),
    );
    field.save(db).unwrap();
    field
}
