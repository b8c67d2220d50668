//! The contract every field plugin implements.
//!
//! A plugin row contributes to the assembled form through four hooks:
//!
//! - [`get_fields`](FormFieldPlugin::get_fields): the form fields, keyed by
//!   names derived from the row's `name`
//! - [`get_initial`](FormFieldPlugin::get_initial): initial values
//! - [`get_cleaners`](FormFieldPlugin::get_cleaners): form-level cleaning
//!   hooks run after field validation
//! - [`get_loaders`](FormFieldPlugin::get_loaders): callables turning the
//!   cleaned data into `{name, label, value}` records
//!
//! `get_fields` and `get_loaders` have no useful default. Types that do not
//! implement them fail with [`PlugformError::NotImplemented`] when the hook
//! is invoked.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use plugform_core::settings::{Select2Settings, Settings};
use plugform_core::{PlugformError, PlugformResult, SETTINGS};
use plugform_db::{DatabaseBackend, Value};
use plugform_forms::{CleanedData, Cleaner, FormFieldDef};
use serde::{Deserialize, Serialize};

use crate::meta::{PluginBase, PluginMeta};

/// What a plugin knows about the form being built.
#[derive(Debug, Clone)]
pub struct FieldContext {
    /// `true` when editing an existing submission, `false` when creating
    /// one.
    pub is_update: bool,
    /// Enhanced dropdown configuration.
    pub select2: Select2Settings,
    /// Visible rows of multiline text fields.
    pub textarea_rows: u32,
}

impl FieldContext {
    /// Creates a context from the global settings.
    pub fn new(is_update: bool) -> Self {
        Self::with_settings(is_update, SETTINGS.get_or_default())
    }

    /// Creates a context from explicit settings.
    pub fn with_settings(is_update: bool, settings: &Settings) -> Self {
        Self {
            is_update,
            select2: settings.select2.clone(),
            textarea_rows: settings.textarea_rows,
        }
    }

    /// A context for creating a new submission.
    pub fn creating() -> Self {
        Self::new(false)
    }

    /// A context for editing an existing submission.
    pub fn updating() -> Self {
        Self::new(true)
    }
}

impl Default for FieldContext {
    fn default() -> Self {
        Self::creating()
    }
}

/// A normalized output record produced by a [`Loader`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedValue {
    /// The field name.
    pub name: String,
    /// The field label.
    pub label: String,
    /// The submitted value, `Null` if absent.
    pub value: Value,
}

/// Turns cleaned form data into one output record.
pub type Loader = Arc<dyn Fn(&CleanedData) -> LoadedValue + Send + Sync>;

/// Returns a loader reading `name` from the data and reporting it with
/// `label`.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use plugform_db::Value;
/// use plugform_models::plugin::simple_loader;
///
/// let loader = simple_loader("email", "Email");
/// let mut data = HashMap::new();
/// data.insert("email".to_string(), Value::from("a@example.com"));
///
/// let record = loader(&data);
/// assert_eq!(record.value, Value::from("a@example.com"));
/// assert_eq!(loader(&HashMap::new()).value, Value::Null);
/// ```
pub fn simple_loader(name: impl Into<String>, label: impl Into<String>) -> Loader {
    let name = name.into();
    let label = label.into();
    Arc::new(move |data: &CleanedData| LoadedValue {
        name: name.clone(),
        label: label.clone(),
        value: data.get(&name).cloned().unwrap_or(Value::Null),
    })
}

/// A plugin row taking part in a configured form.
pub trait FormFieldPlugin: Send + Sync + fmt::Debug {
    /// Returns the metadata of this row's type.
    fn meta(&self) -> &'static PluginMeta;

    /// Returns the content-editor columns.
    fn base(&self) -> &PluginBase;

    /// Returns the content-editor columns mutably.
    fn base_mut(&mut self) -> &mut PluginBase;

    /// Returns the type-specific column values, excluding the base columns.
    fn field_values(&self) -> Vec<(&'static str, Value)>;

    /// Returns the form fields this row contributes, in order.
    fn get_fields(&self, _ctx: &FieldContext) -> PlugformResult<Vec<FormFieldDef>> {
        Err(PlugformError::NotImplemented(format!(
            "{} needs a get_fields implementation",
            self.meta().label_lower()
        )))
    }

    /// Returns initial values keyed by field name.
    fn get_initial(&self) -> HashMap<String, Value> {
        HashMap::new()
    }

    /// Returns form-level cleaning hooks.
    fn get_cleaners(&self) -> Vec<Cleaner> {
        Vec::new()
    }

    /// Returns the loaders extracting this row's submitted values.
    fn get_loaders(&self) -> PlugformResult<Vec<Loader>> {
        Err(PlugformError::NotImplemented(format!(
            "{} needs a get_loaders implementation",
            self.meta().label_lower()
        )))
    }

    /// Called before the row is written.
    fn pre_save(&mut self) {}

    /// Inserts the row and stores its new primary key.
    fn save(&mut self, db: &dyn DatabaseBackend) -> PlugformResult<i64> {
        self.pre_save();
        let mut values = self.base().values();
        values.extend(self.field_values());
        let id = self.meta().insert(db, values)?;
        self.base_mut().id = Some(id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use plugform_db::TableDef;

    use super::*;
    use crate::meta::base_columns;

    static BARE_META: LazyLock<PluginMeta> = LazyLock::new(|| {
        PluginMeta::new("testapp", "bare", TableDef::new("testapp_bare").columns(base_columns()))
    });

    #[derive(Debug, Default)]
    struct Bare {
        base: PluginBase,
    }

    impl FormFieldPlugin for Bare {
        fn meta(&self) -> &'static PluginMeta {
            &BARE_META
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
    }

    #[test]
    fn test_get_fields_not_implemented() {
        let err = Bare::default().get_fields(&FieldContext::creating()).unwrap_err();
        assert!(matches!(err, PlugformError::NotImplemented(_)));
        assert_eq!(
            err.to_string(),
            "Not implemented: testapp.bare needs a get_fields implementation"
        );
    }

    #[test]
    fn test_get_loaders_not_implemented() {
        let Err(err) = Bare::default().get_loaders() else {
            panic!("expected an error");
        };
        assert!(err.to_string().contains("testapp.bare needs a get_loaders implementation"));
    }

    #[test]
    fn test_defaults_are_empty() {
        let plugin = Bare::default();
        assert!(plugin.get_initial().is_empty());
        assert!(plugin.get_cleaners().is_empty());
    }

    #[test]
    fn test_simple_loader_record() {
        let loader = simple_loader("first", "First name");
        let mut data = CleanedData::new();
        data.insert("first".into(), Value::from("hello"));
        assert_eq!(
            loader(&data),
            LoadedValue {
                name: "first".into(),
                label: "First name".into(),
                value: Value::from("hello"),
            }
        );
    }

    #[test]
    fn test_loaded_value_serializes() {
        let record = LoadedValue {
            name: "n".into(),
            label: "L".into(),
            value: Value::Null,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "n");
        assert_eq!(json["label"], "L");
    }

    #[test]
    fn test_field_context_settings() {
        let mut settings = Settings::default();
        settings.textarea_rows = 8;
        let ctx = FieldContext::with_settings(true, &settings);
        assert!(ctx.is_update);
        assert_eq!(ctx.textarea_rows, 8);
        assert!(!FieldContext::creating().is_update);
        assert!(FieldContext::updating().is_update);
    }
}
