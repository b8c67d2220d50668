//! The configured form aggregate.
//!
//! A configured form is the record editors attach field plugins to. Its
//! `form_type` is one of the keys declared by the concrete aggregate's
//! FORMS list. That list is registered once per aggregate type as a
//! [`ConfiguredFormMeta`], normally held in a `LazyLock` static, which
//! fixes the `form_type` choices and the key to [`FormType`] lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use plugform_core::{validation_error, PlugformError, PlugformResult, ValidationError};
use plugform_db::{ColumnDef, ColumnType, DatabaseBackend, Row, TableDef, Value};

use crate::form_type::{FormType, Region};

/// Maximum length of a configured form's name.
pub const NAME_MAX_LENGTH: usize = 1000;

/// Static registration of one concrete aggregate type.
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
/// use plugform_models::configured_form::{ConfiguredForm, ConfiguredFormMeta};
/// use plugform_models::form_type::{FormType, Region};
///
/// static FORMS: LazyLock<ConfiguredFormMeta> = LazyLock::new(|| {
///     ConfiguredFormMeta::new(
///         "docs_configuredform",
///         vec![FormType::builder()
///             .key("contact")
///             .label("contact form")
///             .regions(vec![Region::new("form", "form")])
///             .build()
///             .unwrap()],
///     )
/// });
///
/// let form = ConfiguredForm::new(&FORMS, "Contact us", "contact");
/// assert_eq!(form.to_string(), "Contact us");
/// assert_eq!(form.regions()[0].key, "form");
/// assert_eq!(FORMS.choices(), vec![("contact", "contact form")]);
/// ```
pub struct ConfiguredFormMeta {
    table: TableDef,
    forms: Vec<FormType>,
    types: HashMap<String, usize>,
}

impl ConfiguredFormMeta {
    /// Registers an aggregate type stored in `db_table` with its FORMS.
    ///
    /// A later form type with an already used key shadows the earlier one.
    pub fn new(db_table: impl Into<String>, forms: Vec<FormType>) -> Self {
        let table = TableDef::new(db_table)
            .column(ColumnDef::new("id", ColumnType::AutoField))
            .column(ColumnDef::new("name", ColumnType::Varchar(1000)))
            .column(ColumnDef::new("form_type", ColumnType::Varchar(100)));
        let types = forms
            .iter()
            .enumerate()
            .map(|(idx, ft)| (ft.key().to_string(), idx))
            .collect();
        Self {
            table,
            forms,
            types,
        }
    }

    /// Returns the backing table.
    pub const fn table(&self) -> &TableDef {
        &self.table
    }

    /// Returns the declared form types in order.
    pub fn forms(&self) -> &[FormType] {
        &self.forms
    }

    /// Returns the `form_type` choices as `(key, label)` pairs.
    pub fn choices(&self) -> Vec<(&str, &str)> {
        self.forms.iter().map(|ft| (ft.key(), ft.label())).collect()
    }

    /// Looks up a form type by key.
    pub fn form_type(&self, key: &str) -> Option<&FormType> {
        self.types.get(key).map(|idx| &self.forms[*idx])
    }

    /// Returns the `CREATE TABLE` statement of the backing table.
    pub fn create_table_sql(&self) -> String {
        self.table.create_table_sql()
    }

    /// Validates then inserts a new configured form, storing its id.
    pub fn save(&self, db: &dyn DatabaseBackend, form: &mut ConfiguredForm) -> PlugformResult<i64> {
        form.clean_fields(None)?;
        let sql = self.table.insert_sql(&["name", "form_type"]);
        let id = db.insert(
            &sql,
            &[Value::from(form.name.as_str()), Value::from(form.form_type.as_str())],
        )?;
        form.id = Some(id);
        tracing::debug!(id, form_type = %form.form_type, "saved configured form");
        Ok(id)
    }

    /// Fetches a configured form by id.
    pub fn get(&'static self, db: &dyn DatabaseBackend, id: i64) -> PlugformResult<ConfiguredForm> {
        let sql = self.table.select_sql(Some("\"id\" = ?"), &[]);
        let row = db.query_one(&sql, &[Value::Int(id)])?;
        ConfiguredForm::from_row(self, &row)
    }

    /// Fetches every configured form, ordered by name.
    pub fn all(&'static self, db: &dyn DatabaseBackend) -> PlugformResult<Vec<ConfiguredForm>> {
        let sql = self.table.select_sql(None, &["name", "id"]);
        db.query(&sql, &[])?
            .iter()
            .map(|row| ConfiguredForm::from_row(self, row))
            .collect()
    }
}

impl fmt::Debug for ConfiguredFormMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredFormMeta")
            .field("db_table", &self.table.db_table)
            .field("forms", &self.forms)
            .finish_non_exhaustive()
    }
}

/// One complete configurable form.
#[derive(Clone)]
pub struct ConfiguredForm {
    /// Primary key, `None` until saved.
    pub id: Option<i64>,
    /// Free-text name.
    pub name: String,
    /// Key of the form type.
    pub form_type: String,
    meta: &'static ConfiguredFormMeta,
    regions: OnceLock<Vec<Region>>,
}

impl ConfiguredForm {
    /// Creates an unsaved configured form.
    pub fn new(
        meta: &'static ConfiguredFormMeta,
        name: impl Into<String>,
        form_type: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            form_type: form_type.into(),
            meta,
            regions: OnceLock::new(),
        }
    }

    /// Reads a configured form from a row of its table.
    pub fn from_row(meta: &'static ConfiguredFormMeta, row: &Row) -> PlugformResult<Self> {
        let mut form = Self::new(meta, row.get::<String>("name")?, row.get::<String>("form_type")?);
        form.id = Some(row.get("id")?);
        Ok(form)
    }

    /// Returns the aggregate type's registration.
    pub const fn meta(&self) -> &'static ConfiguredFormMeta {
        self.meta
    }

    /// Returns the saved id, failing for unsaved forms.
    pub fn require_id(&self) -> PlugformResult<i64> {
        self.id.ok_or_else(|| {
            PlugformError::DatabaseError(format!(
                "Configured form {:?} has not been saved",
                self.name
            ))
        })
    }

    /// Returns this form's type, or `None` for an unknown key.
    pub fn get_type(&self) -> Option<&'static FormType> {
        self.meta.form_type(&self.form_type)
    }

    /// Returns this form's type, failing for an unknown key.
    pub fn require_type(&self) -> PlugformResult<&'static FormType> {
        self.get_type().ok_or_else(|| {
            PlugformError::ImproperlyConfigured(format!(
                "Configured form {:?} has unknown form type {:?}",
                self.name, self.form_type
            ))
        })
    }

    /// Returns the layout regions of this form's type, computed once.
    ///
    /// Unknown types and types whose regions do not resolve have none.
    pub fn regions(&self) -> &[Region] {
        self.regions.get_or_init(|| {
            self.get_type()
                .and_then(FormType::regions)
                .map(|source| source.regions_for(self))
                .unwrap_or_default()
        })
    }

    /// Validates the stored values.
    ///
    /// Fields listed in `exclude` report their errors as form-level errors.
    pub fn clean_fields(&self, exclude: Option<&[&str]>) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(validation_error("This field cannot be blank.", "name", exclude));
        }
        let len = self.name.chars().count();
        if len > NAME_MAX_LENGTH {
            return Err(validation_error(
                format!("Ensure this value has at most {NAME_MAX_LENGTH} characters (it has {len})."),
                "name",
                exclude,
            ));
        }
        if self.get_type().is_none() {
            return Err(validation_error(
                format!("Value '{}' is not a valid choice.", self.form_type),
                "form_type",
                exclude,
            ));
        }
        Ok(())
    }
}

impl fmt::Display for ConfiguredForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for ConfiguredForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredForm")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("form_type", &self.form_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::LazyLock;

    use super::*;

    static CALLS: AtomicUsize = AtomicUsize::new(0);

    static META: LazyLock<ConfiguredFormMeta> = LazyLock::new(|| {
        ConfiguredFormMeta::new(
            "unit_configuredform",
            vec![
                FormType::builder()
                    .key("contact")
                    .label("contact form")
                    .regions(vec![Region::new("form", "form")])
                    .build()
                    .unwrap(),
                FormType::builder()
                    .key("dynamic")
                    .label("dynamic")
                    .regions_fn(|form: &ConfiguredForm| {
                        CALLS.fetch_add(1, Ordering::SeqCst);
                        vec![Region::new(form.name.to_lowercase(), form.name.clone())]
                    })
                    .build()
                    .unwrap(),
                FormType::builder()
                    .key("broken")
                    .label("broken")
                    .attr("regions", "unit.not.registered")
                    .build()
                    .unwrap(),
            ],
        )
    });

    #[test]
    fn test_choices_and_lookup() {
        assert_eq!(
            META.choices(),
            vec![("contact", "contact form"), ("dynamic", "dynamic"), ("broken", "broken")]
        );
        assert_eq!(META.form_type("contact").unwrap().label(), "contact form");
        assert!(META.form_type("nope").is_none());
    }

    #[test]
    fn test_static_regions() {
        let form = ConfiguredForm::new(&META, "Contact", "contact");
        assert_eq!(form.regions(), &[Region::new("form", "form")]);
    }

    #[test]
    fn test_dynamic_regions_are_cached() {
        let form = ConfiguredForm::new(&META, "Main", "dynamic");
        let before = CALLS.load(Ordering::SeqCst);
        assert_eq!(form.regions()[0].key, "main");
        assert_eq!(form.regions()[0].title, "Main");
        assert_eq!(CALLS.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn test_unknown_type_has_no_regions() {
        assert!(ConfiguredForm::new(&META, "x", "unknown").regions().is_empty());
        assert!(ConfiguredForm::new(&META, "x", "broken").regions().is_empty());
    }

    #[test]
    fn test_require_type() {
        assert!(ConfiguredForm::new(&META, "x", "contact").require_type().is_ok());
        let err = ConfiguredForm::new(&META, "x", "unknown").require_type().unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_clean_fields() {
        assert!(ConfiguredForm::new(&META, "ok", "contact").clean_fields(None).is_ok());

        let err = ConfiguredForm::new(&META, "ok", "unknown")
            .clean_fields(None)
            .unwrap_err();
        assert!(err.field_errors.contains_key("form_type"));

        let err = ConfiguredForm::new(&META, "x".repeat(1001), "contact")
            .clean_fields(Some(&["name"]))
            .unwrap_err();
        assert!(err.field_errors.is_empty());
        assert!(err.message.contains("at most 1000"));
    }

    #[test]
    fn test_display_is_name() {
        assert_eq!(ConfiguredForm::new(&META, "Hello", "contact").to_string(), "Hello");
    }

    #[test]
    fn test_create_table_sql() {
        let sql = META.create_table_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"unit_configuredform\""));
        assert!(sql.contains("\"form_type\" varchar(100)"));
    }
}
