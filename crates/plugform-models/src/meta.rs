//! Plugin metadata and the columns every plugin table shares.
//!
//! Each plugin type stores its rows in a table of its own. [`PluginMeta`]
//! describes one such type: its table, its label, the static class
//! attributes the union query may inject for missing columns, and (for
//! proxy types sharing a table) the `type` tag that selects its rows.
//! [`PluginKind`] pairs that metadata with the constructor turning a row
//! into a live plugin.

use std::collections::BTreeMap;

use plugform_core::PlugformResult;
use plugform_db::{ColumnDef, ColumnType, DatabaseBackend, Row, TableDef, Value};

use crate::plugin::FormFieldPlugin;

/// Column linking a plugin row to its configured form.
pub const PARENT_COLUMN: &str = "parent_id";
/// Column holding the layout region a row is placed in.
pub const REGION_COLUMN: &str = "region";
/// Column holding a row's position, maintained by the content editor.
pub const ORDERING_COLUMN: &str = "ordering";
/// Column holding a form-field plugin's name.
pub const NAME_COLUMN: &str = "name";
/// Column and class attribute holding a plugin's type tag.
pub const TYPE_COLUMN: &str = "type";

/// Returns the `id`, `parent_id`, `region` and `ordering` columns.
pub fn base_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("id", ColumnType::AutoField),
        ColumnDef::new(PARENT_COLUMN, ColumnType::Integer),
        ColumnDef::new(REGION_COLUMN, ColumnType::Varchar(255)),
        ColumnDef::new(ORDERING_COLUMN, ColumnType::Integer).default(0_i64),
    ]
}

/// The content-editor columns of a plugin row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PluginBase {
    /// Primary key, `None` until saved.
    pub id: Option<i64>,
    /// The owning configured form.
    pub parent_id: i64,
    /// The region the row is placed in.
    pub region: String,
    /// Position within the configured form.
    pub ordering: i64,
}

impl PluginBase {
    /// Creates an unsaved base.
    pub fn new(parent_id: i64, region: impl Into<String>, ordering: i64) -> Self {
        Self {
            id: None,
            parent_id,
            region: region.into(),
            ordering,
        }
    }

    /// Reads the base columns from a row.
    pub fn from_row(row: &Row) -> PlugformResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            parent_id: row.get(PARENT_COLUMN)?,
            region: row.get(REGION_COLUMN)?,
            ordering: row.get(ORDERING_COLUMN)?,
        })
    }

    /// Returns the base column values, excluding the primary key.
    pub fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            (PARENT_COLUMN, Value::Int(self.parent_id)),
            (REGION_COLUMN, Value::from(self.region.as_str())),
            (ORDERING_COLUMN, Value::Int(self.ordering)),
        ]
    }
}

/// Static metadata of one plugin type.
///
/// # Examples
///
/// ```
/// use plugform_db::{ColumnDef, ColumnType, TableDef, Value};
/// use plugform_models::meta::{base_columns, PluginMeta};
///
/// let meta = PluginMeta::new(
///     "testapp",
///     "rating",
///     TableDef::new("testapp_rating")
///         .columns(base_columns())
///         .column(ColumnDef::new("name", ColumnType::Varchar(50))),
/// )
/// .form_field();
/// assert_eq!(meta.label_lower(), "testapp.rating");
/// assert!(meta.is_form_field());
/// assert_eq!(meta.class_attr_value("type"), Some(Value::from("rating")));
/// ```
#[derive(Debug, Clone)]
pub struct PluginMeta {
    /// The application the plugin type belongs to.
    pub app_label: &'static str,
    /// The lowercase type name.
    pub model_name: &'static str,
    /// Human-readable name.
    pub verbose_name: String,
    /// The backing table.
    pub table: TableDef,
    /// Static attributes of the type, readable where no column exists.
    pub class_attrs: BTreeMap<String, Value>,
    /// For proxy types: the `type` value identifying this type's rows.
    pub proxy_type: Option<String>,
    /// Whether the type is a labelled form field taking part in the
    /// form-fields union.
    pub form_field: bool,
}

impl PluginMeta {
    /// Creates metadata for a plugin type backed by `table`.
    pub fn new(app_label: &'static str, model_name: &'static str, table: TableDef) -> Self {
        Self {
            app_label,
            model_name,
            verbose_name: model_name.to_string(),
            table,
            class_attrs: BTreeMap::new(),
            proxy_type: None,
            form_field: false,
        }
    }

    /// Sets the human-readable name.
    #[must_use]
    pub fn verbose_name(mut self, verbose_name: impl Into<String>) -> Self {
        self.verbose_name = verbose_name.into();
        self
    }

    /// Declares a static class attribute.
    #[must_use]
    pub fn class_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.class_attrs.insert(name.into(), value.into());
        self
    }

    /// Marks this type as a proxy whose rows carry `type_tag` in the `type`
    /// column of a shared table.
    #[must_use]
    pub fn proxy(mut self, type_tag: impl Into<String>) -> Self {
        self.proxy_type = Some(type_tag.into());
        self
    }

    /// Marks this type as a labelled form field.
    #[must_use]
    pub fn form_field(mut self) -> Self {
        self.form_field = true;
        self
    }

    /// Returns `app_label.model_name`.
    pub fn label_lower(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }

    /// Returns the table name.
    pub fn db_table(&self) -> &str {
        &self.table.db_table
    }

    /// Returns `true` for types marked with [`form_field`](Self::form_field).
    ///
    /// Carrying a `name` column is not enough: a date range names its
    /// values but is no form field.
    pub const fn is_form_field(&self) -> bool {
        self.form_field
    }

    /// Returns `true` if the table has the given column.
    pub fn has_column(&self, name: &str) -> bool {
        self.table.has_column(name)
    }

    /// Returns the value of a static class attribute.
    ///
    /// Form-field types without an explicit `type` attribute report their
    /// lowercase type name.
    pub fn class_attr_value(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.class_attrs.get(name) {
            return Some(value.clone());
        }
        if name == TYPE_COLUMN && self.is_form_field() {
            return Some(Value::from(self.model_name));
        }
        None
    }

    /// Returns the equality filters selecting this type's rows of one
    /// configured form.
    pub fn parent_filters(&self, parent_id: i64) -> Vec<(&'static str, Value)> {
        let mut filters = vec![(PARENT_COLUMN, Value::Int(parent_id))];
        if let Some(tag) = &self.proxy_type {
            filters.push((TYPE_COLUMN, Value::from(tag.as_str())));
        }
        filters
    }

    /// Returns a `SELECT` of this type's rows of one configured form, in
    /// editor order, with its parameters.
    pub fn select_for_parent(&self, parent_id: i64) -> (String, Vec<Value>) {
        let filters = self.parent_filters(parent_id);
        let clause: Vec<String> = filters.iter().map(|(c, _)| format!("\"{c}\" = ?")).collect();
        let sql = self
            .table
            .select_sql(Some(&clause.join(" AND ")), &[ORDERING_COLUMN, "id"]);
        (sql, filters.into_iter().map(|(_, v)| v).collect())
    }

    /// Returns the `CREATE TABLE` statement of the backing table.
    pub fn create_table_sql(&self) -> String {
        self.table.create_table_sql()
    }

    /// Inserts a row and returns its primary key.
    ///
    /// Proxy types always store their own tag in the `type` column.
    pub fn insert(
        &self,
        db: &dyn DatabaseBackend,
        values: Vec<(&'static str, Value)>,
    ) -> PlugformResult<i64> {
        let mut values = values;
        if let Some(tag) = &self.proxy_type {
            values.retain(|(c, _)| *c != TYPE_COLUMN);
            values.push((TYPE_COLUMN, Value::from(tag.as_str())));
        }
        let columns: Vec<&str> = values.iter().map(|(c, _)| *c).collect();
        let sql = self.table.insert_sql(&columns);
        let params: Vec<Value> = values.into_iter().map(|(_, v)| v).collect();
        let id = db.insert(&sql, &params)?;
        tracing::debug!(plugin = %self.label_lower(), id, "inserted plugin row");
        Ok(id)
    }
}

/// Builds a live plugin from a row of its table.
pub type RowConstructor =
    fn(&'static PluginMeta, &Row) -> PlugformResult<Box<dyn FormFieldPlugin>>;

/// A plugin type: its metadata plus its row constructor.
#[derive(Clone, Copy)]
pub struct PluginKind {
    /// The type's metadata.
    pub meta: &'static PluginMeta,
    /// Turns a (type-coerced) row into a plugin.
    pub from_row: RowConstructor,
}

impl PluginKind {
    /// Pairs metadata with a constructor.
    pub const fn new(meta: &'static PluginMeta, from_row: RowConstructor) -> Self {
        Self { meta, from_row }
    }

    /// Builds a plugin from a raw row, coercing values to the column types
    /// first.
    pub fn instantiate(&self, row: Row) -> PlugformResult<Box<dyn FormFieldPlugin>> {
        let (columns, values): (Vec<String>, Vec<Value>) =
            self.meta.table.coerce_row(row.into_pairs()).into_iter().unzip();
        (self.from_row)(self.meta, &Row::new(columns, values))
    }
}

impl std::fmt::Debug for PluginKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginKind")
            .field("plugin", &self.meta.label_lower())
            .field("proxy_type", &self.meta.proxy_type)
            .finish_non_exhaustive()
    }
}
