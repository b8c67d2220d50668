//! Table and column definitions.
//!
//! Every plugin type stores its rows in its own table. A [`TableDef`]
//! describes that table: its name, its columns, and their storage types.
//! The definitions drive three things: `CREATE TABLE` DDL, `INSERT`
//! statements, and the decision whether a plugin table takes part in a
//! union query at all (it must carry a `name` column).

use crate::value::Value;

/// The storage type of a column.
///
/// The column type also decides how raw backend values are coerced back
/// into [`Value`]s: SQLite, for instance, returns booleans as integers and
/// dates as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ColumnType {
    /// Auto-incrementing integer primary key.
    AutoField,
    /// Signed integer.
    Integer,
    /// Boolean.
    Boolean,
    /// Bounded string.
    Varchar(u32),
    /// Unbounded text.
    Text,
    /// Date without time.
    Date,
}

impl ColumnType {
    /// Returns the SQLite type fragment used in DDL.
    pub fn sql_type(self) -> String {
        match self {
            Self::AutoField => "integer".to_string(),
            Self::Integer => "integer".to_string(),
            Self::Boolean => "bool".to_string(),
            Self::Varchar(n) => format!("varchar({n})"),
            Self::Text => "text".to_string(),
            Self::Date => "date".to_string(),
        }
    }

    /// Converts a raw backend value into the value this column holds.
    ///
    /// Unknown shapes are passed through unchanged.
    pub fn coerce(self, value: Value) -> Value {
        match (self, value) {
            (Self::Boolean, Value::Int(i)) => Value::Bool(i != 0),
            (Self::Date, Value::String(s)) => match s.parse::<chrono::NaiveDate>() {
                Ok(d) => Value::Date(d),
                Err(_) => Value::String(s),
            },
            (_, other) => other,
        }
    }
}

/// A single column of a [`TableDef`].
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// The column name.
    pub name: String,
    /// The storage type.
    pub column_type: ColumnType,
    /// Whether NULL is allowed.
    pub null: bool,
    /// The DDL default, if any.
    pub default: Option<Value>,
}

impl ColumnDef {
    /// Creates a non-null column without default.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            null: false,
            default: None,
        }
    }

    /// Allows NULL in this column.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    /// Sets the DDL default.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Returns the column definition fragment of a `CREATE TABLE` statement.
    pub fn column_sql(&self) -> String {
        let mut sql = format!("\"{}\" {}", self.name, self.column_type.sql_type());
        if self.column_type == ColumnType::AutoField {
            sql.push_str(" NOT NULL PRIMARY KEY AUTOINCREMENT");
            return sql;
        }
        if !self.null {
            sql.push_str(" NOT NULL");
        }
        sql.push_str(&default_sql(self.default.as_ref()));
        sql
    }
}

fn default_sql(default: Option<&Value>) -> String {
    match default {
        Some(Value::Null) => " DEFAULT NULL".to_string(),
        Some(Value::Bool(b)) => format!(" DEFAULT {}", i32::from(*b)),
        Some(Value::Int(i)) => format!(" DEFAULT {i}"),
        Some(Value::Float(f)) => format!(" DEFAULT {f}"),
        Some(Value::String(s)) => format!(" DEFAULT '{}'", s.replace('\'', "''")),
        Some(_) | None => String::new(),
    }
}

/// A table definition.
///
/// # Examples
///
/// ```
/// use plugform_db::schema::{ColumnDef, ColumnType, TableDef};
///
/// let table = TableDef::new("testapp_duration")
///     .column(ColumnDef::new("id", ColumnType::AutoField))
///     .column(ColumnDef::new("name", ColumnType::Varchar(50)));
///
/// assert!(table.has_column("name"));
/// assert!(table.create_table_sql().starts_with("CREATE TABLE IF NOT EXISTS \"testapp_duration\""));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    /// The table name.
    pub db_table: String,
    /// The columns, in declaration order.
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    /// Creates a table without columns.
    pub fn new(db_table: impl Into<String>) -> Self {
        Self {
            db_table: db_table.into(),
            columns: Vec::new(),
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends several columns.
    #[must_use]
    pub fn columns(mut self, columns: impl IntoIterator<Item = ColumnDef>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Returns the column with the given name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns `true` if the table has a column with the given name.
    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Returns the names of all columns in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns the `CREATE TABLE IF NOT EXISTS` statement for this table.
    pub fn create_table_sql(&self) -> String {
        let body: Vec<String> = self.columns.iter().map(ColumnDef::column_sql).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" ({})",
            self.db_table,
            body.join(", ")
        )
    }

    /// Returns an `INSERT` statement for the given columns with `?`
    /// placeholders.
    pub fn insert_sql(&self, columns: &[&str]) -> String {
        let names: Vec<String> = columns.iter().map(|c| format!("\"{c}\"")).collect();
        let placeholders = vec!["?"; columns.len()];
        format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            self.db_table,
            names.join(", "),
            placeholders.join(", ")
        )
    }

    /// Returns a `SELECT` of every column, filtered by the given `WHERE`
    /// clause (without the keyword), ordered by `order_by`.
    pub fn select_sql(&self, where_clause: Option<&str>, order_by: &[&str]) -> String {
        let names: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("\"{}\"", c.name))
            .collect();
        let mut sql = format!("SELECT {} FROM \"{}\"", names.join(", "), self.db_table);
        if let Some(clause) = where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(clause);
        }
        if !order_by.is_empty() {
            let cols: Vec<String> = order_by.iter().map(|c| format!("\"{c}\"")).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&cols.join(", "));
        }
        sql
    }

    /// Coerces every value of a row according to its column's type.
    pub fn coerce_row(&self, pairs: impl IntoIterator<Item = (String, Value)>) -> Vec<(String, Value)> {
        pairs
            .into_iter()
            .map(|(name, value)| {
                let value = match self.get_column(&name) {
                    Some(column) => column.column_type.coerce(value),
                    None => value,
                };
                (name, value)
            })
            .collect()
    }
}
