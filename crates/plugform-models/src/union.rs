//! The form-fields union query.
//!
//! Form-field plugins of different types live in different tables. The
//! union query reads the rows of one configured form from all of them at
//! once, producing `(name, {attribute: value})` pairs in editor order.
//!
//! Each requested attribute is projected per table as
//!
//! 1. the table's column of that name, else
//! 2. the plugin type's static class attribute as a literal, else
//! 3. the attribute's default (see [`field_default`]).
//!
//! Attributes are projected under positional aliases (`__val_0`, ...) and
//! read back by alias, so the result never depends on the column order a
//! storage engine returns.

use std::collections::BTreeMap;

use plugform_core::PlugformResult;
use plugform_db::{ColumnType, DatabaseBackend, Projection, Row, UnionQuery, Value, ValuesQuery};

use crate::configured_form::ConfiguredForm;
use crate::meta::{PluginKind, NAME_COLUMN, ORDERING_COLUMN};

const PART_ALIAS: &str = "__part";
const ORDERING_ALIAS: &str = "__ordering";
const ID_ALIAS: &str = "__id";

/// Attributes whose default is `false` rather than the empty string.
pub const BOOLEAN_DEFAULTS: [&str; 3] =
    ["is_collapsible", "is_collapse_below", "is_collapsed_by_default"];

/// One `(name, attributes)` entry of the union.
pub type UnionRow = (String, BTreeMap<String, Value>);

/// Returns the value (and its type) projected for an attribute that is
/// neither a column nor a class attribute of a plugin type.
///
/// ```
/// use plugform_db::{ColumnType, Value};
/// use plugform_models::union::field_default;
///
/// assert_eq!(field_default("is_collapsible"), (Value::Bool(false), ColumnType::Boolean));
/// assert_eq!(field_default("label"), (Value::from(""), ColumnType::Text));
/// ```
pub fn field_default(attribute: &str) -> (Value, ColumnType) {
    if BOOLEAN_DEFAULTS.contains(&attribute) {
        (Value::Bool(false), ColumnType::Boolean)
    } else {
        (Value::String(String::new()), ColumnType::Text)
    }
}

fn literal_type(value: &Value) -> ColumnType {
    match value {
        Value::Bool(_) => ColumnType::Boolean,
        Value::Int(_) => ColumnType::Integer,
        Value::Date(_) => ColumnType::Date,
        _ => ColumnType::Text,
    }
}

/// The compiled shape of a union: the query plus, per part, the type each
/// attribute alias was projected with.
#[derive(Debug, Clone)]
pub struct UnionPlan {
    query: UnionQuery,
    attributes: Vec<String>,
    part_types: Vec<Vec<ColumnType>>,
}

impl UnionPlan {
    /// Plans the union of `plugins` rows belonging to `parent_id`.
    ///
    /// Only plugin types marked as form fields take part.
    pub fn new(parent_id: i64, plugins: &[PluginKind], attributes: &[&str]) -> Self {
        let mut query = UnionQuery::new();
        let mut part_types = Vec::new();

        for kind in plugins.iter().filter(|k| k.meta.is_form_field()) {
            let meta = kind.meta;
            let mut part = ValuesQuery::new(meta.db_table())
                .project(NAME_COLUMN, Projection::column(NAME_COLUMN));
            let mut types = Vec::with_capacity(attributes.len());

            for (idx, attribute) in attributes.iter().enumerate() {
                let (projection, column_type) = if let Some(column) = meta.table.get_column(attribute) {
                    (Projection::column(*attribute), column.column_type)
                } else if let Some(value) = meta
                    .class_attr_value(attribute)
                    .filter(|v| !matches!(v, Value::Null))
                {
                    let column_type = literal_type(&value);
                    (Projection::Literal(value), column_type)
                } else {
                    let (value, column_type) = field_default(attribute);
                    (Projection::Literal(value), column_type)
                };
                part = part.project(format!("__val_{idx}"), projection);
                types.push(column_type);
            }

            let part_idx = i64::try_from(part_types.len()).unwrap_or(i64::MAX);
            part = part
                .project(PART_ALIAS, Projection::literal(part_idx))
                .project(ORDERING_ALIAS, Projection::column(ORDERING_COLUMN))
                .project(ID_ALIAS, Projection::column("id"));
            for (column, value) in meta.parent_filters(parent_id) {
                part = part.filter(column, value);
            }

            tracing::debug!(plugin = %meta.label_lower(), part = part_idx, "added union part");
            query = query.union_all(part);
            part_types.push(types);
        }

        Self {
            query: query.order_by(&[ORDERING_ALIAS, PART_ALIAS, ID_ALIAS]),
            attributes: attributes.iter().map(|a| (*a).to_string()).collect(),
            part_types,
        }
    }

    /// Returns the number of plugin tables taking part.
    pub fn part_count(&self) -> usize {
        self.part_types.len()
    }

    /// Compiles the union, or returns `None` when no plugin type takes part.
    pub fn compile(&self) -> Option<(String, Vec<Value>)> {
        self.query.compile()
    }

    /// Decodes one result row, coercing each attribute to the type of the
    /// part the row came from.
    pub fn decode(&self, row: &Row) -> PlugformResult<UnionRow> {
        let name: String = row.get(NAME_COLUMN)?;
        let part: i64 = row.get(PART_ALIAS)?;
        let types = usize::try_from(part)
            .ok()
            .and_then(|idx| self.part_types.get(idx));

        let attributes = self
            .attributes
            .iter()
            .enumerate()
            .map(|(idx, attribute)| {
                let value = row
                    .get_value(&format!("__val_{idx}"))
                    .cloned()
                    .unwrap_or(Value::Null);
                let value = match types {
                    Some(types) => types[idx].coerce(value),
                    None => value,
                };
                (attribute.clone(), value)
            })
            .collect();
        Ok((name, attributes))
    }

    /// Runs the union against `db`.
    pub fn execute(&self, db: &dyn DatabaseBackend) -> PlugformResult<Vec<UnionRow>> {
        let Some((sql, params)) = self.compile() else {
            return Ok(Vec::new());
        };
        db.query(&sql, &params)?
            .iter()
            .map(|row| self.decode(row))
            .collect()
    }
}

impl ConfiguredForm {
    /// Reads the form-field plugin rows of this form from every plugin
    /// table, in editor order, with the requested attributes.
    ///
    /// Duplicates are preserved: two rows sharing a name both appear.
    pub fn formfields_union(
        &self,
        db: &dyn DatabaseBackend,
        plugins: &[PluginKind],
        attributes: &[&str],
    ) -> PlugformResult<Vec<UnionRow>> {
        let parent_id = self.require_id()?;
        let rows = UnionPlan::new(parent_id, plugins, attributes).execute(db)?;
        tracing::debug!(configured_form = parent_id, rows = rows.len(), "loaded form fields union");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use plugform_db::{ColumnDef, TableDef};

    use super::*;
    use crate::meta::{base_columns, PluginMeta};
    use crate::plugin::FormFieldPlugin;

    fn unused(
        _: &'static PluginMeta,
        _: &Row,
    ) -> PlugformResult<Box<dyn FormFieldPlugin>> {
        unreachable!("plans never build plugins")
    }

    static TEXT: LazyLock<PluginMeta> = LazyLock::new(|| {
        PluginMeta::new(
            "unit",
            "simplefield",
            TableDef::new("unit_simplefield")
                .columns(base_columns())
                .column(ColumnDef::new("name", ColumnType::Varchar(50)))
                .column(ColumnDef::new("label", ColumnType::Varchar(1000)))
                .column(ColumnDef::new("type", ColumnType::Varchar(1000))),
        )
        .proxy("text")
        .form_field()
    });

    static RATING: LazyLock<PluginMeta> = LazyLock::new(|| {
        PluginMeta::new(
            "unit",
            "rating",
            TableDef::new("unit_rating")
                .columns(base_columns())
                .column(ColumnDef::new("name", ColumnType::Varchar(50))),
        )
        .class_attr("label", "Rating")
        .form_field()
    });

    // Named, but not a form field.
    static RANGE: LazyLock<PluginMeta> = LazyLock::new(|| {
        PluginMeta::new(
            "unit",
            "duration",
            TableDef::new("unit_duration")
                .columns(base_columns())
                .column(ColumnDef::new("name", ColumnType::Varchar(50))),
        )
    });

    static NOTE: LazyLock<PluginMeta> = LazyLock::new(|| {
        PluginMeta::new(
            "unit",
            "note",
            TableDef::new("unit_note")
                .columns(base_columns())
                .column(ColumnDef::new("text", ColumnType::Text)),
        )
    });

    fn kinds() -> Vec<PluginKind> {
        vec![
            PluginKind::new(&TEXT, unused),
            PluginKind::new(&NOTE, unused),
            PluginKind::new(&RANGE, unused),
            PluginKind::new(&RATING, unused),
        ]
    }

    #[test]
    fn test_skips_non_field_plugins() {
        let plan = UnionPlan::new(1, &kinds(), &["label"]);
        assert_eq!(plan.part_count(), 2);
        let (sql, _) = plan.compile().unwrap();
        assert!(!sql.contains("unit_note"));
        assert!(!sql.contains("unit_duration"));
        assert!(sql.contains("unit_rating"));
    }

    #[test]
    fn test_projection_resolution_order() {
        let plan = UnionPlan::new(7, &kinds(), &["label", "type", "is_collapsible", "color"]);
        let (sql, params) = plan.compile().unwrap();
        let parts: Vec<&str> = sql.split(" UNION ALL ").collect();
        assert_eq!(parts.len(), 2);

        // Real columns project directly.
        assert!(parts[0].contains("\"label\" AS \"__val_0\""));
        assert!(parts[0].contains("\"type\" AS \"__val_1\""));
        // Missing columns become literals.
        assert!(parts[0].contains("? AS \"__val_2\""));
        assert!(parts[1].contains("? AS \"__val_0\""));
        assert!(parts[0].contains("\"id\" AS \"__id\""));
        assert!(sql.ends_with("ORDER BY \"__ordering\", \"__part\", \"__id\""));

        assert_eq!(
            params,
            vec![
                // text part: is_collapsible, color, part index, parent, type
                Value::Bool(false),
                Value::from(""),
                Value::Int(0),
                Value::Int(7),
                Value::from("text"),
                // rating part: label, type, is_collapsible, color, part index, parent
                Value::from("Rating"),
                Value::from("rating"),
                Value::Bool(false),
                Value::from(""),
                Value::Int(1),
                Value::Int(7),
            ]
        );
    }

    #[test]
    fn test_decode_coerces_by_part() {
        let plan = UnionPlan::new(1, &kinds(), &["is_collapsible", "label"]);
        let row = Row::new(
            vec![
                "name".into(),
                "__val_0".into(),
                "__val_1".into(),
                "__part".into(),
                "__ordering".into(),
            ],
            vec![
                Value::from("stars"),
                Value::Int(0),
                Value::from("Rating"),
                Value::Int(1),
                Value::Int(3),
            ],
        );
        let (name, attrs) = plan.decode(&row).unwrap();
        assert_eq!(name, "stars");
        assert_eq!(attrs["is_collapsible"], Value::Bool(false));
        assert_eq!(attrs["label"], Value::from("Rating"));
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_no_attributes() {
        let plan = UnionPlan::new(1, &kinds(), &[]);
        let (sql, _) = plan.compile().unwrap();
        assert!(sql.starts_with("SELECT \"name\" AS \"name\", ? AS \"__part\""));
    }

    #[test]
    fn test_empty_plugin_list() {
        assert!(UnionPlan::new(1, &[], &["label"]).compile().is_none());
    }

    #[test]
    fn test_field_defaults_table() {
        for attribute in BOOLEAN_DEFAULTS {
            assert_eq!(field_default(attribute).0, Value::Bool(false));
        }
        assert_eq!(field_default("help_text").0, Value::from(""));
    }
}
