//! Values projections and `UNION ALL` compilation.
//!
//! A [`ValuesQuery`] selects a list of aliased projections from one table,
//! restricted by equality filters. Each projection is either a real column
//! or a literal bound as a parameter. A [`UnionQuery`] concatenates several
//! values queries of the same arity.
//!
//! Every projection carries an explicit alias. Callers read results back
//! by alias, never by the order in which a storage engine happens to
//! return columns.

use crate::value::Value;

/// What a single output column of a [`ValuesQuery`] is computed from.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// A column of the queried table.
    Column(String),
    /// A constant, bound as a query parameter.
    Literal(Value),
}

impl Projection {
    /// Projects the named column.
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(name.into())
    }

    /// Projects a constant value.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }
}

/// A `SELECT <projections> FROM <table> WHERE <filters>` query.
///
/// # Examples
///
/// ```
/// use plugform_db::query::{Projection, ValuesQuery};
///
/// let (sql, params) = ValuesQuery::new("testapp_duration")
///     .project("name", Projection::column("name"))
///     .project("__val_0", Projection::literal(false))
///     .filter("parent_id", 1_i64)
///     .compile();
///
/// assert_eq!(
///     sql,
///     "SELECT \"name\" AS \"name\", ? AS \"__val_0\" FROM \"testapp_duration\" WHERE \"parent_id\" = ?"
/// );
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValuesQuery {
    table: String,
    projections: Vec<(String, Projection)>,
    filters: Vec<(String, Value)>,
}

impl ValuesQuery {
    /// Creates a query against `table` with no projections.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            projections: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Appends a projection under the given alias.
    #[must_use]
    pub fn project(mut self, alias: impl Into<String>, projection: Projection) -> Self {
        self.projections.push((alias.into(), projection));
        self
    }

    /// Adds an equality filter on a column.
    #[must_use]
    pub fn filter(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    /// Returns the table this query reads.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the output aliases in projection order.
    pub fn aliases(&self) -> Vec<&str> {
        self.projections.iter().map(|(a, _)| a.as_str()).collect()
    }

    /// Returns the number of output columns.
    pub fn arity(&self) -> usize {
        self.projections.len()
    }

    /// Compiles the query to SQL with `?` placeholders and its parameters.
    ///
    /// Literal parameters come first, in projection order, followed by the
    /// filter parameters.
    pub fn compile(&self) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let select: Vec<String> = self
            .projections
            .iter()
            .map(|(alias, projection)| match projection {
                Projection::Column(column) => format!("\"{column}\" AS \"{alias}\""),
                Projection::Literal(value) => {
                    params.push(value.clone());
                    format!("? AS \"{alias}\"")
                }
            })
            .collect();

        let mut sql = format!("SELECT {} FROM \"{}\"", select.join(", "), self.table);
        if !self.filters.is_empty() {
            let clauses: Vec<String> = self
                .filters
                .iter()
                .map(|(column, value)| {
                    params.push(value.clone());
                    format!("\"{column}\" = ?")
                })
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        (sql, params)
    }
}

/// Several [`ValuesQuery`]s combined with `UNION ALL`.
///
/// Duplicates are preserved. An optional `ORDER BY` applies to the combined
/// result and must name output aliases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnionQuery {
    parts: Vec<ValuesQuery>,
    order_by: Vec<String>,
}

impl UnionQuery {
    /// Creates an empty union.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a part.
    ///
    /// # Panics
    ///
    /// Panics if the part's arity differs from the parts already added.
    #[must_use]
    pub fn union_all(mut self, part: ValuesQuery) -> Self {
        if let Some(first) = self.parts.first() {
            assert_eq!(
                first.arity(),
                part.arity(),
                "UNION ALL parts must project the same number of columns"
            );
        }
        self.parts.push(part);
        self
    }

    /// Orders the combined result by the given output aliases.
    #[must_use]
    pub fn order_by(mut self, aliases: &[&str]) -> Self {
        self.order_by = aliases.iter().map(|a| (*a).to_string()).collect();
        self
    }

    /// Returns the combined parts.
    pub fn parts(&self) -> &[ValuesQuery] {
        &self.parts
    }

    /// Returns `true` if no part was added.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Compiles the union, or returns `None` when it has no parts.
    pub fn compile(&self) -> Option<(String, Vec<Value>)> {
        if self.parts.is_empty() {
            return None;
        }
        let mut params = Vec::new();
        let mut selects = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            let (sql, part_params) = part.compile();
            selects.push(sql);
            params.extend(part_params);
        }
        let mut sql = selects.join(" UNION ALL ");
        if !self.order_by.is_empty() {
            let cols: Vec<String> = self.order_by.iter().map(|c| format!("\"{c}\"")).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&cols.join(", "));
        }
        tracing::debug!(parts = self.parts.len(), %sql, "compiled union query");
        Some((sql, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(table: &str, parent: i64) -> ValuesQuery {
        ValuesQuery::new(table)
            .project("name", Projection::column("name"))
            .project("__val_0", Projection::column("label"))
            .filter("parent_id", parent)
    }

    #[test]
    fn test_values_query_columns_only() {
        let (sql, params) = part("a", 3).compile();
        assert_eq!(
            sql,
            "SELECT \"name\" AS \"name\", \"label\" AS \"__val_0\" FROM \"a\" WHERE \"parent_id\" = ?"
        );
        assert_eq!(params, vec![Value::Int(3)]);
    }

    #[test]
    fn test_values_query_param_order() {
        let (_, params) = ValuesQuery::new("t")
            .project("x", Projection::literal("lit"))
            .project("y", Projection::literal(false))
            .filter("parent_id", 1_i64)
            .filter("type", "select")
            .compile();
        assert_eq!(
            params,
            vec![
                Value::from("lit"),
                Value::Bool(false),
                Value::Int(1),
                Value::from("select"),
            ]
        );
    }

    #[test]
    fn test_values_query_without_filters() {
        let (sql, params) = ValuesQuery::new("t")
            .project("name", Projection::column("name"))
            .compile();
        assert_eq!(sql, "SELECT \"name\" AS \"name\" FROM \"t\"");
        assert!(params.is_empty());
    }

    #[test]
    fn test_aliases() {
        assert_eq!(part("a", 1).aliases(), vec!["name", "__val_0"]);
    }

    #[test]
    fn test_union_all_compile() {
        let union = UnionQuery::new()
            .union_all(part("a", 1))
            .union_all(part("b", 1))
            .order_by(&["name"]);
        let (sql, params) = union.compile().unwrap();
        assert_eq!(sql.matches(" UNION ALL ").count(), 1);
        assert!(!sql.contains("UNION SELECT"));
        assert!(sql.ends_with(" ORDER BY \"name\""));
        assert!(sql.find("ORDER BY").unwrap() > sql.find("UNION ALL").unwrap());
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_union_empty() {
        assert!(UnionQuery::new().compile().is_none());
        assert!(UnionQuery::new().is_empty());
    }

    #[test]
    #[should_panic(expected = "same number of columns")]
    fn test_union_arity_mismatch_panics() {
        let narrow = ValuesQuery::new("c").project("name", Projection::column("name"));
        let _ = UnionQuery::new().union_all(part("a", 1)).union_all(narrow);
    }
}
