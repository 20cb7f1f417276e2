//! Builds parameterized INSERT, SELECT, UPDATE, DELETE for a catalog table.

use crate::catalog::{ColumnInfo, Projection, TableMeta, ID_COLUMN};
use crate::error::AppError;
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(table: &TableMeta) -> String {
    format!("{}.{}", quoted(&table.schema_name), quoted(&table.table_name))
}

/// Type name for a cast. Types outside pg_catalog are schema-qualified so they resolve whatever the search path.
fn column_type(c: &ColumnInfo) -> String {
    if c.is_builtin_type() {
        quoted(&c.udt_name)
    } else {
        format!("{}.{}", quoted(&c.udt_schema), quoted(&c.udt_name))
    }
}

/// PostgreSQL array literal for a JSON array, e.g. `["a", null, "b\"c"]` -> `{"a",NULL,"b\"c"}`.
/// Nested arrays become nested literals; the column cast parses the elements.
fn array_literal(items: &[Value]) -> String {
    let elems: Vec<String> = items
        .iter()
        .map(|v| match v {
            Value::Null => "NULL".to_string(),
            Value::Array(inner) => array_literal(inner),
            Value::String(s) => array_element(s),
            other => array_element(&other.to_string()),
        })
        .collect();
    format!("{{{}}}", elems.join(","))
}

fn array_element(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Push a value and return its placeholder, cast to the column type when known.
    /// JSON arrays bound to array columns travel as array literals.
    fn push_param(&mut self, v: Value, column: Option<&ColumnInfo>) -> String {
        let v = match (v, column) {
            (Value::Array(items), Some(c)) if c.is_array() => Value::String(array_literal(&items)),
            (v, _) => v,
        };
        self.params.push(v);
        let n = self.params.len();
        match column {
            Some(c) => format!("${}::{}", n, column_type(c)),
            None => format!("${}", n),
        }
    }
}

/// Resolve a caller-supplied key to a known column. Unknown keys never reach identifier position.
fn known_column<'a>(table: &'a TableMeta, key: &str) -> Result<&'a ColumnInfo, AppError> {
    table
        .column(key)
        .ok_or_else(|| AppError::BadRequest(format!("unknown column: {}", key)))
}

/// SELECT list: natively decodable columns as-is, arrays through to_jsonb, everything else as col::text.
/// Falls back to `*` for a table with no visible columns.
fn select_column_list(table: &TableMeta) -> String {
    if table.columns.is_empty() {
        return "*".into();
    }
    table
        .columns
        .iter()
        .map(|c| {
            let q = quoted(&c.name);
            match c.projection() {
                Projection::Native => q,
                Projection::Text => format!("{}::text AS {}", q, q),
                Projection::Json => format!("to_jsonb({}) AS {}", q, q),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn id_predicate(q: &mut QueryBuf, table: &TableMeta, id: &str) -> String {
    let ph = q.push_param(Value::String(id.to_string()), table.column(ID_COLUMN));
    format!("{} = {}", quoted(ID_COLUMN), ph)
}

/// SELECT with one ANDed equality predicate per filter, in filter order. Ordered by id when the table has one.
pub fn select_list(table: &TableMeta, filters: &[(String, String)]) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::with_capacity(filters.len());
    for (key, val) in filters {
        let col = known_column(table, key)?;
        let ph = q.push_param(Value::String(val.clone()), Some(col));
        where_parts.push(format!("{} = {}", quoted(&col.name), ph));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let order_clause = if table.column(ID_COLUMN).is_some() {
        format!(" ORDER BY {}", quoted(ID_COLUMN))
    } else {
        String::new()
    };
    q.sql = format!(
        "SELECT {} FROM {}{}{}",
        select_column_list(table),
        qualified_table(table),
        where_clause,
        order_clause
    );
    Ok(q)
}

/// SELECT by primary key.
pub fn select_by_id(table: &TableMeta, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let pred = id_predicate(&mut q, table, id);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {}",
        select_column_list(table),
        qualified_table(table),
        pred
    );
    q
}

/// INSERT over exactly the body's keys. Caller rejects an empty body.
pub fn insert(table: &TableMeta, body: &Map<String, Value>) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let mut cols = Vec::with_capacity(body.len());
    let mut placeholders = Vec::with_capacity(body.len());
    for (key, val) in body {
        let col = known_column(table, key)?;
        placeholders.push(q.push_param(val.clone(), Some(col)));
        cols.push(quoted(&col.name));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        qualified_table(table),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(table)
    );
    Ok(q)
}

/// UPDATE by id: SET exactly the body's keys; the id is the last parameter.
pub fn update(table: &TableMeta, id: &str, body: &Map<String, Value>) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let mut sets = Vec::with_capacity(body.len());
    for (key, val) in body {
        let col = known_column(table, key)?;
        let ph = q.push_param(val.clone(), Some(col));
        sets.push(format!("{} = {}", quoted(&col.name), ph));
    }
    let pred = id_predicate(&mut q, table, id);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} RETURNING {}",
        qualified_table(table),
        sets.join(", "),
        pred,
        select_column_list(table)
    );
    Ok(q)
}

/// DELETE by id.
pub fn delete(table: &TableMeta, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let pred = id_predicate(&mut q, table, id);
    q.sql = format!(
        "DELETE FROM {} WHERE {} RETURNING {}",
        qualified_table(table),
        pred,
        select_column_list(table)
    );
    q
}
