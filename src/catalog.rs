//! Schema catalog read at startup: base tables and their columns.

use sqlx::PgPool;
use std::collections::HashMap;

/// Primary key column every exposed table is addressed by.
pub const ID_COLUMN: &str = "id";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// PostgreSQL type name (information_schema `udt_name`, e.g. "int4", "varchar"). Used for parameter casts.
    pub udt_name: String,
    /// Schema the type lives in (information_schema `udt_schema`).
    pub udt_schema: String,
    /// information_schema `data_type` (e.g. "integer", "USER-DEFINED", "ARRAY").
    pub data_type: String,
}

/// Schema of the built-in types. Always on the search path.
pub const BUILTIN_TYPE_SCHEMA: &str = "pg_catalog";

/// Built-in types that row decoding turns into JSON natively.
const NATIVE_TYPES: &[&str] = &[
    "int2", "int4", "int8", "float4", "float8", "bool", "uuid", "timestamptz", "timestamp", "date", "time", "text",
    "varchar", "bpchar", "name", "json", "jsonb",
];

/// How a column appears in a SELECT or RETURNING list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Projection {
    /// The column as-is.
    Native,
    /// `col::text`, for types without a native decoding (numeric, enums, interval, inet, ...).
    Text,
    /// `to_jsonb(col)`, for arrays.
    Json,
}

impl ColumnInfo {
    /// A column of a built-in type.
    pub fn new(name: &str, udt_name: &str, data_type: &str) -> Self {
        ColumnInfo {
            name: name.to_string(),
            udt_name: udt_name.to_string(),
            udt_schema: BUILTIN_TYPE_SCHEMA.to_string(),
            data_type: data_type.to_string(),
        }
    }

    pub fn with_udt_schema(mut self, schema: &str) -> Self {
        self.udt_schema = schema.to_string();
        self
    }

    pub fn is_array(&self) -> bool {
        self.data_type == "ARRAY"
    }

    pub fn is_builtin_type(&self) -> bool {
        self.udt_schema.is_empty() || self.udt_schema == BUILTIN_TYPE_SCHEMA
    }

    pub fn projection(&self) -> Projection {
        if self.is_array() {
            Projection::Json
        } else if self.data_type != "USER-DEFINED" && NATIVE_TYPES.contains(&self.udt_name.as_str()) {
            Projection::Native
        } else {
            Projection::Text
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableMeta {
    pub schema_name: String,
    pub table_name: String,
    /// Columns in ordinal order.
    pub columns: Vec<ColumnInfo>,
}

impl TableMeta {
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Base tables of one schema, ordered by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    pub tables: Vec<TableMeta>,
}

impl Catalog {
    pub fn table(&self, name: &str) -> Option<&TableMeta> {
        self.tables.iter().find(|t| t.table_name == name)
    }
}

/// Read base tables (views excluded) and their columns from information_schema.
/// Tables named in `excluded` (case-insensitive) are skipped.
pub async fn load_catalog(pool: &PgPool, schema: &str, excluded: &[String]) -> Result<Catalog, sqlx::Error> {
    let table_names = sqlx::query_as::<_, (String,)>(
        "SELECT table_name::text FROM information_schema.tables \
         WHERE table_schema = $1 AND table_type = 'BASE TABLE' \
         ORDER BY table_name",
    )
    .bind(schema)
    .fetch_all(pool)
    .await?;

    let column_rows = sqlx::query_as::<_, (String, String, String, String, String)>(
        "SELECT table_name::text, column_name::text, udt_name::text, udt_schema::text, data_type::text \
         FROM information_schema.columns \
         WHERE table_schema = $1 \
         ORDER BY table_name, ordinal_position",
    )
    .bind(schema)
    .fetch_all(pool)
    .await?;

    let mut columns_by_table: HashMap<String, Vec<ColumnInfo>> = HashMap::new();
    for (table, column, udt_name, udt_schema, data_type) in column_rows {
        columns_by_table.entry(table).or_default().push(ColumnInfo {
            name: column,
            udt_name,
            udt_schema,
            data_type,
        });
    }

    let tables = table_names
        .into_iter()
        .map(|(name,)| name)
        .filter(|name| !excluded.iter().any(|e| e.eq_ignore_ascii_case(name)))
        .map(|name| TableMeta {
            schema_name: schema.to_string(),
            columns: columns_by_table.remove(&name).unwrap_or_default(),
            table_name: name,
        })
        .collect();

    Ok(Catalog { tables })
}
