//! Generic CRUD execution against PostgreSQL.

use crate::catalog::TableMeta;
use crate::error::AppError;
use crate::sql::{delete, insert, select_by_id, select_list, update, PgBindValue, QueryBuf};
use serde_json::{Map, Value};
use sqlx::PgPool;

pub struct CrudService;

impl CrudService {
    /// List rows matching every (column, value) filter exactly.
    pub async fn list(pool: &PgPool, table: &TableMeta, filters: &[(String, String)]) -> Result<Vec<Value>, AppError> {
        let q = select_list(table, filters)?;
        Self::query_many(pool, &q).await
    }

    /// Fetch one row by id. Returns JSON object or None.
    pub async fn read(pool: &PgPool, table: &TableMeta, id: &str) -> Result<Option<Value>, AppError> {
        let q = select_by_id(table, id);
        Self::query_optional(pool, &q).await
    }

    /// Insert one row from the body's keys. Returns created row.
    pub async fn create(pool: &PgPool, table: &TableMeta, body: &Map<String, Value>) -> Result<Value, AppError> {
        let q = insert(table, body)?;
        let row = Self::query_optional(pool, &q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        Ok(row)
    }

    /// Update one row by id. Returns updated row or None.
    pub async fn update(
        pool: &PgPool,
        table: &TableMeta,
        id: &str,
        body: &Map<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let q = update(table, id, body)?;
        Self::query_optional(pool, &q).await
    }

    /// Delete one row by id. Returns deleted row or None.
    pub async fn delete(pool: &PgPool, table: &TableMeta, id: &str) -> Result<Option<Value>, AppError> {
        let q = delete(table, id);
        Self::query_optional(pool, &q).await
    }

    fn bind_all<'q>(q: &'q QueryBuf) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from(p));
        }
        query
    }

    async fn query_optional(pool: &PgPool, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = Self::bind_all(q).fetch_optional(pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    async fn query_many(pool: &PgPool, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = Self::bind_all(q).fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }
}

/// Convert a row to a JSON object keyed by column name.
pub fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

/// Try each supported Rust type in turn; sqlx refuses mismatched column types, so the first Ok wins.
fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(v) = row.try_get::<Option<i16>, _>(name) {
        return v.map(|n| Value::Number(n.into())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(name) {
        return v.map(|n| Value::Number(n.into())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(name) {
        return v.map(|n| Value::Number(n.into())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(name) {
        return v
            .and_then(|n| serde_json::Number::from_f64(n as f64))
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(name) {
        return v
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(name) {
        return v.map(Value::Bool).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return v.map(|u| Value::String(u.to_string())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return v.map(|d| Value::String(d.to_rfc3339())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return v
            .map(|d| Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return v
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveTime>, _>(name) {
        return v
            .map(|t| Value::String(t.format("%H:%M:%S%.f").to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(name) {
        return v.map(Value::String).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Value>, _>(name) {
        return v.unwrap_or(Value::Null);
    }
    // Select lists project every other type to text or jsonb, so only ad hoc queries land here.
    tracing::warn!(column = %name, "column type has no JSON decoding, returning null");
    Value::Null
}
