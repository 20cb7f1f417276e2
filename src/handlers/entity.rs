//! Table CRUD handlers: list, read, create, update, delete.

use crate::auth::Identity;
use crate::error::AppError;
use crate::service::CrudService;
use crate::state::TableState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde_json::{Map, Value};

/// True for `application/json`, with or without parameters.
fn is_json_content(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// Parse a write body into a flat key/value map. An absent body, or one not sent as JSON, counts as empty.
fn body_to_map(headers: &HeaderMap, bytes: &Bytes) -> Result<Map<String, Value>, AppError> {
    if !is_json_content(headers) || bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(m)) => Ok(m),
        Ok(_) => Err(AppError::BadRequest("body must be a JSON object".into())),
        Err(e) => Err(AppError::BadRequest(format!("invalid JSON body: {}", e))),
    }
}

fn non_empty_body(headers: &HeaderMap, bytes: &Bytes) -> Result<Map<String, Value>, AppError> {
    let body = body_to_map(headers, bytes)?;
    if body.is_empty() {
        return Err(AppError::BadRequest("No data provided".into()));
    }
    Ok(body)
}

pub async fn list(
    State(state): State<TableState>,
    identity: Identity,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Value>>, AppError> {
    tracing::debug!(table = %state.table.table_name, subject = %identity.subject, filters = params.len(), "list");
    let rows = CrudService::list(&state.pool, &state.table, &params).await?;
    Ok(Json(rows))
}

pub async fn read(
    State(state): State<TableState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    tracing::debug!(table = %state.table.table_name, subject = %identity.subject, id = %id, "read");
    let row = CrudService::read(&state.pool, &state.table, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(row))
}

pub async fn create(
    State(state): State<TableState>,
    identity: Identity,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    tracing::debug!(table = %state.table.table_name, subject = %identity.subject, "create");
    let body = non_empty_body(&headers, &body)?;
    let row = CrudService::create(&state.pool, &state.table, &body).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update(
    State(state): State<TableState>,
    identity: Identity,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    tracing::debug!(table = %state.table.table_name, subject = %identity.subject, id = %id, "update");
    let body = non_empty_body(&headers, &body)?;
    let row = CrudService::update(&state.pool, &state.table, &id, &body)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(row))
}

pub async fn delete(
    State(state): State<TableState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    tracing::debug!(table = %state.table.table_name, subject = %identity.subject, id = %id, "delete");
    let row = CrudService::delete(&state.pool, &state.table, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(row))
}
