//! Fixed routes: liveness text and database clock.

use crate::service::row_to_json;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

async fn hello() -> &'static str {
    "Hello World!"
}

/// Current database timestamp, e.g. `{"now": "2024-05-01T10:00:00+00:00"}`.
async fn now(State(state): State<AppState>) -> Response {
    match sqlx::query("SELECT NOW() AS now").fetch_one(&state.pool).await {
        Ok(row) => Json(row_to_json(&row)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "database clock query failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error connecting to database").into_response()
        }
    }
}

/// GET / and GET /now.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/now", get(now))
        .with_state(state)
}
