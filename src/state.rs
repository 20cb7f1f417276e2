//! Request-time state. Assembled once at startup and handed to the router; nothing here is mutated afterwards.

use crate::catalog::TableMeta;
use sqlx::PgPool;
use std::sync::Arc;

/// State for the fixed endpoints.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

/// State for one table's synthesized routes.
#[derive(Clone)]
pub struct TableState {
    pub pool: PgPool,
    pub table: Arc<TableMeta>,
}
