//! Per-table CRUD routes built from the route table.
//! Each registered table gets its own nested router at `/<table>` carrying the table's metadata as state,
//! so a handler never looks a table up by a caller-supplied path segment.

use crate::catalog::Catalog;
use crate::config::Verb;
use crate::handlers::entity::{create, delete as delete_handler, list, read, update};
use crate::state::TableState;
use crate::synth::RouteTable;
use axum::routing::{delete, get, post, put, MethodRouter};
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;

pub fn entity_routes(pool: PgPool, catalog: &Catalog, routes: &RouteTable) -> Router {
    let mut router = Router::new();
    for reg in routes.registrations() {
        let Some(meta) = catalog.table(&reg.table) else {
            tracing::warn!(table = %reg.table, "registered table missing from catalog, skipping");
            continue;
        };
        let state = TableState {
            pool: pool.clone(),
            table: Arc::new(meta.clone()),
        };

        let mut collection: Option<MethodRouter<TableState>> = None;
        let mut item: Option<MethodRouter<TableState>> = None;
        if reg.allows(Verb::Get) {
            collection = Some(get(list));
            item = Some(get(read));
        }
        if reg.allows(Verb::Post) {
            collection = Some(match collection {
                Some(m) => m.post(create),
                None => post(create),
            });
        }
        if reg.allows(Verb::Put) {
            item = Some(match item {
                Some(m) => m.put(update),
                None => put(update),
            });
        }
        if reg.allows(Verb::Delete) {
            item = Some(match item {
                Some(m) => m.delete(delete_handler),
                None => delete(delete_handler),
            });
        }

        let mut table_router: Router<TableState> = Router::new();
        if let Some(m) = collection {
            table_router = table_router.route("/", m);
        }
        if let Some(m) = item {
            table_router = table_router.route("/:id", m);
        }
        router = router.nest(&format!("/{}", reg.table), table_router.with_state(state));
    }
    router
}
