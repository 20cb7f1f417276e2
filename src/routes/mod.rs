//! Router assembly: fixed routes, synthesized table routes, and the request layers.

mod common;
mod entity;

pub use common::common_routes;
pub use entity::entity_routes;

use crate::auth::{require_identity, SharedVerifier};
use crate::catalog::Catalog;
use crate::state::AppState;
use crate::synth::RouteTable;
use axum::middleware::from_fn_with_state;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;

/// The served application: the router behind trailing-slash normalization.
pub type App = NormalizePath<Router>;

/// Full application. CORS sits outermost so preflight is answered before the access gate;
/// the gate wraps every route, including unmatched paths.
/// Trailing slashes are trimmed before routing, so `/guest/` is served as `/guest`.
pub fn app(state: AppState, catalog: &Catalog, routes: &RouteTable, verifier: SharedVerifier) -> App {
    let router = Router::new()
        .merge(common_routes(state.clone()))
        .merge(entity_routes(state.pool, catalog, routes))
        .layer(from_fn_with_state(verifier, require_identity))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());
    NormalizePath::trim_trailing_slash(router)
}
