//! Server: waits for the database, reads the catalog, synthesizes table routes, and serves them behind the access gate.

use axum::extract::Request;
use axum::ServiceExt;
use std::sync::Arc;
use tablerest::{app, connect_with_retry, load_catalog, synthesize, AppState, Config, SharedVerifier, UserInfoVerifier};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tablerest=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = match connect_with_retry(&config.database_url, config.max_connections, config.startup).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "could not connect to database, exiting");
            std::process::exit(1);
        }
    };

    let catalog = load_catalog(&pool, &config.schema, &config.excluded_tables).await?;
    let routes = synthesize(&catalog, &config.allow);
    if routes.is_empty() {
        tracing::warn!(schema = %config.schema, "no tables matched the allow-lists; only fixed routes are served");
    }

    let verifier: SharedVerifier = Arc::new(UserInfoVerifier::new(
        config.identity.userinfo_url.clone(),
        config.identity.timeout,
    )?);

    let app = app(AppState { pool }, &catalog, &routes, verifier);

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;
    Ok(())
}
