//! Database availability check run before the catalog is read.

use crate::config::StartupRetry;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, Connection, PgPool};
use std::future::Future;
use std::str::FromStr;

/// Poll `probe` until it succeeds or `retry.attempts` are used up, sleeping `retry.delay` between tries.
/// Returns the last error when every attempt failed.
pub async fn retry_startup<F, Fut, E>(retry: StartupRetry, mut probe: F) -> Result<(), E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let mut remaining = retry.attempts.max(1);
    loop {
        match probe().await {
            Ok(()) => return Ok(()),
            Err(e) => {
                remaining -= 1;
                tracing::error!(retries_left = remaining, error = %e, "database connection failed");
                if remaining == 0 {
                    return Err(e);
                }
                tokio::time::sleep(retry.delay).await;
            }
        }
    }
}

/// One probe: open a dedicated connection and run `SELECT NOW()`.
async fn probe(opts: &PgConnectOptions) -> Result<(), sqlx::Error> {
    let mut conn = opts.connect().await?;
    sqlx::query("SELECT NOW()").execute(&mut conn).await?;
    conn.close().await?;
    Ok(())
}

/// Wait for the database, then return a lazily connecting pool. Pool sizing is the only knob set here.
pub async fn connect_with_retry(
    database_url: &str,
    max_connections: u32,
    retry: StartupRetry,
) -> Result<PgPool, sqlx::Error> {
    let opts = PgConnectOptions::from_str(database_url)?;
    let probe_opts = &opts;
    retry_startup(retry, move || probe(probe_opts)).await?;
    tracing::info!("connected to database");
    Ok(PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_lazy_with(opts))
}
