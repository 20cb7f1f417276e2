//! tablerest: schema-driven REST facade over PostgreSQL.
//!
//! At startup the base tables of one schema are read from the catalog, intersected with
//! per-verb allow-lists, and exposed as list/get/create/update/delete endpoints behind a
//! bearer-token access gate.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod service;
pub mod sql;
pub mod startup;
pub mod state;
pub mod synth;

pub use auth::{Identity, SharedVerifier, TokenVerifier, UserInfoVerifier, VerifyError};
pub use catalog::{load_catalog, Catalog, ColumnInfo, TableMeta};
pub use config::{AllowLists, Config, Verb};
pub use error::{AppError, ConfigError};
pub use routes::{app, common_routes, entity_routes, App};
pub use service::CrudService;
pub use startup::connect_with_retry;
pub use state::AppState;
pub use synth::{synthesize, RouteTable};
