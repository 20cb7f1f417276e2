//! Process configuration: allow-lists per verb and environment-provided settings.

pub mod types;
pub mod loader;

pub use types::*;
pub use loader::*;
