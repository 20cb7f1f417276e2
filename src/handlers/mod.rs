//! HTTP handlers for the per-table CRUD routes.

pub mod entity;
pub use entity::*;
