//! CrudService: one statement per call, built by the safe SQL builder.

mod crud;
pub use crud::{row_to_json, CrudService};
