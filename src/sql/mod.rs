//! Safe SQL builder: identifiers checked against the catalog and quoted, values as parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
