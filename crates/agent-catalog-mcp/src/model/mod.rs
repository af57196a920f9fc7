//! Agent domain types: records, header fields, filters, and naming.

pub mod filters;
pub mod naming;
pub mod types;

pub use filters::*;
pub use naming::*;
pub use types::*;
