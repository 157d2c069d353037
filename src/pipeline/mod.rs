//! Pipeline orchestration module
//!
//! Sequences the search, fetch and synthesis stages for a query and tracks
//! the run through its states.

mod executor;
mod models;

pub use executor::Pipeline;
pub use models::*;
