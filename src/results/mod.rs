//! Result types passed between pipeline stages
//!
//! Each stage hands the next one a value, never an error: failures are
//! represented by the sentinel variants defined here.

mod types;

pub use types::*;
