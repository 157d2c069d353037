//! Search engine module
//!
//! Defines the SearchProvider trait and the Google Custom Search backend.

mod traits;

pub mod google;

pub use google::GoogleSearch;
pub use traits::*;
