//! searchsynth: search the web, read the results, write a new answer
//!
//! A query runs through four stages: a search backend returns result
//! locators, each page is fetched and reduced to a bounded excerpt, and one
//! language-model call synthesizes an answer from all excerpts. A failure in
//! any single stage or page degrades to a sentinel value instead of aborting
//! the run.

pub mod config;
pub mod engines;
pub mod error;
pub mod fetch;
pub mod network;
pub mod pipeline;
pub mod results;
pub mod synthesis;

pub use config::Settings;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, PipelineState, Query};
pub use results::{ContentExcerpt, PipelineOutcome, ResultLocator, SynthesisResult};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
