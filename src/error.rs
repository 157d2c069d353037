//! Error types for searchsynth
//!
//! Every stage of the pipeline converts these into a sentinel at its own
//! boundary, so they only ever escape the library through startup paths
//! (configuration loading and validation).

/// Errors raised inside a pipeline stage or while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The search backend could not be queried or answered badly.
    #[error("search failed: {0}")]
    Search(String),

    /// A single page could not be retrieved or rendered.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The synthesis backend failed or returned an unusable body.
    #[error("synthesis failed: {0}")]
    Synthesis(String),

    /// Invalid or incomplete configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A backend answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// A response body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
