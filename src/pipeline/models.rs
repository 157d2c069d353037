//! Query and run-state models

use crate::error::{Error, Result};
use std::fmt;

/// A non-empty search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Trim and validate the query text
    pub fn new(text: impl AsRef<str>) -> Result<Self> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(Error::Config("query must not be empty".into()));
        }
        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Searching,
    /// `index` is 1-based
    FetchingContent { index: usize, total: usize },
    Synthesizing,
    Done,
    NoResults,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::NoResults)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::Searching => write!(f, "searching"),
            PipelineState::FetchingContent { index, total } => {
                write!(f, "fetching content ({}/{})", index, total)
            }
            PipelineState::Synthesizing => write!(f, "synthesizing"),
            PipelineState::Done => write!(f, "done"),
            PipelineState::NoResults => write!(f, "no results"),
        }
    }
}
