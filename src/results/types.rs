//! Result type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel for pages whose text is too short to be useful
pub const NO_CONTENT: &str = "No meaningful content found.";

/// Sentinel for pages that could not be retrieved
pub const FETCH_ERROR: &str = "Error fetching content.";

/// Sentinel for a failed synthesis call
pub const SYNTHESIS_ERROR: &str = "Error generating summary.";

/// Message reported when the search returns nothing
pub const NO_RESULTS: &str = "No results found.";

/// A search result before its page has been read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLocator {
    /// Title as reported by the search backend
    pub title: String,
    /// Page URL
    pub link: String,
}

impl ResultLocator {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Bounded text read from one page, or the sentinel standing in for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentExcerpt {
    /// Extracted text, already within the size envelope
    Text(String),
    /// The page had too little paragraph text
    NoContent,
    /// The page could not be fetched or rendered
    FetchError,
}

impl ContentExcerpt {
    /// Text handed to the synthesis stage
    pub fn as_str(&self) -> &str {
        match self {
            ContentExcerpt::Text(text) => text,
            ContentExcerpt::NoContent => NO_CONTENT,
            ContentExcerpt::FetchError => FETCH_ERROR,
        }
    }

    /// Whether this excerpt carries real page text
    pub fn is_text(&self) -> bool {
        matches!(self, ContentExcerpt::Text(_))
    }
}

impl fmt::Display for ContentExcerpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The final answer, or the sentinel for a failed synthesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisResult {
    Answer(String),
    Failed,
}

impl SynthesisResult {
    /// Build from provider text; blank text counts as a failure
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            SynthesisResult::Failed
        } else {
            SynthesisResult::Answer(text.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SynthesisResult::Answer(text) => text,
            SynthesisResult::Failed => SYNTHESIS_ERROR,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SynthesisResult::Failed)
    }
}

impl fmt::Display for SynthesisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The search returned nothing; no page was fetched
    NoResults,
    /// Every stage ran
    Completed {
        locators: Vec<ResultLocator>,
        /// One per locator, same order
        excerpts: Vec<ContentExcerpt>,
        synthesis: SynthesisResult,
    },
}

impl PipelineOutcome {
    /// Text reported to the caller
    pub fn answer(&self) -> &str {
        match self {
            PipelineOutcome::NoResults => NO_RESULTS,
            PipelineOutcome::Completed { synthesis, .. } => synthesis.as_str(),
        }
    }

    pub fn locators(&self) -> &[ResultLocator] {
        match self {
            PipelineOutcome::NoResults => &[],
            PipelineOutcome::Completed { locators, .. } => locators,
        }
    }
}

impl fmt::Display for PipelineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.answer())
    }
}
