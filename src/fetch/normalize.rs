//! Size envelope applied to every extracted page text

use crate::config::FetchSettings;
use crate::results::ContentExcerpt;

/// Bounds on excerpt length
///
/// Text at or below `min_chars` becomes [`ContentExcerpt::NoContent`];
/// anything longer is cut to its first `max_chars` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Envelope {
    pub fn new(min_chars: usize, max_chars: usize) -> Self {
        Self {
            min_chars,
            max_chars,
        }
    }

    pub fn from_settings(settings: &FetchSettings) -> Self {
        Self::new(settings.min_chars, settings.max_chars)
    }

    /// Turn raw extracted text into an excerpt
    pub fn normalize(&self, text: &str) -> ContentExcerpt {
        let text = text.trim();
        if text.chars().count() <= self.min_chars {
            return ContentExcerpt::NoContent;
        }

        // Cut on a char boundary
        let end = text
            .char_indices()
            .nth(self.max_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(text.len());
        ContentExcerpt::Text(text[..end].to_string())
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::from_settings(&FetchSettings::default())
    }
}
