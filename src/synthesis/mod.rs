//! Answer synthesis
//!
//! Exactly one provider is chosen per run. Providers never fail: transport
//! errors and unusable responses become [`SynthesisResult::Failed`].

pub mod gemini;
pub mod openai;
mod prompt;

pub use gemini::GeminiSynthesizer;
pub use openai::OpenAiSynthesizer;
pub use prompt::{build_prompt, join_excerpts};

use crate::config::{SynthesisBackend, SynthesisSettings};
use crate::error::Result;
use crate::network::HttpClient;
use crate::results::{ContentExcerpt, SynthesisResult};
use async_trait::async_trait;

/// A generative text service that writes the final answer
#[async_trait]
pub trait SynthesisProvider: Send + Sync {
    fn name(&self) -> &str;

    /// One request over all excerpts, in order
    async fn synthesize(&self, query: &str, excerpts: &[ContentExcerpt]) -> SynthesisResult;
}

/// Build the provider selected in settings
pub fn create_synthesizer(
    client: HttpClient,
    settings: &SynthesisSettings,
) -> Result<Box<dyn SynthesisProvider>> {
    Ok(match settings.provider {
        SynthesisBackend::Openai => Box::new(OpenAiSynthesizer::new(client, settings)?),
        SynthesisBackend::Gemini => Box::new(GeminiSynthesizer::new(client, settings)?),
    })
}
