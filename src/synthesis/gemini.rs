//! Google Gemini generateContent provider

use super::prompt::build_prompt;
use super::SynthesisProvider;
use crate::config::SynthesisSettings;
use crate::error::{Error, Result};
use crate::network::HttpClient;
use crate::results::{ContentExcerpt, SynthesisResult};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

pub struct GeminiSynthesizer {
    client: HttpClient,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl GeminiSynthesizer {
    pub fn new(client: HttpClient, settings: &SynthesisSettings) -> Result<Self> {
        let api_key = settings
            .gemini
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("GEMINI_API_KEY is not set".into()))?;

        Ok(Self {
            client,
            endpoint: settings.gemini.endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: settings.gemini.model.clone(),
            max_tokens: settings.max_tokens,
            timeout: Duration::from_secs_f64(settings.timeout),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    // Plain prompt, no chat roles
    fn request_body(&self, prompt: &str) -> serde_json::Value {
        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "maxOutputTokens": self.max_tokens },
        })
    }

    /// First candidate's first text part
    fn parse_response(json: &serde_json::Value) -> Result<SynthesisResult> {
        json.pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .map(SynthesisResult::from_text)
            .ok_or_else(|| {
                Error::Synthesis("response has no candidates[0].content.parts[0].text".into())
            })
    }

    async fn generate(&self, prompt: &str) -> Result<SynthesisResult> {
        let headers = [("x-goog-api-key", self.api_key.clone())];
        let json = self
            .client
            .post_json(&self.url(), &headers, &self.request_body(prompt), self.timeout)
            .await?;
        Self::parse_response(&json)
    }
}

#[async_trait]
impl SynthesisProvider for GeminiSynthesizer {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn synthesize(&self, query: &str, excerpts: &[ContentExcerpt]) -> SynthesisResult {
        let prompt = build_prompt(query, excerpts);
        match self.generate(&prompt).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Synthesis failed on {}: {}", self.name(), e);
                SynthesisResult::Failed
            }
        }
    }
}
