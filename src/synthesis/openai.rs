//! OpenAI chat completions provider

use super::prompt::{build_prompt, SYSTEM_PROMPT};
use super::SynthesisProvider;
use crate::config::SynthesisSettings;
use crate::error::{Error, Result};
use crate::network::HttpClient;
use crate::results::{ContentExcerpt, SynthesisResult};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

pub struct OpenAiSynthesizer {
    client: HttpClient,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenAiSynthesizer {
    pub fn new(client: HttpClient, settings: &SynthesisSettings) -> Result<Self> {
        let api_key = settings
            .openai
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".into()))?;

        Ok(Self {
            client,
            endpoint: settings.openai.endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: settings.openai.model.clone(),
            max_tokens: settings.max_tokens,
            timeout: Duration::from_secs_f64(settings.timeout),
        })
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "max_tokens": self.max_tokens,
        })
    }

    /// First choice's message text
    fn parse_response(json: &serde_json::Value) -> Result<SynthesisResult> {
        json.pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(SynthesisResult::from_text)
            .ok_or_else(|| {
                Error::Synthesis("response has no choices[0].message.content".into())
            })
    }

    async fn complete(&self, prompt: &str) -> Result<SynthesisResult> {
        let url = format!("{}/chat/completions", self.endpoint);
        let headers = [("Authorization", format!("Bearer {}", self.api_key))];
        let json = self
            .client
            .post_json(&url, &headers, &self.request_body(prompt), self.timeout)
            .await?;
        Self::parse_response(&json)
    }
}

#[async_trait]
impl SynthesisProvider for OpenAiSynthesizer {
    fn name(&self) -> &str {
        "openai"
    }

    async fn synthesize(&self, query: &str, excerpts: &[ContentExcerpt]) -> SynthesisResult {
        let prompt = build_prompt(query, excerpts);
        match self.complete(&prompt).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Synthesis failed on {}: {}", self.name(), e);
                SynthesisResult::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn synthesizer(endpoint: String) -> OpenAiSynthesizer {
        let mut settings = SynthesisSettings::default();
        settings.openai.endpoint = endpoint;
        settings.openai.api_key = Some("sk-test".into());
        OpenAiSynthesizer::new(HttpClient::new().unwrap(), &settings).unwrap()
    }

    #[test]
    fn test_requires_api_key() {
        let settings = SynthesisSettings::default();
        assert!(OpenAiSynthesizer::new(HttpClient::new().unwrap(), &settings).is_err());
    }

    #[test]
    fn test_request_body_caps_tokens() {
        let body = synthesizer("http://localhost".into()).request_body("hello");
        assert_eq!(body["max_tokens"], 250);
        assert_eq!(body["messages"][1]["content"], "hello");
        assert_eq!(body["messages"][0]["role"], "system");
    }

    #[test]
    fn test_parse_response_shapes() {
        let ok = json!({ "choices": [{ "message": { "content": "  Answer.\n" } }] });
        assert_eq!(
            OpenAiSynthesizer::parse_response(&ok).unwrap(),
            SynthesisResult::Answer("Answer.".into())
        );
        assert!(matches!(
            OpenAiSynthesizer::parse_response(&json!({ "choices": [] })),
            Err(Error::Synthesis(_))
        ));
    }

    #[tokio::test]
    async fn test_synthesize_against_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({ "max_tokens": 250 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "It will rain." } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = synthesizer(format!("{}/v1", server.uri()))
            .synthesize("weather today", &[ContentExcerpt::Text("rain".into())])
            .await;
        assert_eq!(result, SynthesisResult::Answer("It will rain.".into()));
    }

    #[tokio::test]
    async fn test_malformed_response_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "object": "error" })))
            .mount(&server)
            .await;

        let result = synthesizer(server.uri())
            .synthesize("x", &[ContentExcerpt::NoContent])
            .await;
        assert_eq!(result.as_str(), "Error generating summary.");
    }

    #[tokio::test]
    async fn test_empty_or_non_json_body_is_failure() {
        for body in ["", "<html>Bad Gateway</html>"] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .expect(1)
                .mount(&server)
                .await;

            let result = synthesizer(server.uri())
                .synthesize("x", &[ContentExcerpt::Text("t".into())])
                .await;
            assert_eq!(result, SynthesisResult::Failed);
        }
    }

    #[tokio::test]
    async fn test_empty_content_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "   " } }]
            })))
            .mount(&server)
            .await;

        let result = synthesizer(server.uri())
            .synthesize("x", &[ContentExcerpt::NoContent])
            .await;
        assert!(result.is_failed());
    }
}
