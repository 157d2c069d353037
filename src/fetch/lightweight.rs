//! Plain HTTP page fetch

use super::extract::extract_paragraphs;
use super::normalize::Envelope;
use super::ContentFetcher;
use crate::config::{FetchSettings, FetchStrategy};
use crate::error::{Error, Result};
use crate::network::HttpClient;
use crate::results::ContentExcerpt;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Fetches markup with one GET and parses it without running scripts
pub struct LightweightFetcher {
    client: HttpClient,
    timeout: Duration,
    envelope: Envelope,
}

impl LightweightFetcher {
    pub fn new(client: HttpClient, settings: &FetchSettings) -> Self {
        Self {
            client,
            timeout: Duration::from_secs_f64(settings.timeout),
            envelope: Envelope::from_settings(settings),
        }
    }

    async fn paragraph_text(&self, url: &str) -> Result<String> {
        let response = self.client.get_page(url, self.timeout).await?;
        if !response.is_success() {
            return Err(Error::Status {
                status: response.status,
                url: response.url,
            });
        }
        Ok(extract_paragraphs(&response.text))
    }
}

#[async_trait]
impl ContentFetcher for LightweightFetcher {
    fn strategy(&self) -> FetchStrategy {
        FetchStrategy::Lightweight
    }

    async fn fetch(&self, url: &str) -> ContentExcerpt {
        match self.paragraph_text(url).await {
            Ok(text) => {
                debug!("Extracted {} chars from {}", text.chars().count(), url);
                self.envelope.normalize(&text)
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                ContentExcerpt::FetchError
            }
        }
    }
}
