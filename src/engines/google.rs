//! Google Programmable Search (Custom Search JSON API) provider

use super::traits::{is_usable_link, SearchProvider};
use crate::config::{SearchSettings, MAX_RESULT_COUNT};
use crate::error::{Error, Result};
use crate::network::HttpClient;
use crate::results::ResultLocator;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Google Custom Search JSON API
pub struct GoogleSearch {
    client: HttpClient,
    endpoint: String,
    api_key: String,
    engine_id: String,
    request_count: usize,
    timeout: Duration,
}

impl GoogleSearch {
    pub fn new(client: HttpClient, settings: &SearchSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("GOOGLE_API_KEY is not set".into()))?;
        let engine_id = settings
            .engine_id
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("GOOGLE_CSE_ID is not set".into()))?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key,
            engine_id,
            request_count: settings.request_count,
            timeout: Duration::from_secs_f64(settings.timeout),
        })
    }

    /// Query parameters for one request
    ///
    /// Asks for more items than needed so dropped links do not shrink the
    /// list below `limit`.
    fn request_params(&self, query: &str, limit: usize) -> Vec<(&'static str, String)> {
        let num = self.request_count.max(limit).clamp(1, MAX_RESULT_COUNT);
        vec![
            ("key", self.api_key.clone()),
            ("cx", self.engine_id.clone()),
            ("q", query.to_string()),
            ("num", num.to_string()),
        ]
    }

    /// Map the `items` array to locators, keeping provider order
    fn parse_items(json: &serde_json::Value, limit: usize) -> Vec<ResultLocator> {
        let Some(items) = json.get("items").and_then(|v| v.as_array()) else {
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|item| {
                let link = item.get("link").and_then(|v| v.as_str())?.trim();
                if !is_usable_link(link) {
                    return None;
                }
                let title = item
                    .get("title")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .trim();
                Some(ResultLocator::new(title, link))
            })
            .take(limit)
            .collect()
    }

    async fn try_search(&self, query: &str, limit: usize) -> Result<Vec<ResultLocator>> {
        let params = self.request_params(query, limit);
        let json = self
            .client
            .get_json(&self.endpoint, &params, self.timeout)
            .await?;

        if let Some(message) = json.pointer("/error/message").and_then(|v| v.as_str()) {
            return Err(Error::Search(message.to_string()));
        }

        Ok(Self::parse_items(&json, limit))
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    fn name(&self) -> &str {
        "google"
    }

    async fn search(&self, query: &str, limit: usize) -> Vec<ResultLocator> {
        if query.trim().is_empty() || limit == 0 {
            return Vec::new();
        }

        match self.try_search(query, limit).await {
            Ok(locators) => {
                debug!("{} returned {} usable results", self.name(), locators.len());
                locators
            }
            Err(e) => {
                warn!("Search failed on {}: {}", self.name(), e);
                Vec::new()
            }
        }
    }
}
