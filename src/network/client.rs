//! HTTP client shared by the search, fetch and synthesis stages

use super::user_agent::{accept_html, accept_json, accept_language, generate_user_agent};
use crate::config::FetchSettings;
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

/// HTTP response with the body already read
#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
    /// Response URL (after redirects)
    pub url: String,
}

impl HttpResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.text)
            .map_err(|e| Error::Decode(format!("invalid JSON from {}: {}", self.url, e)))
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client wrapper with browser-like defaults
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&FetchSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &FetchSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs_f64(settings.timeout))
            .gzip(true)
            .brotli(true);

        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build()?;

        let mut user_agent = generate_user_agent();
        if let Some(ref suffix) = settings.useragent_suffix {
            user_agent = format!("{} {}", user_agent, suffix);
        }

        Ok(Self {
            client,
            user_agent,
        })
    }

    /// GET a page as a browser would, returning whatever status came back
    pub async fn get_page(&self, url: &str, timeout: Duration) -> Result<HttpResponse> {
        let request = self
            .client
            .get(url)
            .timeout(timeout)
            .header("User-Agent", &self.user_agent)
            .header("Accept", accept_html())
            .header("Accept-Language", accept_language("en"))
            .header("DNT", "1")
            .header("Upgrade-Insecure-Requests", "1");

        Self::send(request).await
    }

    /// GET a JSON API endpoint with query parameters
    pub async fn get_json(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<serde_json::Value> {
        let request = self
            .client
            .get(url)
            .timeout(timeout)
            .header("Accept", accept_json())
            .query(params);

        Self::expect_json(Self::send(request).await?)
    }

    /// POST a JSON body and decode the JSON reply
    pub async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, String)],
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value> {
        let mut request = self
            .client
            .post(url)
            .timeout(timeout)
            .header("Accept", accept_json())
            .json(body);

        for (key, value) in headers {
            request = request.header(*key, value);
        }

        Self::expect_json(Self::send(request).await?)
    }

    async fn send(request: RequestBuilder) -> Result<HttpResponse> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let text = response.text().await?;

        Ok(HttpResponse { status, text, url })
    }

    fn expect_json(response: HttpResponse) -> Result<serde_json::Value> {
        if !response.is_success() {
            return Err(Error::Status {
                status: response.status,
                url: response.url,
            });
        }
        response.json()
    }

    /// Get current user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
