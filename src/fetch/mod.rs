//! Page content retrieval
//!
//! A run is bound to one [`ContentFetcher`] chosen from [`FetchStrategy`]
//! at startup. Fetchers never fail: a page that cannot be read yields
//! [`ContentExcerpt::FetchError`].

mod extract;
mod lightweight;
mod normalize;
mod rendered;

pub use extract::{extract_paragraphs, PARAGRAPH_SCRIPT};
pub use lightweight::LightweightFetcher;
pub use normalize::Envelope;
pub use rendered::RenderedFetcher;

use crate::config::{FetchSettings, FetchStrategy};
use crate::network::HttpClient;
use crate::results::ContentExcerpt;
use async_trait::async_trait;

/// Retrieves one page and reduces it to a bounded excerpt
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    fn strategy(&self) -> FetchStrategy;

    /// Always returns an excerpt within the envelope or a sentinel
    async fn fetch(&self, url: &str) -> ContentExcerpt;
}

/// Build the fetcher for the configured strategy
pub fn create_fetcher(client: HttpClient, settings: &FetchSettings) -> Box<dyn ContentFetcher> {
    match settings.strategy {
        FetchStrategy::Lightweight => Box::new(LightweightFetcher::new(client, settings)),
        FetchStrategy::Rendered => Box::new(RenderedFetcher::new(settings)),
    }
}
