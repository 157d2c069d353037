//! Search provider trait

use crate::results::ResultLocator;
use async_trait::async_trait;
use url::Url;

/// A backend that turns a query into an ordered list of result locators
///
/// Implementations never fail: transport or provider errors are logged and
/// reported as an empty list so the run can finish with "no results".
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name, used in logs
    fn name(&self) -> &str;

    /// Return at most `limit` locators in backend relevance order
    async fn search(&self, query: &str, limit: usize) -> Vec<ResultLocator>;
}

/// Whether a link can be fetched by the content stage
pub fn is_usable_link(link: &str) -> bool {
    match Url::parse(link.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}
