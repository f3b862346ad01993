pub mod duckduckgo;

use std::collections::HashSet;

use tracing::debug;

pub use duckduckgo::DuckDuckGo;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid search URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("search request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("search provider returned status {0}")]
    Status(u16),

    #[error("search provider rejected the request (rate limited or challenge page)")]
    Blocked,
}

/// A web search backend returning result links in rank order.
/// Implemented by `DuckDuckGo` for production; mock implementations used in tests.
pub trait SearchProvider {
    fn name(&self) -> &str;
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, SearchError>;
}

/// Ask the provider for twice `max_links` candidates and keep the first
/// `max_links` unique HTTP(S) links.
pub async fn locate_links(
    provider: &impl SearchProvider,
    query: &str,
    max_links: usize,
) -> Result<Vec<String>, SearchError> {
    let raw = provider.search(query, max_links.saturating_mul(2)).await?;
    let candidates = raw.len();
    let links = select_links(raw, max_links);
    debug!(provider = provider.name(), candidates, kept = links.len(), "links located");
    Ok(links)
}

/// Keep links starting with `http`, drop exact duplicates, stop at `max_links`.
pub fn select_links(raw: impl IntoIterator<Item = String>, max_links: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for link in raw {
        if links.len() >= max_links {
            break;
        }
        if link.starts_with("http") && seen.insert(link.clone()) {
            links.push(link);
        }
    }

    links
}
