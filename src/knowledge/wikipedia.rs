use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{KnowledgeError, KnowledgeSource, clamp_query, join_entries};
use crate::config::SnippetOptions;

const API_BASE: &str = "https://en.wikipedia.org/w/api.php";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<QueryPages>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct QueryPages {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    /// Search rank; generator results arrive unordered.
    #[serde(default)]
    index: u32,
    #[serde(default)]
    extract: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<String>,
    info: Option<String>,
}

/// Searches Wikipedia and returns the intro extract of the top pages.
#[derive(Clone)]
pub struct WikipediaClient {
    http: Client,
    base_url: String,
    options: SnippetOptions,
}

impl WikipediaClient {
    pub fn new(http: Client, options: SnippetOptions) -> Self {
        Self {
            http,
            base_url: API_BASE.to_string(),
            options,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str, options: SnippetOptions) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            options,
        }
    }
}

impl KnowledgeSource for WikipediaClient {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn lookup(&self, query: &str) -> Result<Option<String>, KnowledgeError> {
        let limit = self.options.max_results.to_string();
        let url = url::Url::parse_with_params(
            &self.base_url,
            &[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("generator", "search"),
                ("gsrsearch", clamp_query(query)),
                ("gsrlimit", limit.as_str()),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exlimit", "max"),
                ("redirects", "1"),
            ],
        )?;

        let response = self
            .http
            .get(url)
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(KnowledgeError::Status(status.as_u16()));
        }

        let body: QueryResponse = response.json().await?;
        if let Some(err) = body.error {
            return Err(KnowledgeError::Api(format!(
                "{}: {}",
                err.code.unwrap_or_else(|| "unknown".into()),
                err.info.unwrap_or_default()
            )));
        }

        let mut pages = body.query.map(|q| q.pages).unwrap_or_default();
        pages.sort_by_key(|p| p.index);

        let entries: Vec<String> = pages
            .into_iter()
            .filter(|p| !p.extract.trim().is_empty())
            .take(self.options.max_results)
            .map(|p| format!("Page: {}\nSummary: {}", p.title, p.extract.trim()))
            .collect();

        debug!(pages = entries.len(), "wikipedia lookup complete");
        Ok(join_entries(entries, self.options.max_chars))
    }
}
