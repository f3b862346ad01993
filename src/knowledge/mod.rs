pub mod arxiv;
pub mod wikipedia;

use reqwest::Client;
use serde::Serialize;

use crate::config::SnippetOptions;
use crate::text::truncate_chars;
use arxiv::ArxivClient;
use wikipedia::WikipediaClient;

/// Longest query forwarded to a knowledge source.
const MAX_QUERY_CHARS: usize = 300;

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API returned status {0}")]
    Status(u16),

    #[error("API error: {0}")]
    Api(String),
}

/// Text returned by one knowledge source for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub source: String,
    pub text: String,
}

impl Snippet {
    /// Form used when snippets are handed to the model.
    pub fn render(&self) -> String {
        format!("{}: {}", self.source, self.text)
    }
}

/// A fixed lookup service. `Ok(None)` means the source answered but had nothing.
pub trait KnowledgeSource {
    fn name(&self) -> &str;
    async fn lookup(&self, query: &str) -> Result<Option<String>, KnowledgeError>;
}

/// The production sources, dispatched statically.
#[derive(Clone)]
pub enum KnowledgeBase {
    Wikipedia(WikipediaClient),
    Arxiv(ArxivClient),
}

impl KnowledgeSource for KnowledgeBase {
    fn name(&self) -> &str {
        match self {
            KnowledgeBase::Wikipedia(c) => c.name(),
            KnowledgeBase::Arxiv(c) => c.name(),
        }
    }

    async fn lookup(&self, query: &str) -> Result<Option<String>, KnowledgeError> {
        match self {
            KnowledgeBase::Wikipedia(c) => c.lookup(query).await,
            KnowledgeBase::Arxiv(c) => c.lookup(query).await,
        }
    }
}

/// Wikipedia first, then arXiv.
pub fn default_sources(http: &Client, options: SnippetOptions) -> Vec<KnowledgeBase> {
    vec![
        KnowledgeBase::Wikipedia(WikipediaClient::new(http.clone(), options)),
        KnowledgeBase::Arxiv(ArxivClient::new(http.clone(), options)),
    ]
}

fn clamp_query(query: &str) -> &str {
    truncate_chars(query, MAX_QUERY_CHARS)
}

/// Join per-result entries with a blank line and cap the whole text.
fn join_entries(entries: Vec<String>, max_chars: usize) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    let joined = entries.join("\n\n");
    let text = truncate_chars(&joined, max_chars);
    (!text.trim().is_empty()).then(|| text.to_string())
}
