pub mod compose;
pub mod trace;

use reqwest::Client;
use serde::Serialize;
use tracing::info;

use crate::config::ResearchSettings;
use crate::fetch::{self, ExtractedArticle};
use crate::knowledge::{KnowledgeSource, Snippet};
use crate::llm::{ChatModel, LlmError};
use crate::search::{self, SearchProvider};
use compose::{EvidenceTier, compose};
use trace::{Trace, TraceEntry};

#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("answer generation failed: {0}")]
    Model(#[from] LlmError),
}

/// Everything one question produced.
#[derive(Debug, Serialize)]
pub struct ResearchOutcome {
    pub question: String,
    pub tier: EvidenceTier,
    pub trace: Vec<TraceEntry>,
    pub answer: String,
    /// URLs whose extraction succeeded, in search order.
    pub sources: Vec<String>,
}

pub struct Researcher<K, S, M> {
    http: Client,
    sources: Vec<K>,
    search: S,
    model: M,
    settings: ResearchSettings,
}

impl<K, S, M> Researcher<K, S, M>
where
    K: KnowledgeSource,
    S: SearchProvider,
    M: ChatModel,
{
    pub fn new(http: Client, sources: Vec<K>, search: S, model: M, settings: ResearchSettings) -> Self {
        Self {
            http,
            sources,
            search,
            model,
            settings,
        }
    }

    /// Run the pipeline for one question. Every stage before the model call
    /// degrades into trace entries; a model failure is the only error.
    pub async fn research(&self, question: &str) -> Result<ResearchOutcome, ResearchError> {
        if question.trim().is_empty() {
            return Err(ResearchError::EmptyQuestion);
        }

        info!(question = %question, model = self.model.model(), "research started");
        let mut trace = Trace::default();

        let snippets = self.collect_snippets(question, &mut trace).await;
        let links = self.locate(question, &mut trace).await;
        let articles = self.extract_all(&links, &mut trace).await;

        let composition = compose(question, &articles, &snippets);
        trace.push(TraceEntry::Composing {
            tier: composition.tier,
        });

        let answer = self.model.complete(&composition.prompt).await?;

        info!(
            snippets = snippets.len(),
            articles = articles.len(),
            tier = ?composition.tier,
            "research complete"
        );

        Ok(ResearchOutcome {
            question: question.to_string(),
            tier: composition.tier,
            trace: trace.into_entries(),
            answer,
            sources: articles.into_iter().map(|a| a.url).collect(),
        })
    }

    async fn collect_snippets(&self, question: &str, trace: &mut Trace) -> Vec<Snippet> {
        let mut snippets = Vec::new();

        for source in &self.sources {
            let name = source.name().to_string();
            match source.lookup(question).await {
                Ok(Some(text)) => {
                    trace.push(TraceEntry::SourceResult {
                        source: name.clone(),
                    });
                    snippets.push(Snippet { source: name, text });
                }
                Ok(None) => trace.push(TraceEntry::SourceEmpty { source: name }),
                Err(e) => trace.push(TraceEntry::SourceError {
                    source: name,
                    error: e.to_string(),
                }),
            }
        }

        snippets
    }

    async fn locate(&self, question: &str, trace: &mut Trace) -> Vec<String> {
        let provider = self.search.name().to_string();
        let links = match search::locate_links(&self.search, question, self.settings.max_urls).await {
            Ok(links) => links,
            Err(e) => {
                trace.push(TraceEntry::SearchError {
                    provider: provider.clone(),
                    error: e.to_string(),
                });
                Vec::new()
            }
        };
        trace.push(TraceEntry::LinksFound {
            provider,
            count: links.len(),
        });
        links
    }

    async fn extract_all(&self, links: &[String], trace: &mut Trace) -> Vec<ExtractedArticle> {
        let mut articles = Vec::new();

        for url in links {
            match fetch::extract_article_text(&self.http, url, self.settings.article_chars).await {
                Ok(article) => {
                    trace.push(TraceEntry::Extracted {
                        url: url.clone(),
                        method: article.method,
                    });
                    articles.push(article);
                }
                Err(e) => trace.push(TraceEntry::ExtractionFailed {
                    url: url.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        articles
    }
}
