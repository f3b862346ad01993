use serde::Serialize;
use tracing::debug;

use crate::fetch::ExtractedArticle;
use crate::knowledge::Snippet;

/// Evidence handed to the model, richest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceTier {
    ExtractedArticles,
    Snippets,
    InternalKnowledge,
}

#[derive(Debug)]
pub struct Composition {
    pub tier: EvidenceTier,
    pub prompt: String,
}

pub fn select_tier(articles: &[ExtractedArticle], snippets: &[Snippet]) -> EvidenceTier {
    if !articles.is_empty() {
        EvidenceTier::ExtractedArticles
    } else if !snippets.is_empty() {
        EvidenceTier::Snippets
    } else {
        EvidenceTier::InternalKnowledge
    }
}

pub fn compose(question: &str, articles: &[ExtractedArticle], snippets: &[Snippet]) -> Composition {
    let tier = select_tier(articles, snippets);
    let prompt = match tier {
        EvidenceTier::ExtractedArticles => {
            let combined = articles
                .iter()
                .map(|a| format!("[Source]({}):\n{}", a.url, a.text))
                .collect::<Vec<_>>()
                .join("\n\n");
            debug!(chars = combined.len(), "combined article content:\n{combined}");
            format!(
                "The user asked: {question}\n\n\
                 Please summarize the following content into a readable, concise answer that:\n\
                 - Retains all important facts, numbers, dates, and context\n\
                 - Highlights source URLs in Markdown\n\
                 - Uses clear paragraphs\n\
                 - Avoids repetitive phrases\n\n\
                 Content:\n{combined}\n"
            )
        }
        EvidenceTier::Snippets => {
            let combined = snippets
                .iter()
                .map(Snippet::render)
                .collect::<Vec<_>>()
                .join("\n\n");
            format!(
                "The user asked: {question}\n\n\
                 Please summarize the following research snippets into a readable, concise answer:\n\
                 {combined}\n"
            )
        }
        EvidenceTier::InternalKnowledge => format!(
            "The user asked: {question}\n\n\
             No external sources returned results. Provide a concise, factual answer from internal knowledge.\n"
        ),
    };

    Composition { tier, prompt }
}
