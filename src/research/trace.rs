use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use super::compose::EvidenceTier;
use crate::fetch::ExtractionMethod;

/// One human-readable step of a research run. Display-only; never drives control flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEntry {
    SourceResult { source: String },
    SourceEmpty { source: String },
    SourceError { source: String, error: String },
    SearchError { provider: String, error: String },
    LinksFound { provider: String, count: usize },
    Extracted { url: String, method: ExtractionMethod },
    ExtractionFailed { url: String, reason: String },
    Composing { tier: EvidenceTier },
}

impl TraceEntry {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            TraceEntry::SourceError { .. }
                | TraceEntry::SearchError { .. }
                | TraceEntry::ExtractionFailed { .. }
        )
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEntry::SourceResult { source } => write!(f, "Tool result: {source}"),
            TraceEntry::SourceEmpty { source } => write!(f, "Tool returned no results: {source}"),
            TraceEntry::SourceError { source, error } => {
                write!(f, "Tool error: {source} - {error}")
            }
            TraceEntry::SearchError { provider, error } => {
                write!(f, "{provider} search error: {error}")
            }
            TraceEntry::LinksFound { provider, count } => {
                write!(f, "{provider} found {count} URLs")
            }
            TraceEntry::Extracted { url, method } => {
                write!(f, "Extracted article from {url} ({})", method.as_str())
            }
            TraceEntry::ExtractionFailed { url, reason } => {
                write!(f, "Failed to extract article from {url} ({reason})")
            }
            TraceEntry::Composing { tier } => match tier {
                EvidenceTier::ExtractedArticles => f.write_str("Summarizing extracted content..."),
                EvidenceTier::Snippets => f.write_str("Summarizing research snippets..."),
                EvidenceTier::InternalKnowledge => {
                    f.write_str("Answering from internal knowledge...")
                }
            },
        }
    }
}

/// Ordered trace that mirrors every entry into the log.
#[derive(Debug, Default)]
pub(super) struct Trace(Vec<TraceEntry>);

impl Trace {
    pub(super) fn push(&mut self, entry: TraceEntry) {
        if entry.is_failure() {
            warn!("{entry}");
        } else {
            info!("{entry}");
        }
        self.0.push(entry);
    }

    pub(super) fn into_entries(self) -> Vec<TraceEntry> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lines() {
        let cases = [
            (
                TraceEntry::SourceResult { source: "wikipedia".into() },
                "Tool result: wikipedia",
            ),
            (
                TraceEntry::SourceError {
                    source: "arxiv".into(),
                    error: "timeout".into(),
                },
                "Tool error: arxiv - timeout",
            ),
            (
                TraceEntry::LinksFound {
                    provider: "DuckDuckGo".into(),
                    count: 3,
                },
                "DuckDuckGo found 3 URLs",
            ),
            (
                TraceEntry::Extracted {
                    url: "https://a.com".into(),
                    method: ExtractionMethod::Readability,
                },
                "Extracted article from https://a.com (readability)",
            ),
            (
                TraceEntry::ExtractionFailed {
                    url: "https://a.com".into(),
                    reason: "fetch failed: status 404".into(),
                },
                "Failed to extract article from https://a.com (fetch failed: status 404)",
            ),
            (
                TraceEntry::Composing {
                    tier: EvidenceTier::InternalKnowledge,
                },
                "Answering from internal knowledge...",
            ),
        ];
        for (entry, expected) in cases {
            assert_eq!(entry.to_string(), expected);
        }
    }

    #[test]
    fn failures_are_flagged() {
        assert!(TraceEntry::SearchError {
            provider: "p".into(),
            error: "e".into()
        }
        .is_failure());
        assert!(!TraceEntry::Extracted {
            url: "u".into(),
            method: ExtractionMethod::Readability
        }
        .is_failure());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(TraceEntry::Extracted {
            url: "https://a.com".into(),
            method: ExtractionMethod::Paragraphs,
        })
        .unwrap();
        assert_eq!(json["kind"], "extracted");
        assert_eq!(json["url"], "https://a.com");
        assert_eq!(json["method"], "paragraphs");
    }

    #[test]
    fn trace_keeps_insertion_order() {
        let mut trace = Trace::default();
        trace.push(TraceEntry::SourceEmpty { source: "a".into() });
        trace.push(TraceEntry::SourceEmpty { source: "b".into() });
        let entries = trace.into_entries();
        assert_eq!(entries[0], TraceEntry::SourceEmpty { source: "a".into() });
        assert_eq!(entries[1], TraceEntry::SourceEmpty { source: "b".into() });
    }
}
