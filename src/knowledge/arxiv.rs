use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;

use super::{KnowledgeError, KnowledgeSource, clamp_query, join_entries};
use crate::config::SnippetOptions;
use crate::text::squash_whitespace;

const API_BASE: &str = "https://export.arxiv.org/api/query";

#[derive(Debug, PartialEq, Eq)]
struct ArxivEntry {
    published: String,
    title: String,
    authors: Vec<String>,
    summary: String,
}

impl ArxivEntry {
    fn render(&self) -> String {
        format!(
            "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
            self.published,
            self.title,
            self.authors.join(", "),
            self.summary
        )
    }
}

/// Queries the arXiv Atom API and returns the top abstracts.
#[derive(Clone)]
pub struct ArxivClient {
    http: Client,
    base_url: String,
    options: SnippetOptions,
}

impl ArxivClient {
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

impl KnowledgeSource for ArxivClient {
    fn name(&self) -> &str {
        "arxiv"
    }

    async fn lookup(&self, query: &str) -> Result<Option<String>, KnowledgeError> {
        let limit = self.options.max_results.to_string();
        let url = url::Url::parse_with_params(
            &self.base_url,
            &[
                ("search_query", clamp_query(query)),
                ("start", "0"),
                ("max_results", limit.as_str()),
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

        let feed = response.text().await?;
        let entries = parse_feed(&feed);
        debug!(entries = entries.len(), "arxiv lookup complete");

        let rendered = entries
            .iter()
            .take(self.options.max_results)
            .map(ArxivEntry::render)
            .collect();
        Ok(join_entries(rendered, self.options.max_chars))
    }
}

/// Parse an Atom feed leniently with the HTML parser; unknown tags become plain elements.
fn parse_feed(feed: &str) -> Vec<ArxivEntry> {
    let document = Html::parse_document(feed);
    let (Ok(entry_sel), Ok(title_sel), Ok(published_sel), Ok(summary_sel), Ok(name_sel)) = (
        Selector::parse("entry"),
        Selector::parse("title"),
        Selector::parse("published"),
        Selector::parse("summary"),
        Selector::parse("author name"),
    ) else {
        return Vec::new();
    };

    let first_text = |entry: &scraper::ElementRef<'_>, sel: &Selector| -> String {
        entry
            .select(sel)
            .next()
            .map(|el| squash_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default()
    };

    document
        .select(&entry_sel)
        .filter_map(|entry| {
            let title = first_text(&entry, &title_sel);
            // arXiv reports query errors as an entry titled "Error".
            if title.is_empty() || title == "Error" {
                return None;
            }
            let published = first_text(&entry, &published_sel);
            Some(ArxivEntry {
                published: published.chars().take(10).collect(),
                title,
                authors: entry
                    .select(&name_sel)
                    .map(|n| squash_whitespace(&n.text().collect::<String>()))
                    .filter(|n| !n.is_empty())
                    .collect(),
                summary: first_text(&entry, &summary_sel),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(super) const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:attention</title>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All
      You Need</title>
    <summary>  The dominant sequence transduction models
      are based on complex recurrent networks.</summary>
    <author><name>Ashish Vaswani</name></author>
    <author><name>Noam Shazeer</name></author>
    <link href="http://arxiv.org/abs/1706.03762v7" rel="alternate" type="text/html"/>
    <category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/1810.04805v2</id>
    <published>2018-10-11T00:50:01Z</published>
    <title>BERT: Pre-training of Deep Bidirectional Transformers</title>
    <summary>We introduce a new language representation model called BERT.</summary>
    <author><name>Jacob Devlin</name></author>
    <category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#;

    #[test]
    fn parses_entries_in_order() {
        let entries = parse_feed(FEED);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Attention Is All You Need");
        assert_eq!(entries[0].published, "2017-06-12");
        assert_eq!(entries[0].authors, vec!["Ashish Vaswani", "Noam Shazeer"]);
        assert!(entries[0].summary.starts_with("The dominant sequence"));
        assert_eq!(entries[1].authors, vec!["Jacob Devlin"]);
    }

    #[test]
    fn feed_title_is_not_an_entry() {
        let entries = parse_feed(FEED);
        assert!(entries.iter().all(|e| !e.title.starts_with("ArXiv Query")));
    }

    #[test]
    fn empty_feed_has_no_entries() {
        let feed = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>ArXiv Query</title></feed>"#;
        assert!(parse_feed(feed).is_empty());
    }

    #[test]
    fn render_matches_snippet_layout() {
        let entry = ArxivEntry {
            published: "2017-06-12".into(),
            title: "Attention Is All You Need".into(),
            authors: vec!["A".into(), "B".into()],
            summary: "Transformers.".into(),
        };
        assert_eq!(
            entry.render(),
            "Published: 2017-06-12\nTitle: Attention Is All You Need\nAuthors: A, B\nSummary: Transformers."
        );
    }
}
