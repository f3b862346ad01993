use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::{SearchError, SearchProvider};
use crate::config::SearchOptions;
use crate::fetch::BROWSER_USER_AGENT;

const HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// DuckDuckGo's no-JavaScript results page, scraped for result links.
#[derive(Clone)]
pub struct DuckDuckGo {
    http: Client,
    base_url: String,
    options: SearchOptions,
}

impl DuckDuckGo {
    pub fn new(http: Client, options: SearchOptions) -> Self {
        Self {
            http,
            base_url: HTML_ENDPOINT.to_string(),
            options,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str, options: SearchOptions) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            options,
        }
    }

    fn request_url(&self, query: &str) -> Result<url::Url, url::ParseError> {
        let mut params = vec![
            ("q", query),
            ("kl", self.options.region.as_str()),
            ("kp", self.options.safe_search.ddg_param()),
        ];
        if let Some(limit) = self.options.time_limit {
            params.push(("df", limit.ddg_param()));
        }
        url::Url::parse_with_params(&self.base_url, &params)
    }
}

impl SearchProvider for DuckDuckGo {
    fn name(&self) -> &str {
        "DuckDuckGo"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, SearchError> {
        let url = self.request_url(query)?;

        let response = self
            .http
            .get(url)
            .header("User-Agent", BROWSER_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        // 202 is the challenge page served when DuckDuckGo throttles a client.
        if status == StatusCode::ACCEPTED || status == StatusCode::TOO_MANY_REQUESTS {
            warn!(status = %status, "DuckDuckGo rejected search request");
            return Err(SearchError::Blocked);
        }
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let html = response.text().await?;
        let links = parse_results(&html, max_results);
        debug!(count = links.len(), "DuckDuckGo results parsed");
        Ok(links)
    }
}

fn parse_results(html: &str, max_results: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a.result__a") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(unwrap_redirect)
        .take(max_results)
        .collect()
}

/// Result anchors point at `//duckduckgo.com/l/?uddg=<target>`; recover the target.
/// Other DuckDuckGo-hosted links (ads, internal pages) are dropped.
fn unwrap_redirect(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    let Ok(parsed) = url::Url::parse(&absolute) else {
        return Some(href.to_string());
    };

    let is_ddg = parsed
        .host_str()
        .is_some_and(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com"));
    if !is_ddg {
        return Some(absolute);
    }

    if parsed.path().starts_with("/l/") {
        return parsed
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned());
    }

    None
}
