mod extractor;

use std::time::Duration;

use reqwest::{Client, StatusCode, header};
use serde::Serialize;
use tracing::debug;

use crate::text::truncate_chars;

/// Sent on every page and search request; many sites refuse obvious bots.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

/// Timeout for the Readability download.
const PAGE_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for the direct paragraph-scraping fetch.
const FALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_RESPONSE_BYTES: usize = 10_000_000;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: must be HTTP(S)")]
    InvalidScheme,

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("fetch failed: status {0}")]
    Status(u16),

    #[error("response too large (>{} bytes)", MAX_RESPONSE_BYTES)]
    TooLarge,

    #[error("no content found")]
    NoContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Readability,
    Paragraphs,
}

impl ExtractionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionMethod::Readability => "readability",
            ExtractionMethod::Paragraphs => "paragraphs",
        }
    }
}

/// Text pulled from one page. Existence implies extraction succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub url: String,
    pub text: String,
    pub method: ExtractionMethod,
}

struct Page {
    final_url: String,
    html: String,
}

/// Extract at most `max_chars` characters of main text from `url`.
///
/// Readability runs first; when it yields nothing the page is fetched again
/// with a short timeout and all `<p>` texts are joined instead.
pub async fn extract_article_text(
    client: &Client,
    url: &str,
    max_chars: usize,
) -> Result<ExtractedArticle, FetchError> {
    extract_with_timeouts(client, url, max_chars, PAGE_TIMEOUT, FALLBACK_TIMEOUT).await
}

async fn extract_with_timeouts(
    client: &Client,
    url: &str,
    max_chars: usize,
    page_timeout: Duration,
    fallback_timeout: Duration,
) -> Result<ExtractedArticle, FetchError> {
    let url = normalize_url(url)?;

    let page = download(client, &url, page_timeout).await?;
    let (text, method) = match extractor::readable_text(&page.html, Some(&page.final_url)) {
        Some(text) => {
            debug!(url = %url, chars = text.chars().count(), "readability extraction succeeded");
            (text, ExtractionMethod::Readability)
        }
        None => {
            debug!(url = %url, "readability found no content, scraping paragraphs");
            let page = download(client, &url, fallback_timeout).await?;
            (extractor::paragraph_text(&page.html), ExtractionMethod::Paragraphs)
        }
    };

    // An empty text after the cap is not evidence.
    let text = truncate_chars(&text, max_chars);
    if text.trim().is_empty() {
        return Err(FetchError::NoContent);
    }

    Ok(ExtractedArticle {
        text: text.to_string(),
        url,
        method,
    })
}

/// Prefix `https://` when the link carries no scheme, then require HTTP(S).
pub fn normalize_url(raw: &str) -> Result<String, FetchError> {
    let raw = raw.trim();
    let (candidate, parsed) = match url::Url::parse(raw) {
        Ok(parsed) => (raw.to_string(), parsed),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let prefixed = format!("https://{}", raw.trim_start_matches('/'));
            let parsed = url::Url::parse(&prefixed)?;
            (prefixed, parsed)
        }
        Err(e) => return Err(e.into()),
    };

    match parsed.scheme() {
        "http" | "https" => Ok(candidate),
        _ => Err(FetchError::InvalidScheme),
    }
}

async fn download(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<Page, FetchError> {
    let mut response = client
        .get(url)
        .header(header::USER_AGENT, BROWSER_USER_AGENT)
        .header(header::ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
        .timeout(timeout)
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status(status.as_u16()));
    }

    let final_url = response.url().to_string();
    let charset = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(charset_from_content_type)
        .map(str::to_string);

    if let Some(len) = response.content_length()
        && len as usize > MAX_RESPONSE_BYTES
    {
        return Err(FetchError::TooLarge);
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        body.extend_from_slice(&chunk);
        if body.len() > MAX_RESPONSE_BYTES {
            return Err(FetchError::TooLarge);
        }
    }

    let html = decode_body(&body, charset.as_deref());
    debug!(url = %final_url, bytes = body.len(), "page downloaded");
    Ok(Page { final_url, html })
}

fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Decode with the declared charset, UTF-8 otherwise. A BOM wins over both.
fn decode_body(body: &[u8], charset: Option<&str>) -> String {
    let encoding = charset
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
        .unwrap_or(encoding_rs::UTF_8);
    let (text, _, _) = encoding.decode(body);
    text.into_owned()
}



#[cfg(test)]
mod http_tests {
    use super::fixtures::*;
    use super::*;
    use wiremock::matchers::{header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn html(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
    }

    #[tokio::test]
    async fn extracts_readable_article() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .and(header_eq("User-Agent", BROWSER_USER_AGENT))
            .respond_with(html(ARTICLE_HTML))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new();
        let article = extract_article_text(&client, &format!("{}/article", server.uri()), 3000)
            .await
            .unwrap();

        assert_eq!(article.method, ExtractionMethod::Readability);
        assert!(article.text.contains("ownership"));
        assert!(!article.text.contains("<p>"));
    }

    #[tokio::test]
    async fn extracted_text_respects_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(html(ARTICLE_HTML))
            .mount(&server)
            .await;

        let client = Client::new();
        for cap in [1, 50, 200] {
            let article = extract_article_text(&client, &format!("{}/article", server.uri()), cap)
                .await
                .unwrap();
            assert!(article.text.chars().count() <= cap, "cap {cap} exceeded");
        }
    }

    #[tokio::test]
    async fn zero_cap_reports_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(html(ARTICLE_HTML))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new();
        let result = extract_article_text(&client, &format!("{}/article", server.uri()), 0).await;
        assert!(matches!(result, Err(FetchError::NoContent)));
    }

    #[tokio::test]
    async fn falls_back_to_paragraphs_when_readability_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thin"))
            .respond_with(html(EMPTY_HTML))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/thin"))
            .and(header_eq("User-Agent", BROWSER_USER_AGENT))
            .respond_with(html(PARAGRAPHS_HTML))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new();
        let article = extract_article_text(&client, &format!("{}/thin", server.uri()), 3000)
            .await
            .unwrap();

        assert_eq!(article.method, ExtractionMethod::Paragraphs);
        assert_eq!(article.text, "First paragraph.\nSecond paragraph.");
    }

    #[tokio::test]
    async fn slow_fallback_fetch_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(html(EMPTY_HTML))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(html(PARAGRAPHS_HTML).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = Client::new();
        let result = extract_with_timeouts(
            &client,
            &format!("{}/slow", server.uri()),
            3000,
            PAGE_TIMEOUT,
            Duration::from_millis(100),
        )
        .await;

        match result {
            Err(FetchError::Http(e)) => assert!(e.is_timeout(), "expected timeout, got {e}"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_page_reports_no_content_after_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(html(EMPTY_HTML))
            .expect(2)
            .mount(&server)
            .await;

        let client = Client::new();
        let result = extract_article_text(&client, &format!("{}/empty", server.uri()), 3000).await;
        assert!(matches!(result, Err(FetchError::NoContent)));
    }

    #[tokio::test]
    async fn error_status_fails_without_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new();
        let result = extract_article_text(&client, &format!("{}/missing", server.uri()), 3000).await;
        assert!(matches!(result, Err(FetchError::Status(404))));
    }

    #[tokio::test]
    async fn fallback_status_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(html(EMPTY_HTML))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = Client::new();
        let result = extract_article_text(&client, &format!("{}/flaky", server.uri()), 3000).await;
        assert!(matches!(result, Err(FetchError::Status(403))));
    }

    #[tokio::test]
    async fn download_decodes_declared_charset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latin1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"<p>caf\xe9</p>".to_vec(), "text/html; charset=windows-1252"),
            )
            .mount(&server)
            .await;

        let client = Client::new();
        let page = download(&client, &format!("{}/latin1", server.uri()), PAGE_TIMEOUT)
            .await
            .unwrap();
        assert!(page.html.contains("café"));
    }

    #[tokio::test]
    async fn download_too_large_body_rejected() {
        let oversized = "x".repeat(MAX_RESPONSE_BYTES + 1);
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/huge"))
            .respond_with(ResponseTemplate::new(200).set_body_string(oversized))
            .mount(&server)
            .await;

        let client = Client::new();
        let result = download(&client, &format!("{}/huge", server.uri()), PAGE_TIMEOUT).await;
        assert!(matches!(result, Err(FetchError::TooLarge)));
    }
}
