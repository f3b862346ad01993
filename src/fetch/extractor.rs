use dom_smoothie::{Config, Readability};
use scraper::{Html, Selector};
use tracing::{debug, warn};

/// Main-content text via Readability, or `None` when nothing usable was found.
pub(super) fn readable_text(html: &str, url: Option<&str>) -> Option<String> {
    let mut readability = match Readability::new(html, url, Some(Config::default())) {
        Ok(r) => r,
        Err(e) => {
            warn!(%e, "readability init failed");
            return None;
        }
    };

    match readability.parse() {
        Ok(article) => {
            let text = tidy_lines(&article.text_content.to_string());
            if text.is_empty() { None } else { Some(text) }
        }
        Err(e) => {
            debug!(%e, "readability parse failed");
            None
        }
    }
}

/// Every non-empty `<p>` text, trimmed, one per line.
pub(super) fn paragraph_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };

    document
        .select(&selector)
        .map(|p| p.text().collect::<String>())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trim each line and drop blank ones; Readability output is heavily indented.
fn tidy_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
