//! Link title lookup (HTTP + markup parse).

mod http;

use async_trait::async_trait;
use scraper::{Html, Selector};

use maimai_core::error::Result;

pub use http::HttpTitleFetcher;

/// Fetches the `<title>` of a page.
#[async_trait]
pub trait TitleFetcher: Send + Sync {
    /// `Ok(None)` when the page has no usable title (missing, blank, or a
    /// known placeholder). `Err` is a transport failure.
    async fn fetch_title(&self, url: &str) -> Result<Option<String>>;
}

/// Pull the first `<title>` text out of an HTML document.
pub fn extract_title(html: &str, ignored: &[String]) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    let title = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();

    if title.is_empty() || ignored.iter().any(|i| i == &title) {
        return None;
    }
    Some(title)
}
