//! Web scraping for the generic-page strategy.
//!
//! Uses reqwest for fetching and scraper for HTML parsing. An extraction
//! that finds nothing still yields a document with an empty body; callers
//! decide whether that is a problem.

use lazy_static::lazy_static;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use thiserror::Error;

use crate::document::{Document, Metadata};
use crate::source::PageRequest;

/// Default timeout for HTTP requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fragments shorter than this are navigation crumbs, not content
const MIN_FRAGMENT_LEN: usize = 20;

lazy_static! {
    static ref TITLE_SELECTOR: Selector = Selector::parse("title").unwrap();
    static ref H1_SELECTOR: Selector = Selector::parse("h1").unwrap();
    static ref CONTENT_SELECTOR: Selector =
        Selector::parse("p, h1, h2, h3, h4, h5, h6, li").unwrap();
    /// Main content regions, tried in order before falling back to the body
    static ref REGION_SELECTORS: Vec<Selector> =
        ["article", "main", "[role='main']", ".content", "#content"]
            .iter()
            .map(|s| Selector::parse(s).unwrap())
            .collect();
}

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("failed to fetch URL: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("invalid request header: {0}")]
    InvalidHeader(String),
}

/// Build an HTTP client honouring the request's headers and TLS setting.
fn create_client(request: &PageRequest) -> Result<Client, ScrapeError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &request.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ScrapeError::InvalidHeader(e.to_string()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ScrapeError::InvalidHeader(e.to_string()))?;
        headers.insert(name, value);
    }
    Ok(Client::builder()
        .default_headers(headers)
        .danger_accept_invalid_certs(!request.ssl_verify)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Fetch every page in the request and extract its readable text.
///
/// Returns one document per URL, in request order. A page that fetches but
/// yields no extractable text still produces a document.
pub async fn fetch_pages(request: &PageRequest) -> Result<Vec<Document>, ScrapeError> {
    let client = create_client(request)?;

    let mut documents = Vec::with_capacity(request.urls.len());
    for url in &request.urls {
        let response = client.get(url).send().await?;
        let html = response.text().await?;
        let page = Html::parse_document(&html);

        let title = extract_title(&page);
        let text = extract_text(&page);
        tracing::debug!(url = %url, chars = text.len(), "extracted page text");

        documents.push(Document {
            text,
            metadata: Metadata {
                source: url.clone(),
                title,
                ..Metadata::default()
            },
        });
    }
    Ok(documents)
}

/// Page title from <title>, falling back to the first <h1>.
fn extract_title(page: &Html) -> Option<String> {
    for selector in [&*TITLE_SELECTOR, &*H1_SELECTOR] {
        if let Some(element) = page.select(selector).next() {
            let title: String = element.text().collect();
            let title = title.trim();
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }
    }
    None
}

/// Readable text from the page: the first main-content region that yields
/// anything, otherwise paragraphs and headings from the whole document.
fn extract_text(page: &Html) -> String {
    for selector in REGION_SELECTORS.iter() {
        if let Some(region) = page.select(selector).next() {
            let text = collect_fragments(region.select(&CONTENT_SELECTOR));
            if !text.trim().is_empty() {
                return text;
            }
        }
    }
    collect_fragments(page.select(&CONTENT_SELECTOR))
}

/// Gather paragraph-like elements, dropping whitespace runs and crumbs.
fn collect_fragments<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    for element in elements {
        let text: String = element.text().collect::<Vec<_>>().join(" ");
        let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if cleaned.len() > MIN_FRAGMENT_LEN {
            paragraphs.push(cleaned);
        }
    }
    paragraphs.join("\n\n")
}
