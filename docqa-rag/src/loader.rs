//! Document acquisition from the web.
//!
//! [`WebLoader`] fetches a page over HTTP and turns it into a single
//! [`Document`] whose content is the visible text under a CSS selector.

use async_trait::async_trait;
use docqa_core::{Error, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, error, info};
use url::Url;

use crate::document::{Document, SOURCE_KEY, TITLE_KEY};

/// The selector used when none is configured.
pub const DEFAULT_SELECTOR: &str = "body";

/// Elements whose text is never part of the document.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that end a line of text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p",
    "pre", "section", "table", "td", "th", "tr", "ul",
];

/// A source of documents addressed by URL.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the documents at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] if the URL is invalid, the request fails, or
    /// the response cannot be turned into text.
    async fn fetch(&self, url: &str) -> Result<Vec<Document>>;
}

/// Extracts readable text from an HTML page.
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    content: Selector,
    title: Selector,
    blank_lines: Regex,
    spaces: Regex,
}

impl HtmlExtractor {
    /// Create an extractor reading text from elements matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `selector` is not a valid CSS selector.
    pub fn new(selector: &str) -> Result<Self> {
        let content = Selector::parse(selector)
            .map_err(|e| Error::Config(format!("invalid CSS selector '{selector}': {e}")))?;
        let title = Selector::parse("title")
            .map_err(|e| Error::Config(format!("invalid title selector: {e}")))?;
        let blank_lines = Regex::new(r"\n(?:[ \t\r]*\n)+")
            .map_err(|e| Error::Config(format!("invalid blank-line pattern: {e}")))?;
        let spaces = Regex::new(r"[ \t\r]+")
            .map_err(|e| Error::Config(format!("invalid whitespace pattern: {e}")))?;
        Ok(Self { content, title, blank_lines, spaces })
    }

    /// Build a [`Document`] for `url` from raw `html`.
    ///
    /// Text from every element matching the selector is concatenated.
    /// Runs of blank lines collapse to a single paragraph break.
    pub fn extract(&self, url: &str, html: &str) -> Document {
        let page = Html::parse_document(html);

        let mut raw = String::new();
        for element in page.select(&self.content) {
            collect_text(element, &mut raw);
            raw.push('\n');
        }

        let mut document = Document::new(url, self.normalise(&raw)).with_metadata(SOURCE_KEY, url);

        let title = page
            .select(&self.title)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());
        if let Some(title) = title {
            document = document.with_metadata(TITLE_KEY, title);
        }

        document
    }

    fn normalise(&self, raw: &str) -> String {
        let lines: Vec<String> = raw
            .lines()
            .map(|line| self.spaces.replace_all(line.trim(), " ").into_owned())
            .collect();
        let joined = lines.join("\n");
        self.blank_lines.replace_all(joined.trim(), "\n\n").into_owned()
    }
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if BLOCK_TAGS.contains(&name) {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Loads a web page over HTTP with `reqwest`.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::loader::{DocumentSource, WebLoader};
///
/// let loader = WebLoader::new()?;
/// let documents = loader.fetch("https://docs.smith.langchain.com/user_guide").await?;
/// ```
#[derive(Debug, Clone)]
pub struct WebLoader {
    client: reqwest::Client,
    extractor: HtmlExtractor,
}

impl WebLoader {
    /// Create a loader extracting text from `<body>`.
    pub fn new() -> Result<Self> {
        Self::with_selector(DEFAULT_SELECTOR)
    }

    /// Create a loader extracting text from elements matching `selector`.
    pub fn with_selector(selector: &str) -> Result<Self> {
        Ok(Self { client: reqwest::Client::new(), extractor: HtmlExtractor::new(selector)? })
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl DocumentSource for WebLoader {
    async fn fetch(&self, url: &str) -> Result<Vec<Document>> {
        let parsed = Url::parse(url).map_err(|e| Error::fetch(url, format!("invalid URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::fetch(url, format!("unsupported scheme '{}'", parsed.scheme())));
        }

        debug!(url, "fetching page");
        let response = self.client.get(parsed).send().await.map_err(|e| {
            error!(url, error = %e, "request failed");
            Error::fetch(url, format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(url, %status, "page returned an error status");
            return Err(Error::fetch(url, format!("server returned {status}")));
        }

        let html = response.text().await.map_err(|e| {
            error!(url, error = %e, "failed to read body");
            Error::fetch(url, format!("failed to read body: {e}"))
        })?;

        let document = self.extractor.extract(url, &html);
        info!(url, content_length = document.content.chars().count(), "loaded document");
        Ok(vec![document])
    }
}
