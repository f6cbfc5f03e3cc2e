use encoding_rs::{Encoding, UTF_8};
use html5ever::driver::{self, ParseOpts};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder};
use scraper::{Html, Node};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use crate::error::{AppError, Result};

/// Upper bound on extracted text, in characters.
pub const MAX_TEXT_CHARS: usize = 5000;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Plain text pulled from a fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub source_url: String,
    pub text: String,
}

/// HTTP client for pulling pages. Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Fetches a page with a single GET. Non-2xx statuses are errors.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let declared = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_param);
        let bytes = response.bytes().await?;
        Ok(decode_html(&bytes, declared))
    }

    /// Fetches `url` and reduces the page to at most [`MAX_TEXT_CHARS`] characters of text.
    pub async fn extract_text_from_url(&self, url: &str) -> Result<ExtractedText> {
        let fetch_start = Instant::now();
        let html = self.fetch_html(url).await.map_err(|e| {
            warn!(url, error = %e, "page fetch failed");
            AppError::Fetch(format!("Error extracting text from URL: {}", e))
        })?;
        debug!(url, bytes = html.len(), elapsed = ?fetch_start.elapsed(), "page fetched");

        let text = extract_text(&html);
        info!(url, chars = text.chars().count(), "extracted page text");

        Ok(ExtractedText {
            source_url: url.to_string(),
            text,
        })
    }
}

/// Visible text of an HTML document with `<script>` and `<style>` content
/// removed, whitespace normalized and the result capped at [`MAX_TEXT_CHARS`].
pub fn extract_text(html: &str) -> String {
    // With scripting off, <noscript> children parse as elements instead of
    // one raw-text blob of markup.
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let document = driver::parse_document(Html::new_document(), opts).one(html);

    let mut raw = String::with_capacity(html.len() / 2);
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            matches!(ancestor.value(), Node::Element(el) if matches!(el.name(), "script" | "style"))
        });
        if !hidden {
            raw.push_str(text);
        }
    }

    let mut text = normalize_whitespace(&raw);
    truncate_chars(&mut text, MAX_TEXT_CHARS);
    text
}

/// Trims every line, breaks lines apart at each double space, and joins the
/// non-empty pieces with single spaces. Single spaces inside a piece survive.
pub fn normalize_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.split(is_line_break) {
        for phrase in trim_text(line).split("  ") {
            let phrase = trim_text(phrase);
            if phrase.is_empty() {
                continue;
            }
            if !result.is_empty() {
                result.push(' ');
            }
            result.push_str(phrase);
        }
    }

    result
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Whitespace for trimming purposes: Unicode whitespace plus the ASCII
/// separators U+001C..=U+001F.
pub fn is_text_whitespace(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\u{1c}'..='\u{1f}')
}

pub fn trim_text(text: &str) -> &str {
    text.trim_matches(is_text_whitespace)
}

/// Decodes a page body. A charset in the Content-Type header wins, then a
/// `<meta>` charset in the first 1024 bytes, then UTF-8. A BOM overrides all.
pub fn decode_html(bytes: &[u8], declared: Option<&'static Encoding>) -> String {
    let encoding = declared
        .or_else(|| sniff_meta_charset(bytes))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]).to_ascii_lowercase();
    head.split("<meta")
        .skip(1)
        .filter_map(|tag| tag.split('>').next())
        .find_map(charset_param)
}

/// Encoding named by a `charset=` parameter, as found in a Content-Type
/// value or a `<meta>` tag.
fn charset_param(value: &str) -> Option<&'static Encoding> {
    let lower = value.to_ascii_lowercase();
    let start = lower.find("charset=")? + "charset=".len();
    let label = lower[start..].trim_start_matches(['"', '\'', ' ']);
    let end = label
        .find(|c: char| matches!(c, '"' | '\'' | ';' | ' ' | '/' | '>'))
        .unwrap_or(label.len());
    Encoding::for_label(label[..end].as_bytes())
}

fn truncate_chars(text: &mut String, max_chars: usize) {
    if let Some((idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(idx);
    }
}
