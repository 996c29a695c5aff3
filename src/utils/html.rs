//! Pattern extraction from fetched pages

use crate::error::HkError;
use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;

/// Return capture group 1 of the first match, or `NotFound(label)`
pub fn search_regex(re: &Regex, text: &str, label: &str) -> Result<String, HkError> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| HkError::NotFound(label.to_string()))
}

/// Like [`search_regex`], but strips markup from the capture
pub fn html_search_regex(re: &Regex, text: &str, label: &str) -> Result<String, HkError> {
    search_regex(re, text, label).map(|value| clean_html(&value))
}

/// Reduce an HTML fragment to plain text
pub fn clean_html(html: &str) -> String {
    static BR_RE: OnceLock<Regex> = OnceLock::new();
    static TAG_RE: OnceLock<Regex> = OnceLock::new();

    let text = html.replace('\n', " ");
    let text = BR_RE
        .get_or_init(|| Regex::new(r"(?i)\s*<br\s*/?>\s*").unwrap())
        .replace_all(&text, "\n");
    let text = TAG_RE
        .get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
        .replace_all(&text, "");

    unescape_html(&text).trim().to_string()
}

/// Decode `&...;` character references, named or numeric
///
/// Only semicolon-terminated references are touched, so query strings such
/// as `?a=1&copy=2` survive.
pub fn unescape_html(text: &str) -> String {
    static ENTITY_RE: OnceLock<Regex> = OnceLock::new();
    let re = ENTITY_RE.get_or_init(|| {
        Regex::new(r"&(?:#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z][a-zA-Z0-9]*);").unwrap()
    });

    re.replace_all(text, |caps: &regex::Captures<'_>| decode_reference(&caps[0]))
        .into_owned()
}

/// Run one reference through the HTML5 tokenizer; unknown names come back as-is
fn decode_reference(reference: &str) -> String {
    Html::parse_fragment(reference)
        .root_element()
        .text()
        .collect()
}
