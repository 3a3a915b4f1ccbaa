//! Title text helpers.

use once_cell::sync::Lazy;
use regex::Regex;

/// `[TEXT](http...)` markdown-style links.
static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\(\s*https?://[^)\s]*\s*\)").expect("valid regex"));

static BARE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid regex"));

static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));

pub fn contains_reference_link(text: &str) -> bool {
    MARKDOWN_LINK.is_match(text) || BARE_URL.is_match(text)
}

/// Remove reference links from a title, keeping markdown link text.
pub fn strip_reference_links(text: &str) -> String {
    let without_markdown = MARKDOWN_LINK.replace_all(text, "$1");
    let without_urls = BARE_URL.replace_all(&without_markdown, "");
    SPACE_RUN.replace_all(without_urls.trim(), " ").into_owned()
}
