//! Utility functions and helpers.

pub mod http;
pub mod log;

use scraper::{ElementRef, Selector};
use url::Url;

use crate::error::{AppError, Result};

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).map(|u| u.to_string()).ok()
}

/// Resolve a URL string against a base URL string.
pub fn resolve(base_url: &str, href: &str) -> Option<String> {
    Url::parse(base_url)
        .ok()
        .and_then(|base| resolve_url(&base, href))
}

/// Drop everything from the first `?` on.
pub fn strip_query(url: &str) -> String {
    url.split('?').next().unwrap_or(url).to_string()
}

/// Give a site URL a scheme.
///
/// Handles the protocol-relative `//host` form seen in upstream school data.
/// Returns `None` for blank input.
pub fn normalize_site_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let mut url = trimmed.strip_prefix("//").unwrap_or(trimmed).to_string();
    if url.is_empty() {
        return None;
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        url = format!("https://{url}");
    }
    Some(url)
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `haystack` contains any of `needles`. Both sides are expected lowercase.
pub fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

/// Parse a CSS selector, mapping the parse error into `AppError::Selector`.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Whitespace-normalized text content of an element.
pub fn element_text(element: &ElementRef<'_>) -> String {
    normalize_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Value of a `mailto:` or `tel:` link with the scheme and any query removed.
pub fn contact_value(anchor: &ElementRef<'_>, prefix: &str) -> Option<String> {
    let href = anchor.value().attr("href")?.trim();
    let value = href
        .get(..prefix.len())
        .filter(|scheme| scheme.eq_ignore_ascii_case(prefix))
        .map(|_| &href[prefix.len()..])?;
    let value = value.split('?').next().unwrap_or(value).trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Lowercase every entry of a keyword list.
pub fn lowercase_all(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}
