//! Shared HTML extraction helpers used by the scraping sources.

use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{FetchError, Result};

pub fn parse_selector(input: &str) -> Result<Selector> {
    Selector::parse(input)
        .map_err(|e| FetchError::Parse(format!("invalid selector {input}: {e}")))
}

/// First non-blank value of `attr` on an element matching `selector`.
pub fn select_attr(document: &Html, selector: &str, attr: &str) -> Result<Option<String>> {
    let selector = parse_selector(selector)?;
    Ok(document
        .select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(ToOwned::to_owned))
}

/// The page's `og:image` meta tag.
pub fn og_image(document: &Html) -> Result<Option<String>> {
    select_attr(document, r#"meta[property="og:image"]"#, "content")
}

/// First capture group of `re` in `html`, if non-empty.
pub fn first_capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
