use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use shelfscope_core::{AppConfig, CatalogKind, HttpConfig};
use tracing::{debug, warn};

use crate::error::{FetchError, Result};
use crate::extract::{og_image, select_attr};
use crate::http::PoliteClient;
use crate::slug::search_query;
use crate::sources::{CatalogSource, LookupKey, LookupResult};

const NAME: &str = "goodreads";

/// `._SX98_` / `._SY160_` thumbnail tokens in Goodreads CDN URLs.
static SIZE_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\._S[XY]\d+_").expect("valid regex"));

/// Book lookup: a search request, then the first hit's detail page.
pub struct GoodreadsSource {
    client: PoliteClient,
    base_url: String,
    detail_delay: Duration,
}

impl GoodreadsSource {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let profile = config.profile(CatalogKind::Book);
        Self::with_params(
            &profile.base_url,
            &config.http,
            profile.timeout(),
            config.pacing.detail_delay(),
        )
    }

    pub fn with_params(
        base_url: &str,
        http: &HttpConfig,
        timeout: Duration,
        detail_delay: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: PoliteClient::new(http, timeout, NAME)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            detail_delay,
        })
    }

    pub fn search_url(&self, key: &LookupKey) -> String {
        format!(
            "{}/search?q={}",
            self.base_url,
            search_query(&key.title, key.author.as_deref())
        )
    }

    /// Absolute URL of the first search result, without query string.
    pub fn parse_search_page(&self, html: &str) -> Result<Option<String>> {
        let document = Html::parse_document(html);
        let href = select_attr(&document, "a.bookTitle", "href")?;
        Ok(href.map(|href| self.absolute_book_url(&href)))
    }

    /// Cover URL from a book page, in order: the responsive cover image, the
    /// `og:image` tag, then any image inside the `BookCover` block.
    pub fn parse_book_page(html: &str) -> Result<Option<String>> {
        let document = Html::parse_document(html);
        if let Some(src) = select_attr(&document, "img.ResponsiveImage", "src")? {
            return Ok(Some(src));
        }
        if let Some(content) = og_image(&document)? {
            return Ok(Some(content));
        }
        select_attr(&document, ".BookCover img", "src")
    }

    fn absolute_book_url(&self, href: &str) -> String {
        let path = href
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

/// Drop the thumbnail size token so the URL points at the full-size cover.
pub fn normalize_cover(url: &str) -> String {
    SIZE_TOKEN_RE.replace_all(url, "").into_owned()
}

#[async_trait]
impl CatalogSource for GoodreadsSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn kind(&self) -> CatalogKind {
        CatalogKind::Book
    }

    async fn lookup(&self, key: &LookupKey) -> Result<LookupResult> {
        let search_html = self
            .client
            .get_text(&self.search_url(key))
            .await
            .map_err(FetchError::rate_limit_as_not_found)?;
        let Some(link) = self.parse_search_page(&search_html)? else {
            return Err(FetchError::NotFound(format!("{NAME}: no results for {}", key.title)));
        };
        debug!("{NAME}: first result {link}");

        tokio::time::sleep(self.detail_delay).await;
        let book_html = self
            .client
            .get_text(&link)
            .await
            .map_err(FetchError::rate_limit_as_not_found)?;

        let cover = match Self::parse_book_page(&book_html)? {
            Some(raw) => normalize_cover(&raw),
            None => {
                warn!("{NAME}: no cover found for {}", key.title);
                String::new()
            }
        };
        Ok(LookupResult { link, cover })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn source(base_url: &str) -> GoodreadsSource {
        GoodreadsSource::with_params(
            base_url,
            &HttpConfig::default(),
            Duration::from_secs(5),
            Duration::ZERO,
        )
        .unwrap()
    }

    #[test]
    fn test_strips_size_token() {
        assert_eq!(
            normalize_cover(
                "https://i.gr-assets.com/images/S/compressed.photo.goodreads.com/books/1555447414i/44767458._SY475_.jpg"
            ),
            "https://i.gr-assets.com/images/S/compressed.photo.goodreads.com/books/1555447414i/44767458.jpg"
        );
        assert_eq!(normalize_cover("https://x/1._SX98_.jpg"), "https://x/1.jpg");
        assert_eq!(normalize_cover("https://x/plain.jpg"), "https://x/plain.jpg");
    }

    #[test]
    fn test_search_page_link_is_absolute_and_canonical() {
        let src = source("https://www.goodreads.com/");
        let html = r#"<table><tr><td>
            <a class="bookTitle" href="/book/show/44767458-dune?from_search=true&amp;qid=x">Dune</a>
        </td></tr></table>"#;
        assert_eq!(
            src.parse_search_page(html).unwrap().as_deref(),
            Some("https://www.goodreads.com/book/show/44767458-dune")
        );
        assert_eq!(src.parse_search_page("<p>No results.</p>").unwrap(), None);
    }

    #[test]
    fn test_book_page_cover_fallback_order() {
        let responsive = r#"<img class="ResponsiveImage" src="https://cdn/a._SX50_.jpg">
            <meta property="og:image" content="https://cdn/og.jpg">"#;
        assert_eq!(
            GoodreadsSource::parse_book_page(responsive).unwrap().as_deref(),
            Some("https://cdn/a._SX50_.jpg")
        );

        let og_only = r#"<head><meta property="og:image" content="https://cdn/og.jpg"></head>
            <div class="BookCover"><img src="https://cdn/cover.jpg"></div>"#;
        assert_eq!(
            GoodreadsSource::parse_book_page(og_only).unwrap().as_deref(),
            Some("https://cdn/og.jpg")
        );

        let book_cover = r#"<div class="BookCover"><img src="https://cdn/cover.jpg"></div>"#;
        assert_eq!(
            GoodreadsSource::parse_book_page(book_cover).unwrap().as_deref(),
            Some("https://cdn/cover.jpg")
        );

        assert_eq!(GoodreadsSource::parse_book_page("<p></p>").unwrap(), None);
    }

    #[tokio::test]
    async fn test_lookup_follows_first_result() {
        let mut server = Server::new_async().await;
        let base_url = server.url();

        let _search = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("q".into(), "Dune Frank Herbert".into()))
            .with_status(200)
            .with_body(r#"<a class="bookTitle" href="/book/show/44767458-dune?from_search=true">Dune</a>"#)
            .create_async()
            .await;
        let _book = server
            .mock("GET", "/book/show/44767458-dune")
            .with_status(200)
            .with_body(r#"<div class="BookCover"><img class="ResponsiveImage" src="https://cdn/dune._SY475_.jpg"></div>"#)
            .create_async()
            .await;

        let result = source(&base_url)
            .lookup(&LookupKey::new("Dune").with_author("Frank Herbert"))
            .await
            .unwrap();

        assert_eq!(result.link, format!("{base_url}/book/show/44767458-dune"));
        assert_eq!(result.cover, "https://cdn/dune.jpg");
    }

    #[tokio::test]
    async fn test_lookup_keeps_link_when_cover_missing() {
        let mut server = Server::new_async().await;
        let base_url = server.url();

        let _search = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"<a class="bookTitle" href="/book/show/1.Obscure">Obscure</a>"#)
            .create_async()
            .await;
        let _book = server
            .mock("GET", "/book/show/1.Obscure")
            .with_status(200)
            .with_body("<html><body>no art</body></html>")
            .create_async()
            .await;

        let result = source(&base_url)
            .lookup(&LookupKey::new("Obscure"))
            .await
            .unwrap();
        assert_eq!(result.link, format!("{base_url}/book/show/1.Obscure"));
        assert_eq!(result.cover, "");
    }

    #[tokio::test]
    async fn test_lookup_without_results_is_not_found() {
        let mut server = Server::new_async().await;
        let _search = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<p>No results.</p>")
            .create_async()
            .await;

        let err = source(&server.url())
            .lookup(&LookupKey::new("zzzz"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_lookup_waits_between_search_and_detail_only() {
        let mut server = Server::new_async().await;
        let base_url = server.url();

        let _hit = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("q".into(), "Dune".into()))
            .with_status(200)
            .with_body(r#"<a class="bookTitle" href="/book/show/1.Dune">Dune</a>"#)
            .create_async()
            .await;
        let _miss = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("q".into(), "zzzz".into()))
            .with_status(200)
            .with_body("<p>No results.</p>")
            .create_async()
            .await;
        let _book = server
            .mock("GET", "/book/show/1.Dune")
            .with_status(200)
            .with_body(r#"<img class="ResponsiveImage" src="https://cdn/dune.jpg">"#)
            .create_async()
            .await;

        let delay = Duration::from_millis(300);
        let src =
            GoodreadsSource::with_params(&base_url, &HttpConfig::default(), Duration::from_secs(5), delay)
                .unwrap();

        let started = std::time::Instant::now();
        src.lookup(&LookupKey::new("Dune")).await.unwrap();
        assert!(started.elapsed() >= delay);

        // No detail request, so no detail delay.
        let started = std::time::Instant::now();
        src.lookup(&LookupKey::new("zzzz")).await.unwrap_err();
        assert!(started.elapsed() < delay);
    }
}
