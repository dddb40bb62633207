use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use shelfscope_core::{AppConfig, CatalogKind, HttpConfig};
use tracing::warn;

use crate::error::{FetchError, Result};
use crate::extract::{first_capture, og_image};
use crate::http::PoliteClient;
use crate::slug::slugify;
use crate::sources::{CatalogSource, LookupKey, LookupResult};

const NAME: &str = "letterboxd";
const HIGH_RES_MARKER: &str = "1000-0-1500";

static POSTER_IMG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<img[^>]+src="(https://a\.ltrbxd\.com/resized/[^"]+)"[^>]*class="[^"]*image[^"]*""#)
        .expect("valid regex")
});
static CROP_DIMENSIONS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-\d+-\d+-\d+-\d+-crop").expect("valid regex"));

/// Film lookup against `letterboxd.com/film/<slug>/`.
pub struct LetterboxdSource {
    client: PoliteClient,
    base_url: String,
}

impl LetterboxdSource {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let profile = config.profile(CatalogKind::Movie);
        Self::with_params(&profile.base_url, &config.http, profile.timeout())
    }

    pub fn with_params(base_url: &str, http: &HttpConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: PoliteClient::new(http, timeout, NAME)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn film_url(&self, title: &str) -> String {
        format!("{}/film/{}/", self.base_url, slugify(title))
    }

    pub fn parse_film_page(html: &str) -> Result<Option<String>> {
        if let Some(url) = first_capture(&POSTER_IMG_RE, html) {
            return Ok(Some(url));
        }
        og_image(&Html::parse_document(html))
    }
}

/// Rewrite a resized poster's crop tuple to the 1000x1500 variant.
pub fn normalize_cover(url: &str) -> String {
    if url.contains("resized") && !url.contains(HIGH_RES_MARKER) {
        CROP_DIMENSIONS_RE
            .replace_all(url, "-0-1000-0-1500-crop")
            .into_owned()
    } else {
        url.to_string()
    }
}

#[async_trait]
impl CatalogSource for LetterboxdSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn kind(&self) -> CatalogKind {
        CatalogKind::Movie
    }

    async fn lookup(&self, key: &LookupKey) -> Result<LookupResult> {
        let link = self.film_url(&key.title);
        let html = self
            .client
            .get_text(&link)
            .await
            .map_err(FetchError::rate_limit_as_not_found)?;

        let cover = match Self::parse_film_page(&html)? {
            Some(raw) => normalize_cover(&raw),
            None => {
                warn!("{NAME}: no cover found for {}", key.title);
                String::new()
            }
        };
        Ok(LookupResult { link, cover })
    }
}
