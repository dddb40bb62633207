//! Manga lookup through Jikan, the unofficial MyAnimeList API.
//! Jikan allows 3 requests/second and 60 requests/minute.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use shelfscope_core::{AppConfig, CatalogKind, HttpConfig};
use tracing::warn;

use crate::error::{FetchError, Result};
use crate::http::PoliteClient;
use crate::sources::{CatalogSource, LookupKey, LookupResult};

const NAME: &str = "jikan";
const MAL_MANGA_URL: &str = "https://myanimelist.net/manga";

// === API Response Types ===

#[derive(Debug, Deserialize)]
pub struct JikanSearchResponse {
    #[serde(default)]
    pub data: Vec<JikanManga>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanManga {
    pub mal_id: Option<i64>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub images: Option<JikanImages>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanImages {
    pub jpg: Option<JikanImageSet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanImageSet {
    pub image_url: Option<String>,
    pub large_image_url: Option<String>,
}

impl JikanManga {
    /// Largest JPEG available, else empty.
    pub fn cover(&self) -> String {
        self.images
            .as_ref()
            .and_then(|images| images.jpg.as_ref())
            .and_then(|jpg| {
                [&jpg.large_image_url, &jpg.image_url]
                    .into_iter()
                    .flatten()
                    .find(|url| !url.is_empty())
                    .cloned()
            })
            .unwrap_or_default()
    }

    /// The entry's own URL, else one built from its MAL id. Without an id
    /// there is nothing to link to.
    pub fn link(&self) -> Result<String> {
        let Some(mal_id) = self.mal_id.filter(|id| *id > 0) else {
            return Err(FetchError::Extraction(format!(
                "{NAME}: no MAL id for {}",
                self.title.as_deref().unwrap_or("result")
            )));
        };
        Ok(self
            .url
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| format!("{MAL_MANGA_URL}/{mal_id}")))
    }
}

/// Manga lookup via the Jikan search endpoint, first hit only.
pub struct JikanSource {
    client: PoliteClient,
    base_url: String,
}

impl JikanSource {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let profile = config.profile(CatalogKind::Manga);
        Self::with_params(&profile.base_url, &config.http, profile.timeout())
    }

    pub fn with_params(base_url: &str, http: &HttpConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: PoliteClient::new(http, timeout, NAME)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn parse_search_response(body: &str, title: &str) -> Result<LookupResult> {
        let response: JikanSearchResponse =
            serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;
        let Some(manga) = response.data.into_iter().next() else {
            return Err(FetchError::NotFound(format!("{NAME}: no results for {title}")));
        };

        let link = manga.link()?;
        let cover = manga.cover();
        if cover.is_empty() {
            warn!("{NAME}: no cover image for {title}");
        }
        Ok(LookupResult { link, cover })
    }
}

#[async_trait]
impl CatalogSource for JikanSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn kind(&self) -> CatalogKind {
        CatalogKind::Manga
    }

    async fn lookup(&self, key: &LookupKey) -> Result<LookupResult> {
        let url = format!("{}/manga", self.base_url);
        let body = self
            .client
            .get_text_with_query(&url, &[("q", key.title.as_str()), ("limit", "1")])
            .await?;
        Self::parse_search_response(&body, &key.title)
    }
}
