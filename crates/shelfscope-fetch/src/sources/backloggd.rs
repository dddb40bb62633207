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

const NAME: &str = "backloggd";

static IGDB_COVER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(https://images\.igdb\.com/igdb/image/upload/t_cover_big[^"']*)"#)
        .expect("valid regex")
});

/// Game lookup against `backloggd.com/games/<slug>/`. Covers are served from
/// the IGDB image CDN.
pub struct BackloggdSource {
    client: PoliteClient,
    base_url: String,
}

impl BackloggdSource {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let profile = config.profile(CatalogKind::Game);
        Self::with_params(&profile.base_url, &config.http, profile.timeout())
    }

    pub fn with_params(base_url: &str, http: &HttpConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: PoliteClient::new(http, timeout, NAME)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn game_url(&self, title: &str) -> String {
        format!("{}/games/{}/", self.base_url, slugify(title))
    }

    pub fn parse_game_page(html: &str) -> Result<Option<String>> {
        if let Some(url) = first_capture(&IGDB_COVER_RE, html) {
            return Ok(Some(url));
        }
        og_image(&Html::parse_document(html))
    }
}

#[async_trait]
impl CatalogSource for BackloggdSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn kind(&self) -> CatalogKind {
        CatalogKind::Game
    }

    async fn lookup(&self, key: &LookupKey) -> Result<LookupResult> {
        let link = self.game_url(&key.title);
        let html = self
            .client
            .get_text(&link)
            .await
            .map_err(FetchError::rate_limit_as_not_found)?;

        let cover = Self::parse_game_page(&html)?.unwrap_or_else(|| {
            warn!("{NAME}: no cover found for {}", key.title);
            String::new()
        });
        Ok(LookupResult { link, cover })
    }
}
