use async_trait::async_trait;
use shelfscope_core::{AppConfig, CatalogKind, Item};

use crate::error::Result;

/// What a source needs to find an item: its display title, plus the author
/// for sources that search by both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKey {
    pub title: String,
    pub author: Option<String>,
}

impl LookupKey {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn from_item(item: &Item) -> Self {
        Self {
            title: item.title().to_string(),
            author: item.author().map(ToOwned::to_owned),
        }
    }
}

/// Canonical page link and cover URL found for one item. Either may be empty
/// when the source had nothing for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupResult {
    pub link: String,
    pub cover: String,
}

/// One external site or API able to resolve a title to a link and cover.
///
/// `lookup` maps the outcome onto [`crate::FetchError`]: `NotFound` for a miss
/// or non-success status, `Http` for transport failures, `RateLimited` when
/// the caller should cool down and retry, `Extraction` when the payload is
/// missing a field the link cannot be built without.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn name(&self) -> &'static str;
    fn kind(&self) -> CatalogKind;
    async fn lookup(&self, key: &LookupKey) -> Result<LookupResult>;
}

/// Build the source backing `kind`, configured from its catalog profile.
pub fn source_for(kind: CatalogKind, config: &AppConfig) -> Result<Box<dyn CatalogSource>> {
    let source: Box<dyn CatalogSource> = match kind {
        CatalogKind::Book => Box::new(goodreads::GoodreadsSource::new(config)?),
        CatalogKind::Game => Box::new(backloggd::BackloggdSource::new(config)?),
        CatalogKind::Manga => Box::new(jikan::JikanSource::new(config)?),
        CatalogKind::Movie => Box::new(letterboxd::LetterboxdSource::new(config)?),
    };
    Ok(source)
}

pub mod goodreads;
pub mod backloggd;
pub mod jikan;
pub mod letterboxd;
