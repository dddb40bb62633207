use shelfscope_core::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited by {origin}")]
    RateLimited {
        origin: String,
        retry_after: Option<u64>,
    },

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl FetchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Collapse a 429 into a plain miss, for sources that do not retry.
    pub fn rate_limit_as_not_found(self) -> Self {
        match self {
            Self::RateLimited { origin, .. } => Self::NotFound(format!("{origin} (HTTP 429)")),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
