use thiserror::Error;

/// All errors that can occur in shelfscope-core.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Unknown catalog kind: {0} (expected book, game, manga or movie)")]
    UnknownKind(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
