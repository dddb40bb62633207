use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::CatalogKind;

/// Root application configuration, loaded from `~/.config/shelfscope/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub pacing: PacingConfig,
    pub catalogs: CatalogsConfig,
}

/// Outbound request identity. The sources serve browser-shaped pages, so the
/// defaults mimic a desktop browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pause after a 429 before the single retry.
    pub cooldown_secs: u64,
    pub max_rate_limit_retries: u32,
    /// Pause between the book search request and the detail-page request.
    pub detail_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogsConfig {
    pub book: CatalogProfile,
    pub game: CatalogProfile,
    pub manga: CatalogProfile,
    pub movie: CatalogProfile,
}

/// Per-catalog settings: where the file lives, which origin to query and how
/// aggressively to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProfile {
    pub file: PathBuf,
    pub base_url: String,
    #[serde(default)]
    pub persist: PersistMode,
    pub politeness_ms: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistMode {
    /// Write the catalog once, after the loop.
    #[default]
    EndOfRun,
    /// Write the catalog after every item so an interrupted run loses at most
    /// one lookup.
    EveryItem,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 60,
            max_rate_limit_retries: 1,
            detail_delay_ms: 1000,
        }
    }
}

impl Default for CatalogsConfig {
    fn default() -> Self {
        Self {
            book: CatalogProfile::default_for(CatalogKind::Book),
            game: CatalogProfile::default_for(CatalogKind::Game),
            manga: CatalogProfile::default_for(CatalogKind::Manga),
            movie: CatalogProfile::default_for(CatalogKind::Movie),
        }
    }
}

impl CatalogProfile {
    pub fn default_for(kind: CatalogKind) -> Self {
        match kind {
            CatalogKind::Book => Self {
                file: PathBuf::from("data/books.json"),
                base_url: "https://www.goodreads.com".to_string(),
                persist: PersistMode::EndOfRun,
                politeness_ms: 1500,
                timeout_secs: 15,
            },
            CatalogKind::Game => Self {
                file: PathBuf::from("data/storygames.json"),
                base_url: "https://backloggd.com".to_string(),
                persist: PersistMode::EndOfRun,
                politeness_ms: 1500,
                timeout_secs: 10,
            },
            CatalogKind::Manga => Self {
                file: PathBuf::from("data/manga.json"),
                base_url: "https://api.jikan.moe/v4".to_string(),
                persist: PersistMode::EveryItem,
                politeness_ms: 1000,
                timeout_secs: 10,
            },
            CatalogKind::Movie => Self {
                file: PathBuf::from("data/movies.json"),
                base_url: "https://letterboxd.com".to_string(),
                persist: PersistMode::EndOfRun,
                politeness_ms: 1500,
                timeout_secs: 10,
            },
        }
    }

    pub fn politeness(&self) -> Duration {
        Duration::from_millis(self.politeness_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PacingConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn detail_delay(&self) -> Duration {
        Duration::from_millis(self.detail_delay_ms)
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/shelfscope/config.toml`
    pub fn config_path() -> PathBuf {
        // Allow override via env var
        if let Ok(path) = std::env::var("SHELFSCOPE_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("shelfscope")
            .join("config.toml")
    }

    /// Read the TOML at `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Write as TOML, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn profile(&self, kind: CatalogKind) -> &CatalogProfile {
        match kind {
            CatalogKind::Book => &self.catalogs.book,
            CatalogKind::Game => &self.catalogs.game,
            CatalogKind::Manga => &self.catalogs.manga,
            CatalogKind::Movie => &self.catalogs.movie,
        }
    }
}
