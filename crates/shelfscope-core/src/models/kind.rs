use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// The four catalogs Shelfscope knows how to enrich, one external source each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    /// Goodreads search + detail page.
    Book,
    /// Backloggd game page.
    Game,
    /// Jikan (MyAnimeList) JSON API.
    Manga,
    /// Letterboxd film page.
    Movie,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 4] = [Self::Book, Self::Game, Self::Manga, Self::Movie];

    /// Plural noun used in progress output ("Processing 12 books...").
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Book => "books",
            Self::Game => "games",
            Self::Manga => "manga",
            Self::Movie => "movies",
        }
    }

    /// Human name of the external source backing this catalog.
    pub fn source_name(&self) -> &'static str {
        match self {
            Self::Book => "Goodreads",
            Self::Game => "Backloggd",
            Self::Manga => "Jikan",
            Self::Movie => "Letterboxd",
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Book => "book",
            Self::Game => "game",
            Self::Manga => "manga",
            Self::Movie => "movie",
        };
        write!(f, "{s}")
    }
}

impl FromStr for CatalogKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "book" | "books" => Ok(Self::Book),
            "game" | "games" | "storygames" => Ok(Self::Game),
            "manga" => Ok(Self::Manga),
            "movie" | "movies" | "film" => Ok(Self::Movie),
            other => Err(CatalogError::UnknownKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_parse_roundtrip() {
        for kind in CatalogKind::ALL {
            let parsed: CatalogKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_kind_accepts_plurals() {
        assert_eq!("Books".parse::<CatalogKind>().unwrap(), CatalogKind::Book);
        assert_eq!("storygames".parse::<CatalogKind>().unwrap(), CatalogKind::Game);
    }

    #[test]
    fn test_unknown_kind_is_error() {
        let err = "podcast".parse::<CatalogKind>().unwrap_err();
        assert!(matches!(err, CatalogError::UnknownKind(ref k) if k == "podcast"));
    }
}
