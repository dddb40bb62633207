//! Lookup keys derived from an item's title (and author, for books).

use once_cell::sync::Lazy;
use regex::Regex;

static HYPHEN_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid regex"));

/// Characters dropped outright when building a slug.
const STRIPPED: &[char] = &[':', '\'', '.', ',', '!', '?'];

/// Path slug in the style Backloggd and Letterboxd use: `"Cats & Dogs - A Story"`
/// becomes `"cats-and-dogs-a-story"`.
///
/// Titles that normalize to nothing come back empty; callers pass that through.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped: String = lowered.chars().filter(|c| !STRIPPED.contains(c)).collect();
    let replaced = stripped.replace('&', "and").replace(" - ", "-");
    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let hyphenated = collapsed.replace(' ', "-");
    HYPHEN_RUN_RE.replace_all(&hyphenated, "-").into_owned()
}

/// Percent-encoded `"title author"` for a free-text search endpoint.
pub fn search_query(title: &str, author: Option<&str>) -> String {
    let query = match author.map(str::trim).filter(|a| !a.is_empty()) {
        Some(author) => format!("{} {author}", title.trim()),
        None => title.trim().to_string(),
    };
    urlencoding::encode(&query).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugifies_punctuation_and_case() {
        assert_eq!(slugify("Amélie: The Movie!"), "amélie-the-movie");
        assert_eq!(slugify("Cats & Dogs - A Story"), "cats-and-dogs-a-story");
        assert_eq!(slugify("What's Eating Gilbert Grape?"), "whats-eating-gilbert-grape");
        assert_eq!(slugify("Mr. & Mrs. Smith"), "mr-and-mrs-smith");
    }

    #[test]
    fn test_collapses_whitespace_and_hyphens() {
        assert_eq!(slugify("  Spider-Man:   Into  the -- Spider-Verse "), "spider-man-into-the-spider-verse");
        assert_eq!(slugify("Tab\tSeparated\nTitle"), "tab-separated-title");
    }

    #[test]
    fn test_slug_never_contains_forbidden_characters() {
        let titles = [
            "Hello, World!",
            "Who's Afraid of Virginia Woolf?",
            "A  -  B",
            "Fate/stay night: Unlimited Blade Works",
            "...",
        ];
        for title in titles {
            let slug = slugify(title);
            assert!(!slug.contains(' '), "{slug}");
            assert!(!slug.contains("--"), "{slug}");
            for c in STRIPPED {
                assert!(!slug.contains(*c), "{slug}");
            }
            assert_eq!(slug, slugify(title));
        }
    }

    #[test]
    fn test_punctuation_only_title_is_passed_through_empty() {
        assert_eq!(slugify("?!"), "");
    }

    #[test]
    fn test_search_query_joins_and_encodes() {
        assert_eq!(
            search_query("The Left Hand of Darkness", Some("Ursula K. Le Guin")),
            "The%20Left%20Hand%20of%20Darkness%20Ursula%20K.%20Le%20Guin"
        );
        assert_eq!(search_query("Dune", None), "Dune");
        assert_eq!(search_query("Dune", Some("  ")), "Dune");
        assert_eq!(search_query("Ficciones", Some("Borges & Co")), "Ficciones%20Borges%20%26%20Co");
    }
}
