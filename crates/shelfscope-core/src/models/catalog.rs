use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CatalogError, Result};

const ITEMS_KEY: &str = "items";
const TITLE_KEY: &str = "title";
const AUTHOR_KEY: &str = "author";
const LINK_KEY: &str = "link";
const COVER_KEY: &str = "cover";

// ─── Item ──────────────────────────────────────────────────

/// One catalog entry. Only `title`, `author`, `link` and `cover` are
/// interpreted; every other key is carried through untouched and in its
/// original position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(Map<String, Value>);

impl Item {
    pub fn new(title: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(TITLE_KEY.to_string(), Value::String(title.into()));
        Self(fields)
    }

    /// Wrap a JSON value, rejecting anything that is not an object with a
    /// string `title`.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(CatalogError::InvalidCatalog(
                "item is not a JSON object".to_string(),
            ));
        };
        match fields.get(TITLE_KEY) {
            Some(Value::String(_)) => Ok(Self(fields)),
            Some(_) => Err(CatalogError::InvalidCatalog(
                "item title is not a string".to_string(),
            )),
            None => Err(CatalogError::InvalidCatalog("item has no title".to_string())),
        }
    }

    pub fn title(&self) -> &str {
        self.str_field(TITLE_KEY)
    }

    /// Author, when present and non-blank. Only the book catalog carries one.
    pub fn author(&self) -> Option<&str> {
        Some(self.str_field(AUTHOR_KEY).trim()).filter(|s| !s.is_empty())
    }

    /// Current link; absent, null and non-string values read as empty.
    pub fn link(&self) -> &str {
        self.str_field(LINK_KEY)
    }

    /// Current cover URL; absent, null and non-string values read as empty.
    pub fn cover(&self) -> &str {
        self.str_field(COVER_KEY)
    }

    /// `link` is present and not null.
    pub fn has_link_key(&self) -> bool {
        !matches!(self.0.get(LINK_KEY), None | Some(Value::Null))
    }

    /// `cover` is present and not null.
    pub fn has_cover_key(&self) -> bool {
        !matches!(self.0.get(COVER_KEY), None | Some(Value::Null))
    }

    /// `link` is absent, null or an empty string.
    pub fn link_is_fillable(&self) -> bool {
        self.is_fillable(LINK_KEY)
    }

    /// `cover` is absent, null or an empty string.
    pub fn cover_is_fillable(&self) -> bool {
        self.is_fillable(COVER_KEY)
    }

    /// Neither `link` nor `cover` can be filled in. A non-string value counts
    /// as taken: it is never overwritten.
    pub fn is_complete(&self) -> bool {
        !self.link_is_fillable() && !self.cover_is_fillable()
    }

    /// `link`/`cover` keys holding something other than a string or null.
    pub fn malformed_fields(&self) -> Vec<&'static str> {
        [LINK_KEY, COVER_KEY]
            .into_iter()
            .filter(|key| {
                self.0
                    .get(*key)
                    .is_some_and(|value| !value.is_string() && !value.is_null())
            })
            .collect()
    }

    pub fn set_link(&mut self, link: impl Into<String>) {
        self.0
            .insert(LINK_KEY.to_string(), Value::String(link.into()));
    }

    pub fn set_cover(&mut self, cover: impl Into<String>) {
        self.0
            .insert(COVER_KEY.to_string(), Value::String(cover.into()));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    fn is_fillable(&self, key: &str) -> bool {
        match self.0.get(key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        }
    }

    fn str_field(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or_default()
    }
}

// ─── Catalog ───────────────────────────────────────────────

/// A catalog document: a JSON object whose `items` key holds the entries.
///
/// Top-level keys other than `items` are kept verbatim, and `items` is written
/// back at the position it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    document: Map<String, Value>,
    items: Vec<Item>,
}

impl Catalog {
    pub fn from_items(items: Vec<Item>) -> Self {
        let mut document = Map::new();
        document.insert(ITEMS_KEY.to_string(), Value::Null);
        Self { document, items }
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut document) = value else {
            return Err(CatalogError::InvalidCatalog(
                "catalog root is not a JSON object".to_string(),
            ));
        };

        let raw_items = match document.get_mut(ITEMS_KEY).map(Value::take) {
            Some(Value::Array(raw_items)) => raw_items,
            Some(_) => {
                return Err(CatalogError::InvalidCatalog(
                    "`items` is not an array".to_string(),
                ));
            }
            None => {
                return Err(CatalogError::InvalidCatalog(
                    "missing `items` array".to_string(),
                ));
            }
        };

        let items = raw_items
            .into_iter()
            .enumerate()
            .map(|(i, raw)| {
                Item::from_value(raw).map_err(|e| match e {
                    CatalogError::InvalidCatalog(msg) => {
                        CatalogError::InvalidCatalog(format!("item {}: {msg}", i + 1))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { document, items })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Mutable access to entries. A slice, so entries can be edited but never
    /// added or removed.
    pub fn items_mut(&mut self) -> &mut [Item] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn to_value(&self) -> Value {
        let mut document = self.document.clone();
        let items = self
            .items
            .iter()
            .cloned()
            .map(Item::into_value)
            .collect::<Vec<_>>();
        document.insert(ITEMS_KEY.to_string(), Value::Array(items));
        Value::Object(document)
    }

    /// Two-space indented JSON with non-ASCII characters left unescaped.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }
}
