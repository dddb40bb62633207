use shelfscope_core::Item;

use crate::sources::LookupResult;

pub trait MergeLookup {
    /// Fill `link`/`cover` from a lookup, only where the item's value is empty
    /// or null and the found value is not. Non-string values are never
    /// replaced. Returns the names of the fields written.
    fn merge_lookup(&mut self, found: &LookupResult) -> Vec<&'static str>;

    /// Make sure both `link` and `cover` exist, writing `""` for any that are
    /// absent or null. Existing values of any type are left alone.
    fn ensure_link_and_cover(&mut self);
}

impl MergeLookup for Item {
    fn merge_lookup(&mut self, found: &LookupResult) -> Vec<&'static str> {
        let mut written = Vec::new();

        if self.link_is_fillable() && !found.link.is_empty() {
            self.set_link(found.link.clone());
            written.push("link");
        }

        if self.cover_is_fillable() && !found.cover.is_empty() {
            self.set_cover(found.cover.clone());
            written.push("cover");
        }

        self.ensure_link_and_cover();
        written
    }

    fn ensure_link_and_cover(&mut self) {
        if !self.has_link_key() {
            self.set_link("");
        }
        if !self.has_cover_key() {
            self.set_cover("");
        }
    }
}
