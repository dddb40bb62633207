use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::Catalog;

/// Load a catalog document from a UTF-8 JSON file.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let contents = fs::read_to_string(path)?;
    Catalog::from_json_str(&contents)
}

/// Write the whole catalog back to `path`.
///
/// The document goes to a sibling temp file first and is renamed over the
/// target, so an interrupted write never leaves a truncated catalog behind.
pub fn save_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = catalog.to_json_string()?;
    let tmp = temp_path(path);
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "catalog.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
