pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use config::{AppConfig, CatalogProfile, CatalogsConfig, HttpConfig, PacingConfig, PersistMode};
pub use error::{CatalogError, Result};
pub use models::*;

pub use storage::catalog_file::{load_catalog, save_catalog};
