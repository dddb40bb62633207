//! Shelfscope Fetch: cover and link lookup, catalog enrichment.

pub mod error;
pub mod http;
pub mod slug;
pub mod extract;
pub mod sources;
pub mod enrichment;

pub use error::{FetchError, Result};
pub use sources::{CatalogSource, LookupKey, LookupResult, source_for};
pub use enrichment::{EnrichmentPipeline, EnrichmentReport, ItemProgress, ItemStatus, PipelineOptions};
