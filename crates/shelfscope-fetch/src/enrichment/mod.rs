pub mod merge;
pub mod pipeline;

pub use merge::MergeLookup;
pub use pipeline::{EnrichmentPipeline, EnrichmentReport, ItemProgress, ItemStatus, PipelineOptions};
