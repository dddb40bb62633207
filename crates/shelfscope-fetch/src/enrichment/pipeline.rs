use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use shelfscope_core::{AppConfig, Catalog, CatalogKind, PersistMode, save_catalog};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::enrichment::merge::MergeLookup;
use crate::error::{FetchError, Result};
use crate::sources::{CatalogSource, LookupKey, LookupResult};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Pause after each looked-up item.
    pub politeness: Duration,
    /// Pause after a rate-limited response, before retrying.
    pub cooldown: Duration,
    pub max_rate_limit_retries: u32,
    pub persist: PersistMode,
    /// Look up and merge in memory, never write the catalog file.
    pub dry_run: bool,
}

impl PipelineOptions {
    pub fn from_config(config: &AppConfig, kind: CatalogKind) -> Self {
        let profile = config.profile(kind);
        Self {
            politeness: profile.politeness(),
            cooldown: config.pacing.cooldown(),
            max_rate_limit_retries: config.pacing.max_rate_limit_retries,
            persist: profile.persist,
            dry_run: false,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            politeness: Duration::from_millis(1500),
            cooldown: Duration::from_secs(60),
            max_rate_limit_retries: 1,
            persist: PersistMode::EndOfRun,
            dry_run: false,
        }
    }
}

/// What happened to one item, as reported to the progress callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    /// Already had both link and cover; no request made.
    Skipped,
    /// About to query the source.
    Fetching,
    /// Source asked us to back off; waiting before the retry.
    RateLimited { cooldown: Duration },
    /// Lookup succeeded. `fields` lists what was written (may be empty).
    Updated { fields: Vec<&'static str> },
    /// Lookup failed; the item keeps whatever it had.
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct ItemProgress<'a> {
    /// 1-based position in the catalog.
    pub index: usize,
    pub total: usize,
    pub title: &'a str,
    pub author: Option<&'a str>,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EnrichmentReport {
    pub source: String,
    pub total: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub rate_limit_pauses: usize,
    pub errors: Vec<String>,
}

impl EnrichmentReport {
    fn add_error(&mut self, title: &str, error: &FetchError) {
        self.errors.push(format!("{title}: {error}"));
    }
}

/// Walks a catalog item by item, filling missing links and covers from one
/// source. Strictly sequential: each item is resolved, merged and (optionally)
/// persisted before the next one starts.
pub struct EnrichmentPipeline {
    source: Box<dyn CatalogSource>,
    options: PipelineOptions,
}

impl EnrichmentPipeline {
    pub fn new(source: Box<dyn CatalogSource>, options: PipelineOptions) -> Self {
        Self { source, options }
    }

    /// Enrich `catalog` in place. When `path` is given (and this is not a dry
    /// run) the catalog is written there according to the persist mode.
    ///
    /// Lookup failures are recorded per item and never abort the run; only a
    /// failed write does.
    pub async fn run<F>(
        &self,
        catalog: &mut Catalog,
        path: Option<&Path>,
        mut progress: F,
    ) -> Result<EnrichmentReport>
    where
        F: FnMut(ItemProgress<'_>),
    {
        let total = catalog.len();
        let mut report = EnrichmentReport {
            source: self.source.name().to_string(),
            total,
            ..Default::default()
        };
        let persist_path = path.filter(|_| !self.options.dry_run);

        info!(
            "enriching {total} {} from {}",
            self.source.kind().plural(),
            self.source.name()
        );

        for i in 0..total {
            let item = &catalog.items()[i];
            let key = LookupKey::from_item(item);
            let complete = item.is_complete();
            for field in item.malformed_fields() {
                warn!("{}: `{field}` is not a string, leaving it as is", key.title);
            }
            let emit = |status: ItemStatus| ItemProgress {
                index: i + 1,
                total,
                title: &key.title,
                author: key.author.as_deref(),
                status,
            };

            if complete {
                report.skipped += 1;
                progress(emit(ItemStatus::Skipped));
                continue;
            }

            progress(emit(ItemStatus::Fetching));
            let outcome = self
                .lookup_with_retry(&key, &mut report, |status| progress(emit(status)))
                .await;

            let item = &mut catalog.items_mut()[i];
            let status = match outcome {
                Ok(found) => {
                    let fields = item.merge_lookup(&found);
                    debug!("{}: wrote {fields:?}", key.title);
                    report.updated += 1;
                    ItemStatus::Updated { fields }
                }
                Err(err) => {
                    item.ensure_link_and_cover();
                    warn!("{}: {err}", key.title);
                    report.failed += 1;
                    report.add_error(&key.title, &err);
                    ItemStatus::Failed {
                        reason: err.to_string(),
                    }
                }
            };
            progress(emit(status));

            if self.options.persist == PersistMode::EveryItem {
                if let Some(path) = persist_path {
                    save_catalog(path, catalog)?;
                }
            }

            if i + 1 < total {
                sleep(self.options.politeness).await;
            }
        }

        if self.options.persist == PersistMode::EndOfRun {
            if let Some(path) = persist_path {
                save_catalog(path, catalog)?;
            }
        }

        info!(
            "done: {} updated, {} skipped, {} failed of {}",
            report.updated, report.skipped, report.failed, report.total
        );
        Ok(report)
    }

    /// One lookup plus at most `max_rate_limit_retries` retries, each preceded
    /// by the cooldown. Any other error is returned immediately.
    async fn lookup_with_retry<F>(
        &self,
        key: &LookupKey,
        report: &mut EnrichmentReport,
        mut on_status: F,
    ) -> Result<LookupResult>
    where
        F: FnMut(ItemStatus),
    {
        let mut attempt = 0u32;
        loop {
            match self.source.lookup(key).await {
                Err(err)
                    if err.is_rate_limited() && attempt < self.options.max_rate_limit_retries =>
                {
                    warn!(
                        "{}: {err}, waiting {}s before retry",
                        key.title,
                        self.options.cooldown.as_secs()
                    );
                    report.rate_limit_pauses += 1;
                    on_status(ItemStatus::RateLimited {
                        cooldown: self.options.cooldown,
                    });
                    sleep(self.options.cooldown).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
