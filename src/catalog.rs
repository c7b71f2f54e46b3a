use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::database::Database;
use crate::error::{CatalogError, Result};
use crate::export;
use crate::extractor::RecordExtractor;
use crate::models::{IdentifierSet, ProductRecord};
use crate::traits::{PageSource, SiteLayout};
use crate::walker::ListingWalker;

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub extracted: usize,
    pub skipped: usize,
    pub filtered_out: usize,
    pub persisted: u64,
}

/// Discover -> Extract -> Filter -> Persist over one site layout.
///
/// Holds no per-run state; identifiers and records live only inside `run`.
pub struct CatalogPipeline {
    layout: SiteLayout,
    walker: ListingWalker,
    extractor: RecordExtractor,
    config: PipelineConfig,
}

impl CatalogPipeline {
    pub fn new(layout: SiteLayout, config: PipelineConfig) -> Result<Self> {
        let walker = ListingWalker::new(&layout)?;
        let extractor = RecordExtractor::new(&layout)?;

        Ok(Self {
            layout,
            walker,
            extractor,
            config,
        })
    }

    pub async fn run<S: PageSource>(&self, source: &mut S, database: &Database) -> Result<RunSummary> {
        let ids = self.discover(source).await?;
        if ids.is_empty() {
            info!("No identifiers found on {}, nothing to persist", self.layout.name);
            return Ok(RunSummary::default());
        }

        let (records, skipped) = self.extract(source, &ids).await?;
        let extracted = records.len();

        let records = self.filter(records);
        let filtered_out = extracted - records.len();

        let records = match &self.config.output_csv {
            Some(path) => {
                export::save(path, &records)?;
                export::load(path)?
            }
            None => records,
        };

        let persisted = database.ingest(&records).await?;

        Ok(RunSummary {
            discovered: ids.len(),
            extracted,
            skipped,
            filtered_out,
            persisted,
        })
    }

    /// Walks listing pages until the configured bound or the end of the catalog.
    async fn discover<S: PageSource>(&self, source: &mut S) -> Result<IdentifierSet> {
        let mut ids = IdentifierSet::new();

        for page in 1..=self.config.total_pages {
            let url = self.layout.listing_url(&self.config.search_query, page);

            match source.navigate(&url).await {
                Ok(()) => {}
                Err(CatalogError::EndOfCatalog { .. }) => {
                    info!("Reached the last page: {}", page);
                    break;
                }
                Err(e) => return Err(e),
            }

            let (page_ids, exhausted) = self.walk_listing(source).await?;
            let found = page_ids.len();
            let new = ids.merge(page_ids);
            info!(
                "Listing page {}: {} identifiers, {} new, {} total",
                page,
                found,
                new,
                ids.len()
            );

            if found == 0 || exhausted {
                info!("Reached the last page: {}", page);
                break;
            }

            if page < self.config.total_pages && !self.config.page_delay.is_zero() {
                tokio::time::sleep(self.config.page_delay).await;
            }
        }

        Ok(ids)
    }

    /// Collects identifiers from the current listing page, re-reading it after
    /// every lazy-load trigger. The flag reports that the source ran out of page.
    async fn walk_listing<S: PageSource>(&self, source: &mut S) -> Result<(IdentifierSet, bool)> {
        let mut ids = IdentifierSet::new();

        for scroll in 0..=self.config.scrolls_per_page {
            let markup = source.current_markup().await?;
            ids.merge(self.walker.collect_identifiers(&markup));

            if scroll == self.config.scrolls_per_page {
                break;
            }
            match source.trigger_lazy_load().await {
                Ok(()) => {}
                Err(CatalogError::EndOfCatalog { .. }) => return Ok((ids, true)),
                Err(e) => return Err(e),
            }
        }

        Ok((ids, false))
    }

    /// Extracts records in discovery order, skipping items with unusable required fields.
    async fn extract<S: PageSource>(
        &self,
        source: &mut S,
        ids: &IdentifierSet,
    ) -> Result<(Vec<ProductRecord>, usize)> {
        let mut records = Vec::with_capacity(ids.len());
        let mut skipped = 0;

        for id in ids.iter() {
            let url = self.layout.item_url(id);
            source.navigate(&url).await?;
            let markup = source.current_markup().await?;

            match self.extractor.extract(&markup, &url) {
                Ok(record) => records.push(record),
                Err(e) if e.is_item_recoverable() => {
                    warn!("Skipping {}: {}", id, e);
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Extracted {} records from {} identifiers ({} skipped)",
            records.len(),
            ids.len(),
            skipped
        );
        Ok((records, skipped))
    }

    fn filter(&self, records: Vec<ProductRecord>) -> Vec<ProductRecord> {
        let before = records.len();
        let kept: Vec<_> = records
            .into_iter()
            .filter(|record| record.status != self.config.sentinel_status)
            .collect();

        info!(
            "Dropped {} records with status {:?}",
            before - kept.len(),
            self.config.sentinel_status
        );
        kept
    }
}
