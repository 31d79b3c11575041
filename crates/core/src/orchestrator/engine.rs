//! Catalog orchestrator implementation.
//!
//! Decides, per request, whether to serve from the local stores or go to the
//! provider:
//! - Homepage: store only, seeding the store once if it is empty
//! - Search: always the provider, written through to the store
//! - Single item: store first, provider on a miss

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::catalog::{
    now_millis, CatalogError, DetailStore, MovieDetail, MovieSummary, SortField,
    SummarySearchQuery, SummaryStore,
};
use crate::enrichment::EnrichmentHandle;
use crate::metrics;
use crate::provider::{MetadataProvider, PlotLength, ProviderError, SearchHit};

use super::config::SeedingConfig;
use super::types::{CatalogPage, OrchestratorError, ResultOrder, SeedReport};

/// The catalog orchestrator - composes the provider, the stores and the
/// enrichment queue.
pub struct CatalogOrchestrator {
    seeding: SeedingConfig,
    provider: Arc<dyn MetadataProvider>,
    summaries: Arc<dyn SummaryStore>,
    details: Arc<dyn DetailStore>,
    enrichment: EnrichmentHandle,
    /// Serializes seeding so concurrent cold-start requests seed once.
    seed_lock: Mutex<()>,
}

impl CatalogOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        seeding: SeedingConfig,
        provider: Arc<dyn MetadataProvider>,
        summaries: Arc<dyn SummaryStore>,
        details: Arc<dyn DetailStore>,
        enrichment: EnrichmentHandle,
    ) -> Self {
        Self {
            seeding,
            provider,
            summaries,
            details,
            enrichment,
            seed_lock: Mutex::new(()),
        }
    }

    // =========================================================================
    // Homepage
    // =========================================================================

    /// Browse the cached summaries, ordered descending by `sort`.
    ///
    /// An empty store is seeded first; the caller waits for seeding but not
    /// for the enrichment it triggers.
    pub async fn get_homepage(
        &self,
        page: u32,
        size: u32,
        sort: Option<&str>,
    ) -> Result<CatalogPage, OrchestratorError> {
        let sort = SortField::from_param(sort);
        debug!(page, size, ?sort, "Homepage request");

        let mut result = self.summaries.list_all(page, size, sort)?;

        // `total` counts the whole table, not just this page
        if result.total == 0 {
            let limit = self
                .seeding
                .per_keyword_limit
                .unwrap_or(size as usize)
                .max(1);
            self.seed_if_empty(limit).await?;
            result = self.summaries.list_all(page, size, sort)?;
        }

        Ok(CatalogPage::from(result))
    }

    /// Seed the store unless it already holds summaries.
    ///
    /// Returns `None` when another caller got there first.
    pub async fn seed_if_empty(
        &self,
        per_keyword_limit: usize,
    ) -> Result<Option<SeedReport>, OrchestratorError> {
        let _guard = self.seed_lock.lock().await;

        if self.summaries.count()? > 0 {
            debug!("Store already populated, skipping seeding");
            return Ok(None);
        }

        Ok(Some(self.seed(per_keyword_limit).await))
    }

    /// One seeding pass over every configured keyword.
    ///
    /// Keyword failures are logged and skipped; the pass itself never fails.
    async fn seed(&self, per_keyword_limit: usize) -> SeedReport {
        info!(
            categories = self.seeding.categories.len(),
            per_keyword_limit, "Seeding summary cache"
        );
        metrics::SEEDING_RUNS.inc();

        let mut report = SeedReport::default();
        let mut seeded_ids = Vec::new();
        let fetched_at = now_millis();

        for (category, keyword) in self.seeding.keywords() {
            report.keywords_searched += 1;

            let results = match self.provider.search(keyword, 1).await {
                Ok(results) => results,
                Err(e) => {
                    report.keywords_failed += 1;
                    metrics::SEEDING_KEYWORD_FAILURES.inc();
                    warn!(category, keyword, error = %e, "Seeding failed for keyword");
                    continue;
                }
            };

            for hit in results.hits.iter().take(per_keyword_limit) {
                match self.summaries.upsert_if_absent(&hit.to_summary(fetched_at)) {
                    Ok(_) => {
                        report.summaries_written += 1;
                        seeded_ids.push(hit.external_id.clone());
                    }
                    Err(e) => {
                        warn!(keyword, external_id = %hit.external_id, error = %e, "Failed to store seeded summary");
                    }
                }
            }
        }

        metrics::SEEDED_SUMMARIES.inc_by(report.summaries_written as u64);
        self.enrichment.dispatch(seeded_ids);

        info!(
            searched = report.keywords_searched,
            failed = report.keywords_failed,
            written = report.summaries_written,
            "Seeding finished"
        );
        report
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Search the provider for `term`.
    ///
    /// A blank or missing term behaves like the homepage. `page` is zero-based
    /// and maps to provider page `page + 1`. `total_pages` is computed from the
    /// provider's total and the caller's `size`, so it does not match the
    /// provider's own fixed-size pages. `filter` is accepted but not applied.
    pub async fn search(
        &self,
        term: Option<&str>,
        sort: Option<&str>,
        filter: Option<&str>,
        page: u32,
        size: u32,
    ) -> Result<CatalogPage, OrchestratorError> {
        let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) else {
            return self.get_homepage(page, size, sort).await;
        };

        if let Some(filter) = filter.map(str::trim).filter(|f| !f.is_empty()) {
            debug!(filter, "Search filter is not applied to provider results");
        }

        // No provider page lies past u32::MAX.
        let Some(provider_page) = page.checked_add(1) else {
            debug!(term, page, "Search page out of range");
            return Ok(CatalogPage::empty(page));
        };
        debug!(term, page, provider_page, size, "Provider search");

        let results = self
            .provider
            .search(term, provider_page)
            .await
            .map_err(|e| match e {
                ProviderError::Parse(message) => OrchestratorError::Parse(message),
                other => OrchestratorError::Provider(other),
            })?;

        if !results.found && results.is_empty() {
            debug!(term, "No provider results");
            return Ok(CatalogPage::empty(page));
        }

        let fetched_at = now_millis();
        for hit in &results.hits {
            if let Err(e) = self.summaries.upsert_if_absent(&hit.to_summary(fetched_at)) {
                warn!(external_id = %hit.external_id, error = %e, "Failed to cache search hit");
            }
        }

        self.enrichment.dispatch(results.external_ids());

        let mut data: Vec<MovieSummary> = results
            .hits
            .iter()
            .map(|hit| self.resolve_hit(hit, fetched_at))
            .collect();
        ResultOrder::from_param(sort).apply(&mut data);

        let page_size = if size > 0 { size as u64 } else { data.len() as u64 };
        let total_pages = if page_size == 0 {
            0
        } else {
            results.total_results.div_ceil(page_size)
        };

        Ok(CatalogPage {
            size: data.len() as u32,
            data,
            page_number: page,
            total_pages,
            total: results.total_results,
        })
    }

    /// Stored summary for a hit, or the raw hit if the store can't provide it.
    fn resolve_hit(&self, hit: &SearchHit, fetched_at: i64) -> MovieSummary {
        match self.summaries.find_by_external_id(&hit.external_id) {
            Ok(Some(summary)) => {
                metrics::CACHE_LOOKUPS
                    .with_label_values(&["summary", "hit"])
                    .inc();
                summary
            }
            Ok(None) => {
                metrics::CACHE_LOOKUPS
                    .with_label_values(&["summary", "miss"])
                    .inc();
                hit.to_summary(fetched_at)
            }
            Err(e) => {
                warn!(external_id = %hit.external_id, error = %e, "Summary lookup failed, using provider hit");
                hit.to_summary(fetched_at)
            }
        }
    }

    /// Title substring search over the local cache only.
    pub fn search_cached(
        &self,
        text: &str,
        genre: Option<&str>,
        page: u32,
        size: u32,
    ) -> Result<CatalogPage, OrchestratorError> {
        let query = SummarySearchQuery {
            text: text.trim().to_string(),
            genre: genre
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(String::from),
            page,
            size,
        };

        Ok(CatalogPage::from(
            self.summaries.search_by_title_substring(&query)?,
        ))
    }

    // =========================================================================
    // Single item
    // =========================================================================

    /// Full detail for an id, fetched (long plot) and cached on a miss.
    ///
    /// Upstream failures surface as `NotFound`; an unreadable reply is `Parse`.
    pub async fn get_by_id(&self, external_id: &str) -> Result<MovieDetail, OrchestratorError> {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(OrchestratorError::NotFound(external_id.to_string()));
        }

        if let Some(detail) = self.details.find_by_external_id(external_id)? {
            metrics::CACHE_LOOKUPS
                .with_label_values(&["detail", "hit"])
                .inc();
            return Ok(detail);
        }
        metrics::CACHE_LOOKUPS
            .with_label_values(&["detail", "miss"])
            .inc();

        let detail = self
            .provider
            .fetch_detail(external_id, PlotLength::Full)
            .await
            .map_err(|e| match e {
                ProviderError::Parse(message) => OrchestratorError::Parse(message),
                ProviderError::NotFound(_) => OrchestratorError::NotFound(external_id.to_string()),
                other => {
                    warn!(external_id, error = %other, "Detail fetch failed");
                    OrchestratorError::NotFound(external_id.to_string())
                }
            })?;

        // Cache writes are best effort; the caller still gets the detail
        if let Err(e) = self.details.upsert(&detail) {
            warn!(external_id, error = %e, "Failed to cache detail");
        }
        if let Err(e) = self.summaries.upsert_if_absent(&detail.to_summary(now_millis())) {
            warn!(external_id, error = %e, "Failed to cache summary from detail");
        }

        Ok(detail)
    }

    // =========================================================================
    // Administration
    // =========================================================================

    /// Make sure the id is in the summary cache; returns the stored summary.
    pub async fn add_movie(&self, external_id: &str) -> Result<MovieSummary, OrchestratorError> {
        let detail = self.get_by_id(external_id).await?;
        let summary = self
            .summaries
            .upsert_if_absent(&detail.to_summary(now_millis()))?;
        info!(external_id = %summary.external_id, "Movie added to catalog");
        Ok(summary)
    }

    /// Remove a summary. Its detail record, if any, is kept.
    pub fn remove_movie(&self, external_id: &str) -> Result<(), OrchestratorError> {
        match self.summaries.remove(external_id.trim()) {
            Ok(()) => {
                info!(external_id, "Movie removed from catalog");
                Ok(())
            }
            Err(CatalogError::NotFound(id)) => Err(OrchestratorError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Number of cached summaries.
    pub fn summary_count(&self) -> Result<u64, OrchestratorError> {
        Ok(self.summaries.count()?)
    }
}
