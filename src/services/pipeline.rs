//! Pipeline run orchestration
//!
//! Drives the stages of one synchronization run and owns the fatal-error
//! policy: source and persistence failures abort the run, record-level
//! enrichment failures do not. There is no resumption within a run; the
//! enrichment ledger makes the next run pick up whatever is left.

use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;

use crate::db;
use crate::error::{Error, Result};
use crate::models::{RunStatus, RunSummary};
use crate::services::enricher::Enricher;
use crate::services::merger;
use crate::services::notifier::Notifier;
use crate::services::warehouse_client::ReferenceSource;

/// Synchronization pipeline over injected collaborators
pub struct Pipeline {
    db: SqlitePool,
    source: Arc<dyn ReferenceSource>,
    enricher: Enricher,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline {
    pub fn new(
        db: SqlitePool,
        source: Arc<dyn ReferenceSource>,
        enricher: Enricher,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db,
            source,
            enricher,
            notifier,
        }
    }

    /// Execute one full run: notify start, run the stages, close the run
    /// row, notify the outcome. Fatal errors propagate after bookkeeping.
    pub async fn run(&self) -> Result<RunSummary> {
        self.notifier
            .notify("Starting Pokemon ranking pipeline run...")
            .await;
        tracing::info!("Starting Pokemon ranking pipeline run");

        let run_id = db::runs::open_run(&self.db).await?;

        match self.run_stages().await {
            Ok(summary) => {
                db::runs::close_run(&self.db, run_id, RunStatus::Succeeded, &summary, None)
                    .await?;
                self.notifier
                    .notify(&format!(
                        "Pokemon ranking pipeline completed successfully! {} added.",
                        summary.new_records
                    ))
                    .await;
                tracing::info!(
                    new_records = summary.new_records,
                    failures = summary.failures,
                    "Pipeline run completed"
                );
                Ok(summary)
            }
            Err(e) => {
                // Bookkeeping is best-effort here; the original error wins
                let summary = RunSummary::default();
                if let Err(close_err) = db::runs::close_run(
                    &self.db,
                    run_id,
                    RunStatus::Failed,
                    &summary,
                    Some(&e.to_string()),
                )
                .await
                {
                    tracing::warn!(error = %close_err, "Failed to record run failure");
                }
                self.notifier
                    .notify(&format!("Pokemon ranking pipeline failed: {e}"))
                    .await;
                tracing::error!(error = %e, "Pipeline run failed");
                Err(e)
            }
        }
    }

    async fn run_stages(&self) -> Result<RunSummary> {
        // Reference snapshot; failure here aborts the run
        let reference = self.source.fetch_reference().await?;
        db::reference::replace_reference(&self.db, &reference).await?;

        // The ledger fails soft to an empty set: on the very first run the
        // enrichment table may not exist yet
        let known_ids = match db::enrichment::known_ids(&self.db).await {
            Ok(ids) => ids,
            Err(Error::LedgerUnavailable(reason)) => {
                tracing::warn!(%reason, "Enrichment ledger unavailable, attempting full enrichment");
                HashSet::new()
            }
            Err(e) => return Err(e),
        };

        let outcome = self.enricher.enrich(&reference, &known_ids).await;

        let summary = RunSummary {
            reference_rows: reference.len(),
            new_records: outcome.enriched.len(),
            failures: outcome.failures,
        };

        if outcome.enriched.is_empty() {
            // Nothing new this run is distinct from a join with no matches:
            // leave the merged view from the prior run untouched
            tracing::warn!("No new enrichment results, skipping merge");
            return Ok(summary);
        }

        db::enrichment::append_enrichment(&self.db, &outcome.enriched).await?;

        let merged = merger::merge(&reference, &outcome.enriched);
        tracing::info!(rows = merged.len(), "Merged reference and enrichment data");
        db::merged::replace_merged(&self.db, &merged).await?;

        Ok(summary)
    }
}
