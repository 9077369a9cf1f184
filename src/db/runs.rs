//! Pipeline run bookkeeping
//!
//! One row per run; no resumption semantics, the enrichment ledger alone
//! makes successive runs incremental.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{RunStatus, RunSummary};

/// Open a run row; returns its id
pub async fn open_run(pool: &SqlitePool) -> Result<i64> {
    let started_at = Utc::now().to_rfc3339();

    let result = sqlx::query("INSERT INTO pipeline_runs (status, started_at) VALUES (?, ?)")
        .bind(RunStatus::Running.as_str())
        .bind(&started_at)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Close a run row with its terminal state and counters
pub async fn close_run(
    pool: &SqlitePool,
    run_id: i64,
    status: RunStatus,
    summary: &RunSummary,
    error: Option<&str>,
) -> Result<()> {
    let ended_at = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE pipeline_runs
        SET status = ?, reference_rows = ?, new_records = ?, failures = ?,
            error = ?, ended_at = ?
        WHERE run_id = ?
        "#,
    )
    .bind(status.as_str())
    .bind(summary.reference_rows as i64)
    .bind(summary.new_records as i64)
    .bind(summary.failures as i64)
    .bind(error)
    .bind(&ended_at)
    .bind(run_id)
    .execute(pool)
    .await?;

    Ok(())
}
