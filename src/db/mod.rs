//! Database access for pokesync
//!
//! Local relational store holding the raw reference snapshot, the
//! append-only enrichment ledger, the derived merged view, and run
//! bookkeeping.

pub mod enrichment;
pub mod merged;
pub mod reference;
pub mod runs;

use sqlx::SqlitePool;
use std::path::Path;

use crate::error::Result;

/// Initialize database connection pool, creating the file and tables on
/// first use.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create pipeline tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    // Raw warehouse snapshot, replaced every run
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reference_snapshot (
            id INTEGER NOT NULL,
            attributes TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Enrichment results; doubles as the ledger of already-enriched ids
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pokemon_enrichment (
            id INTEGER PRIMARY KEY,
            types TEXT NOT NULL,
            abilities TEXT NOT NULL,
            generation TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Derived reporting view, replaced every run that produces new results
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ranking_merged (
            id INTEGER NOT NULL,
            fields TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pipeline_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            status TEXT NOT NULL,
            reference_rows INTEGER NOT NULL DEFAULT 0,
            new_records INTEGER NOT NULL DEFAULT 0,
            failures INTEGER NOT NULL DEFAULT 0,
            error TEXT,
            started_at TEXT NOT NULL,
            ended_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized");

    Ok(())
}
