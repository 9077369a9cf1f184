//! Enrichment results and the ledger of already-enriched identifiers

use sqlx::{Row, SqlitePool};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::models::EnrichedPokemon;

/// Identifiers enriched by prior runs
///
/// Callers treat `LedgerUnavailable` as an empty ledger: a missing table on
/// the very first run is expected, not fatal.
pub async fn known_ids(pool: &SqlitePool) -> Result<HashSet<i64>> {
    let rows = sqlx::query("SELECT id FROM pokemon_enrichment")
        .fetch_all(pool)
        .await
        .map_err(|e| Error::LedgerUnavailable(e.to_string()))?;

    Ok(rows.iter().map(|row| row.get::<i64, _>("id")).collect())
}

/// Append newly enriched records
///
/// Conflicts on the identifier key are ignored, so one identifier can never
/// hold two ledger rows even if it appeared twice in a reference snapshot.
pub async fn append_enrichment(pool: &SqlitePool, records: &[EnrichedPokemon]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for record in records {
        sqlx::query(
            r#"
            INSERT INTO pokemon_enrichment (id, types, abilities, generation)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(record.id)
        .bind(&record.types)
        .bind(&record.abilities)
        .bind(&record.generation)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(rows = records.len(), "Enrichment results appended");
    Ok(())
}

/// Load all enrichment rows, ordered by identifier
pub async fn load_enrichment(pool: &SqlitePool) -> Result<Vec<EnrichedPokemon>> {
    let rows = sqlx::query(
        "SELECT id, types, abilities, generation FROM pokemon_enrichment ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| EnrichedPokemon {
            id: row.get("id"),
            types: row.get("types"),
            abilities: row.get("abilities"),
            generation: row.get("generation"),
        })
        .collect())
}
