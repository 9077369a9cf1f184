//! Raw reference snapshot persistence (replace semantics)

use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::RankedPokemon;

/// Replace the stored snapshot with the current run's reference rows
pub async fn replace_reference(pool: &SqlitePool, records: &[RankedPokemon]) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM reference_snapshot")
        .execute(&mut *tx)
        .await?;

    for record in records {
        let attributes = serde_json::to_string(&record.attributes)
            .map_err(|e| Error::Internal(format!("Failed to serialize attributes: {e}")))?;

        sqlx::query("INSERT INTO reference_snapshot (id, attributes) VALUES (?, ?)")
            .bind(record.id)
            .bind(&attributes)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::info!(rows = records.len(), "Reference snapshot replaced");
    Ok(())
}

/// Load the stored snapshot
pub async fn load_reference(pool: &SqlitePool) -> Result<Vec<RankedPokemon>> {
    let rows = sqlx::query("SELECT id, attributes FROM reference_snapshot")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| {
            let attributes: String = row.get("attributes");
            let attributes: BTreeMap<String, serde_json::Value> =
                serde_json::from_str(&attributes)
                    .map_err(|e| Error::Internal(format!("Failed to deserialize attributes: {e}")))?;
            Ok(RankedPokemon {
                id: row.get("id"),
                attributes,
            })
        })
        .collect()
}
