//! Derived merged view persistence (replace semantics)

use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::MergedPokemon;

/// Replace the merged view with the current run's join output
pub async fn replace_merged(pool: &SqlitePool, records: &[MergedPokemon]) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM ranking_merged")
        .execute(&mut *tx)
        .await?;

    for record in records {
        let fields = serde_json::to_string(&record.fields)
            .map_err(|e| Error::Internal(format!("Failed to serialize merged fields: {e}")))?;

        sqlx::query("INSERT INTO ranking_merged (id, fields) VALUES (?, ?)")
            .bind(record.id)
            .bind(&fields)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::info!(rows = records.len(), "Merged view replaced");
    Ok(())
}

/// Load the stored merged view
pub async fn load_merged(pool: &SqlitePool) -> Result<Vec<MergedPokemon>> {
    let rows = sqlx::query("SELECT id, fields FROM ranking_merged")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| {
            let fields: String = row.get("fields");
            let fields: BTreeMap<String, serde_json::Value> = serde_json::from_str(&fields)
                .map_err(|e| Error::Internal(format!("Failed to deserialize merged fields: {e}")))?;
            Ok(MergedPokemon {
                id: row.get("id"),
                fields,
            })
        })
        .collect()
}
