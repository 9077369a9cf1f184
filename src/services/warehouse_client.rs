//! Analytical warehouse client
//!
//! Fetches the ranking reference snapshot through the warehouse's REST query
//! endpoint (BigQuery `jobs.query` shape). Any transport, auth, or response
//! shape problem is fatal to the run.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::WarehouseConfig;
use crate::error::{Error, Result};
use crate::models::RankedPokemon;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Source of the reference dataset
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn fetch_reference(&self) -> Result<Vec<RankedPokemon>>;
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    schema: Option<TableSchema>,
    rows: Option<Vec<TableRow>>,
    #[serde(rename = "jobComplete")]
    job_complete: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct TableSchema {
    fields: Vec<SchemaField>,
}

#[derive(Debug, Deserialize)]
struct SchemaField {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    f: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    v: Value,
}

/// Warehouse HTTP client
pub struct WarehouseClient {
    http_client: reqwest::Client,
    config: WarehouseConfig,
}

impl WarehouseClient {
    pub fn new(config: &WarehouseConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::SourceUnavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    fn query_text(&self) -> String {
        format!(
            "SELECT * FROM `{}` LIMIT {}",
            self.config.table, self.config.row_limit
        )
    }
}

#[async_trait]
impl ReferenceSource for WarehouseClient {
    async fn fetch_reference(&self) -> Result<Vec<RankedPokemon>> {
        let url = format!(
            "{}/projects/{}/queries",
            self.config.base_url.trim_end_matches('/'),
            self.config.project
        );
        let body = serde_json::json!({
            "query": self.query_text(),
            "useLegacySql": false,
        });

        tracing::debug!(url = %url, "Querying warehouse");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("warehouse request failed: {e}")))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::SourceUnavailable(format!(
                "warehouse query returned {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let query_response: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("malformed warehouse response: {e}")))?;

        let records = parse_rows(query_response, &self.config.id_column)?;
        tracing::info!(rows = records.len(), "Fetched reference snapshot from warehouse");
        Ok(records)
    }
}

/// Parse the query response's schema/rows shape into reference records.
///
/// The warehouse serializes every cell value as a JSON string, so the
/// identifier column is parsed out of its string form.
fn parse_rows(response: QueryResponse, id_column: &str) -> Result<Vec<RankedPokemon>> {
    if response.job_complete == Some(false) {
        return Err(Error::SourceUnavailable(
            "warehouse query did not complete within the request".to_string(),
        ));
    }

    let schema = response
        .schema
        .ok_or_else(|| Error::SourceUnavailable("warehouse response has no schema".to_string()))?;

    let id_index = schema
        .fields
        .iter()
        .position(|field| field.name == id_column)
        .ok_or_else(|| {
            Error::SourceUnavailable(format!(
                "identifier column '{id_column}' missing from warehouse schema"
            ))
        })?;

    // A zero-row result omits the rows field entirely
    let rows = response.rows.unwrap_or_default();

    rows.into_iter()
        .map(|row| {
            if row.f.len() != schema.fields.len() {
                return Err(Error::SourceUnavailable(format!(
                    "warehouse row has {} cells, schema has {} fields",
                    row.f.len(),
                    schema.fields.len()
                )));
            }

            let id = cell_as_i64(&row.f[id_index].v).ok_or_else(|| {
                Error::SourceUnavailable(format!(
                    "identifier column '{}' is not an integer: {}",
                    id_column, row.f[id_index].v
                ))
            })?;

            let mut record = RankedPokemon::new(id);
            for (field, cell) in schema.fields.iter().zip(row.f.iter()) {
                if field.name != id_column {
                    record.attributes.insert(field.name.clone(), cell.v.clone());
                }
            }
            Ok(record)
        })
        .collect()
}

fn cell_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
