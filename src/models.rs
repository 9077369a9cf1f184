//! Data model for the ranking synchronization pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference record from the warehouse ranking snapshot
///
/// Owned by the pipeline run for the run's duration only; the warehouse
/// columns besides the identifier are carried opaquely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedPokemon {
    /// Pokedex number, the stable warehouse identifier
    pub id: i64,
    /// Remaining warehouse columns, keyed by column name
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl RankedPokemon {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: serde_json::Value) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }
}

/// Enrichment fetched from PokeAPI for one identifier
///
/// Built only by the enricher, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedPokemon {
    pub id: i64,
    /// Comma-joined type names, in the order the service returned them
    pub types: String,
    /// Comma-joined ability names, in the order the service returned them
    pub abilities: String,
    /// Generation label from the species resource
    pub generation: String,
}

/// Join of a reference record and its enrichment, for the derived view
///
/// Exists only transiently for the current run's output. Colliding field
/// names carry a `_ref` (warehouse) or `_api` (enrichment) suffix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedPokemon {
    pub id: i64,
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Counters reported for a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Rows in this run's reference snapshot
    pub reference_rows: usize,
    /// Records newly enriched this run
    pub new_records: usize,
    /// Records whose enrichment lookups failed this run
    pub failures: usize,
}

/// Lifecycle state of a pipeline run, as recorded in `pipeline_runs`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Succeeded,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
        }
    }
}
