//! Configuration resolution
//!
//! Every setting resolves environment → TOML file → compiled default. The
//! warehouse access token additionally warns when more than one source is
//! set, since that usually means a stale file.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::error::{Error, Result};
use crate::services::pokeapi_client::POKEAPI_BASE_URL;

const DEFAULT_WAREHOUSE_BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";
const DEFAULT_ID_COLUMN: &str = "number";
const DEFAULT_ROW_LIMIT: u32 = 1000;

/// Default pacing interval between record request pairs. Two requests per
/// record at this interval stays under the service's 100 req/s ceiling.
const DEFAULT_REQUEST_INTERVAL_MS: u64 = 25;

/// Execution mode toggle
///
/// Scheduled runs notify and default to system paths; interactive runs stay
/// quiet and local. Enrichment logic is identical in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Interactive,
    Scheduled,
}

impl RunMode {
    pub fn from_env() -> Self {
        match std::env::var("POKESYNC_RUN_MODE") {
            Ok(value) if value.trim().eq_ignore_ascii_case("scheduled") => RunMode::Scheduled,
            _ => RunMode::Interactive,
        }
    }
}

/// On-disk configuration file shape (all fields optional)
#[derive(Debug, Default, Deserialize)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub warehouse: WarehouseToml,
    #[serde(default)]
    pub pokeapi: PokeApiToml,
}

#[derive(Debug, Default, Deserialize)]
pub struct WarehouseToml {
    pub base_url: Option<String>,
    pub project: Option<String>,
    pub table: Option<String>,
    pub id_column: Option<String>,
    pub row_limit: Option<u32>,
    pub access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PokeApiToml {
    pub base_url: Option<String>,
    pub request_interval_ms: Option<u64>,
}

/// Fully resolved pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub run_mode: RunMode,
    pub database_path: PathBuf,
    /// Absent webhook means notifications are a no-op
    pub webhook_url: Option<String>,
    pub warehouse: WarehouseConfig,
    pub pokeapi: PokeApiConfig,
}

#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub base_url: String,
    pub project: String,
    /// Fully qualified ranking table name
    pub table: String,
    /// Name of the identifier column in the ranking table
    pub id_column: String,
    pub row_limit: u32,
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct PokeApiConfig {
    pub base_url: String,
    pub request_interval: Duration,
}

impl PipelineConfig {
    /// Resolve configuration from the process environment, the TOML config
    /// file, and compiled defaults, in that priority order.
    pub fn load() -> Result<Self> {
        let toml_config = load_toml_config()?;
        Self::resolve(RunMode::from_env(), &toml_config)
    }

    pub fn resolve(run_mode: RunMode, toml_config: &TomlConfig) -> Result<Self> {
        let database_path = env_var("POKESYNC_DATABASE_PATH")
            .map(PathBuf::from)
            .or_else(|| toml_config.database_path.clone())
            .unwrap_or_else(|| default_database_path(run_mode));

        let webhook_url =
            env_var("POKESYNC_WEBHOOK_URL").or_else(|| toml_config.webhook_url.clone());

        let warehouse = WarehouseConfig {
            base_url: env_var("POKESYNC_WAREHOUSE_BASE_URL")
                .or_else(|| toml_config.warehouse.base_url.clone())
                .unwrap_or_else(|| DEFAULT_WAREHOUSE_BASE_URL.to_string()),
            project: env_var("POKESYNC_WAREHOUSE_PROJECT")
                .or_else(|| toml_config.warehouse.project.clone())
                .ok_or_else(|| {
                    Error::Config(
                        "Warehouse project not configured. Set POKESYNC_WAREHOUSE_PROJECT or \
                         project under [warehouse] in the config file."
                            .to_string(),
                    )
                })?,
            table: env_var("POKESYNC_WAREHOUSE_TABLE")
                .or_else(|| toml_config.warehouse.table.clone())
                .ok_or_else(|| {
                    Error::Config(
                        "Warehouse ranking table not configured. Set POKESYNC_WAREHOUSE_TABLE or \
                         table under [warehouse] in the config file."
                            .to_string(),
                    )
                })?,
            id_column: env_var("POKESYNC_WAREHOUSE_ID_COLUMN")
                .or_else(|| toml_config.warehouse.id_column.clone())
                .unwrap_or_else(|| DEFAULT_ID_COLUMN.to_string()),
            row_limit: toml_config.warehouse.row_limit.unwrap_or(DEFAULT_ROW_LIMIT),
            access_token: resolve_access_token(toml_config)?,
        };

        let pokeapi = PokeApiConfig {
            base_url: env_var("POKESYNC_POKEAPI_BASE_URL")
                .or_else(|| toml_config.pokeapi.base_url.clone())
                .unwrap_or_else(|| POKEAPI_BASE_URL.to_string()),
            request_interval: Duration::from_millis(
                toml_config
                    .pokeapi
                    .request_interval_ms
                    .unwrap_or(DEFAULT_REQUEST_INTERVAL_MS),
            ),
        };

        Ok(Self {
            run_mode,
            database_path,
            webhook_url,
            warehouse,
            pokeapi,
        })
    }
}

/// Non-empty, trimmed environment variable
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Resolve the warehouse access token (environment wins over TOML)
fn resolve_access_token(toml_config: &TomlConfig) -> Result<String> {
    let env_token = env_var("POKESYNC_WAREHOUSE_TOKEN");
    let toml_token = toml_config
        .warehouse
        .access_token
        .clone()
        .filter(|token| !token.trim().is_empty());

    if env_token.is_some() && toml_token.is_some() {
        warn!("Warehouse access token found in environment and TOML. Using environment (highest priority).");
    }

    env_token.or(toml_token).ok_or_else(|| {
        Error::Config(
            "Warehouse access token not configured. Set POKESYNC_WAREHOUSE_TOKEN or \
             access_token under [warehouse] in the config file."
                .to_string(),
        )
    })
}

/// Scheduled runs live under the system data directory (container installs
/// mount it); interactive runs use the per-user data directory.
fn default_database_path(run_mode: RunMode) -> PathBuf {
    match run_mode {
        RunMode::Scheduled => PathBuf::from("/var/lib/pokesync/pokesync.db"),
        RunMode::Interactive => dirs::data_local_dir()
            .map(|dir| dir.join("pokesync"))
            .unwrap_or_else(|| PathBuf::from("./pokesync_data"))
            .join("pokesync.db"),
    }
}

fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = env_var("POKESYNC_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("pokesync").join("config.toml"))
}

fn load_toml_config() -> Result<TomlConfig> {
    let Some(path) = config_file_path() else {
        return Ok(TomlConfig::default());
    };
    if !path.exists() {
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read config failed: {e}")))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse config failed: {e}")))
}
