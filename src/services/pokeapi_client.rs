//! PokeAPI client
//!
//! Two lookups per identifier: the pokemon resource carries types and
//! abilities, the species resource carries the generation label.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";
const USER_AGENT: &str = concat!("pokesync/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// PokeAPI client errors
///
/// All of these are record-level: the enricher tallies them and moves on.
#[derive(Debug, Error)]
pub enum PokeApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{resource} #{id} not found")]
    NotFound { resource: &'static str, id: i64 },

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Pokemon resource response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PokemonResponse {
    /// Pokedex number
    pub id: i64,
    pub types: Vec<TypeSlot>,
    pub abilities: Vec<AbilitySlot>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub type_info: NamedResource,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
}

/// Species resource response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpeciesResponse {
    pub generation: NamedResource,
}

/// Named sub-object, the shape PokeAPI uses for nested resources
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NamedResource {
    pub name: String,
}

/// Lookup capability consumed by the enricher
#[async_trait]
pub trait PokemonLookup: Send + Sync {
    async fn fetch_pokemon(&self, id: i64) -> Result<PokemonResponse, PokeApiError>;
    async fn fetch_species(&self, id: i64) -> Result<SpeciesResponse, PokeApiError>;
}

/// PokeAPI HTTP client
pub struct PokeApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl PokeApiClient {
    pub fn new(base_url: &str) -> Result<Self, PokeApiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| PokeApiError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_resource<T: serde::de::DeserializeOwned>(
        &self,
        resource: &'static str,
        id: i64,
    ) -> Result<T, PokeApiError> {
        let url = format!("{}/{}/{}", self.base_url, resource, id);

        tracing::debug!(id, url = %url, "Querying PokeAPI");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| PokeApiError::Network(e.to_string()))?;

        let status = response.status();

        if status == 404 {
            return Err(PokeApiError::NotFound { resource, id });
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PokeApiError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| PokeApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl PokemonLookup for PokeApiClient {
    async fn fetch_pokemon(&self, id: i64) -> Result<PokemonResponse, PokeApiError> {
        self.get_resource("pokemon", id).await
    }

    async fn fetch_species(&self, id: i64) -> Result<SpeciesResponse, PokeApiError> {
        self.get_resource("pokemon-species", id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = PokeApiClient::new(POKEAPI_BASE_URL);
        assert!(client.is_ok());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = PokeApiClient::new("http://localhost:9000/api/").unwrap();
        assert_eq!(client.base_url, "http://localhost:9000/api");
    }

    #[test]
    fn test_parse_pokemon_response() {
        let body = r#"{
            "id": 25,
            "name": "pikachu",
            "types": [
                {"slot": 1, "type": {"name": "electric", "url": "https://pokeapi.co/api/v2/type/13/"}}
            ],
            "abilities": [
                {"ability": {"name": "static", "url": "https://pokeapi.co/api/v2/ability/9/"}, "is_hidden": false},
                {"ability": {"name": "lightning-rod", "url": "https://pokeapi.co/api/v2/ability/31/"}, "is_hidden": true}
            ]
        }"#;

        let parsed: PokemonResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.id, 25);
        assert_eq!(parsed.types.len(), 1);
        assert_eq!(parsed.types[0].type_info.name, "electric");
        assert_eq!(parsed.abilities.len(), 2);
        assert_eq!(parsed.abilities[1].ability.name, "lightning-rod");
    }

    #[test]
    fn test_parse_species_response() {
        let body = r#"{
            "id": 25,
            "generation": {"name": "generation-i", "url": "https://pokeapi.co/api/v2/generation/1/"},
            "is_legendary": false
        }"#;

        let parsed: SpeciesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.generation.name, "generation-i");
    }

    #[test]
    fn test_not_found_display_names_endpoint() {
        let err = PokeApiError::NotFound {
            resource: "pokemon-species",
            id: 9999,
        };
        assert_eq!(err.to_string(), "pokemon-species #9999 not found");
    }
}
