//! Shared test doubles and fixtures for integration tests

// Each integration test binary compiles this module and uses a subset of it
#![allow(dead_code)]

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use pokesync::error::{Error, Result};
use pokesync::models::RankedPokemon;
use pokesync::services::notifier::Notifier;
use pokesync::services::pokeapi_client::{
    AbilitySlot, NamedResource, PokeApiError, PokemonLookup, PokemonResponse, SpeciesResponse,
    TypeSlot,
};
use pokesync::services::warehouse_client::ReferenceSource;

/// In-memory database with the pipeline schema applied
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .connect(":memory:")
        .await
        .unwrap();
    pokesync::db::init_tables(&pool).await.unwrap();
    pool
}

fn named(name: &str) -> NamedResource {
    NamedResource {
        name: name.to_string(),
    }
}

pub fn pokemon_response(id: i64) -> PokemonResponse {
    PokemonResponse {
        id,
        types: vec![TypeSlot {
            type_info: named("electric"),
        }],
        abilities: vec![
            AbilitySlot {
                ability: named("static"),
            },
            AbilitySlot {
                ability: named("lightning-rod"),
            },
        ],
    }
}

pub fn species_response() -> SpeciesResponse {
    SpeciesResponse {
        generation: named("generation-i"),
    }
}

/// Scripted lookup double: configurable per-id failures, call counting
#[derive(Default)]
pub struct ScriptedLookup {
    fail_pokemon: HashSet<i64>,
    fail_species: HashSet<i64>,
    pokemon_calls: AtomicUsize,
    species_calls: AtomicUsize,
    requested_ids: Mutex<Vec<i64>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pokemon resource lookup for `id` returns 404
    pub fn failing_pokemon(mut self, id: i64) -> Self {
        self.fail_pokemon.insert(id);
        self
    }

    /// The species resource lookup for `id` returns 404
    pub fn failing_species(mut self, id: i64) -> Self {
        self.fail_species.insert(id);
        self
    }

    pub fn pokemon_calls(&self) -> usize {
        self.pokemon_calls.load(Ordering::SeqCst)
    }

    pub fn species_calls(&self) -> usize {
        self.species_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.pokemon_calls() + self.species_calls()
    }

    /// Every identifier any lookup was issued for
    pub fn requested_ids(&self) -> Vec<i64> {
        self.requested_ids.lock().unwrap().clone()
    }
}

#[async_trait]
impl PokemonLookup for ScriptedLookup {
    async fn fetch_pokemon(&self, id: i64) -> std::result::Result<PokemonResponse, PokeApiError> {
        self.pokemon_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_ids.lock().unwrap().push(id);

        if self.fail_pokemon.contains(&id) {
            return Err(PokeApiError::NotFound {
                resource: "pokemon",
                id,
            });
        }
        Ok(pokemon_response(id))
    }

    async fn fetch_species(&self, id: i64) -> std::result::Result<SpeciesResponse, PokeApiError> {
        self.species_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_ids.lock().unwrap().push(id);

        if self.fail_species.contains(&id) {
            return Err(PokeApiError::NotFound {
                resource: "pokemon-species",
                id,
            });
        }
        Ok(species_response())
    }
}

/// Reference source double returning a fixed snapshot
pub struct FakeSource {
    records: Vec<RankedPokemon>,
}

impl FakeSource {
    pub fn new(records: Vec<RankedPokemon>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl ReferenceSource for FakeSource {
    async fn fetch_reference(&self) -> Result<Vec<RankedPokemon>> {
        Ok(self.records.clone())
    }
}

/// Reference source double that always fails
pub struct UnavailableSource;

#[async_trait]
impl ReferenceSource for UnavailableSource {
    async fn fetch_reference(&self) -> Result<Vec<RankedPokemon>> {
        Err(Error::SourceUnavailable("warehouse is down".to_string()))
    }
}

/// Notifier double capturing every message
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, text: &str) {
        self.messages.lock().unwrap().push(text.to_string());
    }
}
