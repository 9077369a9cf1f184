//! Service modules for the synchronization pipeline

pub mod enricher;
pub mod merger;
pub mod notifier;
pub mod pipeline;
pub mod pokeapi_client;
pub mod rate_limiter;
pub mod warehouse_client;

pub use enricher::{Enricher, EnrichmentOutcome};
pub use notifier::{NoopNotifier, Notifier, WebhookNotifier};
pub use pipeline::Pipeline;
pub use pokeapi_client::{PokeApiClient, PokeApiError, PokemonLookup};
pub use rate_limiter::RateLimiter;
pub use warehouse_client::{ReferenceSource, WarehouseClient};
