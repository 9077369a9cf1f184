//! # pokesync
//!
//! Batch synchronization pipeline for the Pokemon ranking dataset:
//! - pulls the ranking snapshot from the analytical warehouse (replace per run)
//! - enriches each entry from PokeAPI at a bounded request rate, keeping an
//!   append-only ledger so successive runs stay incremental
//! - persists a merged reporting view (replace per run)

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use error::{Error, Result};
