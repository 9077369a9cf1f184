//! Common error types for pokesync

use thiserror::Error;

/// Common result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline-level error taxonomy
///
/// Record-level enrichment failures are not represented here: the enricher
/// absorbs them into its failure tally and the run continues. Everything
/// below propagates to the top level, which logs, best-effort notifies, and
/// terminates the run.
#[derive(Error, Debug)]
pub enum Error {
    /// Reference fetch from the warehouse failed; fatal to the run
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Database operation error (wraps sqlx::Error); fatal to the run
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// Enrichment ledger could not be read; callers treat this as an empty
    /// ledger and attempt full enrichment
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (serialization and similar)
    #[error("Internal error: {0}")]
    Internal(String),
}
