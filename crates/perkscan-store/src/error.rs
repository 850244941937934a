//! Error types for the perk store.

use thiserror::Error;

/// Errors surfaced by the persistence gateway.
///
/// A unique-constraint violation on the fingerprint column is handled
/// internally (it drives the insert-vs-update branch) and never escapes
/// through this type.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
