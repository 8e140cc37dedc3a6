//! Error types for the data layer.
//!
//! All errors are propagated via [`StoreError`], which wraps the underlying
//! [`sqlx`] errors with additional context about which operation failed.

use stockyard_types::{AssetId, AssetStateError};

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A loaded row violates the asset's numeric ranges.
    #[error("invalid asset record: {0}")]
    InvalidRecord(#[from] AssetStateError),

    /// An update targeted an asset that does not exist.
    #[error("asset not found: {0}")]
    AssetNotFound(AssetId),

    /// The store is unreachable or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
