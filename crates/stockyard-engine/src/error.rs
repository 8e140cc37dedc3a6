//! Error types for the valuation engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all failure
//! modes during startup and shutdown.

/// Top-level error for the valuation engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: stockyard_core::config::ConfigError,
    },

    /// Data layer access failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: stockyard_db::StoreError,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
