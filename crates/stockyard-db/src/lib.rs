//! Data layer for the Stockyard valuation simulator.
//!
//! Defines the [`AssetStore`] trait -- the engine's only persistence seam --
//! plus two implementations: [`PgAssetStore`] over `PostgreSQL` for
//! production and [`MemoryAssetStore`] for tests and local runs.
//!
//! # Modules
//!
//! - [`error`] -- The [`StoreError`] type shared by all implementations
//! - [`postgres`] -- Connection pool configuration and migrations
//! - [`store`] -- The [`AssetStore`] trait
//! - [`pg_store`] -- `PostgreSQL` implementation (sqlx runtime queries)
//! - [`memory`] -- In-memory implementation with injectable write failures

pub mod error;
pub mod memory;
pub mod pg_store;
pub mod postgres;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryAssetStore;
pub use pg_store::PgAssetStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use store::AssetStore;
