//! Simulation core for the Stockyard valuation simulator.
//!
//! Owns the two periodic loops -- the valuation tick and the retention
//! sweep -- plus the broadcast hub that fans each tick's batch out to
//! subscribers. The engine is generic over the
//! [`AssetStore`](stockyard_db::AssetStore) seam so production runs
//! against `PostgreSQL` and tests run in memory.
//!
//! # Modules
//!
//! - [`config`] -- Typed YAML configuration with defaults
//! - [`tick`] -- One tick: snapshot read, per-asset model + persist, batch
//! - [`sweeper`] -- Age-based history pruning
//! - [`hub`] -- Bounded fan-out of tick batches to subscribers
//! - [`engine`] -- Lifecycle: idempotent start/stop of the two loops

pub mod config;
pub mod engine;
pub mod hub;
pub mod sweeper;
pub mod tick;

pub use config::EngineConfig;
pub use engine::SimulationEngine;
pub use hub::{BroadcastHub, Subscription};
pub use sweeper::run_sweep;
pub use tick::{TickError, TickSummary, run_tick};
