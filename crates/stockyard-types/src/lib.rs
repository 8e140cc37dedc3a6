//! Shared type definitions for the Stockyard valuation simulator.
//!
//! This crate is the single source of truth for the data model used across
//! the Stockyard workspace: the simulated asset record, the OHLC history
//! point, and the ephemeral change events broadcast to subscribers.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for asset identifiers
//! - [`asset`] -- The mutable asset record and its range validation
//! - [`market`] -- History points, change events, and per-tick batches

pub mod asset;
pub mod ids;
pub mod market;

// Re-export all public types at crate root for convenience.
pub use asset::{AssetState, AssetStateError};
pub use ids::AssetId;
pub use market::{ChangeEvent, TickBatch, ValuationPoint};
