//! Pure valuation model for the Stockyard simulator.
//!
//! Given one asset's current state, [`compute_next`] produces its next
//! weight, price-per-unit, and total valuation. The computation has no I/O
//! and no shared state; all randomness comes from an injected
//! [`DriftSource`], so the model is deterministic under test.
//!
//! # Modules
//!
//! - [`drift`] -- The randomness seam: production and fixed drift sources
//! - [`valuation`] -- The growth/drift/bias computation itself

pub mod drift;
pub mod valuation;

pub use drift::{DriftSource, FixedDrift, RandomDrift};
pub use valuation::{compute_next, ModelError, NextValuation};
