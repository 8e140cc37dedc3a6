//! The [`AssetStore`] trait: the engine's only persistence seam.
//!
//! The simulation engine and retention sweeper are generic over this trait
//! so that production runs against `PostgreSQL` while tests run against the
//! in-memory implementation with injected failures.

use chrono::{DateTime, Utc};
use stockyard_types::{AssetId, AssetState, ValuationPoint};

use crate::error::StoreError;

/// Durable storage for asset records and historical valuation points.
///
/// All methods return `Send` futures so implementations can be driven from
/// spawned tasks. Update semantics: `update_asset` writes the three derived
/// fields in one atomic statement, so a concurrent external override can
/// never produce a torn weight/price/valuation combination.
pub trait AssetStore: Send + Sync {
    /// Read a full snapshot of all asset records.
    ///
    /// Rows that fail range validation are logged and omitted from the
    /// snapshot rather than failing the whole read.
    fn list_assets(&self) -> impl Future<Output = Result<Vec<AssetState>, StoreError>> + Send;

    /// Atomically update one asset's weight, price-per-unit, and valuation.
    fn update_asset(
        &self,
        id: AssetId,
        weight: f64,
        price_per_unit_weight: f64,
        valuation: f64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Append a batch of history points (typically one per asset per tick).
    fn insert_valuation_points(
        &self,
        points: &[ValuationPoint],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Bulk-delete history points older than `cutoff`.
    ///
    /// Returns the number of rows deleted. Deleting zero rows is a normal
    /// outcome, never an error.
    fn delete_points_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}
