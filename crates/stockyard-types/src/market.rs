//! History points, change events, and per-tick batches.
//!
//! A [`ValuationPoint`] is the durable OHLC-style record appended once per
//! asset per tick and pruned by the retention sweeper. [`ChangeEvent`] and
//! [`TickBatch`] are ephemeral: constructed during a tick, handed to the
//! broadcast hub as one unit, then discarded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::AssetId;

/// One historical OHLC-style valuation record for an asset.
///
/// Immutable after creation. The engine emits at most one point per asset
/// per tick, so timestamps are strictly increasing per asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationPoint {
    /// The asset this point belongs to.
    pub asset_id: AssetId,
    /// Valuation at the start of the tick (previous recorded valuation).
    pub open: f64,
    /// Highest valuation seen this tick (`>= max(open, close)`).
    pub high: f64,
    /// Lowest valuation seen this tick (`<= min(open, close)`).
    pub low: f64,
    /// Valuation at the end of the tick.
    pub close: f64,
    /// Synthetic trade volume for chart consumers.
    pub volume: u32,
    /// When the point was produced.
    pub timestamp: DateTime<Utc>,
}

impl ValuationPoint {
    /// Check the OHLC invariants: `low <= min(open, close)` and
    /// `high >= max(open, close)`.
    pub fn is_well_formed(&self) -> bool {
        self.low <= self.open.min(self.close) && self.high >= self.open.max(self.close)
    }
}

/// One asset's state change within a tick.
///
/// Ephemeral: aggregated into a [`TickBatch`], broadcast, then discarded.
/// The embedded [`ValuationPoint`] lets chart consumers append a candle
/// without a separate history query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// The asset that changed.
    pub asset_id: AssetId,
    /// The new derived valuation.
    pub new_valuation: f64,
    /// The new live weight.
    pub new_weight: f64,
    /// The new market price per kilogram.
    pub new_price_per_unit_weight: f64,
    /// When the change was computed.
    pub timestamp: DateTime<Utc>,
    /// The history point recorded for this tick.
    pub point: ValuationPoint,
}

/// All change events produced by one tick, delivered to subscribers as a
/// single unit so message overhead stays bounded under large asset counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickBatch {
    /// The tick number that produced this batch.
    pub tick: u64,
    /// One event per asset that updated successfully this tick.
    pub events: Vec<ChangeEvent>,
    /// When the batch was assembled.
    pub timestamp: DateTime<Utc>,
}
