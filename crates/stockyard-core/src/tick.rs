//! One simulation tick, end to end.
//!
//! [`run_tick`] reads a snapshot of every asset, runs the valuation model
//! on each, persists the per-asset results, and assembles the batch of
//! change events for broadcast. Per-asset failures (model preconditions
//! or write errors) are logged and excluded from the batch; only a failed
//! snapshot read aborts the whole tick.

use std::time::{Duration, Instant};

use chrono::Utc;
use futures::StreamExt;
use stockyard_db::{AssetStore, StoreError};
use stockyard_model::{DriftSource, FixedDrift, compute_next};
use stockyard_types::{AssetState, ChangeEvent, TickBatch, ValuationPoint};

/// Errors that abort an entire tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The asset snapshot could not be read; nothing was modified.
    #[error("failed to read asset snapshot: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}

/// Outcome of one completed tick.
#[derive(Debug)]
pub struct TickSummary {
    /// The batch of change events, ordered by asset id.
    pub batch: TickBatch,
    /// Number of assets processed successfully.
    pub processed: usize,
    /// Number of assets skipped due to per-asset failures.
    pub skipped: usize,
    /// Wall time the tick took.
    pub elapsed: Duration,
}

/// Run one tick over every asset in the store.
///
/// All stochastic draws for the tick are taken from `drift` up front, in
/// snapshot order, so a seeded run is reproducible regardless of how the
/// per-asset work interleaves. Per-asset persistence then proceeds with at
/// most `max_concurrent` assets in flight.
///
/// # Errors
///
/// Returns [`TickError::Store`] only when the snapshot read fails. Every
/// per-asset failure is logged, counted in `skipped`, and excluded from
/// the batch.
pub async fn run_tick<S: AssetStore>(
    store: &S,
    tick: u64,
    drift: &mut impl DriftSource,
    max_concurrent: usize,
) -> Result<TickSummary, TickError> {
    let started = Instant::now();
    let timestamp = Utc::now();

    let assets = store.list_assets().await?;
    let total = assets.len();

    // Draw the tick's randomness serially before fanning out.
    let draws: Vec<(AssetState, FixedDrift)> = assets
        .into_iter()
        .map(|state| {
            let fixed = FixedDrift {
                base: drift.base_drift(),
                high: drift.high_jitter(),
                low: drift.low_jitter(),
                vol: drift.volume(),
            };
            (state, fixed)
        })
        .collect();

    let mut events: Vec<ChangeEvent> = futures::stream::iter(draws)
        .map(|(state, fixed)| process_asset(store, state, fixed))
        .buffer_unordered(max_concurrent.max(1))
        .filter_map(|outcome| async move { outcome })
        .collect()
        .await;

    // Deterministic batch order regardless of completion order.
    events.sort_unstable_by_key(|event| event.asset_id);

    let processed = events.len();
    let skipped = total.saturating_sub(processed);
    let elapsed = started.elapsed();

    tracing::debug!(tick, processed, skipped, ?elapsed, "Tick complete");

    Ok(TickSummary {
        batch: TickBatch {
            tick,
            events,
            timestamp,
        },
        processed,
        skipped,
        elapsed,
    })
}

/// Model, persist, and report one asset. Returns `None` on any per-asset
/// failure so the tick can continue with the rest of the herd.
async fn process_asset<S: AssetStore>(
    store: &S,
    state: AssetState,
    mut fixed: FixedDrift,
) -> Option<ChangeEvent> {
    let next = match compute_next(&state, &mut fixed) {
        Ok(next) => next,
        Err(error) => {
            tracing::warn!(asset_id = %state.id, %error, "Skipping asset: model rejected state");
            return None;
        }
    };

    // Candle: open is the valuation the asset entered the tick with, the
    // jitter widens the range cosmetically without breaking OHLC bounds.
    let open = state.valuation;
    let close = next.new_valuation;
    let timestamp = Utc::now();
    let point = ValuationPoint {
        asset_id: state.id,
        open,
        high: open.max(close) * (1.0 + fixed.high_jitter()),
        low: open.min(close) * (1.0 - fixed.low_jitter()),
        close,
        volume: fixed.volume(),
        timestamp,
    };

    if let Err(error) = store
        .update_asset(
            state.id,
            next.new_weight,
            next.new_price_per_unit_weight,
            next.new_valuation,
        )
        .await
    {
        tracing::warn!(asset_id = %state.id, %error, "Skipping asset: live update failed");
        return None;
    }

    if let Err(error) = store
        .insert_valuation_points(std::slice::from_ref(&point))
        .await
    {
        // The live record is already updated, but a point that never
        // reached the store must not reach subscribers either.
        tracing::warn!(asset_id = %state.id, %error, "Skipping asset: history append failed");
        return None;
    }

    Some(ChangeEvent {
        asset_id: state.id,
        new_valuation: next.new_valuation,
        new_weight: next.new_weight,
        new_price_per_unit_weight: next.new_price_per_unit_weight,
        timestamp,
        point,
    })
}
