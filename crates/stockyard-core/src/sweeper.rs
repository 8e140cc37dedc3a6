//! Age-based pruning of valuation history.
//!
//! The sweeper keeps the history table bounded: on each pass it deletes
//! every point older than the configured horizon. It never touches live
//! asset records, and a pass that deletes nothing is a normal outcome.

use chrono::{Duration, Utc};
use stockyard_db::{AssetStore, StoreError};

/// Delete all history points older than `horizon` before now.
///
/// Returns the number of points deleted. A failed sweep leaves the
/// history intact; the caller retries on the next scheduled pass.
///
/// # Errors
///
/// Propagates the store error when the bulk delete fails.
pub async fn run_sweep<S: AssetStore>(store: &S, horizon: Duration) -> Result<u64, StoreError> {
    // An unrepresentable cutoff (absurd horizon) degrades to a no-op
    // sweep rather than a panic.
    let cutoff = Utc::now()
        .checked_sub_signed(horizon)
        .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);
    let deleted = store.delete_points_older_than(cutoff).await?;
    if deleted > 0 {
        tracing::info!(deleted, %cutoff, "Retention sweep pruned history points");
    } else {
        tracing::debug!(%cutoff, "Retention sweep found nothing to prune");
    }
    Ok(deleted)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use stockyard_db::MemoryAssetStore;
    use stockyard_types::{AssetId, ValuationPoint};

    use super::*;

    fn point_aged(age: Duration) -> ValuationPoint {
        ValuationPoint {
            asset_id: AssetId::new(),
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.5,
            volume: 20,
            timestamp: Utc::now() - age,
        }
    }

    #[tokio::test]
    async fn sweep_deletes_only_points_past_horizon() {
        let store = MemoryAssetStore::new();
        store
            .insert_valuation_points(&[
                point_aged(Duration::days(10)),
                point_aged(Duration::days(8)),
                point_aged(Duration::days(6)),
                point_aged(Duration::hours(1)),
            ])
            .await
            .unwrap();

        let deleted = run_sweep(&store, Duration::days(7)).await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.point_count().await, 2);
    }

    #[tokio::test]
    async fn sweep_on_empty_history_is_noop() {
        let store = MemoryAssetStore::new();
        let deleted = run_sweep(&store, Duration::days(7)).await.unwrap();
        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn repeated_sweeps_are_idempotent() {
        let store = MemoryAssetStore::new();
        store
            .insert_valuation_points(&[point_aged(Duration::days(9))])
            .await
            .unwrap();

        assert_eq!(run_sweep(&store, Duration::days(7)).await.unwrap(), 1);
        assert_eq!(run_sweep(&store, Duration::days(7)).await.unwrap(), 0);
    }
}
