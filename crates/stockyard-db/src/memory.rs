//! In-memory [`AssetStore`] for tests and local runs.
//!
//! Backs the engine's test suite: cheap to seed, inspectable, and able to
//! inject failures -- per-asset write failures and whole-snapshot read
//! failures -- so the engine's isolation paths can be exercised without a
//! database.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use stockyard_types::{AssetId, AssetState, ValuationPoint};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::AssetStore;

/// [`AssetStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: RwLock<BTreeMap<AssetId, AssetState>>,
    points: RwLock<Vec<ValuationPoint>>,
    failing_writes: RwLock<BTreeSet<AssetId>>,
    failing_point_inserts: RwLock<BTreeSet<AssetId>>,
    fail_lists: AtomicBool,
}

impl MemoryAssetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a validated asset record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidRecord`] if the record fails range
    /// validation.
    pub async fn insert_asset(&self, asset: AssetState) -> Result<(), StoreError> {
        asset.validate()?;
        self.assets.write().await.insert(asset.id, asset);
        Ok(())
    }

    /// Insert a record without validation.
    ///
    /// Test hook for exercising the engine's handling of corrupt states;
    /// `list_assets` will return the record as-is.
    pub async fn insert_unvalidated(&self, asset: AssetState) {
        self.assets.write().await.insert(asset.id, asset);
    }

    /// Make every subsequent `update_asset` for `id` fail.
    pub async fn fail_writes_for(&self, id: AssetId) {
        self.failing_writes.write().await.insert(id);
    }

    /// Make every subsequent `insert_valuation_points` batch containing a
    /// point for `id` fail.
    pub async fn fail_point_inserts_for(&self, id: AssetId) {
        self.failing_point_inserts.write().await.insert(id);
    }

    /// Toggle failure of every subsequent `list_assets` call.
    pub fn set_fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    /// Return one asset's current record, if present.
    pub async fn get_asset(&self, id: AssetId) -> Option<AssetState> {
        self.assets.read().await.get(&id).cloned()
    }

    /// Return all stored history points for one asset, in insertion order.
    pub async fn points_for(&self, id: AssetId) -> Vec<ValuationPoint> {
        self.points
            .read()
            .await
            .iter()
            .filter(|p| p.asset_id == id)
            .cloned()
            .collect()
    }

    /// Return the total number of stored history points.
    pub async fn point_count(&self) -> usize {
        self.points.read().await.len()
    }
}

impl AssetStore for MemoryAssetStore {
    async fn list_assets(&self) -> Result<Vec<AssetState>, StoreError> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "simulated snapshot read failure".to_owned(),
            ));
        }
        Ok(self.assets.read().await.values().cloned().collect())
    }

    async fn update_asset(
        &self,
        id: AssetId,
        weight: f64,
        price_per_unit_weight: f64,
        valuation: f64,
    ) -> Result<(), StoreError> {
        if self.failing_writes.read().await.contains(&id) {
            return Err(StoreError::Unavailable(format!(
                "simulated write failure for {id}"
            )));
        }
        let mut assets = self.assets.write().await;
        let asset = assets.get_mut(&id).ok_or(StoreError::AssetNotFound(id))?;
        asset.current_weight = weight;
        asset.price_per_unit_weight = price_per_unit_weight;
        asset.valuation = valuation;
        Ok(())
    }

    async fn insert_valuation_points(&self, points: &[ValuationPoint]) -> Result<(), StoreError> {
        {
            let failing = self.failing_point_inserts.read().await;
            if let Some(point) = points.iter().find(|p| failing.contains(&p.asset_id)) {
                return Err(StoreError::Unavailable(format!(
                    "simulated point insert failure for {}",
                    point.asset_id
                )));
            }
        }
        self.points.write().await.extend_from_slice(points);
        Ok(())
    }

    async fn delete_points_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut points = self.points.write().await;
        let before = points.len();
        points.retain(|p| p.timestamp >= cutoff);
        Ok(u64::try_from(before.saturating_sub(points.len())).unwrap_or(0))
    }
}
