//! `PostgreSQL` implementation of [`AssetStore`].
//!
//! Asset updates are single-statement row writes so the three derived
//! fields (weight, price, valuation) change atomically. History points are
//! batch-inserted with a multi-row UNNEST `INSERT`, reducing round-trips
//! by a factor of the batch size.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use stockyard_types::{AssetId, AssetState, ValuationPoint};
use uuid::Uuid;

use crate::error::StoreError;
use crate::postgres::PostgresPool;
use crate::store::AssetStore;

/// [`AssetStore`] backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgAssetStore {
    pool: PgPool,
}

impl PgAssetStore {
    /// Create a store over an existing connection pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }

    /// Insert a new asset record (onboarding flows and seed data).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidRecord`] if the record fails range
    /// validation, or [`StoreError::Postgres`] if the insert fails.
    pub async fn insert_asset(&self, asset: &AssetState) -> Result<(), StoreError> {
        asset.validate()?;
        sqlx::query(
            r"INSERT INTO assets
                (id, current_weight, daily_growth_rate, health_score,
                 price_per_unit_weight, target_valuation, valuation)
              VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(asset.id.into_inner())
        .bind(asset.current_weight)
        .bind(asset.daily_growth_rate)
        .bind(i16::from(asset.health_score))
        .bind(asset.price_per_unit_weight)
        .bind(asset.target_valuation)
        .bind(asset.valuation)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Count stored history points for one asset.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the query fails.
    pub async fn count_points(&self, id: AssetId) -> Result<u64, StoreError> {
        let count: i64 =
            sqlx::query_scalar(r"SELECT COUNT(*) FROM valuation_points WHERE asset_id = $1")
                .bind(id.into_inner())
                .fetch_one(&self.pool)
                .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

/// A row from the `assets` table.
///
/// Uses runtime types rather than compile-time checked types to avoid
/// requiring a live database during builds.
#[derive(Debug, Clone, sqlx::FromRow)]
struct AssetRow {
    id: Uuid,
    current_weight: f64,
    daily_growth_rate: f64,
    health_score: i16,
    price_per_unit_weight: f64,
    target_valuation: Option<f64>,
    valuation: f64,
}

impl AssetRow {
    /// Convert a raw row into a validated [`AssetState`].
    fn into_state(self) -> Result<AssetState, StoreError> {
        let health_score = u8::try_from(self.health_score)
            .map_err(|_err| StoreError::Config(format!("health_score out of range: {}", self.id)))?;
        let state = AssetState {
            id: AssetId::from(self.id),
            current_weight: self.current_weight,
            daily_growth_rate: self.daily_growth_rate,
            health_score,
            price_per_unit_weight: self.price_per_unit_weight,
            target_valuation: self.target_valuation,
            valuation: self.valuation,
        };
        state.validate()?;
        Ok(state)
    }
}

impl AssetStore for PgAssetStore {
    async fn list_assets(&self) -> Result<Vec<AssetState>, StoreError> {
        let rows = sqlx::query_as::<_, AssetRow>(
            r"SELECT id, current_weight, daily_growth_rate, health_score,
                     price_per_unit_weight, target_valuation, valuation
              FROM assets
              ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut assets = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            match row.into_state() {
                Ok(state) => assets.push(state),
                Err(err) => {
                    // An out-of-range row is excluded from the snapshot
                    // instead of failing the whole tick.
                    tracing::warn!(asset_id = %id, error = %err, "Skipping invalid asset row");
                }
            }
        }
        Ok(assets)
    }

    async fn update_asset(
        &self,
        id: AssetId,
        weight: f64,
        price_per_unit_weight: f64,
        valuation: f64,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r"UPDATE assets
              SET current_weight = $2,
                  price_per_unit_weight = $3,
                  valuation = $4,
                  updated_at = NOW()
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .bind(weight)
        .bind(price_per_unit_weight)
        .bind(valuation)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AssetNotFound(id));
        }
        Ok(())
    }

    async fn insert_valuation_points(&self, points: &[ValuationPoint]) -> Result<(), StoreError> {
        if points.is_empty() {
            return Ok(());
        }

        let len = points.len();
        let mut asset_ids = Vec::with_capacity(len);
        let mut opens = Vec::with_capacity(len);
        let mut highs = Vec::with_capacity(len);
        let mut lows = Vec::with_capacity(len);
        let mut closes = Vec::with_capacity(len);
        let mut volumes = Vec::with_capacity(len);
        let mut timestamps = Vec::with_capacity(len);

        for point in points {
            asset_ids.push(point.asset_id.into_inner());
            opens.push(point.open);
            highs.push(point.high);
            lows.push(point.low);
            closes.push(point.close);
            volumes.push(i32::try_from(point.volume).unwrap_or(i32::MAX));
            timestamps.push(point.timestamp);
        }

        // Multi-row INSERT using UNNEST for batch efficiency.
        sqlx::query(
            r"INSERT INTO valuation_points (asset_id, open, high, low, close, volume, timestamp)
              SELECT * FROM UNNEST($1::UUID[], $2::FLOAT8[], $3::FLOAT8[], $4::FLOAT8[], $5::FLOAT8[], $6::INT4[], $7::TIMESTAMPTZ[])",
        )
        .bind(&asset_ids)
        .bind(&opens)
        .bind(&highs)
        .bind(&lows)
        .bind(&closes)
        .bind(&volumes)
        .bind(&timestamps)
        .execute(&self.pool)
        .await?;

        tracing::debug!(count = len, "Inserted valuation points (batch UNNEST)");
        Ok(())
    }

    async fn delete_points_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(r"DELETE FROM valuation_points WHERE timestamp < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
