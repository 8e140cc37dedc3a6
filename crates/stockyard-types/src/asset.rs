//! The mutable asset record and its numeric-range validation.
//!
//! An [`AssetState`] is one simulated biological/financial unit. It is
//! created by the surrounding onboarding flow, mutated exclusively by the
//! simulation engine (weight, price-per-unit, valuation), and never deleted
//! by the core. Validation happens at the store boundary so the engine only
//! ever sees records inside the legal ranges.

use serde::{Deserialize, Serialize};

use crate::ids::AssetId;

/// Maximum legal health score (inclusive).
pub const MAX_HEALTH_SCORE: u8 = 100;

/// Errors raised when an asset record violates its numeric ranges.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AssetStateError {
    /// `current_weight` must be a positive, finite number.
    #[error("asset {id}: current_weight must be positive and finite")]
    NonPositiveWeight {
        /// The offending asset.
        id: AssetId,
    },

    /// `daily_growth_rate` must be non-negative and finite.
    #[error("asset {id}: daily_growth_rate must be non-negative and finite")]
    NegativeGrowthRate {
        /// The offending asset.
        id: AssetId,
    },

    /// `health_score` must be in `0..=100`.
    #[error("asset {id}: health_score {score} exceeds {MAX_HEALTH_SCORE}")]
    HealthOutOfRange {
        /// The offending asset.
        id: AssetId,
        /// The out-of-range score.
        score: u8,
    },

    /// `price_per_unit_weight` must be a positive, finite number.
    #[error("asset {id}: price_per_unit_weight must be positive and finite")]
    NonPositivePrice {
        /// The offending asset.
        id: AssetId,
    },

    /// `target_valuation`, when set, must be a positive, finite number.
    #[error("asset {id}: target_valuation must be positive and finite when set")]
    NonPositiveTarget {
        /// The offending asset.
        id: AssetId,
    },
}

/// One simulated biological/financial unit.
///
/// The `valuation` field is derived (`current_weight *
/// price_per_unit_weight`) and persisted redundantly for fast reads. It is
/// never independently authoritative: the engine recomputes it on every
/// tick and the store writes all three derived fields in a single atomic
/// update so external readers never observe a torn combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetState {
    /// Unique, immutable identifier.
    pub id: AssetId,
    /// Live weight in kilograms. Positive; monotonically non-decreasing
    /// absent an external correction.
    pub current_weight: f64,
    /// Nominal per-tick weight gain in kilograms, before health adjustment.
    pub daily_growth_rate: f64,
    /// Health score in `0..=100`; scales effective growth. Zero freezes it.
    pub health_score: u8,
    /// Market price per kilogram. Positive; the stochastic factor.
    pub price_per_unit_weight: f64,
    /// Optional target valuation. When set, biases price drift toward it.
    pub target_valuation: Option<f64>,
    /// Derived total valuation (`current_weight * price_per_unit_weight`).
    pub valuation: f64,
}

impl AssetState {
    /// Check every numeric field against its legal range.
    ///
    /// Called at the store boundary when loading records, so the model's
    /// positive-weight/positive-price preconditions hold for every state
    /// the engine processes.
    ///
    /// # Errors
    ///
    /// Returns the first [`AssetStateError`] found.
    pub fn validate(&self) -> Result<(), AssetStateError> {
        if !(self.current_weight.is_finite() && self.current_weight > 0.0) {
            return Err(AssetStateError::NonPositiveWeight { id: self.id });
        }
        if !(self.daily_growth_rate.is_finite() && self.daily_growth_rate >= 0.0) {
            return Err(AssetStateError::NegativeGrowthRate { id: self.id });
        }
        if self.health_score > MAX_HEALTH_SCORE {
            return Err(AssetStateError::HealthOutOfRange {
                id: self.id,
                score: self.health_score,
            });
        }
        if !(self.price_per_unit_weight.is_finite() && self.price_per_unit_weight > 0.0) {
            return Err(AssetStateError::NonPositivePrice { id: self.id });
        }
        if let Some(target) = self.target_valuation {
            if !(target.is_finite() && target > 0.0) {
                return Err(AssetStateError::NonPositiveTarget { id: self.id });
            }
        }
        Ok(())
    }

    /// Recompute the derived valuation from its two factors.
    pub fn computed_valuation(&self) -> f64 {
        self.current_weight * self.price_per_unit_weight
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn sample() -> AssetState {
        AssetState {
            id: AssetId::new(),
            current_weight: 300.0,
            daily_growth_rate: 1.0,
            health_score: 100,
            price_per_unit_weight: 60_000.0,
            target_valuation: Some(20_000_000.0),
            valuation: 18_000_000.0,
        }
    }

    #[test]
    fn valid_state_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn zero_weight_rejected() {
        let mut s = sample();
        s.current_weight = 0.0;
        assert!(matches!(
            s.validate(),
            Err(AssetStateError::NonPositiveWeight { .. })
        ));
    }

    #[test]
    fn nan_price_rejected() {
        let mut s = sample();
        s.price_per_unit_weight = f64::NAN;
        assert!(matches!(
            s.validate(),
            Err(AssetStateError::NonPositivePrice { .. })
        ));
    }

    #[test]
    fn negative_growth_rejected() {
        let mut s = sample();
        s.daily_growth_rate = -0.5;
        assert!(matches!(
            s.validate(),
            Err(AssetStateError::NegativeGrowthRate { .. })
        ));
    }

    #[test]
    fn health_above_cap_rejected() {
        let mut s = sample();
        s.health_score = 101;
        assert!(matches!(
            s.validate(),
            Err(AssetStateError::HealthOutOfRange { score: 101, .. })
        ));
    }

    #[test]
    fn non_positive_target_rejected() {
        let mut s = sample();
        s.target_valuation = Some(0.0);
        assert!(matches!(
            s.validate(),
            Err(AssetStateError::NonPositiveTarget { .. })
        ));
    }

    #[test]
    fn computed_valuation_is_product() {
        let s = sample();
        assert_eq!(s.computed_valuation(), 18_000_000.0);
    }

    #[test]
    fn state_roundtrip_serde() {
        let s = sample();
        let json = serde_json::to_string(&s).unwrap();
        let restored: AssetState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, s);
    }
}
