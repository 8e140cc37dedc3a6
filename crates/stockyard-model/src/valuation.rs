//! The growth/drift/bias computation for one asset, one tick.
//!
//! [`compute_next`] is the whole contract: deterministic given its
//! [`DriftSource`], no I/O, no shared state. The engine calls it once per
//! asset per tick and treats any error as "skip this asset, report it".
//!
//! # Algorithm
//!
//! 1. Growth: `effective = daily_growth_rate * (health_score / 100)`,
//!    added to the current weight. Health 0 freezes growth entirely.
//! 2. Market: a uniform base drift of ±0.1% from the drift source.
//! 3. Target bias: when a target valuation is set and the gap exceeds the
//!    threshold, a fixed ±0.1% nudge is added toward the target. This is
//!    a first-order pull, not a solver: the asset approaches the target
//!    asymptotically and may oscillate near it because noise is applied
//!    on top of the bias.
//! 4. The new price is floored so total valuation never drops below a
//!    small positive minimum.

use stockyard_types::{AssetState, AssetStateError};

use crate::drift::DriftSource;

/// Minimum gap to the target before the directional bias engages.
pub const TARGET_BIAS_THRESHOLD: f64 = 100.0;

/// Magnitude of the per-tick directional bias toward the target (0.1%).
pub const TARGET_BIAS: f64 = 0.001;

/// Floor on total valuation; the new price is raised so the valuation
/// never degenerates to zero or negative.
pub const MIN_VALUATION: f64 = 1000.0;

/// Errors from the valuation model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The input state violates the model's preconditions (non-positive
    /// weight or price, out-of-range health). The engine must skip the
    /// asset rather than propagate a corrupt value.
    #[error("precondition violated: {source}")]
    Precondition {
        /// The underlying range violation.
        #[from]
        source: AssetStateError,
    },
}

/// The model's output for one asset and one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextValuation {
    /// New live weight (`>=` the input weight).
    pub new_weight: f64,
    /// New market price per kilogram (always positive).
    pub new_price_per_unit_weight: f64,
    /// New derived valuation (`new_weight * new_price_per_unit_weight`).
    pub new_valuation: f64,
    /// The total fractional price change applied (drift plus bias).
    pub change_percent: f64,
}

/// Compute the next state for one asset.
///
/// # Errors
///
/// Returns [`ModelError::Precondition`] if the input state fails range
/// validation. The caller must never construct such states; when one is
/// encountered anyway the model fails fast instead of propagating a
/// corrupt value downstream.
pub fn compute_next(
    state: &AssetState,
    drift: &mut impl DriftSource,
) -> Result<NextValuation, ModelError> {
    state.validate()?;

    // Growth step. Health scales the nominal rate; never negative.
    let effective_growth = state.daily_growth_rate * (f64::from(state.health_score) / 100.0);
    let new_weight = state.current_weight + effective_growth;

    // Target bias, computed against the pre-growth valuation.
    let mut change_percent = 0.0;
    if let Some(target) = state.target_valuation {
        let current_valuation = state.current_weight * state.price_per_unit_weight;
        let diff = target - current_valuation;
        if diff.abs() > TARGET_BIAS_THRESHOLD {
            change_percent += if diff > 0.0 { TARGET_BIAS } else { -TARGET_BIAS };
        }
    }

    // Market noise, applied after the bias.
    change_percent += drift.base_drift();

    let mut new_price = state.price_per_unit_weight * (1.0 + change_percent);

    // Valuation floor. Raising the price (rather than clamping the
    // valuation afterwards) keeps the product identity exact.
    if new_weight * new_price < MIN_VALUATION {
        new_price = MIN_VALUATION / new_weight;
    }

    let new_valuation = new_weight * new_price;

    Ok(NextValuation {
        new_weight,
        new_price_per_unit_weight: new_price,
        new_valuation,
        change_percent,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use stockyard_types::AssetId;

    use super::*;
    use crate::drift::FixedDrift;

    fn asset(weight: f64, growth: f64, health: u8, price: f64, target: Option<f64>) -> AssetState {
        AssetState {
            id: AssetId::new(),
            current_weight: weight,
            daily_growth_rate: growth,
            health_score: health,
            price_per_unit_weight: price,
            target_valuation: target,
            valuation: weight * price,
        }
    }

    #[test]
    fn scenario_single_tick_with_upward_bias() {
        // weight 300, growth 1/day, health 100, 60k/kg, target 20M.
        // Current valuation 18M < target, so the price must be biased up.
        let state = asset(300.0, 1.0, 100, 60_000.0, Some(20_000_000.0));
        let mut drift = FixedDrift::zero();

        let next = compute_next(&state, &mut drift).unwrap();

        assert_eq!(next.new_weight, 301.0);
        assert!(next.new_price_per_unit_weight > 60_000.0);
        assert!(
            (next.new_valuation - next.new_weight * next.new_price_per_unit_weight).abs() < 1e-6
        );
    }

    #[test]
    fn positive_health_grows_weight() {
        let state = asset(250.0, 0.8, 50, 40_000.0, None);
        let mut drift = FixedDrift::zero();

        let next = compute_next(&state, &mut drift).unwrap();
        assert!(next.new_weight > state.current_weight);
        assert_eq!(next.new_weight, 250.0 + 0.8 * 0.5);
    }

    #[test]
    fn zero_health_freezes_growth() {
        let state = asset(250.0, 0.8, 0, 40_000.0, None);
        let mut drift = FixedDrift::zero();

        let next = compute_next(&state, &mut drift).unwrap();
        assert_eq!(next.new_weight, state.current_weight);
    }

    #[test]
    fn valuation_is_exact_product() {
        let state = asset(312.5, 1.2, 87, 55_500.0, Some(18_000_000.0));
        let mut drift = FixedDrift {
            base: 0.0007,
            ..FixedDrift::zero()
        };

        let next = compute_next(&state, &mut drift).unwrap();
        assert!(
            (next.new_valuation - next.new_weight * next.new_price_per_unit_weight).abs() < 1e-6
        );
    }

    #[test]
    fn bias_pulls_price_up_while_below_target() {
        // Noise held at zero: while the asset sits more than the threshold
        // below its target, the price must strictly increase tick over
        // tick. The loop stops once the gap has closed (a single biased
        // step may land inside the threshold or slightly past the target).
        let mut state = asset(300.0, 0.0, 0, 50_000.0, Some(15_100_000.0));
        let mut drift = FixedDrift::zero();

        let mut closed = false;
        for _ in 0..200 {
            let gap = 15_100_000.0 - state.current_weight * state.price_per_unit_weight;
            if gap <= TARGET_BIAS_THRESHOLD {
                closed = true;
                break;
            }
            let next = compute_next(&state, &mut drift).unwrap();
            assert!(next.new_price_per_unit_weight > state.price_per_unit_weight);
            state.current_weight = next.new_weight;
            state.price_per_unit_weight = next.new_price_per_unit_weight;
            state.valuation = next.new_valuation;
        }
        assert!(closed, "price never closed the gap to the target");
    }

    #[test]
    fn bias_pulls_price_down_when_above_target() {
        let state = asset(300.0, 0.0, 0, 60_000.0, Some(1_000_000.0));
        let mut drift = FixedDrift::zero();

        let next = compute_next(&state, &mut drift).unwrap();
        assert!(next.new_price_per_unit_weight < state.price_per_unit_weight);
    }

    #[test]
    fn valuation_floor_holds() {
        // A tiny asset with a crash-level downward draw still never drops
        // below the valuation floor.
        let state = asset(1.0, 0.0, 0, 1_001.0, None);
        let mut drift = FixedDrift {
            base: -0.001,
            ..FixedDrift::zero()
        };

        let next = compute_next(&state, &mut drift).unwrap();
        assert!(next.new_valuation >= MIN_VALUATION);
        assert!(next.new_price_per_unit_weight > 0.0);
    }

    #[test]
    fn no_bias_without_target() {
        let state = asset(300.0, 0.0, 0, 60_000.0, None);
        let mut drift = FixedDrift::zero();

        let next = compute_next(&state, &mut drift).unwrap();
        assert_eq!(next.new_price_per_unit_weight, 60_000.0);
        assert_eq!(next.change_percent, 0.0);
    }

    #[test]
    fn bias_disengages_inside_threshold() {
        // Gap of 50 currency units is below the 100-unit threshold.
        let state = asset(1.0, 0.0, 0, 10_000.0, Some(10_050.0));
        let mut drift = FixedDrift::zero();

        let next = compute_next(&state, &mut drift).unwrap();
        assert_eq!(next.new_price_per_unit_weight, 10_000.0);
    }

    #[test]
    fn corrupt_state_fails_fast() {
        let mut state = asset(300.0, 1.0, 100, 60_000.0, None);
        state.current_weight = -1.0;
        let mut drift = FixedDrift::zero();

        let result = compute_next(&state, &mut drift);
        assert!(matches!(result, Err(ModelError::Precondition { .. })));
    }
}
