//! The randomness seam for the valuation model.
//!
//! All stochastic inputs to a tick -- base price drift, chart jitter, and
//! synthetic volume -- are drawn through [`DriftSource`]. Production uses
//! [`RandomDrift`] over a seeded [`rand`] generator; tests use
//! [`FixedDrift`] to hold the noise at exact values (usually zero).

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Half-width of the symmetric base drift band (±0.1% per tick).
pub const BASE_DRIFT_BAND: f64 = 0.001;

/// Maximum cosmetic jitter applied above `max(open, close)` (+0.05%).
pub const MAX_HIGH_JITTER: f64 = 0.0005;

/// Maximum cosmetic jitter applied below `min(open, close)` (-0.005%).
pub const MAX_LOW_JITTER: f64 = 0.000_05;

/// Smallest synthetic volume (inclusive).
pub const MIN_VOLUME: u32 = 10;

/// Largest synthetic volume (exclusive).
pub const MAX_VOLUME: u32 = 60;

/// Source of the per-tick stochastic draws.
///
/// The contracts on the ranges are part of the model's correctness: jitter
/// values must stay within their caps so derived high/low never violate
/// the OHLC invariants.
pub trait DriftSource {
    /// Uniform base price drift in `[-BASE_DRIFT_BAND, BASE_DRIFT_BAND]`.
    fn base_drift(&mut self) -> f64;

    /// Cosmetic upward jitter in `[0, MAX_HIGH_JITTER]`.
    fn high_jitter(&mut self) -> f64;

    /// Cosmetic downward jitter in `[0, MAX_LOW_JITTER]`.
    fn low_jitter(&mut self) -> f64;

    /// Synthetic volume in `[MIN_VOLUME, MAX_VOLUME)`.
    fn volume(&mut self) -> u32;
}

/// Production drift source backed by a [`rand`] generator.
///
/// Seeded explicitly so an engine run is reproducible given the same
/// configuration seed and store contents.
#[derive(Debug)]
pub struct RandomDrift<R: Rng> {
    rng: R,
}

impl RandomDrift<SmallRng> {
    /// Create a drift source from an explicit seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomDrift<R> {
    /// Wrap an existing generator.
    pub const fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> DriftSource for RandomDrift<R> {
    fn base_drift(&mut self) -> f64 {
        self.rng.random_range(-BASE_DRIFT_BAND..=BASE_DRIFT_BAND)
    }

    fn high_jitter(&mut self) -> f64 {
        self.rng.random_range(0.0..=MAX_HIGH_JITTER)
    }

    fn low_jitter(&mut self) -> f64 {
        self.rng.random_range(0.0..=MAX_LOW_JITTER)
    }

    fn volume(&mut self) -> u32 {
        self.rng.random_range(MIN_VOLUME..MAX_VOLUME)
    }
}

/// Deterministic drift source for tests.
///
/// Returns the same configured values on every draw.
#[derive(Debug, Clone, Copy)]
pub struct FixedDrift {
    /// Value returned by `base_drift`.
    pub base: f64,
    /// Value returned by `high_jitter`.
    pub high: f64,
    /// Value returned by `low_jitter`.
    pub low: f64,
    /// Value returned by `volume`.
    pub vol: u32,
}

impl FixedDrift {
    /// A source with all noise held at zero and a nominal volume.
    pub const fn zero() -> Self {
        Self {
            base: 0.0,
            high: 0.0,
            low: 0.0,
            vol: MIN_VOLUME,
        }
    }
}

impl DriftSource for FixedDrift {
    fn base_drift(&mut self) -> f64 {
        self.base
    }

    fn high_jitter(&mut self) -> f64 {
        self.high
    }

    fn low_jitter(&mut self) -> f64 {
        self.low
    }

    fn volume(&mut self) -> u32 {
        self.vol
    }
}
