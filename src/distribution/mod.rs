//! Discrete exponential score distribution
//!
//! Scores are drawn by inverse transform: a uniform draw `u` in (0, 1] maps
//! to the continuous exponential `x = -mean * ln(u)`, which is discretized as
//! `floor(x) + 1` so the smallest score is 1.
//!
//! The odds helpers answer "how lucky was that":
//! - [`ScoreDistribution::probability_of`] is the survival probability
//!   `exp(-x / mean)`, the headline "chance of beating this".
//! - [`ScoreDistribution::rarity_of`] is its reciprocal, "1 in N".
//! - [`ScoreDistribution::pinpoint_rarity_of`] is the reciprocal of the exact
//!   mass of landing on `x`.

mod source;

pub use source::{PcgSource, RandomSource, ScriptedSource};

use crate::error::{GameError, GameResult};

/// Default mean of the distribution
pub const DEFAULT_MEAN: i64 = 50;

/// Smallest positive double; stands in for a zero draw so `ln` stays finite
const SMALLEST_POSITIVE: f64 = f64::from_bits(1);

/// Map a uniform draw in (0, 1] to a score (always >= 1)
pub fn score_from_uniform(mean: i64, u: f64) -> i64 {
    let u = u.clamp(SMALLEST_POSITIVE, 1.0);
    let x = -(mean as f64) * u.ln();
    // `as` saturates for huge means; the +1 must not wrap past it
    (x.floor() as i64).saturating_add(1)
}

/// A draw that maps back to `score`: the midpoint of its bucket
pub fn uniform_for_score(mean: i64, score: i64) -> f64 {
    let x = (score.max(1) - 1) as f64 + 0.5;
    (-x / mean as f64).exp()
}

/// Score sampler plus the odds math for a fixed mean
pub struct ScoreDistribution {
    mean: i64,
    source: Box<dyn RandomSource>,
}

impl ScoreDistribution {
    /// Create a distribution; `mean` must be positive
    pub fn new(mean: i64, source: Box<dyn RandomSource>) -> GameResult<Self> {
        if mean <= 0 {
            return Err(GameError::Configuration(format!(
                "distribution mean must be positive, got {}",
                mean
            )));
        }
        Ok(Self { mean, source })
    }

    /// Distribution with an OS-seeded PCG source
    pub fn with_mean(mean: i64) -> GameResult<Self> {
        Self::new(mean, Box::new(PcgSource::from_os()))
    }

    pub fn mean(&self) -> i64 {
        self.mean
    }

    /// Draw the next score
    pub fn sample(&mut self) -> i64 {
        let u = self.source.next_uniform();
        score_from_uniform(self.mean, u)
    }

    /// P(X >= x) of the underlying continuous distribution
    pub fn probability_of(&self, x: i64) -> f64 {
        (-(x as f64) / self.mean as f64).exp()
    }

    /// "1 in N" framing of [`Self::probability_of`]
    pub fn rarity_of(&self, x: i64) -> i64 {
        // `as` saturates, so huge scores pin to i64::MAX
        ((x as f64) / self.mean as f64).exp().floor() as i64
    }

    /// Reciprocal of the probability of landing on exactly `x`
    pub fn pinpoint_rarity_of(&self, x: i64) -> i64 {
        let mean = self.mean as f64;
        let upper = (-(x.saturating_sub(1) as f64) / mean).exp();
        let lower = (-(x as f64) / mean).exp();
        (1.0 / (upper - lower)) as i64
    }

    /// Percentage shown when the rarity is 1 (likelier than even odds)
    pub fn percent_of(&self, x: i64) -> i64 {
        (self.probability_of(x) * 100.0).round() as i64
    }
}

impl std::fmt::Debug for ScoreDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreDistribution")
            .field("mean", &self.mean)
            .finish_non_exhaustive()
    }
}
