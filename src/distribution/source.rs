//! Uniform random sources

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// Produces uniform draws in (0, 1]
pub trait RandomSource: Send {
    fn next_uniform(&mut self) -> f64;
}

/// PCG-backed source; seed it for reproducible sequences
#[derive(Debug, Clone)]
pub struct PcgSource {
    rng: Pcg64,
}

impl PcgSource {
    /// Seeded from the operating system
    pub fn from_os() -> Self {
        Self {
            rng: Pcg64::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
        }
    }
}

impl RandomSource for PcgSource {
    fn next_uniform(&mut self) -> f64 {
        // random::<f64>() is in [0, 1); flip it into (0, 1]
        1.0 - self.rng.random::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    draws: Vec<f64>,
    next: usize,
}

impl ScriptedSource {
    pub fn new(draws: Vec<f64>) -> Self {
        assert!(!draws.is_empty(), "ScriptedSource needs at least one draw");
        Self { draws, next: 0 }
    }
}

impl RandomSource for ScriptedSource {
    fn next_uniform(&mut self) -> f64 {
        let u = self.draws[self.next % self.draws.len()];
        self.next += 1;
        u
    }
}
