use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::board::Point;

/// Knobs for a single solve. Passed explicitly to every agent; nothing is process-wide.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Emit the per-step narration (board, chosen cell, reason) as `info` events.
    pub verbose: bool,
    /// Seed for every random choice. `None` seeds from the OS.
    pub rng_seed: Option<u64>,
    /// The cell revealed unconditionally on the first move.
    pub first_move: Point,
    /// Wall-clock budget for drawing models in one estimation.
    pub sample_time_cap: Duration,
    /// Upper bound on distinct models drawn in one estimation.
    pub max_samples: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            verbose: false,
            rng_seed: None,
            first_move: Point::new(0, 0),
            sample_time_cap: Duration::from_millis(50),
            max_samples: 10_000,
        }
    }
}

impl Config {
    pub fn seeded(seed: u64) -> Self {
        Config {
            rng_seed: Some(seed),
            ..Config::default()
        }
    }

    pub fn rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = Config::seeded(7);
        let mut first = config.rng();
        let mut second = config.rng();
        let a: Vec<u32> = (0..4).map(|_| first.random()).collect();
        let b: Vec<u32> = (0..4).map(|_| second.random()).collect();
        assert_eq!(a, b);
    }
}
