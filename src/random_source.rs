use rand::rngs::StdRng;
use rand::{ Rng, SeedableRng };
use std::f64::consts::PI;

/// Spreads run indices over the seed space so neighbouring runs do not get
/// neighbouring seeds.
const RUN_SEED_MULTIPLIER: u64 = 0x9e37_79b9_7f4a_7c15;

/// Owned source of uniform and standard normal deviates. Every run gets its
/// own instance so runs never share random state.
#[derive(Debug, Clone)]
pub struct RandomSource {
    seed: Option<u64>,
    rng: StdRng,
}

impl RandomSource {
    /// Creates a deterministic stream when a seed is given, otherwise seeds
    /// from system entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RandomSource { seed, rng }
    }

    /// Independent stream for the run with the given index. Two calls with the
    /// same base seed and run index produce the same stream.
    pub fn for_run(seed: Option<u64>, run: usize) -> Self {
        let run_seed = seed.map(|seed| {
            seed.wrapping_add((run as u64).wrapping_add(1).wrapping_mul(RUN_SEED_MULTIPLIER))
        });
        RandomSource::new(run_seed)
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Generates random number in range: [min, max)
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        assert!(min <= max, "Minimum number cannot be bigger than maximum number!");
        min + (max - min) * self.rng.gen::<f64>()
    }

    /// Generates random index in range: [0, len). A draw that rounds up to
    /// `len` is clamped to the last index.
    pub fn uniform_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "Cannot draw an index from an empty range!");
        (self.uniform(0.0, len as f64) as usize).min(len - 1)
    }

    /// Samples the standard normal distribution with the Box-Muller transform.
    pub fn standard_normal(&mut self) -> f64 {
        // u1 lies in (0, 1] so ln(u1) is always defined
        let u1 = 1.0 - self.rng.gen::<f64>();
        let u2 = self.rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }
}
