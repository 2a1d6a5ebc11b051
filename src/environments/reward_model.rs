use std::fmt;

use crate::errors::{ Result, SimulationError };
use crate::random_source::RandomSource;

/// Distribution family of the arms. Gaussian arms have a normally distributed
/// true value and pay that value plus unit normal noise. Bernoulli arms have a
/// success probability and pay 1.0 on success and 0.0 otherwise.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum RewardDistribution {
    Gaussian,
    Bernoulli,
}

impl TryFrom<u8> for RewardDistribution {
    type Error = SimulationError;

    fn try_from(mode: u8) -> Result<Self> {
        match mode {
            0 => Ok(RewardDistribution::Gaussian),
            1 => Ok(RewardDistribution::Bernoulli),
            other =>
                Err(
                    SimulationError::invalid_parameter(
                        format!("value distribution must be 0 (Gaussian) or 1 (Bernoulli), got {other}")
                    )
                ),
        }
    }
}

impl fmt::Display for RewardDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewardDistribution::Gaussian => write!(f, "gaussian"),
            RewardDistribution::Bernoulli => write!(f, "bernoulli"),
        }
    }
}

/// Generates hidden arm values and samples the rewards observed when an arm
/// is pulled.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct RewardModel {
    distribution: RewardDistribution,
}

impl RewardModel {
    pub fn new(distribution: RewardDistribution) -> Self {
        RewardModel { distribution }
    }

    /// Draws the true value of one arm for a fresh run.
    pub fn init_arm_value(&self, rng: &mut RandomSource) -> f64 {
        match self.distribution {
            RewardDistribution::Gaussian => rng.standard_normal(),
            RewardDistribution::Bernoulli => rng.uniform(0.0, 1.0),
        }
    }

    /// Samples the reward of pulling an arm with the given true value.
    pub fn sample_reward(&self, true_value: f64, rng: &mut RandomSource) -> f64 {
        match self.distribution {
            RewardDistribution::Gaussian => true_value + rng.standard_normal(),
            RewardDistribution::Bernoulli => {
                if rng.uniform(0.0, 1.0) < true_value { 1.0 } else { 0.0 }
            }
        }
    }

    /// Checks that a caller supplied true value can be used with this model.
    pub fn validate_arm_value(&self, value: f64) -> Result<()> {
        match self.distribution {
            RewardDistribution::Gaussian if !value.is_finite() => {
                Err(SimulationError::invalid_parameter(format!("arm value must be finite, got {value}")))
            }
            RewardDistribution::Bernoulli if !(0.0..=1.0).contains(&value) => {
                Err(
                    SimulationError::invalid_parameter(
                        format!("Bernoulli arm value must be in the range [0, 1], got {value}")
                    )
                )
            }
            _ => Ok(()),
        }
    }
}
