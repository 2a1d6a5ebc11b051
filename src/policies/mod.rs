pub mod epsilon_greedy;
pub mod gradient_ascent;
pub mod pursuit_method;
pub mod reference_reward;
pub mod reinforcement_comparison;

use std::fmt;

pub use epsilon_greedy::EpsilonGreedy;
pub use gradient_ascent::StochasticGradientAscent;
pub use pursuit_method::PursuitMethod;
pub use reference_reward::{ ReferenceReward, ReferenceUpdate };
pub use reinforcement_comparison::ReinforcementComparison;

use crate::errors::{ Result, SimulationError };
use crate::random_source::RandomSource;

/// Action selection and learning rule of an agent playing one run.
///
/// A policy is reset before every run, asked for one action per step and then
/// told which reward that action produced. No state survives a `reset`.
pub trait Policy: Send {
    /// Reinitialises every per-arm parameter for a fresh run over
    /// `num_of_arms` arms.
    fn reset(&mut self, num_of_arms: usize);

    /// Chooses the arm to pull, an index in `[0, num_of_arms)`.
    fn select_action(&mut self, rng: &mut RandomSource) -> usize;

    /// Learns from the `reward` produced by `action` at the 0-based `step` of
    /// the current run.
    fn update(&mut self, action: usize, reward: f64, step: usize);

    fn name(&self) -> &'static str;
}

/// Policy variant together with its hyperparameters. Cheap to copy, so every
/// run can build its own policy instance from it.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum PolicyConfig {
    EpsilonGreedy {
        epsilon: f64,
    },
    ReinforcementComparison {
        alpha: f64,
        beta: f64,
        reference: ReferenceUpdate,
    },
    PursuitMethod {
        beta: f64,
    },
    StochasticGradientAscent {
        alpha: f64,
        reference: ReferenceUpdate,
    },
}

impl PolicyConfig {
    /// Maps an algorithm id and the two positional parameters onto a policy.
    ///
    /// - 0: epsilon greedy, `alpha` is epsilon
    /// - 1: reinforcement comparison, `alpha` is the reference rate and `beta`
    ///   the preference rate
    /// - 2: pursuit method, `alpha` is the shift rate
    /// - 3: stochastic gradient ascent, `alpha` is the step size and also the
    ///   reference reward rate under the exponential average rule
    ///
    /// `reference` overrides the reference reward rule of the two preference
    /// based policies.
    pub fn from_algorithm(
        algorithm: u8,
        alpha: f64,
        beta: f64,
        reference: Option<ReferenceUpdate>
    ) -> Result<Self> {
        let config = match algorithm {
            0 => PolicyConfig::EpsilonGreedy { epsilon: alpha },
            1 =>
                PolicyConfig::ReinforcementComparison {
                    alpha,
                    beta,
                    reference: reference.unwrap_or(ReferenceUpdate::ExponentialAverage),
                },
            2 => PolicyConfig::PursuitMethod { beta: alpha },
            3 =>
                PolicyConfig::StochasticGradientAscent {
                    alpha,
                    reference: reference.unwrap_or(ReferenceUpdate::SampleMean),
                },
            other => {
                return Err(
                    SimulationError::invalid_parameter(
                        format!("algorithm must be one of 0, 1, 2 or 3, got {other}")
                    )
                );
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            PolicyConfig::EpsilonGreedy { epsilon } => check_unit_interval("epsilon", epsilon),
            PolicyConfig::ReinforcementComparison { alpha, beta, reference } => {
                check_reference_rate(reference, alpha)?;
                check_non_negative("beta", beta)
            }
            PolicyConfig::PursuitMethod { beta } => check_unit_interval("beta", beta),
            PolicyConfig::StochasticGradientAscent { alpha, reference } => {
                check_non_negative("alpha", alpha)?;
                check_reference_rate(reference, alpha)
            }
        }
    }

    /// Creates a fresh, not yet reset policy.
    pub fn build(&self) -> Box<dyn Policy> {
        match *self {
            PolicyConfig::EpsilonGreedy { epsilon } => Box::new(EpsilonGreedy::new(epsilon)),
            PolicyConfig::ReinforcementComparison { alpha, beta, reference } => {
                Box::new(ReinforcementComparison::new(alpha, beta, reference))
            }
            PolicyConfig::PursuitMethod { beta } => Box::new(PursuitMethod::new(beta)),
            PolicyConfig::StochasticGradientAscent { alpha, reference } => {
                Box::new(StochasticGradientAscent::new(alpha, reference))
            }
        }
    }
}

impl fmt::Display for PolicyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyConfig::EpsilonGreedy { epsilon } => write!(f, "epsilon greedy (epsilon={epsilon})"),
            PolicyConfig::ReinforcementComparison { alpha, beta, reference } => {
                write!(f, "reinforcement comparison (alpha={alpha}, beta={beta}, reference={reference})")
            }
            PolicyConfig::PursuitMethod { beta } => write!(f, "pursuit method (beta={beta})"),
            PolicyConfig::StochasticGradientAscent { alpha, reference } => {
                write!(f, "stochastic gradient ascent (alpha={alpha}, reference={reference})")
            }
        }
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimulationError::invalid_parameter(format!("{name} must be in the range [0, 1], got {value}")))
    }
}

fn check_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::invalid_parameter(format!("{name} must be a finite number, got {value}")))
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    check_finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(SimulationError::invalid_parameter(format!("{name} must not be negative, got {value}")))
    }
}

/// A fixed rate outside (0, 1] makes the exponential average overshoot every
/// reward and diverge.
fn check_reference_rate(rule: ReferenceUpdate, rate: f64) -> Result<()> {
    match rule {
        ReferenceUpdate::ExponentialAverage if !(rate > 0.0 && rate <= 1.0) => {
            Err(
                SimulationError::invalid_parameter(
                    format!("reference reward rate must be in the range (0, 1], got {rate}")
                )
            )
        }
        ReferenceUpdate::ExponentialAverage => Ok(()),
        ReferenceUpdate::SampleMean => check_finite("alpha", rate),
    }
}

/// Index of the largest value. Only a strictly greater value replaces the
/// current best, so ties resolve to the lowest index.
pub fn argmax(values: &[f64]) -> usize {
    let mut best_index = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (index, &value) in values.iter().enumerate() {
        if value > best_value {
            best_value = value;
            best_index = index;
        }
    }
    best_index
}

/// Writes the softmax of `preferences` into `probabilities`.
pub fn softmax_into(preferences: &[f64], probabilities: &mut [f64]) {
    debug_assert_eq!(preferences.len(), probabilities.len());
    // shifting by the max keeps exp() finite for large preferences
    let max = preferences.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for (probability, &preference) in probabilities.iter_mut().zip(preferences) {
        *probability = (preference - max).exp();
        sum += *probability;
    }
    for probability in probabilities.iter_mut() {
        *probability /= sum;
    }
}

/// Draws an index with probability proportional to its weight: `x` is drawn
/// from `[0, sum(weights))` and the first index whose running total strictly
/// exceeds `x` is returned. The weights must have a finite positive total.
pub fn sample_by_weight(weights: &[f64], rng: &mut RandomSource) -> usize {
    let total: f64 = weights.iter().sum();
    debug_assert!(total.is_finite() && total > 0.0, "Weights have no usable mass: {weights:?}");

    let x = rng.uniform(0.0, total);
    let mut running = 0.0;
    for (index, &weight) in weights.iter().enumerate() {
        running += weight;
        if running > x {
            return index;
        }
    }
    // rounding left the running total at or below x
    weights
        .iter()
        .rposition(|&weight| weight > 0.0)
        .unwrap_or(weights.len() - 1)
}
