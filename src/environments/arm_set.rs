use crate::environments::RewardModel;
use crate::errors::{ Result, SimulationError };
use crate::policies::argmax;
use crate::random_source::RandomSource;

/// Hidden true values of the arms for one run, together with the index of the
/// arm the agent should learn to prefer.
#[derive(PartialEq, Debug, Clone)]
pub struct ArmSet {
    true_values: Vec<f64>,
    optimal_arm: usize,
}

impl ArmSet {
    /// Draws `num_of_arms` fresh true values from the reward model.
    pub fn generate(num_of_arms: usize, model: &RewardModel, rng: &mut RandomSource) -> Self {
        assert!(num_of_arms > 0, "Arm set needs at least one arm!");
        let true_values: Vec<f64> = (0..num_of_arms).map(|_| model.init_arm_value(rng)).collect();
        ArmSet::new(true_values)
    }

    /// Uses caller supplied true values.
    pub fn from_values(true_values: Vec<f64>) -> Result<Self> {
        if true_values.is_empty() {
            return Err(SimulationError::NoArms);
        }
        Ok(ArmSet::new(true_values))
    }

    fn new(true_values: Vec<f64>) -> Self {
        let optimal_arm = argmax(&true_values);
        ArmSet { true_values, optimal_arm }
    }

    pub fn len(&self) -> usize {
        self.true_values.len()
    }

    pub fn true_value(&self, arm: usize) -> f64 {
        self.true_values[arm]
    }

    pub fn true_values(&self) -> &[f64] {
        &self.true_values
    }

    pub fn optimal_arm(&self) -> usize {
        self.optimal_arm
    }
}
