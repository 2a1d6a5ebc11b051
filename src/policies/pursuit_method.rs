use tracing::trace;

use crate::constants::PROBABILITY_TOLERANCE;
use crate::policies::{ argmax, sample_by_weight, Policy };
use crate::random_source::RandomSource;

/// Pursuit method. Estimates action values by sample averages like epsilon
/// greedy, but acts through an explicit probability vector that is pushed a
/// little toward the currently greedy arm after every reward.
#[derive(PartialEq, Debug, Clone)]
pub struct PursuitMethod {
    /// Fraction of the remaining probability mass moved to the greedy arm.
    beta: f64,
    q_values: Vec<f64>,
    num_times_arm_selected: Vec<usize>,
    probabilities: Vec<f64>,
}

impl PursuitMethod {
    pub fn new(beta: f64) -> Self {
        assert!((0.0..=1.0).contains(&beta), "Beta must be in the range [0, 1].");
        PursuitMethod {
            beta,
            q_values: Vec::new(),
            num_times_arm_selected: Vec::new(),
            probabilities: Vec::new(),
        }
    }

    fn pursue_greedy_action(&mut self) {
        let greedy = argmax(&self.q_values);
        for (action, probability) in self.probabilities.iter_mut().enumerate() {
            if action == greedy {
                *probability += self.beta * (1.0 - *probability);
            } else {
                *probability -= self.beta * *probability;
            }
        }
        debug_assert!(
            (self.probabilities.iter().sum::<f64>() - 1.0).abs() < PROBABILITY_TOLERANCE,
            "Pursuit probabilities no longer sum to one: {:?}",
            self.probabilities
        );
    }
}

impl Policy for PursuitMethod {
    fn reset(&mut self, num_of_arms: usize) {
        self.q_values = vec![0.0; num_of_arms];
        self.num_times_arm_selected = vec![0; num_of_arms];
        self.probabilities = vec![1.0 / (num_of_arms as f64); num_of_arms];
    }

    fn select_action(&mut self, rng: &mut RandomSource) -> usize {
        sample_by_weight(&self.probabilities, rng)
    }

    fn update(&mut self, action: usize, reward: f64, step: usize) {
        self.num_times_arm_selected[action] += 1;
        let alpha = 1.0 / (self.num_times_arm_selected[action] as f64);
        self.q_values[action] += alpha * (reward - self.q_values[action]);
        self.pursue_greedy_action();

        trace!(step, action, reward, q_value = self.q_values[action], "pursuit method update");
    }

    fn name(&self) -> &'static str {
        "pursuit_method"
    }
}
