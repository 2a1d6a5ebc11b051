use tracing::trace;

use crate::policies::{ sample_by_weight, softmax_into, Policy, ReferenceReward, ReferenceUpdate };
use crate::random_source::RandomSource;

/// Gradient bandit. Performs stochastic gradient ascent on the expected
/// reward with respect to per-arm preferences, acting through the softmax of
/// those preferences.
#[derive(PartialEq, Debug, Clone)]
pub struct StochasticGradientAscent {
    /// Step size of the preference update.
    alpha: f64,
    preferences: Vec<f64>,
    /// Softmax of `preferences`, refreshed before every selection.
    probabilities: Vec<f64>,
    reference: ReferenceReward,
}

impl StochasticGradientAscent {
    /// `alpha` is the preference step size. The exponential average reference
    /// rule moves the reference reward at the same rate.
    pub fn new(alpha: f64, reference: ReferenceUpdate) -> Self {
        StochasticGradientAscent {
            alpha,
            preferences: Vec::new(),
            probabilities: Vec::new(),
            reference: ReferenceReward::new(reference, alpha),
        }
    }
}

impl Policy for StochasticGradientAscent {
    fn reset(&mut self, num_of_arms: usize) {
        self.preferences = vec![0.0; num_of_arms];
        self.probabilities = vec![1.0 / (num_of_arms as f64); num_of_arms];
        self.reference.reset();
    }

    fn select_action(&mut self, rng: &mut RandomSource) -> usize {
        softmax_into(&self.preferences, &mut self.probabilities);
        sample_by_weight(&self.probabilities, rng)
    }

    /// Uses the probabilities the action was sampled from.
    fn update(&mut self, action: usize, reward: f64, step: usize) {
        let reference = self.reference.update(reward, step);
        let advantage = reward - reference;

        for (arm, (preference, &probability)) in self.preferences
            .iter_mut()
            .zip(&self.probabilities)
            .enumerate() {
            if arm == action {
                *preference += self.alpha * advantage * (1.0 - probability);
            } else {
                *preference -= self.alpha * advantage * probability;
            }
        }

        trace!(step, action, reward, reference, "gradient ascent update");
    }

    fn name(&self) -> &'static str {
        "stochastic_gradient_ascent"
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reset_initialises_preferences_to_zero() {
        let mut policy = StochasticGradientAscent::new(0.1, ReferenceUpdate::SampleMean);
        policy.reset(4);

        assert_eq!(policy.preferences, vec![0.0; 4]);
        assert_eq!(policy.probabilities, vec![0.25; 4]);
    }

    #[test]
    fn test_first_update_with_sample_mean_reference_has_no_advantage() {
        let mut policy = StochasticGradientAscent::new(0.1, ReferenceUpdate::SampleMean);
        let mut rng = RandomSource::new(Some(2));
        policy.reset(3);

        let action = policy.select_action(&mut rng);
        policy.update(action, 5.0, 0);

        // the reference equals the only reward seen so far
        assert_eq!(policy.preferences, vec![0.0; 3]);
    }

    #[test]
    fn test_gradient_update() {
        let mut policy = StochasticGradientAscent::new(0.5, ReferenceUpdate::ExponentialAverage);
        let mut rng = RandomSource::new(Some(2));
        policy.reset(2);
        policy.select_action(&mut rng);

        policy.update(0, 2.0, 0);

        // reference moves at the step size: 0 + 0.5 * 2 = 1, advantage 1,
        // probabilities 0.5 each
        assert_relative_eq!(policy.reference.value(), 1.0);
        assert_relative_eq!(policy.preferences[0], 0.5 * 1.0 * 0.5);
        assert_relative_eq!(policy.preferences[1], -0.5 * 1.0 * 0.5);
    }

    #[test]
    fn test_probabilities_stay_normalised() {
        let mut policy = StochasticGradientAscent::new(0.1, ReferenceUpdate::SampleMean);
        let mut rng = RandomSource::new(Some(8));
        policy.reset(5);

        for step in 0..5000 {
            let action = policy.select_action(&mut rng);

            assert!(policy.probabilities.iter().all(|&probability| probability >= 0.0));
            assert_relative_eq!(policy.probabilities.iter().sum::<f64>(), 1.0, epsilon = 1e-4);

            let reward = (action as f64) + rng.standard_normal();
            policy.update(action, reward, step);
        }
    }

    #[test]
    fn test_learns_better_arm() {
        let mut policy = StochasticGradientAscent::new(0.1, ReferenceUpdate::SampleMean);
        let mut rng = RandomSource::new(Some(8));
        policy.reset(3);

        for step in 0..3000 {
            let action = policy.select_action(&mut rng);
            let reward = if action == 2 { 1.0 } else { 0.0 };
            policy.update(action, reward, step);
        }
        policy.select_action(&mut rng);

        assert!(policy.probabilities[2] > 0.8, "Best arm probability: {}", policy.probabilities[2]);
    }
}
