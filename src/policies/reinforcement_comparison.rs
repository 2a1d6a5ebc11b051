use tracing::trace;

use crate::policies::{ sample_by_weight, softmax_into, Policy, ReferenceReward, ReferenceUpdate };
use crate::random_source::RandomSource;

/// Reinforcement comparison. Keeps one preference per arm and picks arms with
/// softmax probabilities over the preferences. A reward above the reference
/// reward raises the preference of the pulled arm, a reward below lowers it.
#[derive(PartialEq, Debug, Clone)]
pub struct ReinforcementComparison {
    /// Preference learning rate.
    beta: f64,
    preferences: Vec<f64>,
    /// Scratch buffer for the softmax of the preferences.
    probabilities: Vec<f64>,
    reference: ReferenceReward,
}

impl ReinforcementComparison {
    /// `alpha` is the rate of the reference reward (read by the exponential
    /// average rule only), `beta` the preference learning rate.
    pub fn new(alpha: f64, beta: f64, reference: ReferenceUpdate) -> Self {
        ReinforcementComparison {
            beta,
            preferences: Vec::new(),
            probabilities: Vec::new(),
            reference: ReferenceReward::new(reference, alpha),
        }
    }

    pub fn reference_reward(&self) -> f64 {
        self.reference.value()
    }
}

impl Policy for ReinforcementComparison {
    fn reset(&mut self, num_of_arms: usize) {
        self.preferences = vec![1.0 / (num_of_arms as f64); num_of_arms];
        self.probabilities = vec![0.0; num_of_arms];
        self.reference.reset();
    }

    fn select_action(&mut self, rng: &mut RandomSource) -> usize {
        softmax_into(&self.preferences, &mut self.probabilities);
        sample_by_weight(&self.probabilities, rng)
    }

    fn update(&mut self, action: usize, reward: f64, step: usize) {
        let reference = self.reference.update(reward, step);
        self.preferences[action] += self.beta * (reward - reference);

        trace!(
            step,
            action,
            reward,
            reference,
            preference = self.preferences[action],
            "reinforcement comparison update"
        );
    }

    fn name(&self) -> &'static str {
        "reinforcement_comparison"
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reset_gives_uniform_preferences() {
        let mut policy = ReinforcementComparison::new(0.05, 0.1, ReferenceUpdate::ExponentialAverage);
        policy.reset(4);

        assert_eq!(policy.preferences, vec![0.25; 4]);
        assert_eq!(policy.reference_reward(), 0.0);
    }

    #[test]
    fn test_update_with_exponential_reference() {
        let mut policy = ReinforcementComparison::new(0.5, 0.1, ReferenceUpdate::ExponentialAverage);
        policy.reset(2);

        policy.update(0, 1.0, 0);
        // reference moves first: 0 + 0.5 * (1 - 0) = 0.5
        assert_relative_eq!(policy.reference_reward(), 0.5);
        assert_relative_eq!(policy.preferences[0], 0.5 + 0.1 * 0.5);
        assert_relative_eq!(policy.preferences[1], 0.5);

        policy.update(1, 0.0, 1);
        assert_relative_eq!(policy.reference_reward(), 0.25);
        assert_relative_eq!(policy.preferences[1], 0.5 - 0.1 * 0.25);
    }

    #[test]
    fn test_update_with_sample_mean_reference() {
        let mut policy = ReinforcementComparison::new(0.5, 1.0, ReferenceUpdate::SampleMean);
        policy.reset(2);

        policy.update(0, 2.0, 0);
        assert_relative_eq!(policy.reference_reward(), 2.0);
        assert_relative_eq!(policy.preferences[0], 0.5);

        policy.update(0, 4.0, 1);
        assert_relative_eq!(policy.reference_reward(), 3.0);
        assert_relative_eq!(policy.preferences[0], 1.5);
    }

    #[test]
    fn test_strong_preference_dominates_selection() {
        let mut policy = ReinforcementComparison::new(0.05, 0.1, ReferenceUpdate::ExponentialAverage);
        let mut rng = RandomSource::new(Some(9));
        policy.reset(3);
        policy.preferences[2] = 50.0;

        for _ in 0..100 {
            assert_eq!(policy.select_action(&mut rng), 2);
        }
    }

    #[test]
    fn test_learns_better_arm() {
        let mut policy = ReinforcementComparison::new(0.1, 0.1, ReferenceUpdate::ExponentialAverage);
        let mut rng = RandomSource::new(Some(21));
        policy.reset(2);

        for step in 0..2000 {
            let action = policy.select_action(&mut rng);
            let reward = if action == 1 { 1.0 } else { 0.0 };
            policy.update(action, reward, step);
        }

        assert!(policy.preferences[1] > policy.preferences[0]);
    }

    #[test]
    fn test_largest_reference_rate_keeps_state_finite() {
        let mut policy = ReinforcementComparison::new(1.0, 0.1, ReferenceUpdate::ExponentialAverage);
        let mut rng = RandomSource::new(Some(13));
        policy.reset(3);

        for step in 0..2000 {
            let action = policy.select_action(&mut rng);
            let reward = (action as f64) + rng.standard_normal();
            policy.update(action, reward, step);
        }

        assert!(policy.reference_reward().is_finite());
        assert!(policy.preferences.iter().all(|preference| preference.is_finite()));
        assert_relative_eq!(policy.probabilities.iter().sum::<f64>(), 1.0, epsilon = 1e-4);
    }
}
