use tracing::trace;

use crate::policies::{ argmax, Policy };
use crate::random_source::RandomSource;

/// Action value method. Keeps a sample average estimate of every arm and acts
/// greedily on it, except that with probability epsilon a uniformly random arm
/// is explored instead.
#[derive(PartialEq, Debug, Clone)]
pub struct EpsilonGreedy {
    /// Should be in range: 0 <= epsilon <= 1
    /// If epsilon = 0, greedy action is always taken. If epsilon = 1, random
    /// action is always taken.
    epsilon: f64,
    /// What the agent has learned about each arm. Index is the arm, value is
    /// the sample average of the rewards received from it.
    q_values: Vec<f64>,
    /// Number of times each arm was pulled in the current run.
    num_times_arm_selected: Vec<usize>,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f64) -> Self {
        assert!((0.0..=1.0).contains(&epsilon), "Epsilon must be in the range [0, 1].");
        EpsilonGreedy {
            epsilon,
            q_values: Vec::new(),
            num_times_arm_selected: Vec::new(),
        }
    }

    fn random_action_selection_policy(&self, rng: &mut RandomSource) -> usize {
        rng.uniform_index(self.q_values.len())
    }

    fn greedy_action_selection_policy(&self) -> usize {
        argmax(&self.q_values)
    }
}

impl Policy for EpsilonGreedy {
    fn reset(&mut self, num_of_arms: usize) {
        self.q_values = vec![0.0; num_of_arms];
        self.num_times_arm_selected = vec![0; num_of_arms];
    }

    fn select_action(&mut self, rng: &mut RandomSource) -> usize {
        if rng.uniform(0.0, 1.0) < self.epsilon {
            return self.random_action_selection_policy(rng);
        }
        self.greedy_action_selection_policy()
    }

    /// Sample average update of the pulled arm.
    fn update(&mut self, action: usize, reward: f64, step: usize) {
        self.num_times_arm_selected[action] += 1;
        let alpha = 1.0 / (self.num_times_arm_selected[action] as f64);
        self.q_values[action] += alpha * (reward - self.q_values[action]);

        trace!(step, action, reward, q_value = self.q_values[action], "epsilon greedy update");
    }

    fn name(&self) -> &'static str {
        "epsilon_greedy"
    }
}
