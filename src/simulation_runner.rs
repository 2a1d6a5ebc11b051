use rayon::prelude::*;
use std::time::Instant;
use tracing::{ debug, info };

use crate::constants::{ DEFAULT_ALPHA, NUM_OF_RUNS, NUM_OF_STEPS, RUNS_PER_CHUNK };
use crate::environments::{ ArmSet, RewardDistribution, RewardModel };
use crate::errors::{ Result, SimulationError };
use crate::policies::{ Policy, PolicyConfig };
use crate::random_source::RandomSource;
use crate::statistics_calculator::StatisticsCalculator;

/// Everything needed to run one experiment.
#[derive(PartialEq, Debug, Clone)]
pub struct SimulationConfig {
    /// Number of arms, the k in k-armed bandit.
    pub num_of_arms: usize,
    /// Number of steps (pulls) in one run.
    pub num_of_steps: usize,
    /// Number of independent runs averaged together.
    pub num_of_runs: usize,
    pub distribution: RewardDistribution,
    pub policy: PolicyConfig,
    /// Base seed. When set, the whole experiment is reproducible.
    pub seed: Option<u64>,
    /// Fixed true values reused by every run instead of drawing fresh ones.
    pub arm_values: Option<Vec<f64>>,
    /// Spread runs over the rayon thread pool.
    pub parallel: bool,
}

impl SimulationConfig {
    /// Config with the default number of runs and steps and the epsilon
    /// greedy policy.
    pub fn new(num_of_arms: usize, distribution: RewardDistribution) -> Self {
        SimulationConfig {
            num_of_arms,
            num_of_steps: NUM_OF_STEPS,
            num_of_runs: NUM_OF_RUNS,
            distribution,
            policy: PolicyConfig::EpsilonGreedy { epsilon: DEFAULT_ALPHA },
            seed: None,
            arm_values: None,
            parallel: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_of_arms == 0 {
            return Err(SimulationError::NoArms);
        }
        if self.num_of_steps == 0 {
            return Err(SimulationError::InvalidStepCount(self.num_of_steps));
        }
        if self.num_of_runs == 0 {
            return Err(SimulationError::InvalidRunCount(self.num_of_runs));
        }
        self.policy.validate()?;

        if let Some(values) = &self.arm_values {
            if values.len() != self.num_of_arms {
                return Err(SimulationError::ArmCountMismatch {
                    expected: self.num_of_arms,
                    got: values.len(),
                });
            }
            let model = RewardModel::new(self.distribution);
            for &value in values {
                model.validate_arm_value(value)?;
            }
        }
        Ok(())
    }
}

/// Actions taken and rewards received during one run.
#[derive(PartialEq, Debug, Clone)]
pub struct RunRecord {
    pub optimal_arm: usize,
    pub actions: Vec<usize>,
    pub rewards: Vec<f64>,
}

impl RunRecord {
    pub fn total_reward(&self) -> f64 {
        self.rewards.iter().sum()
    }

    pub fn optimal_selections(&self) -> usize {
        self.actions
            .iter()
            .filter(|&&action| action == self.optimal_arm)
            .count()
    }
}

/// Plays one run of `num_of_steps` steps. The policy must already be reset
/// for `arms.len()` arms.
pub fn play_run(
    arms: &ArmSet,
    model: &RewardModel,
    policy: &mut dyn Policy,
    rng: &mut RandomSource,
    num_of_steps: usize
) -> RunRecord {
    let mut actions = Vec::with_capacity(num_of_steps);
    let mut rewards = Vec::with_capacity(num_of_steps);

    for step in 0..num_of_steps {
        let action = policy.select_action(rng);
        let reward = model.sample_reward(arms.true_value(action), rng);
        policy.update(action, reward, step);

        actions.push(action);
        rewards.push(reward);
    }

    RunRecord {
        optimal_arm: arms.optimal_arm(),
        actions,
        rewards,
    }
}

/// Drives all runs of an experiment and accumulates their statistics.
pub struct SimulationRunner {
    config: SimulationConfig,
    model: RewardModel,
    fixed_arms: Option<ArmSet>,
}

impl SimulationRunner {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let fixed_arms = match &config.arm_values {
            Some(values) => Some(ArmSet::from_values(values.clone())?),
            None => None,
        };
        Ok(SimulationRunner {
            model: RewardModel::new(config.distribution),
            config,
            fixed_arms,
        })
    }

    /// Runs every run of the experiment. Runs are processed in fixed chunks
    /// whose partial sums are merged in chunk order, so the result does not
    /// depend on whether the chunks ran in parallel.
    pub fn run(&self) -> StatisticsCalculator {
        info!(
            arms = self.config.num_of_arms,
            steps = self.config.num_of_steps,
            runs = self.config.num_of_runs,
            distribution = %self.config.distribution,
            policy = %self.config.policy,
            parallel = self.config.parallel,
            "Running k-armed bandit simulation"
        );
        let start_time = Instant::now();

        let num_of_chunks = self.config.num_of_runs.div_ceil(RUNS_PER_CHUNK);
        let partials: Vec<StatisticsCalculator> = if self.config.parallel {
            (0..num_of_chunks)
                .into_par_iter()
                .map(|chunk| self.run_chunk(chunk))
                .collect()
        } else {
            (0..num_of_chunks).map(|chunk| self.run_chunk(chunk)).collect()
        };

        let mut statistics = StatisticsCalculator::new(self.config.num_of_steps);
        for partial in partials {
            statistics.merge(partial);
        }

        info!(elapsed = ?start_time.elapsed(), "Simulation finished");
        statistics
    }

    fn run_chunk(&self, chunk: usize) -> StatisticsCalculator {
        let first_run = chunk * RUNS_PER_CHUNK;
        let last_run = (first_run + RUNS_PER_CHUNK).min(self.config.num_of_runs);
        let mut statistics = StatisticsCalculator::new(self.config.num_of_steps);

        for run in first_run..last_run {
            let record = self.run_one(run);
            statistics.record_run(&record);
        }
        statistics
    }

    /// Plays run number `run` with fresh arms, a fresh policy and the run's
    /// own random stream.
    pub fn run_one(&self, run: usize) -> RunRecord {
        let mut rng = RandomSource::for_run(self.config.seed, run);
        let arms = match &self.fixed_arms {
            Some(arms) => arms.clone(),
            None => ArmSet::generate(self.config.num_of_arms, &self.model, &mut rng),
        };
        let mut policy = self.config.policy.build();
        policy.reset(arms.len());

        let record = play_run(&arms, &self.model, policy.as_mut(), &mut rng, self.config.num_of_steps);
        debug!(
            run,
            policy = policy.name(),
            optimal_arm = record.optimal_arm,
            total_reward = record.total_reward(),
            optimal_selections = record.optimal_selections(),
            "Run finished"
        );
        record
    }
}
