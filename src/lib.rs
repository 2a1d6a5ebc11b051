pub mod constants;
pub mod environments;
pub mod errors;
pub mod policies;
pub mod random_source;
pub mod simulation_runner;
pub mod statistics_calculator;

pub use environments::{ ArmSet, RewardDistribution, RewardModel };
pub use errors::{ Result, SimulationError };
pub use policies::{ Policy, PolicyConfig, ReferenceUpdate };
pub use random_source::RandomSource;
pub use simulation_runner::{ play_run, RunRecord, SimulationConfig, SimulationRunner };
pub use statistics_calculator::{ SimulationReport, StatisticsCalculator, StepStatistics };
