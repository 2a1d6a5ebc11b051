/// Represents the number of independent runs averaged together in one experiment.
pub const NUM_OF_RUNS: usize = 5000;
/// Represents the number of steps (pulls) taken in one run.
pub const NUM_OF_STEPS: usize = 1000;
/// Default value of the first algorithm parameter. Used as epsilon by the
/// epsilon greedy policy, as the reference reward rate by reinforcement
/// comparison, as the shift rate by the pursuit method and as the step size by
/// stochastic gradient ascent.
pub const DEFAULT_ALPHA: f64 = 0.05;
/// Default value of the second algorithm parameter. Only reinforcement
/// comparison reads it, as the preference learning rate.
pub const DEFAULT_BETA: f64 = 0.1;
/// Number of runs accumulated together by one worker before partial results
/// are merged. Fixed so that parallel and sequential execution sum the same
/// values in the same order.
pub const RUNS_PER_CHUNK: usize = 64;
/// Tolerance used when checking that a probability vector sums to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;
/// Directory used for statistics files when none is given.
pub const BASE_DIRECTORY: &str = "files";
