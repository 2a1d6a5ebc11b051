use std::io::{ self, BufWriter };
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ ArgAction, Parser, ValueEnum };
use tracing_subscriber::EnvFilter;

use k_armed_bandit_simulation::constants::{
    BASE_DIRECTORY,
    DEFAULT_ALPHA,
    DEFAULT_BETA,
    NUM_OF_RUNS,
    NUM_OF_STEPS,
};
use k_armed_bandit_simulation::{
    PolicyConfig,
    ReferenceUpdate,
    Result,
    RewardDistribution,
    SimulationConfig,
    SimulationRunner,
};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ReferenceArg {
    /// Fixed rate exponential moving average
    #[value(alias = "exponential")]
    Ema,
    /// Running sample mean over the steps of a run
    #[value(alias = "mean")]
    SampleMean,
}

impl From<ReferenceArg> for ReferenceUpdate {
    fn from(arg: ReferenceArg) -> Self {
        match arg {
            ReferenceArg::Ema => ReferenceUpdate::ExponentialAverage,
            ReferenceArg::SampleMean => ReferenceUpdate::SampleMean,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "bandit",
    author,
    version,
    about = "Simulates the k-armed bandit problem and prints per-step mean reward and optimal action fraction as CSV",
    long_about = None
)]
struct Args {
    /// Number of arms
    #[arg(value_name = "K-ARMS", value_parser = clap::value_parser!(u32).range(1..))]
    arms: u32,

    /// Value distribution: Gaussian: 0 - Bernoulli: 1
    #[arg(value_name = "DISTRIBUTION", value_parser = clap::value_parser!(u8).range(0..=1))]
    distribution: u8,

    /// Algorithm: Epsilon Greedy: 0 - Reinforcement Comparison: 1 - Pursuit Method: 2 - Stochastic Gradient Ascent: 3
    #[arg(value_name = "ALGORITHM", value_parser = clap::value_parser!(u8).range(0..=3))]
    algorithm: u8,

    /// Epsilon, reference reward rate, pursuit rate or gradient step size depending on the algorithm.
    /// Gradient ascent with the ema reference rule also uses its step size as the reference rate
    #[arg(value_name = "PARAM_1", default_value_t = DEFAULT_ALPHA, allow_negative_numbers = true)]
    alpha: f64,

    /// Preference learning rate of reinforcement comparison
    #[arg(value_name = "PARAM_2", default_value_t = DEFAULT_BETA, allow_negative_numbers = true)]
    beta: f64,

    /// Number of independent runs
    #[arg(short = 'n', long, default_value_t = NUM_OF_RUNS)]
    runs: usize,

    /// Number of steps in each run
    #[arg(short = 't', long, default_value_t = NUM_OF_STEPS)]
    steps: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Reference reward rule of reinforcement comparison and gradient ascent
    #[arg(long, value_enum)]
    reference_update: Option<ReferenceArg>,

    /// Fixed true values of the arms, comma separated, reused by every run
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    arm_values: Option<Vec<f64>>,

    /// Spread runs over all cores
    #[arg(long)]
    parallel: bool,

    /// Also save the results and a per-run summary into timestamped files in this directory
    #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = BASE_DIRECTORY)]
    output_dir: Option<PathBuf>,

    /// Log progress to standard error, repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn build_config(args: &Args) -> Result<SimulationConfig> {
    let distribution = RewardDistribution::try_from(args.distribution)?;
    let policy = PolicyConfig::from_algorithm(
        args.algorithm,
        args.alpha,
        args.beta,
        args.reference_update.map(ReferenceUpdate::from)
    )?;

    Ok(SimulationConfig {
        num_of_arms: args.arms as usize,
        num_of_steps: args.steps,
        num_of_runs: args.runs,
        distribution,
        policy,
        seed: args.seed,
        arm_values: args.arm_values.clone(),
        parallel: args.parallel,
    })
}

fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;
    let report = SimulationRunner::new(config)?.run().finalize()?;

    let stdout = io::stdout();
    let mut output = BufWriter::new(stdout.lock());
    report.write_csv(&mut output)?;

    if let Some(directory) = &args.output_dir {
        report.write_statistics(directory)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
