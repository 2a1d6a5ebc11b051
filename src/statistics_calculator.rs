use std::{ fs::{ self, File }, path::{ Path, PathBuf } };
use std::io::prelude::*;

use chrono::prelude::*;
use polars::prelude::*;
use tracing::{ debug, info };

use crate::errors::{ Result, SimulationError };
use crate::simulation_runner::RunRecord;

/// Polars truncates printed frames by default. Widen the limits so the whole
/// run summary ends up in the statistics file.
fn set_polars_environment_variables(max_rows: usize) {
    std::env::set_var("POLARS_FMT_MAX_COLS", "16");
    std::env::set_var("POLARS_FMT_MAX_ROWS", max_rows.to_string());
}

fn get_timestamped_file_path(directory: &Path, file_name: &str, extension: &str) -> PathBuf {
    let local: DateTime<Local> = Local::now();
    let datetime_str = local.format("%Y-%m-%d_%H-%M-%S").to_string();
    directory.join(format!("{}_{}.{}", file_name, datetime_str, extension))
}

/// Accumulates per-step and per-run statistics while runs are played.
///
/// `reward_sums[t]` holds the sum over runs of the reward received at step
/// `t` and `optimal_counts[t]` the number of runs that pulled the optimal arm
/// at step `t`. Both are turned into means by [`StatisticsCalculator::finalize`].
#[derive(PartialEq, Debug, Clone)]
pub struct StatisticsCalculator {
    reward_sums: Vec<f64>,
    optimal_counts: Vec<f64>,
    total_reward_per_run: Vec<f64>,
    optimal_selections_per_run: Vec<u64>,
}

impl StatisticsCalculator {
    pub fn new(num_of_steps: usize) -> Self {
        StatisticsCalculator {
            reward_sums: vec![0.0; num_of_steps],
            optimal_counts: vec![0.0; num_of_steps],
            total_reward_per_run: Vec::new(),
            optimal_selections_per_run: Vec::new(),
        }
    }

    pub fn num_of_runs(&self) -> usize {
        self.total_reward_per_run.len()
    }

    pub fn record_run(&mut self, record: &RunRecord) {
        debug_assert_eq!(record.rewards.len(), self.reward_sums.len());
        let mut total_reward = 0.0;
        let mut optimal_selections = 0;

        for (step, (&action, &reward)) in record.actions.iter().zip(&record.rewards).enumerate() {
            self.reward_sums[step] += reward;
            total_reward += reward;
            if action == record.optimal_arm {
                self.optimal_counts[step] += 1.0;
                optimal_selections += 1;
            }
        }

        self.total_reward_per_run.push(total_reward);
        self.optimal_selections_per_run.push(optimal_selections);
    }

    /// Adds the runs accumulated by `other` after the runs already held.
    pub fn merge(&mut self, other: StatisticsCalculator) {
        debug_assert_eq!(self.reward_sums.len(), other.reward_sums.len());
        for (sum, partial) in self.reward_sums.iter_mut().zip(&other.reward_sums) {
            *sum += partial;
        }
        for (count, partial) in self.optimal_counts.iter_mut().zip(&other.optimal_counts) {
            *count += partial;
        }
        self.total_reward_per_run.extend(other.total_reward_per_run);
        self.optimal_selections_per_run.extend(other.optimal_selections_per_run);
    }

    /// Turns the accumulated sums into means and computes the mean and sample
    /// standard deviation of the total reward per run. A single run has a
    /// standard deviation of 0.
    pub fn finalize(mut self) -> Result<SimulationReport> {
        let num_of_runs = self.num_of_runs();
        if num_of_runs == 0 {
            return Err(SimulationError::InvalidRunCount(num_of_runs));
        }
        let n = num_of_runs as f64;

        for sum in self.reward_sums.iter_mut() {
            *sum /= n;
        }
        for count in self.optimal_counts.iter_mut() {
            *count /= n;
        }

        let mean_total_reward = self.total_reward_per_run.iter().sum::<f64>() / n;
        let std_total_reward = if num_of_runs > 1 {
            let squared_deviations: f64 = self.total_reward_per_run
                .iter()
                .map(|total| (total - mean_total_reward).powi(2))
                .sum();
            (squared_deviations / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        let steps = self.reward_sums
            .iter()
            .zip(&self.optimal_counts)
            .map(|(&mean_reward, &optimal_fraction)| StepStatistics { mean_reward, optimal_fraction })
            .collect();

        debug!(num_of_runs, mean_total_reward, std_total_reward, "Statistics finalized");

        Ok(SimulationReport {
            steps,
            mean_total_reward,
            std_total_reward,
            total_reward_per_run: self.total_reward_per_run,
            optimal_selections_per_run: self.optimal_selections_per_run,
        })
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct StepStatistics {
    /// Reward at this step averaged over runs.
    pub mean_reward: f64,
    /// Fraction of runs that pulled the optimal arm at this step.
    pub optimal_fraction: f64,
}

/// Final result of an experiment.
#[derive(PartialEq, Debug, Clone)]
pub struct SimulationReport {
    pub steps: Vec<StepStatistics>,
    pub mean_total_reward: f64,
    pub std_total_reward: f64,
    pub total_reward_per_run: Vec<f64>,
    pub optimal_selections_per_run: Vec<u64>,
}

impl SimulationReport {
    /// One `mean_reward,optimal_fraction` line per step followed by a
    /// `mean_total_reward,std_total_reward` line.
    pub fn csv_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.steps
            .iter()
            .map(|step| format!("{:.6},{:.6}", step.mean_reward, step.optimal_fraction))
            .collect();
        lines.push(format!("{:.6},{:.6}", self.mean_total_reward, self.std_total_reward));
        lines
    }

    pub fn write_csv<W: Write>(&self, output: &mut W) -> Result<()> {
        for line in self.csv_lines() {
            writeln!(output, "{}", line)?;
        }
        output.flush()?;
        Ok(())
    }

    /// One row per run with its total reward and number of optimal pulls,
    /// plus the per-step averages of both.
    pub fn run_summary_df(&self) -> Result<DataFrame> {
        let num_of_steps = self.steps.len() as f64;
        let df = DataFrame::new(
            vec![
                Series::new("run", Vec::from_iter(0..self.total_reward_per_run.len() as u64)),
                Series::new("total_reward", &self.total_reward_per_run),
                Series::new("optimal_selections", &self.optimal_selections_per_run)
            ]
        )?;

        let df = df
            .lazy()
            .with_column((col("total_reward") / lit(num_of_steps)).alias("mean_reward"))
            .with_column(
                (col("optimal_selections").cast(DataType::Float64) / lit(num_of_steps)).alias(
                    "optimal_fraction"
                )
            )
            .collect()?;
        Ok(df)
    }

    fn get_summary_lines(&self) -> Result<Vec<String>> {
        let df = self.run_summary_df()?;
        let mut lines: Vec<String> = Vec::new();

        lines.push("### Statistics for all the runs ###".to_string());
        lines.push(
            format!(
                "Ran {} runs, with {} steps in each",
                self.total_reward_per_run.len(),
                self.steps.len()
            )
        );
        lines.push(
            format!(
                "Mean total reward: {} \t Standard deviation: {}",
                self.mean_total_reward,
                self.std_total_reward
            )
        );
        lines.push(format!("{:?}", df));
        Ok(lines)
    }

    /// Writes the CSV stream and the run summary into timestamped files in
    /// `directory`, creating it when missing. Returns both paths.
    pub fn write_statistics(&self, directory: &Path) -> Result<(PathBuf, PathBuf)> {
        if !directory.is_dir() {
            fs::create_dir_all(directory)?;
            info!(directory = %directory.display(), "Created statistics directory");
        }
        set_polars_environment_variables(self.total_reward_per_run.len());

        let csv_path = get_timestamped_file_path(directory, "run_result", "csv");
        let mut output = File::create(&csv_path)?;
        self.write_csv(&mut output)?;

        let summary_path = get_timestamped_file_path(directory, "run_summary", "txt");
        let mut output = File::create(&summary_path)?;
        for line in self.get_summary_lines()? {
            writeln!(output, "{}", line)?;
        }

        info!(csv = %csv_path.display(), summary = %summary_path.display(), "Statistics saved");
        Ok((csv_path, summary_path))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn record(optimal_arm: usize, actions: Vec<usize>, rewards: Vec<f64>) -> RunRecord {
        RunRecord { optimal_arm, actions, rewards }
    }

    fn two_run_statistics() -> StatisticsCalculator {
        let mut statistics = StatisticsCalculator::new(3);
        statistics.record_run(&record(1, vec![0, 1, 1], vec![1.0, 2.0, 3.0]));
        statistics.record_run(&record(1, vec![1, 1, 0], vec![3.0, 4.0, 5.0]));
        statistics
    }

    #[test]
    fn test_record_run_accumulates_series() {
        let statistics = two_run_statistics();

        assert_eq!(statistics.reward_sums, vec![4.0, 6.0, 8.0]);
        assert_eq!(statistics.optimal_counts, vec![1.0, 2.0, 1.0]);
        assert_eq!(statistics.total_reward_per_run, vec![6.0, 12.0]);
        assert_eq!(statistics.optimal_selections_per_run, vec![2, 2]);
    }

    #[test]
    fn test_finalize_computes_means_and_sample_deviation() {
        let report = two_run_statistics().finalize().unwrap();

        assert_eq!(
            report.steps,
            vec![
                StepStatistics { mean_reward: 2.0, optimal_fraction: 0.5 },
                StepStatistics { mean_reward: 3.0, optimal_fraction: 1.0 },
                StepStatistics { mean_reward: 4.0, optimal_fraction: 0.5 }
            ]
        );
        assert_relative_eq!(report.mean_total_reward, 9.0);
        // deviations of 3 from the mean, divided by n - 1 = 1
        assert_relative_eq!(report.std_total_reward, (18.0_f64).sqrt());
    }

    #[test]
    fn test_finalize_with_single_run_does_not_divide_by_zero() {
        let mut statistics = StatisticsCalculator::new(1);
        statistics.record_run(&record(0, vec![0], vec![0.7]));

        let report = statistics.finalize().unwrap();

        assert_relative_eq!(report.mean_total_reward, 0.7);
        assert_eq!(report.std_total_reward, 0.0);
    }

    #[test]
    fn test_finalize_without_runs_is_rejected() {
        let statistics = StatisticsCalculator::new(5);
        assert!(matches!(statistics.finalize(), Err(SimulationError::InvalidRunCount(0))));
    }

    #[test]
    fn test_merge_matches_recording_in_one_place() {
        let mut first = StatisticsCalculator::new(3);
        first.record_run(&record(1, vec![0, 1, 1], vec![1.0, 2.0, 3.0]));
        let mut second = StatisticsCalculator::new(3);
        second.record_run(&record(1, vec![1, 1, 0], vec![3.0, 4.0, 5.0]));

        first.merge(second);

        assert_eq!(first, two_run_statistics());
    }

    #[test]
    fn test_csv_lines() {
        let report = two_run_statistics().finalize().unwrap();

        let lines = report.csv_lines();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "2.000000,0.500000");
        assert_eq!(lines[1], "3.000000,1.000000");
        assert_eq!(lines[2], "4.000000,0.500000");
        assert!(lines[3].starts_with("9.000000,4.24264"));
    }

    #[test]
    fn test_write_csv() {
        let report = two_run_statistics().finalize().unwrap();
        let mut output: Vec<u8> = Vec::new();

        report.write_csv(&mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with("2.000000,0.500000\n"));
    }

    #[test]
    fn test_run_summary_df() {
        let report = two_run_statistics().finalize().unwrap();

        let df = report.run_summary_df().unwrap();

        assert_eq!(df.shape(), (2, 5));
        let mean_rewards: Vec<f64> = df
            .column("mean_reward")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .map(|value| value.unwrap_or(f64::NAN))
            .collect();
        assert_relative_eq!(mean_rewards[0], 2.0);
        assert_relative_eq!(mean_rewards[1], 4.0);
    }

    #[test]
    fn test_get_timestamped_file_path() {
        let directory = Path::new("test_directory");

        let path = get_timestamped_file_path(directory, "test_file", "csv");

        assert_eq!(path.parent(), Some(directory));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("test_file_"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn test_write_statistics_creates_files() {
        let directory = std::env::temp_dir().join("k_armed_bandit_statistics_test");
        let report = two_run_statistics().finalize().unwrap();

        let (csv_path, summary_path) = report.write_statistics(&directory).unwrap();

        assert!(csv_path.exists());
        assert!(summary_path.exists());
        let csv = fs::read_to_string(&csv_path).unwrap();
        assert_eq!(csv.lines().collect::<Vec<_>>(), report.csv_lines());

        // Clean up
        fs::remove_dir_all(&directory).unwrap();
    }
}
