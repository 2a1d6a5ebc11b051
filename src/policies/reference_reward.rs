use std::fmt;

/// Rule used to move the reference reward toward the latest reward.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ReferenceUpdate {
    /// `R̄ += rate * (reward - R̄)` with a constant rate.
    ExponentialAverage,
    /// `R̄ += (reward - R̄) / (t + 1)` where `t` is the 0-based step of the run.
    SampleMean,
}

impl fmt::Display for ReferenceUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceUpdate::ExponentialAverage => write!(f, "ema"),
            ReferenceUpdate::SampleMean => write!(f, "sample-mean"),
        }
    }
}

/// Running baseline reward the advantage of each new reward is measured
/// against.
#[derive(PartialEq, Debug, Clone)]
pub struct ReferenceReward {
    rule: ReferenceUpdate,
    rate: f64,
    value: f64,
}

impl ReferenceReward {
    /// `rate` is only read by the exponential average rule.
    pub fn new(rule: ReferenceUpdate, rate: f64) -> Self {
        ReferenceReward { rule, rate, value: 0.0 }
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Folds `reward` observed at `step` into the baseline and returns the
    /// updated value.
    pub fn update(&mut self, reward: f64, step: usize) -> f64 {
        let step_size = match self.rule {
            ReferenceUpdate::ExponentialAverage => self.rate,
            ReferenceUpdate::SampleMean => 1.0 / ((step + 1) as f64),
        };
        self.value += step_size * (reward - self.value);
        self.value
    }
}
