pub mod arm_set;
pub mod reward_model;

pub use arm_set::ArmSet;
pub use reward_model::{ RewardDistribution, RewardModel };
