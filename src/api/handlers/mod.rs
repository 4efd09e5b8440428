pub mod aggregated;
pub mod analytics;
pub mod chains;
pub mod data;
pub mod fees;
pub mod health;
pub mod metrics;
pub mod protocols;
pub mod staking;
