use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthColor {
    Black,
    Red,
    Yellow,
    Green,
}

impl std::fmt::Display for HealthColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HealthColor::Black => "black",
            HealthColor::Red => "red",
            HealthColor::Yellow => "yellow",
            HealthColor::Green => "green",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidStakingPlatform {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub chain: String,
    pub tvl: f64,
    /// Staked share of the token supply, 0..=1.
    pub staking_ratio: f64,
    /// Liquid value available for exits, USD.
    pub liquidity_depth: f64,
    pub utilization_rate: f64,
    pub average_slippage: f64,
    /// Hours until a withdrawal completes.
    pub withdrawal_time: f64,
    pub health_score: u8,
    pub health_color: HealthColor,
    pub health_intensity: f64,
    pub change24h: f64,
    pub change7d: f64,
}
