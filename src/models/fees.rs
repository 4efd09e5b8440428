use serde::{Deserialize, Serialize};

/// Fee or revenue totals over the standard windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeFigures {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
    pub cumulative: f64,
}

impl FeeFigures {
    pub fn scaled(&self, share: f64) -> Self {
        Self {
            daily: self.daily * share,
            weekly: self.weekly * share,
            monthly: self.monthly * share,
            cumulative: self.cumulative * share,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolFee {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub category: String,
    pub chains: Vec<String>,
    pub fees: FeeFigures,
    pub revenue: FeeFigures,
    /// Day the figures were observed, `YYYY-MM-DD`.
    pub date: String,
}

/// One day of the aggregate fee chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeTrendPoint {
    /// Unix seconds.
    pub timestamp: i64,
    pub date: String,
    pub fees: f64,
    pub revenue: f64,
}
