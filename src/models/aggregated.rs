use serde::{Deserialize, Serialize};

/// One protocol's contribution to a chain aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolSnapshot {
    pub name: String,
    pub tvl: f64,
    pub change_1h: f64,
    pub change_1d: f64,
    pub change_7d: f64,
    pub change_1m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedData {
    pub protocols: Vec<ProtocolSnapshot>,
    pub total_tvl: f64,
    pub total_protocols: u32,
    pub average_change1h: f64,
    pub average_change1d: f64,
    pub average_change7d: f64,
    pub average_change1m: f64,
    pub market_cap_tvl_ratio: f64,
    pub token_price: f64,
    pub price_change24h: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPoint {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub tvl: f64,
    pub market_cap: f64,
    pub ratio: f64,
}

/// The three chart series share the same points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub tvl: Vec<HistoricalPoint>,
    pub market_cap: Vec<HistoricalPoint>,
    pub ratio: Vec<HistoricalPoint>,
}

impl ChartData {
    pub fn from_points(points: Vec<HistoricalPoint>) -> Self {
        Self {
            tvl: points.clone(),
            market_cap: points.clone(),
            ratio: points,
        }
    }
}
