use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Protocol row of the protocols table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub category: String,
    pub tvl: f64,
    #[serde(rename = "change_24h")]
    pub change_24h: f64,
    #[serde(rename = "change_7d")]
    pub change_7d: f64,
    pub market_cap: f64,
    pub mcap_tvl_ratio: f64,
    #[serde(default)]
    pub chain_tvls: BTreeMap<String, f64>,
}

/// Protocol as listed on a single chain's page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainProtocol {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub category: String,
    pub tvl: f64,
    pub change_1d: f64,
    pub change_7d: f64,
}
