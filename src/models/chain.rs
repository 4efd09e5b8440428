use serde::{Deserialize, Serialize};

use super::ChainProtocol;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    pub id: String,
    pub name: String,
    pub token_symbol: String,
    pub logo: String,
    pub tvl: f64,
    #[serde(rename = "change_24h")]
    pub change_24h: f64,
    #[serde(rename = "change_7d")]
    pub change_7d: f64,
    pub market_cap: f64,
    pub mcap_to_tvl: f64,
    /// Number of protocols deployed on the chain.
    pub protocols: u32,
}

/// A chain merged with its protocol list. The protocol list replaces the
/// protocol count in the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDetail {
    pub id: String,
    pub name: String,
    pub token_symbol: String,
    pub logo: String,
    pub tvl: f64,
    #[serde(rename = "change_24h")]
    pub change_24h: f64,
    #[serde(rename = "change_7d")]
    pub change_7d: f64,
    pub market_cap: f64,
    pub mcap_to_tvl: f64,
    pub protocols: Vec<ChainProtocol>,
}

impl ChainDetail {
    pub fn new(chain: Chain, protocols: Vec<ChainProtocol>) -> Self {
        Self {
            id: chain.id,
            name: chain.name,
            token_symbol: chain.token_symbol,
            logo: chain.logo,
            tvl: chain.tvl,
            change_24h: chain.change_24h,
            change_7d: chain.change_7d,
            market_cap: chain.market_cap,
            mcap_to_tvl: chain.mcap_to_tvl,
            protocols,
        }
    }
}
