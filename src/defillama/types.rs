use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Protocols (`GET /protocols`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LlamaProtocol {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    /// Primary chain, or "Multi-Chain".
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chains: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tvl: Option<f64>,
    /// Per-chain TVL, keyed by chain name. Also carries synthetic keys such
    /// as `Ethereum-borrowed` or `staking`.
    #[serde(default, rename = "chainTvls", deserialize_with = "null_as_default")]
    pub chain_tvls: HashMap<String, Option<f64>>,
    #[serde(default, rename = "marketCap")]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub mcap: Option<f64>,
    #[serde(default)]
    pub change_1h: Option<f64>,
    #[serde(default)]
    pub change_1d: Option<f64>,
    #[serde(default)]
    pub change_7d: Option<f64>,
    #[serde(default)]
    pub change_1m: Option<f64>,
    #[serde(default)]
    pub stablecoin: Option<bool>,
}

impl LlamaProtocol {
    /// Market cap from either `marketCap` or `mcap`, whichever is set.
    pub fn market_cap(&self) -> f64 {
        self.market_cap.or(self.mcap).unwrap_or(0.0)
    }

    /// TVL attributed to `chain` (case-insensitive), if the provider reports it.
    pub fn tvl_on(&self, chain: &str) -> Option<f64> {
        self.chain_tvls
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(chain))
            .and_then(|(_, tvl)| *tvl)
    }
}

// ---------------------------------------------------------------------------
// Chains (`GET /v2/chains`, `GET /v2/chains/market-cap`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LlamaChain {
    #[serde(default)]
    pub gecko_id: Option<String>,
    pub name: String,
    #[serde(default, rename = "tokenSymbol")]
    pub token_symbol: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub tvl: Option<f64>,
    #[serde(default)]
    pub change_24h: Option<f64>,
    #[serde(default)]
    pub change_7d: Option<f64>,
    #[serde(default)]
    pub protocols: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlamaChainMarketCap {
    #[serde(default)]
    pub gecko_id: Option<String>,
    #[serde(default)]
    pub mcap: Option<f64>,
}

// ---------------------------------------------------------------------------
// Historical chain TVL (`GET /charts/{chain}`)
// ---------------------------------------------------------------------------

/// Unix seconds, sent either as a JSON string or a number.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LlamaDate {
    Seconds(i64),
    Float(f64),
    Text(String),
}

impl LlamaDate {
    pub fn as_seconds(&self) -> Option<i64> {
        match self {
            LlamaDate::Seconds(s) => Some(*s),
            LlamaDate::Float(f) if f.is_finite() => Some(*f as i64),
            LlamaDate::Float(_) => None,
            LlamaDate::Text(t) => t.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlamaTvlPoint {
    pub date: LlamaDate,
    #[serde(default, rename = "totalLiquidityUSD")]
    pub total_liquidity_usd: Option<f64>,
}

// ---------------------------------------------------------------------------
// Fees (`GET /overview/fees`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LlamaFeeProtocol {
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chains: Vec<String>,
    #[serde(default, rename = "total24h")]
    pub total_24h: Option<f64>,
    #[serde(default, rename = "total7d")]
    pub total_7d: Option<f64>,
    #[serde(default, rename = "total30d")]
    pub total_30d: Option<f64>,
    #[serde(default, rename = "totalAllTime")]
    pub total_all_time: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LlamaFeesOverview {
    #[serde(default, deserialize_with = "null_as_default")]
    pub protocols: Vec<LlamaFeeProtocol>,
    /// `[timestamp_secs, value]` pairs.
    #[serde(default, rename = "totalDataChart", deserialize_with = "null_as_default")]
    pub total_data_chart: Vec<(i64, f64)>,
}

// ---------------------------------------------------------------------------
// Prices (`GET coins/prices/current/{coin}`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlamaCoinPrice {
    pub price: f64,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LlamaPriceResponse {
    #[serde(default)]
    pub coins: HashMap<String, LlamaCoinPrice>,
}

// ---------------------------------------------------------------------------
// Deserialization helpers
// ---------------------------------------------------------------------------

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
