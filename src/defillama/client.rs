use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::types::{
    LlamaChain, LlamaChainMarketCap, LlamaFeesOverview, LlamaPriceResponse, LlamaProtocol,
    LlamaTvlPoint,
};

#[derive(Debug, Error)]
pub enum LlamaClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Client for the DeFi Llama public API (TVL, chains, fees) and its coins
/// price API.
#[derive(Debug, Clone)]
pub struct LlamaClient {
    http: Client,
    base_url: String,
    coins_url: String,
}

impl LlamaClient {
    pub fn new(http: Client, base_url: impl Into<String>, coins_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            coins_url: coins_url.into(),
        }
    }

    /// Every protocol tracked by the provider.
    pub async fn get_protocols(&self) -> Result<Vec<LlamaProtocol>, LlamaClientError> {
        let url = endpoint(&self.base_url, &["protocols"])?;
        self.get_json(url, &[]).await
    }

    /// Current TVL per chain.
    pub async fn get_chains(&self) -> Result<Vec<LlamaChain>, LlamaClientError> {
        let url = endpoint(&self.base_url, &["v2", "chains"])?;
        self.get_json(url, &[]).await
    }

    /// Native-token market cap per chain, keyed by `gecko_id`.
    pub async fn get_chain_market_caps(
        &self,
    ) -> Result<Vec<LlamaChainMarketCap>, LlamaClientError> {
        let url = endpoint(&self.base_url, &["v2", "chains", "market-cap"])?;
        self.get_json(url, &[]).await
    }

    /// Daily TVL history for one chain.
    pub async fn get_chain_tvl_history(
        &self,
        chain: &str,
    ) -> Result<Vec<LlamaTvlPoint>, LlamaClientError> {
        let url = endpoint(&self.base_url, &["charts", chain])?;
        self.get_json(url, &[]).await
    }

    /// Fees overview across all protocols. The aggregate daily chart is only
    /// requested when `include_chart` is set.
    pub async fn get_fees_overview(
        &self,
        include_chart: bool,
    ) -> Result<LlamaFeesOverview, LlamaClientError> {
        let url = endpoint(&self.base_url, &["overview", "fees"])?;
        let exclude = (!include_chart).to_string();
        self.get_json(
            url,
            &[
                ("excludeTotalDataChart", exclude.as_str()),
                ("excludeTotalDataChartBreakdown", "true"),
                ("dataType", "dailyFees"),
            ],
        )
        .await
    }

    /// Current USD price for a coin id such as `coingecko:ethereum`.
    /// Returns 0 when the provider has no quote for it.
    pub async fn get_current_price(&self, coin_id: &str) -> Result<f64, LlamaClientError> {
        let url = endpoint(&self.coins_url, &["prices", "current", coin_id])?;
        let resp: LlamaPriceResponse = self.get_json(url, &[]).await?;
        Ok(resp.coins.get(coin_id).map(|c| c.price).unwrap_or(0.0))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, LlamaClientError> {
        let mut url = url;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        tracing::debug!(%url, "DeFi Llama request");
        let resp = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?;

        Ok(resp.json().await?)
    }
}

/// Append path segments to a base URL, percent-encoding each one
/// (chain names may contain spaces).
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, LlamaClientError> {
    let mut url = Url::parse(base)
        .map_err(|e| LlamaClientError::Unexpected(format!("invalid base url {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| LlamaClientError::Unexpected(format!("base url cannot hold a path: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
