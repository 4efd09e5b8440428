use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LidoClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Live protocol metrics for Lido stETH.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LidoMetrics {
    /// Simple moving average APR, in percent.
    pub staking_apr: f64,
    pub withdrawal_time_hours: f64,
    pub queued_eth: f64,
    pub queue_length: f64,
    pub daily_reward_rate: f64,
}

impl Default for LidoMetrics {
    /// What we assume when the Lido APIs are unreachable.
    fn default() -> Self {
        Self {
            staking_apr: 0.0,
            withdrawal_time_hours: 24.0,
            queued_eth: 0.0,
            queue_length: 0.0,
            daily_reward_rate: 0.0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AprResponse {
    #[serde(default)]
    data: Option<AprData>,
}

#[derive(Debug, Deserialize)]
struct AprData {
    #[serde(default, rename = "smaApr")]
    sma_apr: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WithdrawalResponse {
    #[serde(default)]
    data: Option<WithdrawalData>,
}

#[derive(Debug, Deserialize)]
struct WithdrawalData {
    #[serde(default, rename = "estimatedTimeSeconds")]
    estimated_time_seconds: Option<f64>,
    #[serde(default, rename = "queuedEth")]
    queued_eth: Option<f64>,
    #[serde(default, rename = "queueLength")]
    queue_length: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct LidoClient {
    http: Client,
    api_url: String,
    wq_api_url: String,
}

impl LidoClient {
    pub fn new(http: Client, api_url: impl Into<String>, wq_api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            wq_api_url: wq_api_url.into(),
        }
    }

    /// Fetch APR and withdrawal-queue metrics concurrently. Never fails:
    /// any upstream error yields [`LidoMetrics::default`].
    pub async fn fetch_metrics(&self) -> LidoMetrics {
        let (apr, withdrawal) = tokio::join!(self.fetch_apr(), self.fetch_withdrawal());

        match (apr, withdrawal) {
            (Ok(apr), Ok(withdrawal)) => {
                let sma_apr = apr.data.and_then(|d| d.sma_apr).unwrap_or(0.0);
                let wq = withdrawal.data;
                LidoMetrics {
                    staking_apr: sma_apr,
                    withdrawal_time_hours: wq
                        .as_ref()
                        .and_then(|d| d.estimated_time_seconds)
                        .unwrap_or(0.0)
                        / 3600.0,
                    queued_eth: wq.as_ref().and_then(|d| d.queued_eth).unwrap_or(0.0),
                    queue_length: wq.as_ref().and_then(|d| d.queue_length).unwrap_or(0.0),
                    daily_reward_rate: sma_apr / 365.0,
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Lido metrics unavailable, using defaults");
                LidoMetrics::default()
            }
        }
    }

    async fn fetch_apr(&self) -> Result<AprResponse, LidoClientError> {
        let url = format!("{}/v1/protocol/steth/apr/sma", self.api_url.trim_end_matches('/'));
        let resp = self.http.get(&url).send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }

    async fn fetch_withdrawal(&self) -> Result<WithdrawalResponse, LidoClientError> {
        let url = format!(
            "{}/v2/request-time/calculate",
            self.wq_api_url.trim_end_matches('/')
        );
        let resp = self.http.get(&url).send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }
}
