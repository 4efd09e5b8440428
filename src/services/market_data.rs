use chrono::Utc;
use reqwest::Client;

use crate::cache::{keys, CacheStore};
use crate::config::AppConfig;
use crate::defillama::{LlamaClient, LlamaClientError};
use crate::insights::{aggregate, chains, fees, health, protocols};
use crate::lido::LidoClient;
use crate::models::{
    AggregatedData, Chain, ChainDetail, ChainProtocol, ChartData, FeeTrendPoint,
    LiquidStakingPlatform, Protocol, ProtocolFee, TrackedChain,
};

/// Cache-through reads of every dataset the dashboard shows.
#[derive(Clone)]
pub struct MarketData {
    llama: LlamaClient,
    lido: LidoClient,
    cache: CacheStore,
    revenue_share: f64,
}

impl MarketData {
    pub fn new(llama: LlamaClient, lido: LidoClient, cache: CacheStore, revenue_share: f64) -> Self {
        Self {
            llama,
            lido,
            cache,
            revenue_share,
        }
    }

    pub fn from_config(config: &AppConfig, http: Client, cache: CacheStore) -> Self {
        Self::new(
            LlamaClient::new(http.clone(), &config.llama_api_url, &config.llama_coins_url),
            LidoClient::new(http, &config.lido_api_url, &config.lido_wq_api_url),
            cache,
            config.revenue_share,
        )
    }

    // -----------------------------------------------------------------------
    // Protocols and chains
    // -----------------------------------------------------------------------

    pub async fn protocols(&self) -> Result<Vec<Protocol>, LlamaClientError> {
        self.cache
            .get_or_fetch(keys::PROTOCOLS, || async {
                let raw = self.llama.get_protocols().await?;
                Ok::<_, LlamaClientError>(protocols::map_protocols(&raw))
            })
            .await
    }

    /// Chains by market cap. A failed market-cap request leaves every
    /// market cap at 0 rather than failing the listing.
    pub async fn chains(&self) -> Result<Vec<Chain>, LlamaClientError> {
        self.cache
            .get_or_fetch(keys::CHAINS, || async {
                let (tvl, mcaps) =
                    tokio::join!(self.llama.get_chains(), self.llama.get_chain_market_caps());
                let mcaps = mcaps.unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "chain market caps unavailable");
                    Vec::new()
                });
                Ok::<_, LlamaClientError>(chains::merge_chains(tvl?, &mcaps))
            })
            .await
    }

    pub async fn chain_protocols(&self, chain: &str) -> Result<Vec<ChainProtocol>, LlamaClientError> {
        self.cache
            .get_or_fetch(&keys::chain_protocols(chain), || async {
                let raw = self.llama.get_protocols().await?;
                Ok::<_, LlamaClientError>(chains::chain_protocols(&raw, chain))
            })
            .await
    }

    /// Chain row merged with its protocols; `None` when the provider does
    /// not list the chain.
    pub async fn chain_detail(&self, name: &str) -> Result<Option<ChainDetail>, LlamaClientError> {
        let all = self.chains().await?;
        let Some(chain) = chains::find_chain(&all, name).cloned() else {
            return Ok(None);
        };
        let protocols = self.chain_protocols(&chain.name).await?;
        Ok(Some(ChainDetail::new(chain, protocols)))
    }

    // -----------------------------------------------------------------------
    // Chain overview
    // -----------------------------------------------------------------------

    pub async fn aggregated(&self, chain: TrackedChain) -> Result<AggregatedData, LlamaClientError> {
        self.cache
            .get_or_fetch(&keys::aggregated_data(chain.name()), || async {
                let (raw, price) = tokio::join!(
                    self.llama.get_protocols(),
                    self.llama.get_current_price(chain.coin_id())
                );
                let price = price.unwrap_or_else(|e| {
                    tracing::warn!(chain = %chain, error = %e, "token price unavailable");
                    0.0
                });
                Ok::<_, LlamaClientError>(aggregate::aggregate_chain(&raw?, chain, price))
            })
            .await
    }

    pub async fn historical(
        &self,
        chain: TrackedChain,
        days: u32,
    ) -> Result<ChartData, LlamaClientError> {
        self.cache
            .get_or_fetch(&keys::historical_data(chain.name(), days), || async {
                let raw = self.llama.get_chain_tvl_history(chain.name()).await?;
                Ok::<_, LlamaClientError>(aggregate::chart_data(&raw, days, Utc::now()))
            })
            .await
    }

    // -----------------------------------------------------------------------
    // Fees
    // -----------------------------------------------------------------------

    pub async fn fees(&self) -> Result<Vec<ProtocolFee>, LlamaClientError> {
        self.cache
            .get_or_fetch(keys::FEES, || async {
                let overview = self.llama.get_fees_overview(false).await?;
                Ok::<_, LlamaClientError>(fees::fee_table(
                    &overview,
                    self.revenue_share,
                    Utc::now().date_naive(),
                ))
            })
            .await
    }

    pub async fn fee_history(&self) -> Result<Vec<FeeTrendPoint>, LlamaClientError> {
        self.cache
            .get_or_fetch(keys::FEES_HISTORY, || async {
                let overview = self.llama.get_fees_overview(true).await?;
                Ok::<_, LlamaClientError>(fees::fee_trend(&overview))
            })
            .await
    }

    // -----------------------------------------------------------------------
    // Liquid staking
    // -----------------------------------------------------------------------

    pub async fn liquid_staking(&self) -> Result<Vec<LiquidStakingPlatform>, LlamaClientError> {
        self.cache
            .get_or_fetch(keys::LIQUID_STAKING, || async {
                let (raw, lido) =
                    tokio::join!(self.llama.get_protocols(), self.lido.fetch_metrics());
                tracing::debug!(
                    apr = lido.staking_apr,
                    daily_reward_rate = lido.daily_reward_rate,
                    queued_eth = lido.queued_eth,
                    queue_length = lido.queue_length,
                    "Lido metrics"
                );
                let platforms =
                    health::liquid_staking_platforms(&raw?, &lido, health::random_jitter);
                tracing::info!(count = platforms.len(), "scored liquid staking platforms");
                Ok::<_, LlamaClientError>(platforms)
            })
            .await
    }
}
