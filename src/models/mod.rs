pub mod aggregated;
pub mod analytics;
pub mod chain;
pub mod fees;
pub mod protocol;
pub mod staking;

pub use aggregated::{AggregatedData, ChartData, HistoricalPoint, ProtocolSnapshot};
pub use analytics::{AnalyticsEvent, AnalyticsEventInput};
pub use chain::{Chain, ChainDetail};
pub use fees::{FeeFigures, FeeTrendPoint, ProtocolFee};
pub use protocol::{ChainProtocol, Protocol};
pub use staking::{HealthColor, LiquidStakingPlatform};

/// Placeholder image served when the data provider has no logo.
pub const PLACEHOLDER_LOGO: &str = "/placeholder-logo.png";

/// Chains with a dedicated aggregation view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TrackedChain {
    Ethereum,
    Bitcoin,
    Solana,
    Polygon,
}

impl TrackedChain {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ethereum" | "eth" => Some(Self::Ethereum),
            "bitcoin" | "btc" => Some(Self::Bitcoin),
            "solana" | "sol" => Some(Self::Solana),
            "polygon" | "matic" => Some(Self::Polygon),
            _ => None,
        }
    }

    /// Name used by the data provider.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ethereum => "Ethereum",
            Self::Bitcoin => "Bitcoin",
            Self::Solana => "Solana",
            Self::Polygon => "Polygon",
        }
    }

    /// Coin id for the price endpoint.
    pub fn coin_id(self) -> &'static str {
        match self {
            Self::Ethereum => "coingecko:ethereum",
            Self::Bitcoin => "coingecko:bitcoin",
            Self::Solana => "coingecko:solana",
            Self::Polygon => "coingecko:matic-network",
        }
    }

    /// Whether a protocol's primary chain counts as this chain.
    pub fn matches(self, chain: &str) -> bool {
        match self {
            Self::Bitcoin => chain == "Bitcoin" || chain == "BTC",
            other => chain == other.name(),
        }
    }
}

impl std::fmt::Display for TrackedChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
