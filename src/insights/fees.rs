use chrono::{DateTime, NaiveDate, Utc};

use crate::defillama::{LlamaFeeProtocol, LlamaFeesOverview};
use crate::models::{FeeFigures, FeeTrendPoint, ProtocolFee, PLACEHOLDER_LOGO};

/// Assumed share of fees kept as protocol revenue in the fees table.
pub const FEES_OVERVIEW_REVENUE_SHARE: f64 = 0.3;

/// Assumed revenue share in the fee trend chart.
pub const FEE_TREND_REVENUE_SHARE: f64 = 0.5;

const DEFAULT_CATEGORY: &str = "Other";

/// Known categories for protocols the fee feed reports without one.
fn known_category(name: &str) -> Option<&'static str> {
    let category = match name {
        "Uniswap" | "Balancer" => "DEX",
        "Compound" | "Sky Lending" => "Lending",
        "OpenSea" | "GhostMarket" => "NFT Marketplace",
        "Bitcoin" | "Ethereum" | "Polygon" | "Tron" | "Gnosis" | "Celo" | "Doge" | "Fuse"
        | "Litecoin" | "Near" | "Rootstock" => "Chain",
        "WBTC" => "Bridge",
        "AO" => "Other",
        _ => return None,
    };
    Some(category)
}

/// Lookup table first, then the feed's own category, then "Other".
pub fn protocol_category(name: &str, reported: Option<&str>) -> String {
    known_category(name)
        .or(reported.filter(|c| !c.is_empty()))
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string()
}

/// `"Aave V3"` becomes `"aave-v3"`.
pub fn slug(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

pub fn protocol_fee(p: &LlamaFeeProtocol, revenue_share: f64, today: NaiveDate) -> ProtocolFee {
    let fees = FeeFigures {
        daily: p.total_24h.unwrap_or(0.0),
        weekly: p.total_7d.unwrap_or(0.0),
        monthly: p.total_30d.unwrap_or(0.0),
        cumulative: p.total_all_time.unwrap_or(0.0),
    };

    ProtocolFee {
        id: slug(&p.name),
        name: p.name.clone(),
        logo: p.logo.clone().unwrap_or_else(|| PLACEHOLDER_LOGO.to_string()),
        category: protocol_category(&p.name, p.category.as_deref()),
        chains: p.chains.clone(),
        revenue: fees.scaled(revenue_share),
        fees,
        date: today.format("%Y-%m-%d").to_string(),
    }
}

/// Fee table rows, highest daily fees first.
pub fn fee_table(
    overview: &LlamaFeesOverview,
    revenue_share: f64,
    today: NaiveDate,
) -> Vec<ProtocolFee> {
    let mut rows: Vec<ProtocolFee> = overview
        .protocols
        .iter()
        .map(|p| protocol_fee(p, revenue_share, today))
        .collect();
    rows.sort_by(|a, b| b.fees.daily.total_cmp(&a.fees.daily));
    rows
}

/// Daily aggregate fee chart, oldest first.
pub fn fee_trend(overview: &LlamaFeesOverview) -> Vec<FeeTrendPoint> {
    let mut points: Vec<FeeTrendPoint> = overview
        .total_data_chart
        .iter()
        .filter_map(|&(timestamp, fees)| {
            let at = DateTime::<Utc>::from_timestamp(timestamp, 0)?;
            Some(FeeTrendPoint {
                timestamp,
                date: at.format("%Y-%m-%d").to_string(),
                fees,
                revenue: fees * FEE_TREND_REVENUE_SHARE,
            })
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);
    points
}
