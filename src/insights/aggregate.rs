use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::defillama::{LlamaProtocol, LlamaTvlPoint};
use crate::models::{AggregatedData, ChartData, HistoricalPoint, ProtocolSnapshot, TrackedChain};

use super::format::{format_change, format_usd};

/// Bridged BTC representations. Counted into total TVL.
const WRAPPED_PROTOCOLS: [&str; 3] = ["Binance Bitcoin", "Coinbase BTC", "Core Bitcoin Bridge"];

/// Protocols re-staking assets already counted elsewhere. Excluded from
/// total TVL but kept in the averages.
const DERIVATIVE_PROTOCOLS: [&str; 4] = ["Babylon", "Function", "Lombard", "exSat Credit Staking"];

/// Estimated market-cap multiple of TVL for the historical chart.
pub const HISTORICAL_MCAP_MULTIPLE: f64 = 1.5;

/// Roll up every protocol whose primary chain is `chain`.
pub fn aggregate_chain(
    protocols: &[LlamaProtocol],
    chain: TrackedChain,
    token_price: f64,
) -> AggregatedData {
    let mut snapshots = Vec::new();
    let mut count = 0usize;
    let mut wrapped_tvl = 0.0;
    let mut derivative_tvl = 0.0;
    let mut native_tvl = 0.0;
    let mut total_mcap = 0.0;
    let (mut sum_1h, mut sum_1d, mut sum_7d, mut sum_1m) = (0.0, 0.0, 0.0, 0.0);

    let candidates = protocols.iter().filter(|p| {
        p.chain.as_deref().is_some_and(|c| chain.matches(c)) && p.tvl.unwrap_or(0.0) > 0.0
    });

    for p in candidates {
        // WBTC still counts toward the protocol total and the averages.
        count += 1;
        if chain == TrackedChain::Bitcoin && p.name == "WBTC" {
            debug!("skipping WBTC on Bitcoin, it is an Ethereum token");
            continue;
        }

        let tvl = p.tvl.unwrap_or(0.0).abs();
        if WRAPPED_PROTOCOLS.contains(&p.name.as_str()) {
            wrapped_tvl += tvl;
        } else if DERIVATIVE_PROTOCOLS.contains(&p.name.as_str()) {
            derivative_tvl += tvl;
        } else {
            native_tvl += tvl;
        }

        let snapshot = ProtocolSnapshot {
            name: p.name.clone(),
            tvl,
            change_1h: p.change_1h.unwrap_or(0.0),
            change_1d: p.change_1d.unwrap_or(0.0),
            change_7d: p.change_7d.unwrap_or(0.0),
            change_1m: p.change_1m.unwrap_or(0.0),
        };
        total_mcap += p.market_cap.unwrap_or(0.0);
        sum_1h += snapshot.change_1h;
        sum_1d += snapshot.change_1d;
        sum_7d += snapshot.change_7d;
        sum_1m += snapshot.change_1m;
        snapshots.push(snapshot);
    }

    let total_tvl = wrapped_tvl + native_tvl;
    debug!(
        chain = %chain,
        wrapped = %format_usd(wrapped_tvl),
        derivative = %format_usd(derivative_tvl),
        native = %format_usd(native_tvl),
        total = %format_usd(total_tvl),
        "TVL breakdown"
    );

    let average = |sum: f64| if count > 0 { sum / count as f64 } else { 0.0 };
    let average_change1d = average(sum_1d);
    debug!(chain = %chain, protocols = count, change_1d = %format_change(average_change1d), "averaged");

    snapshots.sort_by(|a, b| b.tvl.total_cmp(&a.tvl));

    AggregatedData {
        total_protocols: u32::try_from(count).unwrap_or(u32::MAX),
        protocols: snapshots,
        total_tvl,
        average_change1h: average(sum_1h),
        average_change1d,
        average_change7d: average(sum_7d),
        average_change1m: average(sum_1m),
        market_cap_tvl_ratio: if total_tvl > 0.0 { total_mcap / total_tvl } else { 0.0 },
        token_price,
        price_change24h: average_change1d,
    }
}

/// Chart points for the last `days` days, oldest first.
pub fn historical_points(
    raw: &[LlamaTvlPoint],
    days: u32,
    now: DateTime<Utc>,
) -> Vec<HistoricalPoint> {
    let cutoff = now - Duration::days(i64::from(days));

    let mut points: Vec<(i64, HistoricalPoint)> = raw
        .iter()
        .filter_map(|point| {
            let tvl = point.total_liquidity_usd.filter(|v| v.is_finite() && *v > 0.0)?;
            let seconds = point.date.as_seconds()?;
            let at = DateTime::<Utc>::from_timestamp(seconds, 0)?;
            if at < cutoff {
                return None;
            }
            let market_cap = tvl * HISTORICAL_MCAP_MULTIPLE;
            Some((
                seconds,
                HistoricalPoint {
                    date: at.format("%Y-%m-%d").to_string(),
                    tvl,
                    market_cap,
                    ratio: market_cap / tvl,
                },
            ))
        })
        .collect();

    points.sort_by_key(|(seconds, _)| *seconds);
    points.into_iter().map(|(_, p)| p).collect()
}

pub fn chart_data(raw: &[LlamaTvlPoint], days: u32, now: DateTime<Utc>) -> ChartData {
    ChartData::from_points(historical_points(raw, days, now))
}
