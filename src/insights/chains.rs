use std::collections::HashMap;

use crate::defillama::{LlamaChain, LlamaChainMarketCap, LlamaProtocol};
use crate::models::{Chain, ChainProtocol, PLACEHOLDER_LOGO};

/// Join chain TVL rows with market caps on `gecko_id`, largest market cap
/// first. Rows without a TVL figure are dropped.
pub fn merge_chains(chains: Vec<LlamaChain>, market_caps: &[LlamaChainMarketCap]) -> Vec<Chain> {
    let mcaps: HashMap<&str, f64> = market_caps
        .iter()
        .filter_map(|m| Some((m.gecko_id.as_deref()?, m.mcap.unwrap_or(0.0))))
        .collect();

    let mut merged: Vec<Chain> = chains
        .into_iter()
        .filter_map(|c| {
            let raw_tvl = c.tvl?;
            let tvl = raw_tvl.max(0.0);
            let market_cap = c
                .gecko_id
                .as_deref()
                .and_then(|id| mcaps.get(id).copied())
                .unwrap_or(0.0);

            Some(Chain {
                id: c
                    .gecko_id
                    .clone()
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| c.name.to_lowercase()),
                token_symbol: c.token_symbol.unwrap_or_default(),
                logo: c.logo.unwrap_or_else(|| PLACEHOLDER_LOGO.to_string()),
                tvl,
                change_24h: c.change_24h.unwrap_or(0.0),
                change_7d: c.change_7d.unwrap_or(0.0),
                market_cap,
                mcap_to_tvl: if tvl > 0.0 { market_cap / tvl } else { 0.0 },
                protocols: c.protocols.unwrap_or(0),
                name: c.name,
            })
        })
        .collect();

    merged.sort_by(|a, b| b.market_cap.total_cmp(&a.market_cap));
    merged
}

/// Case-insensitive lookup by chain name.
pub fn find_chain<'a>(chains: &'a [Chain], name: &str) -> Option<&'a Chain> {
    chains.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// Protocols deployed on `chain`, largest chain TVL first. TVL is the
/// chain-specific figure when the provider reports one.
pub fn chain_protocols(protocols: &[LlamaProtocol], chain: &str) -> Vec<ChainProtocol> {
    let mut listed: Vec<ChainProtocol> = protocols
        .iter()
        .filter(|p| p.chains.iter().any(|c| c.eq_ignore_ascii_case(chain)))
        .map(|p| ChainProtocol {
            id: p.id.clone().unwrap_or_else(|| p.name.to_lowercase()),
            name: p.name.clone(),
            logo: p.logo.clone().unwrap_or_else(|| PLACEHOLDER_LOGO.to_string()),
            category: p
                .category
                .clone()
                .unwrap_or_else(|| super::protocols::UNCATEGORIZED.to_string()),
            tvl: p.tvl_on(chain).or(p.tvl).unwrap_or(0.0),
            change_1d: p.change_1d.unwrap_or(0.0),
            change_7d: p.change_7d.unwrap_or(0.0),
        })
        .collect();

    listed.sort_by(|a, b| b.tvl.total_cmp(&a.tvl));
    listed
}
