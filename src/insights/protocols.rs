use crate::defillama::LlamaProtocol;
use crate::models::{Protocol, PLACEHOLDER_LOGO};

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Reshape provider protocols for the protocols table, largest TVL first.
pub fn map_protocols(raw: &[LlamaProtocol]) -> Vec<Protocol> {
    let mut protocols: Vec<Protocol> = raw.iter().map(map_protocol).collect();
    protocols.sort_by(|a, b| b.tvl.total_cmp(&a.tvl));
    protocols
}

pub fn map_protocol(p: &LlamaProtocol) -> Protocol {
    let tvl = p.tvl.unwrap_or(0.0);
    let market_cap = p.market_cap();

    Protocol {
        id: p.id.clone().unwrap_or_else(|| p.name.to_lowercase()),
        name: p.name.clone(),
        logo: p.logo.clone().unwrap_or_else(|| PLACEHOLDER_LOGO.to_string()),
        category: p
            .category
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNCATEGORIZED.to_string()),
        tvl,
        change_24h: p.change_1d.unwrap_or(0.0),
        change_7d: p.change_7d.unwrap_or(0.0),
        market_cap,
        mcap_tvl_ratio: if tvl > 0.0 { market_cap / tvl } else { 0.0 },
        chain_tvls: p
            .chain_tvls
            .iter()
            .filter_map(|(chain, tvl)| Some((chain.clone(), (*tvl)?)))
            .collect(),
    }
}
