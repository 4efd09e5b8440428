//! Cache key names shared by every service.

pub const PROTOCOLS: &str = "protocols";
pub const CHAINS: &str = "chains";
pub const FEES: &str = "fees";
pub const FEES_HISTORY: &str = "fees_history";
pub const LIQUID_STAKING: &str = "liquid_staking";
pub const FIRESTORE_DATA: &str = "firestore-data";

pub fn chain_protocols(chain: &str) -> String {
    format!("chain_protocols_{}", chain.to_lowercase())
}

pub fn aggregated_data(chain: &str) -> String {
    format!("aggregated_data_{}", chain.to_lowercase())
}

pub fn historical_data(chain: &str, days: u32) -> String {
    format!("historical_data_{}_{}", chain.to_lowercase(), days)
}
