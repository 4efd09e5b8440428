pub mod client;
pub mod types;

pub use client::{LlamaClient, LlamaClientError};
pub use types::{
    LlamaChain, LlamaChainMarketCap, LlamaDate, LlamaFeeProtocol, LlamaFeesOverview,
    LlamaProtocol, LlamaTvlPoint,
};
