use rand::Rng;

use crate::defillama::LlamaProtocol;
use crate::lido::LidoMetrics;
use crate::models::{HealthColor, LiquidStakingPlatform, PLACEHOLDER_LOGO};

const WEIGHT_STAKING_RATIO: f64 = 0.25;
const WEIGHT_LIQUIDITY_DEPTH: f64 = 0.30;
const WEIGHT_UTILIZATION: f64 = 0.25;
const WEIGHT_SLIPPAGE: f64 = 0.10;
const WEIGHT_WITHDRAWAL: f64 = 0.10;

const OPTIMAL_STAKING_RATIO: f64 = 0.65;
const OPTIMAL_UTILIZATION: f64 = 0.7;
const MAX_DEVIATION: f64 = 0.6;
const MAX_ACCEPTABLE_SLIPPAGE: f64 = 0.01;
/// One week, in hours.
const MAX_WITHDRAWAL_HOURS: f64 = 168.0;

const MIN_SCORE: f64 = 5.0;
const MAX_SCORE: f64 = 100.0;

/// Assumed ETH buffer in front of the Lido withdrawal queue.
const LIDO_QUEUE_BUFFER_ETH: f64 = 100_000.0;

/// Score inputs. A `None` component scores as neutral (half its weight).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HealthInputs {
    pub staking_ratio: Option<f64>,
    pub liquidity_depth: Option<f64>,
    pub utilization_rate: Option<f64>,
    pub average_slippage: Option<f64>,
    pub withdrawal_time: Option<f64>,
    pub tvl: f64,
}

/// Sub-metrics estimated for one liquid-staking platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StakingMetrics {
    pub staking_ratio: f64,
    pub liquidity_depth: f64,
    pub utilization_rate: f64,
    pub average_slippage: f64,
    pub withdrawal_time: f64,
}

impl Default for StakingMetrics {
    fn default() -> Self {
        Self {
            staking_ratio: 0.0,
            liquidity_depth: 0.0,
            utilization_rate: 0.0,
            average_slippage: 0.0,
            withdrawal_time: 24.0,
        }
    }
}

impl StakingMetrics {
    /// Clamp ratios to [0, 1], slippage to [0, 0.1] and depth/time to >= 0.
    pub fn normalize(self) -> Self {
        Self {
            staking_ratio: clamp_or_zero(self.staking_ratio, 0.0, 1.0),
            liquidity_depth: clamp_or_zero(self.liquidity_depth, 0.0, f64::INFINITY),
            utilization_rate: clamp_or_zero(self.utilization_rate, 0.0, 1.0),
            average_slippage: clamp_or_zero(self.average_slippage, 0.0, 0.1),
            withdrawal_time: clamp_or_zero(self.withdrawal_time, 0.0, f64::INFINITY),
        }
    }

    pub fn with_tvl(&self, tvl: f64) -> HealthInputs {
        HealthInputs {
            staking_ratio: Some(self.staking_ratio),
            liquidity_depth: Some(self.liquidity_depth),
            utilization_rate: Some(self.utilization_rate),
            average_slippage: Some(self.average_slippage),
            withdrawal_time: Some(self.withdrawal_time),
            tvl,
        }
    }
}

fn clamp_or_zero(v: f64, lo: f64, hi: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(lo, hi)
    }
}

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// Multiplier in [0.9, 1.1] applied to every score.
pub fn random_jitter() -> f64 {
    rand::thread_rng().gen_range(0.9..=1.1)
}

/// Weighted 0-100 health score. `jitter` scales the weighted sum before it
/// is clamped to [5, 100] and rounded.
pub fn health_score(inputs: &HealthInputs, jitter: f64) -> u8 {
    let neutral = |weight: f64| 0.5 * weight * 100.0;

    let staking = match inputs.staking_ratio {
        Some(r) => {
            let diff = ((r - OPTIMAL_STAKING_RATIO).abs() / MAX_DEVIATION).min(1.0);
            (1.0 - diff) * WEIGHT_STAKING_RATIO * 100.0
        }
        None => neutral(WEIGHT_STAKING_RATIO),
    };

    let depth = match inputs.liquidity_depth {
        Some(d) if inputs.tvl > 0.0 => (d / inputs.tvl).min(1.0) * WEIGHT_LIQUIDITY_DEPTH * 100.0,
        _ => neutral(WEIGHT_LIQUIDITY_DEPTH),
    };

    let utilization = match inputs.utilization_rate {
        Some(u) => {
            let diff = ((u - OPTIMAL_UTILIZATION).abs() / MAX_DEVIATION).min(1.0);
            (1.0 - diff) * WEIGHT_UTILIZATION * 100.0
        }
        None => neutral(WEIGHT_UTILIZATION),
    };

    let slippage = match inputs.average_slippage {
        Some(s) => (1.0 - s / MAX_ACCEPTABLE_SLIPPAGE).max(0.0) * WEIGHT_SLIPPAGE * 100.0,
        None => neutral(WEIGHT_SLIPPAGE),
    };

    let withdrawal = match inputs.withdrawal_time {
        Some(t) => (1.0 - t / MAX_WITHDRAWAL_HOURS).max(0.0) * WEIGHT_WITHDRAWAL * 100.0,
        None => neutral(WEIGHT_WITHDRAWAL),
    };

    let score = (staking + depth + utilization + slippage + withdrawal) * jitter;
    let clamped = if score.is_nan() {
        MIN_SCORE
    } else {
        score.clamp(MIN_SCORE, MAX_SCORE)
    };
    clamped.round() as u8
}

/// Colour band and intensity for a score.
pub fn health_indicators(score: u8) -> (HealthColor, f64) {
    let s = f64::from(score);
    if s >= 80.0 {
        (HealthColor::Green, ((s - 80.0) / 20.0 + 0.5).min(1.0))
    } else if s >= 60.0 {
        (HealthColor::Yellow, ((s - 60.0) / 20.0 + 0.5).min(1.0))
    } else if s >= 40.0 {
        (HealthColor::Red, ((s - 40.0) / 20.0 + 0.5).min(1.0))
    } else {
        (HealthColor::Black, (s / 40.0 + 0.3).min(1.0))
    }
}

// ---------------------------------------------------------------------------
// Platform estimates
// ---------------------------------------------------------------------------

/// Metrics derived from live Lido APR and withdrawal-queue data.
pub fn lido_estimate(m: &LidoMetrics) -> StakingMetrics {
    let utilization = if m.queued_eth + LIDO_QUEUE_BUFFER_ETH > 0.0 {
        m.queued_eth / (m.queued_eth + LIDO_QUEUE_BUFFER_ETH)
    } else {
        0.0
    };
    StakingMetrics {
        staking_ratio: (m.staking_apr / 10.0).min(0.95),
        liquidity_depth: m.queued_eth,
        utilization_rate: utilization,
        average_slippage: 0.001,
        withdrawal_time: m.withdrawal_time_hours,
    }
}

/// Rocket Pool has no public metrics endpoint; assume 40% of TVL is liquid.
pub fn rocket_pool_estimate(tvl: f64) -> StakingMetrics {
    StakingMetrics {
        staking_ratio: 0.6,
        liquidity_depth: tvl * 0.4,
        utilization_rate: 0.7,
        average_slippage: 0.002,
        withdrawal_time: 24.0,
    }
}

/// Conservative guess for platforms without dedicated data.
pub fn default_estimate(tvl: f64) -> StakingMetrics {
    StakingMetrics {
        staking_ratio: 0.5,
        liquidity_depth: tvl * 0.3,
        utilization_rate: 0.6,
        average_slippage: 0.003,
        withdrawal_time: 24.0,
    }
}

pub fn estimate_for(name: &str, tvl: f64, lido: &LidoMetrics) -> StakingMetrics {
    let lower = name.to_lowercase();
    if lower.contains("lido") {
        lido_estimate(lido)
    } else if lower.contains("rocket") {
        rocket_pool_estimate(tvl)
    } else {
        default_estimate(tvl)
    }
}

/// Liquid-staking protocols with a positive TVL, excluding stablecoins.
pub fn is_liquid_staking(p: &LlamaProtocol) -> bool {
    let category = p.category.as_deref().unwrap_or_default().to_lowercase();
    category.contains("liquid staking")
        && p.tvl.unwrap_or(0.0) > 0.0
        && !p.stablecoin.unwrap_or(false)
}

/// Score every liquid-staking protocol. Platforms with no staking ratio or
/// liquidity are dropped; the rest come back by TVL, largest first.
pub fn liquid_staking_platforms(
    protocols: &[LlamaProtocol],
    lido: &LidoMetrics,
    mut jitter: impl FnMut() -> f64,
) -> Vec<LiquidStakingPlatform> {
    let mut platforms: Vec<LiquidStakingPlatform> = protocols
        .iter()
        .filter(|p| is_liquid_staking(p))
        .map(|p| {
            let tvl = p.tvl.unwrap_or(0.0);
            let metrics = estimate_for(&p.name, tvl, lido).normalize();
            let score = health_score(&metrics.with_tvl(tvl), jitter());
            let (color, intensity) = health_indicators(score);

            LiquidStakingPlatform {
                id: p.id.clone().unwrap_or_else(|| p.name.to_lowercase()),
                name: p.name.clone(),
                logo: p.logo.clone().unwrap_or_else(|| PLACEHOLDER_LOGO.to_string()),
                chain: p.chain.clone().unwrap_or_default(),
                tvl,
                staking_ratio: metrics.staking_ratio,
                liquidity_depth: metrics.liquidity_depth,
                utilization_rate: metrics.utilization_rate,
                average_slippage: metrics.average_slippage,
                withdrawal_time: metrics.withdrawal_time,
                health_score: score,
                health_color: color,
                health_intensity: intensity,
                change24h: p.change_1d.unwrap_or(0.0),
                change7d: p.change_7d.unwrap_or(0.0),
            }
        })
        .filter(|p| p.tvl > 0.0 && p.staking_ratio > 0.0 && p.liquidity_depth > 0.0)
        .collect();

    platforms.sort_by(|a, b| b.tvl.total_cmp(&a.tvl));
    platforms
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
