/// Core types for the pools module
use crate::logger::{self, LogTag};
use crate::pools::constants::{known_tick_spacing, FEE_TIER_UNITS_PER_PERCENT};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenInfo {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Immutable snapshot of a pool, fetched once per run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolState {
    /// Lower-cased pool address
    pub id: String,
    pub token0: TokenInfo,
    pub token1: TokenInfo,
    pub current_tick: i32,
    /// token1 per token0
    pub current_price: f64,
    /// Hundredths of a basis point (3000 = 0.3%)
    pub fee_tier: u32,
    pub tick_spacing: i32,
    pub liquidity: f64,
    pub total_value_locked_usd: f64,
    /// Pool-level fee figure from the indexer, used when no daily history exists
    pub recent_fees_usd: f64,
}

impl PoolState {
    /// `TOKEN0/TOKEN1`
    pub fn name(&self) -> String {
        format!("{}/{}", self.token0.symbol, self.token1.symbol)
    }

    pub fn fee_tier_percent(&self) -> f64 {
        self.fee_tier as f64 / FEE_TIER_UNITS_PER_PERCENT
    }
}

/// One day of pool fee history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalFeeSample {
    pub date: DateTime<Utc>,
    pub fees_usd: f64,
    pub volume_usd: f64,
}

/// Average daily fees over the samples, 0 for an empty window
///
/// Non-finite or negative entries count as zero fees for that day.
pub fn average_daily_fees(samples: &[HistoricalFeeSample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let total: f64 = samples
        .iter()
        .map(|s| if s.fees_usd.is_finite() && s.fees_usd > 0.0 { s.fees_usd } else { 0.0 })
        .sum();

    total / samples.len() as f64
}

/// Tick spacing for a fee tier; unknown tiers fall back to `default_spacing`
pub fn tick_spacing_for_fee_tier(fee_tier: u32, default_spacing: i32) -> i32 {
    match known_tick_spacing(fee_tier) {
        Some(spacing) => spacing,
        None => {
            logger::warning(
                LogTag::Subgraph,
                &format!(
                    "Unknown fee tier: {}, using default tick spacing of {}",
                    fee_tier, default_spacing
                ),
            );
            default_spacing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(day: i64, fees: f64) -> HistoricalFeeSample {
        HistoricalFeeSample {
            date: Utc.timestamp_opt(1_700_000_000 - day * 86_400, 0).unwrap(),
            fees_usd: fees,
            volume_usd: fees * 1000.0,
        }
    }

    #[test]
    fn test_known_fee_tiers() {
        assert_eq!(tick_spacing_for_fee_tier(100, 60), 1);
        assert_eq!(tick_spacing_for_fee_tier(500, 60), 10);
        assert_eq!(tick_spacing_for_fee_tier(3000, 60), 60);
        assert_eq!(tick_spacing_for_fee_tier(10000, 60), 200);
    }

    #[test]
    fn test_unknown_fee_tier_uses_default() {
        assert_eq!(tick_spacing_for_fee_tier(777, 60), 60);
        assert_eq!(tick_spacing_for_fee_tier(777, 50), 50);
    }

    #[test]
    fn test_average_daily_fees() {
        assert_eq!(average_daily_fees(&[]), 0.0);

        let samples = vec![sample(0, 1200.0), sample(1, 1800.0), sample(2, 1500.0)];
        assert!((average_daily_fees(&samples) - 1500.0).abs() < 1e-9);

        let with_garbage = vec![sample(0, 1000.0), sample(1, f64::NAN)];
        assert!((average_daily_fees(&with_garbage) - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_pool_name_and_fee_percent() {
        let token = |symbol: &str, decimals| TokenInfo {
            address: String::new(),
            symbol: symbol.to_string(),
            decimals,
        };
        let pool = PoolState {
            id: "0xpool".to_string(),
            token0: token("WETH", 18),
            token1: token("USDC", 6),
            current_tick: -199000,
            current_price: 2150.0,
            fee_tier: 3000,
            tick_spacing: 60,
            liquidity: 1.0e18,
            total_value_locked_usd: 5_000_000.0,
            recent_fees_usd: 10_500.0,
        };
        assert_eq!(pool.name(), "WETH/USDC");
        assert!((pool.fee_tier_percent() - 0.3).abs() < 1e-12);
    }
}
