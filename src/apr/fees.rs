/// Fee APR estimation
///
/// Fee capture is modeled as uniformly diluted across the liquidity bins the
/// position spans, and only accrues while the price is inside the range.
/// Annualization is simple (daily fees × days per year), no compounding.
use crate::apr::ticks::TickRange;
use crate::logger::{self, LogTag};
use crate::pools::types::{average_daily_fees, HistoricalFeeSample};
use serde::Serialize;

/// Where the daily fee figure came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeeSource {
    /// Average of `days` daily samples
    Historical { days: usize },
    /// Pool-level fee figure divided by the fallback period
    PoolFallback { period_days: f64 },
}

impl std::fmt::Display for FeeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeeSource::Historical { days } => write!(f, "{}-day historical average", days),
            FeeSource::PoolFallback { period_days } => {
                write!(f, "pool fee total / {} days (fallback)", period_days)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyFees {
    pub daily_fees_usd: f64,
    pub source: FeeSource,
}

/// Pick the daily fee figure: historical average when positive, else fallback
pub fn resolve_daily_fees(
    samples: &[HistoricalFeeSample],
    pool_fees_usd: f64,
    fallback_period_days: f64,
) -> DailyFees {
    let historical = average_daily_fees(samples);
    if historical > 0.0 {
        return DailyFees {
            daily_fees_usd: historical,
            source: FeeSource::Historical { days: samples.len() },
        };
    }

    let fallback = if pool_fees_usd.is_finite()
        && pool_fees_usd > 0.0
        && fallback_period_days.is_finite()
        && fallback_period_days > 0.0
    {
        pool_fees_usd / fallback_period_days
    } else {
        0.0
    };

    logger::warning(
        LogTag::Fees,
        &format!(
            "No historical fee data, falling back to pool fees ${:.2} / {} days",
            pool_fees_usd, fallback_period_days
        ),
    );

    DailyFees {
        daily_fees_usd: fallback,
        source: FeeSource::PoolFallback {
            period_days: fallback_period_days,
        },
    }
}

/// Everything the fee estimator looks at
#[derive(Debug, Clone, Copy)]
pub struct FeeAprInputs {
    pub daily_fees_usd: f64,
    pub liquidity: f64,
    pub total_value_locked_usd: f64,
    pub current_tick: i32,
    pub range: TickRange,
    pub tick_spacing: i32,
    pub in_range: bool,
    pub days_per_year: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeeApr {
    pub annual_fees_usd: f64,
    /// Annual fees over TVL, in percent
    pub active_range_apr: f64,
    pub bin_count: i64,
    /// Active-range APR diluted over the position's bins, 0 when out of range
    pub position_apr: f64,
}

/// Never fails: degenerate or invalid inputs produce 0, never NaN or infinity
pub fn estimate_fee_apr(inputs: &FeeAprInputs) -> FeeApr {
    let daily = non_negative(inputs.daily_fees_usd);
    let days_per_year = non_negative(inputs.days_per_year);
    let annual_fees_usd = finite_or_zero(daily * days_per_year);
    let bin_count = inputs.range.bin_count(inputs.tick_spacing);

    let tvl = non_negative(inputs.total_value_locked_usd);
    let liquidity = non_negative(inputs.liquidity);
    if tvl <= 0.0 || liquidity <= 0.0 {
        logger::warning(LogTag::Fees, "Zero liquidity or TVL detected, returning 0 APR");
        return FeeApr {
            annual_fees_usd,
            active_range_apr: 0.0,
            bin_count,
            position_apr: 0.0,
        };
    }

    let active_range_apr = finite_or_zero(annual_fees_usd / tvl * 100.0);

    let position_apr = if bin_count <= 0 || !inputs.in_range {
        0.0
    } else {
        finite_or_zero(active_range_apr / bin_count as f64)
    };

    if logger::is_debug_enabled(LogTag::Fees) {
        logger::debug(
            LogTag::Fees,
            &format!(
                "Daily fees ${:.2}, annual ${:.2}, TVL ${:.2}, active range APR {:.4}%, {} bins, tick {} in range: {}, position APR {:.4}%",
                daily,
                annual_fees_usd,
                tvl,
                active_range_apr,
                bin_count,
                inputs.current_tick,
                inputs.in_range,
                position_apr
            ),
        );
    }

    FeeApr {
        annual_fees_usd,
        active_range_apr,
        bin_count,
        position_apr,
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
