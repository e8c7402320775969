/// Result assembly: runs the pure pipeline stages and builds the report
///
/// Stages, in order: tick conversion, range classification, fee APR,
/// emissions APR. `estimate_for_pool` adds the data fetch in front.
use crate::apr::emissions::{EmissionsPolicy, ReferencePoint};
use crate::apr::fees::{estimate_fee_apr, resolve_daily_fees, FeeAprInputs, FeeSource};
use crate::apr::ticks::{is_in_range, price_range_to_ticks, TickAnchor, TickModel, TickRange};
use crate::config::EstimatorConfig;
use crate::errors::{AprError, AprResult};
use crate::logger::{self, LogTag};
use crate::pools::source::{fetch_pool_inputs, PoolDataSource};
use crate::pools::types::{HistoricalFeeSample, PoolState};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PoolSummary {
    pub id: String,
    pub name: String,
    pub fee_tier: u32,
    pub fee_tier_percent: f64,
    pub current_price: f64,
    pub current_tick: i32,
    pub tick_spacing: i32,
    pub liquidity: f64,
    pub total_value_locked_usd: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionSummary {
    pub lower_price_usd: f64,
    pub upper_price_usd: f64,
    pub width_usd: f64,
    /// Width as a percent of the current price
    pub width_percent: f64,
    pub raw_ticks: TickRange,
    pub ticks: TickRange,
    pub bin_count: i64,
    pub in_range: bool,
    pub tick_model: TickModel,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeeSummary {
    pub daily_fees_usd: f64,
    pub annual_fees_usd: f64,
    pub source: FeeSource,
    pub active_range_apr: f64,
    pub fee_apr: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AprReport {
    pub pool: PoolSummary,
    pub position: PositionSummary,
    pub fees: FeeSummary,
    pub emissions_apr: f64,
    pub emissions_policy: EmissionsPolicy,
    pub total_apr: f64,
    pub references: Vec<ReferencePoint>,
}

impl AprReport {
    pub fn fee_apr(&self) -> f64 {
        self.fees.fee_apr
    }
}

/// Estimate the APR of the range `[lower_price_usd, upper_price_usd]`
///
/// Bounds given in the wrong order are swapped. Equal bounds are rejected.
pub fn estimate_position_apr(
    pool: &PoolState,
    fee_samples: &[HistoricalFeeSample],
    lower_price_usd: f64,
    upper_price_usd: f64,
    config: &EstimatorConfig,
) -> AprResult<AprReport> {
    let (lower, upper) = normalize_bounds(lower_price_usd, upper_price_usd)?;
    let emissions = config.emissions_estimator()?;

    let anchor = TickAnchor {
        current_tick: pool.current_tick,
        current_price: pool.current_price,
        tick_spacing: pool.tick_spacing,
        token0_decimals: pool.token0.decimals,
        token1_decimals: pool.token1.decimals,
    };
    let conversion = price_range_to_ticks(&anchor, lower, upper, config.tick_model)?;
    let in_range = is_in_range(pool.current_tick, &conversion.aligned);

    let daily = resolve_daily_fees(
        fee_samples,
        pool.recent_fees_usd,
        config.fallback_fee_period_days,
    );
    let fee = estimate_fee_apr(&FeeAprInputs {
        daily_fees_usd: daily.daily_fees_usd,
        liquidity: pool.liquidity,
        total_value_locked_usd: pool.total_value_locked_usd,
        current_tick: pool.current_tick,
        range: conversion.aligned,
        tick_spacing: pool.tick_spacing,
        in_range,
        days_per_year: config.days_per_year,
    });

    let width_usd = upper - lower;
    let emissions_apr = emissions.estimate(width_usd, in_range)?;
    let total_apr = fee.position_apr + emissions_apr;

    logger::info(
        LogTag::Report,
        &format!(
            "{} range ${:.2} - ${:.2}: fee {:.4}% + emissions {:.4}% = {:.4}% ({})",
            pool.name(),
            lower,
            upper,
            fee.position_apr,
            emissions_apr,
            total_apr,
            if in_range { "in range" } else { "out of range" }
        ),
    );

    Ok(AprReport {
        pool: PoolSummary {
            id: pool.id.clone(),
            name: pool.name(),
            fee_tier: pool.fee_tier,
            fee_tier_percent: pool.fee_tier_percent(),
            current_price: pool.current_price,
            current_tick: pool.current_tick,
            tick_spacing: pool.tick_spacing,
            liquidity: pool.liquidity,
            total_value_locked_usd: pool.total_value_locked_usd,
        },
        position: PositionSummary {
            lower_price_usd: lower,
            upper_price_usd: upper,
            width_usd,
            width_percent: width_usd / pool.current_price * 100.0,
            raw_ticks: conversion.raw,
            ticks: conversion.aligned,
            bin_count: fee.bin_count,
            in_range,
            tick_model: conversion.model,
        },
        fees: FeeSummary {
            daily_fees_usd: daily.daily_fees_usd,
            annual_fees_usd: fee.annual_fees_usd,
            source: daily.source,
            active_range_apr: fee.active_range_apr,
            fee_apr: fee.position_apr,
        },
        emissions_apr,
        emissions_policy: emissions.policy(),
        total_apr,
        references: emissions.references(),
    })
}

/// Fetch pool state and fee history concurrently, then estimate
pub async fn estimate_for_pool(
    source: &dyn PoolDataSource,
    pool_id: &str,
    lower_price_usd: f64,
    upper_price_usd: f64,
    config: &EstimatorConfig,
) -> AprResult<AprReport> {
    // Reject bad bounds before touching the network
    normalize_bounds(lower_price_usd, upper_price_usd)?;

    let inputs = fetch_pool_inputs(source, pool_id, config.history_days).await?;
    estimate_position_apr(
        &inputs.pool,
        &inputs.fee_samples,
        lower_price_usd,
        upper_price_usd,
        config,
    )
}

fn normalize_bounds(lower: f64, upper: f64) -> AprResult<(f64, f64)> {
    for (field, value) in [("lower_price_usd", lower), ("upper_price_usd", upper)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(AprError::invalid_input(
                field,
                format!("must be a positive finite price, got {}", value),
            ));
        }
    }

    if lower == upper {
        return Err(AprError::invalid_input(
            "price_range",
            format!("lower and upper bounds are both {}", lower),
        ));
    }

    if lower > upper {
        logger::warning(
            LogTag::Report,
            &format!("Swapping reversed price bounds {} / {}", lower, upper),
        );
        Ok((upper, lower))
    } else {
        Ok((lower, upper))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pools::source::testing::{reference_pool, StaticPoolSource};
    use crate::pools::types::tick_spacing_for_fee_tier;
    use chrono::{TimeZone, Utc};

    fn week_of_fees(daily: f64) -> Vec<HistoricalFeeSample> {
        (0..7)
            .map(|d| HistoricalFeeSample {
                date: Utc.timestamp_opt(1_700_000_000 - d * 86_400, 0).unwrap(),
                fees_usd: daily,
                volume_usd: daily / 0.003,
            })
            .collect()
    }

    #[test]
    fn test_reference_scenario() {
        let config = EstimatorConfig::default();
        let report = estimate_position_apr(
            &reference_pool(),
            &week_of_fees(1500.0),
            2083.95,
            2235.04,
            &config,
        )
        .unwrap();

        assert_eq!(report.pool.tick_spacing, 60);
        assert_eq!(report.position.ticks, TickRange::new(-200040, -198180));
        assert_eq!(report.position.bin_count, 31);
        assert!(report.position.in_range);
        assert!(report.fee_apr() > 0.0);
        assert!((report.fee_apr() - 10.95 / 31.0).abs() < 1e-9);
        assert_eq!(report.fees.source, FeeSource::Historical { days: 7 });
        assert_eq!(report.total_apr, report.fee_apr() + report.emissions_apr);

        // 151.09 wide is exactly the narrow reference
        assert!((report.position.width_usd - 151.09).abs() < 1e-9);
        assert!((report.emissions_apr - 299.24).abs() < 1e-6);
    }

    #[test]
    fn test_reversed_bounds_are_normalized() {
        let config = EstimatorConfig::default();
        let pool = reference_pool();
        let fees = week_of_fees(1500.0);
        let forward = estimate_position_apr(&pool, &fees, 2083.95, 2235.04, &config).unwrap();
        let reversed = estimate_position_apr(&pool, &fees, 2235.04, 2083.95, &config).unwrap();
        assert_eq!(forward.position.ticks, reversed.position.ticks);
        assert_eq!(forward.total_apr, reversed.total_apr);
    }

    #[test]
    fn test_out_of_range_position() {
        let config = EstimatorConfig::default();
        let report =
            estimate_position_apr(&reference_pool(), &week_of_fees(1500.0), 2500.0, 2700.0, &config)
                .unwrap();
        assert!(!report.position.in_range);
        assert_eq!(report.fee_apr(), 0.0);
        assert_eq!(report.emissions_apr, 0.0);
        assert_eq!(report.total_apr, 0.0);
    }

    #[test]
    fn test_invalid_bounds() {
        let config = EstimatorConfig::default();
        let pool = reference_pool();
        for (lower, upper) in [(2100.0, 2100.0), (0.0, 2100.0), (-1.0, 2100.0), (f64::NAN, 2.0)] {
            let err = estimate_position_apr(&pool, &[], lower, upper, &config).unwrap_err();
            assert!(matches!(err, AprError::InvalidInput { .. }));
        }
    }

    #[test]
    fn test_subnormal_range_never_reports_infinite_apr() {
        let config = EstimatorConfig::default();
        let mut pool = reference_pool();
        pool.current_tick = 0;
        pool.current_price = 1.0;

        let result = estimate_position_apr(&pool, &[], 5e-324, 1e-323, &config);
        assert!(matches!(result, Err(AprError::InvalidInput { .. })));
    }

    #[test]
    fn test_unknown_fee_tier_uses_default_spacing() {
        let config = EstimatorConfig::default();
        let mut pool = reference_pool();
        pool.fee_tier = 777;
        pool.tick_spacing = tick_spacing_for_fee_tier(777, config.default_tick_spacing);

        let report = estimate_position_apr(&pool, &[], 2083.95, 2235.04, &config).unwrap();
        assert_eq!(report.pool.tick_spacing, 60);
        assert!(report.position.bin_count > 0);
    }

    #[test]
    fn test_broken_reference_table_is_configuration_error() {
        let config = EstimatorConfig {
            references: Vec::new(),
            ..EstimatorConfig::default()
        };
        let err = estimate_position_apr(&reference_pool(), &[], 2083.95, 2235.04, &config)
            .unwrap_err();
        assert!(matches!(err, AprError::InvalidConfiguration { .. }));
    }

    #[tokio::test]
    async fn test_estimate_for_pool_pipeline() {
        let source = StaticPoolSource::new(Some(reference_pool()), Ok(week_of_fees(1500.0)));
        let report = estimate_for_pool(
            &source,
            "0xb2cc224c1c9fee385f8ad6a55b4d94e92359dc59",
            2083.95,
            2235.04,
            &EstimatorConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(report.position.bin_count, 31);
        assert!(report.total_apr > report.fee_apr());
    }

    #[tokio::test]
    async fn test_estimate_for_pool_empty_history_uses_fallback() {
        let source = StaticPoolSource::new(Some(reference_pool()), Ok(Vec::new()));
        let report = estimate_for_pool(&source, "0xpool", 2083.95, 2235.04, &EstimatorConfig::default())
            .await
            .unwrap();
        // 10_500 over the 7-day fallback period is the same 1500/day
        assert_eq!(report.fees.daily_fees_usd, 1500.0);
        assert_eq!(report.fees.source, FeeSource::PoolFallback { period_days: 7.0 });
        assert!(report.fee_apr() > 0.0);
    }

    #[tokio::test]
    async fn test_estimate_for_pool_unavailable() {
        let source = StaticPoolSource::new(None, Ok(Vec::new()));
        let err = estimate_for_pool(&source, "0xdead", 2083.95, 2235.04, &EstimatorConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AprError::DataUnavailable { .. }));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = estimate_position_apr(
            &reference_pool(),
            &week_of_fees(1500.0),
            2083.95,
            2235.04,
            &EstimatorConfig::default(),
        )
        .unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["pool"]["name"], "WETH/USDC");
        assert_eq!(value["position"]["ticks"]["lower_tick"], -200040);
        assert_eq!(value["emissions_policy"], "interpolated");
        assert_eq!(value["fees"]["source"]["kind"], "historical");
    }
}
