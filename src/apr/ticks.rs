/// Price to tick conversion and range classification
///
/// The default model anchors a proportionality factor `k = tick / ln(price)`
/// on the single (tick, price) observation the pool gives us and maps prices
/// with `tick ≈ k · ln(price)`. That is an approximation of the real
/// logarithmic grid (`tick = log_1.0001(raw price)`) and is only accurate near
/// the current price. `TickModel::Exact` uses the real grid instead.
use crate::errors::{AprError, AprResult};
use crate::logger::{self, LogTag};
use serde::{Deserialize, Serialize};

/// Tick base of the concentrated-liquidity price grid
pub const TICK_BASE: f64 = 1.0001;

pub const MIN_TICK: i32 = -887_272;
pub const MAX_TICK: i32 = 887_272;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickModel {
    /// `tick ≈ (current_tick / ln(current_price)) · ln(price)`
    AnchoredLog,
    /// `tick = ln(price · 10^(decimals1 − decimals0)) / ln(1.0001)`
    Exact,
}

impl std::fmt::Display for TickModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TickModel::AnchoredLog => write!(f, "anchored-log (approximation)"),
            TickModel::Exact => write!(f, "exact (log base 1.0001)"),
        }
    }
}

/// A tick interval; bounds may be in either order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickRange {
    pub lower_tick: i32,
    pub upper_tick: i32,
}

impl TickRange {
    pub fn new(lower_tick: i32, upper_tick: i32) -> Self {
        Self {
            lower_tick,
            upper_tick,
        }
    }

    pub fn min_tick(&self) -> i32 {
        self.lower_tick.min(self.upper_tick)
    }

    pub fn max_tick(&self) -> i32 {
        self.lower_tick.max(self.upper_tick)
    }

    /// `|upper − lower|`
    pub fn tick_width(&self) -> i64 {
        (self.upper_tick as i64 - self.lower_tick as i64).abs()
    }

    /// `floor(tick_width / spacing)`, 0 for a non-positive spacing
    pub fn bin_count(&self, tick_spacing: i32) -> i64 {
        if tick_spacing <= 0 {
            return 0;
        }
        self.tick_width() / tick_spacing as i64
    }

    /// Inclusive on both ends, independent of bound order
    pub fn contains(&self, tick: i32) -> bool {
        self.min_tick() <= tick && tick <= self.max_tick()
    }
}

/// Raw (unaligned) and aligned ticks for a price range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickConversion {
    pub raw: TickRange,
    pub aligned: TickRange,
    /// `k` for the anchored model, `1 / ln(1.0001)` for the exact one
    pub scale: f64,
    pub model: TickModel,
}

/// Inputs describing the pool side of the conversion
#[derive(Debug, Clone, Copy)]
pub struct TickAnchor {
    pub current_tick: i32,
    pub current_price: f64,
    pub tick_spacing: i32,
    pub token0_decimals: u8,
    pub token1_decimals: u8,
}

/// Map a USD price range onto the pool's tick grid, aligned to tick spacing
pub fn price_range_to_ticks(
    anchor: &TickAnchor,
    lower_price_usd: f64,
    upper_price_usd: f64,
    model: TickModel,
) -> AprResult<TickConversion> {
    if anchor.tick_spacing <= 0 {
        return Err(AprError::invalid_configuration(
            "tick_spacing",
            format!("must be positive, got {}", anchor.tick_spacing),
        ));
    }
    ensure_positive_price("current_price", anchor.current_price)?;
    ensure_positive_price("lower_price_usd", lower_price_usd)?;
    ensure_positive_price("upper_price_usd", upper_price_usd)?;

    let (raw, scale) = match model {
        TickModel::AnchoredLog => {
            let k = anchored_scale(anchor.current_tick, anchor.current_price)?;
            // Higher price maps to the lower tick under this pool's sign convention
            let raw_lower = to_tick((k * upper_price_usd.ln()).floor(), "lower_tick")?;
            let raw_upper = to_tick((k * lower_price_usd.ln()).ceil(), "upper_tick")?;
            (TickRange::new(raw_lower, raw_upper), k)
        }
        TickModel::Exact => {
            let scale = 1.0 / TICK_BASE.ln();
            let decimals_shift = anchor.token1_decimals as i32 - anchor.token0_decimals as i32;
            let adjust = 10f64.powi(decimals_shift).ln();
            let at_lower = (lower_price_usd.ln() + adjust) * scale;
            let at_upper = (upper_price_usd.ln() + adjust) * scale;
            let raw_lower = to_tick(at_lower.min(at_upper).floor(), "lower_tick")?;
            let raw_upper = to_tick(at_lower.max(at_upper).ceil(), "upper_tick")?;
            (TickRange::new(raw_lower, raw_upper), scale)
        }
    };

    let aligned = align_outward(&raw, anchor.tick_spacing)?;

    if logger::is_debug_enabled(LogTag::Ticks) {
        logger::debug(
            LogTag::Ticks,
            &format!(
                "Price range {} - {} -> raw ticks {} - {} (scale {:.4}, model {})",
                lower_price_usd, upper_price_usd, raw.lower_tick, raw.upper_tick, scale, model
            ),
        );
        logger::debug(
            LogTag::Ticks,
            &format!(
                "Aligned to tick spacing ({}): {} - {}",
                anchor.tick_spacing, aligned.lower_tick, aligned.upper_tick
            ),
        );
    }

    Ok(TickConversion {
        raw,
        aligned,
        scale,
        model,
    })
}

/// `k = current_tick / ln(current_price)`
pub fn anchored_scale(current_tick: i32, current_price: f64) -> AprResult<f64> {
    ensure_positive_price("current_price", current_price)?;

    let ln_price = current_price.ln();
    if ln_price == 0.0 {
        if current_tick == 0 {
            return Ok(0.0);
        }
        return Err(AprError::invalid_input(
            "current_price",
            "an anchor price of exactly 1.0 with a non-zero tick does not define a tick scale",
        ));
    }

    let k = current_tick as f64 / ln_price;
    if !k.is_finite() {
        return Err(AprError::invalid_input("current_price", "tick scale is not finite"));
    }
    Ok(k)
}

/// Widen both bounds to multiples of `tick_spacing`: the smaller bound is
/// floored and the larger one ceiled, whatever order they come in.
pub fn align_outward(raw: &TickRange, tick_spacing: i32) -> AprResult<TickRange> {
    if tick_spacing <= 0 {
        return Err(AprError::invalid_configuration(
            "tick_spacing",
            format!("must be positive, got {}", tick_spacing),
        ));
    }

    let (lower, upper) = if raw.lower_tick <= raw.upper_tick {
        (
            floor_to_spacing(raw.lower_tick, tick_spacing),
            ceil_to_spacing(raw.upper_tick, tick_spacing),
        )
    } else {
        (
            ceil_to_spacing(raw.lower_tick, tick_spacing),
            floor_to_spacing(raw.upper_tick, tick_spacing),
        )
    };

    Ok(TickRange::new(
        to_tick(lower as f64, "lower_tick")?,
        to_tick(upper as f64, "upper_tick")?,
    ))
}

pub fn floor_to_spacing(tick: i32, tick_spacing: i32) -> i64 {
    let spacing = tick_spacing as i64;
    (tick as i64).div_euclid(spacing) * spacing
}

pub fn ceil_to_spacing(tick: i32, tick_spacing: i32) -> i64 {
    let spacing = tick_spacing as i64;
    let tick = tick as i64;
    if tick.rem_euclid(spacing) == 0 {
        tick
    } else {
        (tick.div_euclid(spacing) + 1) * spacing
    }
}

/// RangeClassifier: is the current tick inside the (unordered) range
pub fn is_in_range(current_tick: i32, range: &TickRange) -> bool {
    range.contains(current_tick)
}

fn ensure_positive_price(field: &str, value: f64) -> AprResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AprError::invalid_input(
            field,
            format!("must be a positive finite price, got {}", value),
        ))
    }
}

fn to_tick(value: f64, field: &str) -> AprResult<i32> {
    if value.is_finite() && value >= MIN_TICK as f64 && value <= MAX_TICK as f64 {
        Ok(value as i32)
    } else {
        Err(AprError::invalid_input(
            field,
            format!("tick {} is outside [{}, {}]", value, MIN_TICK, MAX_TICK),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_anchor() -> TickAnchor {
        TickAnchor {
            current_tick: -199000,
            current_price: 2150.0,
            tick_spacing: 60,
            token0_decimals: 18,
            token1_decimals: 6,
        }
    }

    #[test]
    fn test_reference_range_conversion() {
        let conversion =
            price_range_to_ticks(&reference_anchor(), 2083.95, 2235.04, TickModel::AnchoredLog)
                .unwrap();

        assert_eq!(conversion.raw, TickRange::new(-200007, -198190));
        assert_eq!(conversion.aligned, TickRange::new(-200040, -198180));
        assert_eq!(conversion.aligned.bin_count(60), 31);
        assert!(conversion.scale < 0.0);
        assert!(is_in_range(-199000, &conversion.aligned));
    }

    #[test]
    fn test_aligned_bounds_are_multiples_and_never_narrower() {
        let prices = [
            (100.0, 120.0),
            (1500.0, 1500.5),
            (2000.0, 2300.0),
            (2149.0, 2151.0),
            (3000.0, 9000.0),
        ];

        for spacing in [1, 10, 60, 200] {
            for &(lower, upper) in &prices {
                let anchor = TickAnchor {
                    tick_spacing: spacing,
                    ..reference_anchor()
                };
                let c = price_range_to_ticks(&anchor, lower, upper, TickModel::AnchoredLog)
                    .unwrap();
                assert_eq!(c.aligned.lower_tick % spacing, 0);
                assert_eq!(c.aligned.upper_tick % spacing, 0);
                assert!(c.aligned.min_tick() <= c.raw.min_tick());
                assert!(c.aligned.max_tick() >= c.raw.max_tick());
            }
        }
    }

    #[test]
    fn test_positive_tick_pool_still_aligns_outward() {
        // k > 0: the raw pair comes out reversed, alignment must still widen it
        let anchor = TickAnchor {
            current_tick: 46000,
            current_price: 99.5,
            tick_spacing: 60,
            token0_decimals: 18,
            token1_decimals: 18,
        };
        let c = price_range_to_ticks(&anchor, 90.0, 110.0, TickModel::AnchoredLog).unwrap();
        assert!(c.raw.lower_tick > c.raw.upper_tick);
        assert!(c.aligned.min_tick() <= c.raw.min_tick());
        assert!(c.aligned.max_tick() >= c.raw.max_tick());
        assert!(is_in_range(46000, &c.aligned));
    }

    #[test]
    fn test_exact_model_brackets_current_tick() {
        // 2150 USDC per WETH is tick ≈ -199,600 on the real grid
        let c = price_range_to_ticks(&reference_anchor(), 2100.0, 2200.0, TickModel::Exact)
            .unwrap();
        assert!(c.aligned.lower_tick < c.aligned.upper_tick);
        assert!(c.aligned.contains(-199_600));
        assert_eq!(c.aligned.lower_tick % 60, 0);
        assert_eq!(c.aligned.upper_tick % 60, 0);
    }

    #[test]
    fn test_invalid_prices_are_rejected() {
        let anchor = reference_anchor();
        for (lower, upper) in [(0.0, 2000.0), (2000.0, -1.0), (f64::NAN, 2000.0)] {
            let err = price_range_to_ticks(&anchor, lower, upper, TickModel::AnchoredLog)
                .unwrap_err();
            assert!(matches!(err, AprError::InvalidInput { .. }));
        }

        let bad_anchor = TickAnchor {
            current_price: 0.0,
            ..anchor
        };
        assert!(matches!(
            price_range_to_ticks(&bad_anchor, 2000.0, 2100.0, TickModel::AnchoredLog),
            Err(AprError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_non_positive_spacing_is_configuration_error() {
        for spacing in [0, -60] {
            let anchor = TickAnchor {
                tick_spacing: spacing,
                ..reference_anchor()
            };
            let err = price_range_to_ticks(&anchor, 2000.0, 2100.0, TickModel::AnchoredLog)
                .unwrap_err();
            assert!(matches!(err, AprError::InvalidConfiguration { .. }));
        }
    }

    #[test]
    fn test_unit_anchor_price() {
        assert!(anchored_scale(100, 1.0).is_err());
        assert_eq!(anchored_scale(0, 1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_spacing_rounding_for_negative_ticks() {
        assert_eq!(floor_to_spacing(-200007, 60), -200040);
        assert_eq!(ceil_to_spacing(-198190, 60), -198180);
        assert_eq!(floor_to_spacing(-120, 60), -120);
        assert_eq!(ceil_to_spacing(-120, 60), -120);
        assert_eq!(floor_to_spacing(61, 60), 60);
        assert_eq!(ceil_to_spacing(61, 60), 120);
    }

    #[test]
    fn test_range_classifier_is_order_independent() {
        let forward = TickRange::new(-200040, -198180);
        let reversed = TickRange::new(-198180, -200040);
        for tick in [-200100, -200040, -199000, -198180, -198000] {
            assert_eq!(is_in_range(tick, &forward), is_in_range(tick, &reversed));
        }
        assert!(is_in_range(-200040, &forward));
        assert!(is_in_range(-198180, &reversed));
        assert!(!is_in_range(-198179, &forward));
    }

    #[test]
    fn test_bin_count() {
        let range = TickRange::new(-198180, -200040);
        assert_eq!(range.tick_width(), 1860);
        assert_eq!(range.bin_count(60), 31);
        assert_eq!(range.bin_count(0), 0);
        assert_eq!(TickRange::new(600, 600).bin_count(60), 0);
    }
}
