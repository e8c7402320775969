/// Pool constants: fee tiers and their tick spacings

/// Fee tiers in hundredths of a basis point (3000 = 0.3%) with tick spacing
pub const FEE_TIER_TICK_SPACINGS: [(u32, i32); 4] = [
    (100, 1),     // 0.01%
    (500, 10),    // 0.05%
    (3000, 60),   // 0.3%
    (10000, 200), // 1%
];

/// Fee tier units per percent
pub const FEE_TIER_UNITS_PER_PERCENT: f64 = 10_000.0;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Tick spacing for a known fee tier
pub fn known_tick_spacing(fee_tier: u32) -> Option<i32> {
    FEE_TIER_TICK_SPACINGS
        .iter()
        .find(|(tier, _)| *tier == fee_tier)
        .map(|(_, spacing)| *spacing)
}
