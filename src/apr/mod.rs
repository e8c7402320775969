/// APR estimation pipeline
///
/// ticks -> range classification -> fee APR + emissions APR -> report
pub mod emissions;
pub mod fees;
pub mod report;
pub mod ticks;

pub use emissions::{EmissionsEstimator, EmissionsPolicy, ReferencePoint};
pub use fees::{estimate_fee_apr, resolve_daily_fees, DailyFees, FeeApr, FeeAprInputs, FeeSource};
pub use report::{
    estimate_for_pool, estimate_position_apr, AprReport, FeeSummary, PoolSummary, PositionSummary,
};
pub use ticks::{
    align_outward, anchored_scale, is_in_range, price_range_to_ticks, TickAnchor, TickConversion,
    TickModel, TickRange,
};
