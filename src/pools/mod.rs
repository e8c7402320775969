/// Pool data: snapshot types, fee-tier constants, and the data source seam

pub mod constants;
pub mod source;
pub mod types;

pub use constants::*;
pub use source::{fetch_pool_inputs, PoolDataSource, PoolInputs};
pub use types::{
    average_daily_fees, tick_spacing_for_fee_tier, HistoricalFeeSample, PoolState, TokenInfo,
};
