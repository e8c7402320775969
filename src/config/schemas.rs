/// Configuration schemas - all config structures defined once with defaults
use crate::apr::emissions::{EmissionsPolicy, ReferencePoint};
use crate::apr::ticks::TickModel;
use crate::config_struct;

/// WETH/USDC pool the reference observations were taken from
pub const DEFAULT_POOL_ADDRESS: &str = "0xb2cc224c1c9feE385f8ad6a55b4d94E92359DC59";

/// Subgraph indexing the default pool, served through The Graph gateway
pub const DEFAULT_SUBGRAPH_ID: &str = "GENunSHWLBXm59mBSgPzQ8metBEp9YDfdqwFr91Av1UM";

pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.thegraph.com/api";

/// Reference observations read off the pool's frontend for two ranges
pub fn default_references() -> Vec<ReferencePoint> {
    vec![
        ReferencePoint::observed(2002.24, 2303.1, 300.86, 149.62),
        ReferencePoint::observed(2083.95, 2235.04, 151.09, 299.24),
    ]
}

// ============================================================================
// SUBGRAPH CONFIGURATION
// ============================================================================

config_struct! {
    /// Indexing service (The Graph gateway) access
    pub struct SubgraphConfig {
        gateway_url: String = DEFAULT_GATEWAY_URL.to_string(),
        /// Overridden by SUBGRAPH_API_KEY or --api-key
        api_key: String = String::new(),
        subgraph_id: String = DEFAULT_SUBGRAPH_ID.to_string(),
        timeout_secs: u64 = 15,
        /// 0 disables client-side rate limiting
        rate_limit_per_minute: usize = 60,
        /// Requests allowed in flight and starting back to back
        max_concurrent_requests: usize = 2,
    }
}

impl SubgraphConfig {
    /// `{gateway}/{api_key}/subgraphs/id/{subgraph_id}`
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/{}/subgraphs/id/{}",
            self.gateway_url.trim_end_matches('/'),
            self.api_key,
            self.subgraph_id
        )
    }
}

// ============================================================================
// ESTIMATOR CONFIGURATION
// ============================================================================

config_struct! {
    /// Constants and calibration data passed into the estimators
    pub struct EstimatorConfig {
        days_per_year: f64 = 365.0,
        /// Historical window requested from the indexer
        history_days: u32 = 7,
        /// The pool-level fee figure is treated as a total over this many days
        fallback_fee_period_days: f64 = 7.0,
        /// Used when the fee tier is not one of the known tiers
        default_tick_spacing: i32 = 60,
        tick_model: TickModel = TickModel::AnchoredLog,
        emissions_policy: EmissionsPolicy = EmissionsPolicy::Interpolated,
        /// Table for the interpolated policy
        references: Vec<ReferencePoint> = default_references(),
        /// Single reference for the proportional policy
        proportional_reference: ReferencePoint = ReferencePoint::new(151.09, 299.24),
    }
}

// ============================================================================
// POSITION DEFAULTS
// ============================================================================

config_struct! {
    /// Position evaluated when the command line does not name one
    pub struct PositionConfig {
        pool_address: String = DEFAULT_POOL_ADDRESS.to_string(),
        lower_price_usd: f64 = 2083.95,
        upper_price_usd: f64 = 2235.04,
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

config_struct! {
    /// Root configuration structure containing all sub-configurations
    pub struct Config {
        subgraph: SubgraphConfig = SubgraphConfig::default(),
        estimator: EstimatorConfig = EstimatorConfig::default(),
        position: PositionConfig = PositionConfig::default(),
    }
}
