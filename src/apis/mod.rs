/// External data APIs
///
/// - `client`: rate limiter and timeout-bound HTTP client shared by API clients
/// - `stats`: per-client request statistics
/// - `subgraph`: GraphQL indexer client, the production `PoolDataSource`
pub mod client;
pub mod stats;
pub mod subgraph;

pub use client::{HttpClient, RateLimiter};
pub use stats::{ApiStats, ApiStatsTracker};
pub use subgraph::SubgraphClient;
