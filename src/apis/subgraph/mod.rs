/// Uniswap-v3-style subgraph client (The Graph gateway)
///
/// Queries implemented:
/// 1. `pool(id)` - current pool snapshot (tick, prices, fee tier, TVL, fees)
/// 2. `poolDayDatas(first, orderBy: date, orderDirection: desc, where: {pool, date_gt})`
///    - daily fee history, newest first
pub mod types;

pub use self::types::{
    GraphQlResponse, PoolDayDatasData, PoolQueryData, SubgraphPool, SubgraphPoolDayData,
};

use crate::apis::client::{HttpClient, RateLimiter};
use crate::apis::stats::{ApiStats, ApiStatsTracker};
use crate::config::SubgraphConfig;
use crate::errors::{AprError, AprResult};
use crate::logger::{self, LogTag};
use crate::pools::constants::SECONDS_PER_DAY;
use crate::pools::source::PoolDataSource;
use crate::pools::types::{HistoricalFeeSample, PoolState};
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

const API_NAME: &str = "Subgraph";

const POOL_QUERY: &str = r#"
query Pool($id: ID!) {
  pool(id: $id) {
    id
    feeTier
    liquidity
    sqrtPrice
    tick
    feesUSD
    token0 { id symbol decimals }
    token1 { id symbol decimals }
    token0Price
    token1Price
    totalValueLockedUSD
  }
}
"#;

const POOL_DAY_DATAS_QUERY: &str = r#"
query PoolDayDatas($pool: String!, $first: Int!, $since: Int!) {
  poolDayDatas(
    first: $first
    orderBy: date
    orderDirection: desc
    where: { pool: $pool, date_gt: $since }
  ) {
    date
    feesUSD
    volumeUSD
  }
}
"#;

/// GraphQL client with rate limiting and stats tracking
pub struct SubgraphClient {
    http: HttpClient,
    endpoint: String,
    rate_limiter: RateLimiter,
    stats: Arc<ApiStatsTracker>,
    default_tick_spacing: i32,
}

impl SubgraphClient {
    /// Fails with `InvalidConfiguration` when no API key is configured
    pub fn new(config: &SubgraphConfig, default_tick_spacing: i32) -> AprResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AprError::invalid_configuration(
                "subgraph.api_key",
                "no API key configured (set SUBGRAPH_API_KEY or pass --api-key)",
            ));
        }

        Ok(Self {
            http: HttpClient::new(config.timeout_secs)?,
            endpoint: config.endpoint_url(),
            rate_limiter: RateLimiter::with_burst(
                config.rate_limit_per_minute,
                config.max_concurrent_requests,
            ),
            stats: Arc::new(ApiStatsTracker::new()),
            default_tick_spacing,
        })
    }

    pub async fn get_stats(&self) -> ApiStats {
        self.stats.get_stats().await
    }

    /// POST a GraphQL query and decode `data` into `T`
    pub async fn query<T>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> AprResult<T>
    where
        T: DeserializeOwned,
    {
        let guard = self.rate_limiter.acquire().await?;

        if logger::is_debug_enabled(LogTag::Api) {
            logger::debug(
                LogTag::Api,
                &format!("{} {} variables={}", API_NAME, operation, variables),
            );
        }

        logger::verbose(
            LogTag::Api,
            &format!(
                "{} {} query: {}",
                API_NAME,
                operation,
                query.split_whitespace().collect::<Vec<_>>().join(" ")
            ),
        );

        let start = Instant::now();
        let response_result = self
            .http
            .client()
            .post(&self.endpoint)
            .timeout(self.http.timeout())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await;
        drop(guard);
        let elapsed = start.elapsed().as_millis() as f64;

        let response = match response_result {
            Ok(response) => response,
            Err(err) => {
                self.record_failure(operation, elapsed, format!("Request failed: {}", err))
                    .await;
                return Err(AprError::transport(operation, err.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("HTTP {}: {}", status, body);
            self.record_failure(operation, elapsed, message.clone()).await;
            return Err(AprError::transport(operation, message));
        }

        let body = match response.json::<GraphQlResponse<T>>().await {
            Ok(body) => body,
            Err(err) => {
                self.record_failure(operation, elapsed, format!("Parse error: {}", err))
                    .await;
                return Err(AprError::parse(operation, err.to_string()));
            }
        };

        match body.into_result(operation) {
            Ok(data) => {
                self.stats.record_request(true, elapsed).await;
                if logger::is_debug_enabled(LogTag::Api) {
                    logger::debug(
                        LogTag::Api,
                        &format!("{} {} completed in {:.0}ms", API_NAME, operation, elapsed),
                    );
                }
                Ok(data)
            }
            Err(err) => {
                self.record_failure(operation, elapsed, err.to_string()).await;
                Err(err)
            }
        }
    }

    async fn record_failure(&self, operation: &str, elapsed_ms: f64, message: String) {
        self.stats.record_request(false, elapsed_ms).await;
        self.stats
            .record_error_with_event(API_NAME, operation, message)
            .await;
    }

    /// Raw pool entity, `None` when the subgraph has no such pool
    pub async fn fetch_pool(&self, pool_id: &str) -> AprResult<Option<SubgraphPool>> {
        let id = pool_id.to_lowercase();
        logger::debug(LogTag::Subgraph, &format!("Fetching pool {}", id));

        let data: PoolQueryData = self.query("pool", POOL_QUERY, json!({ "id": id })).await?;
        Ok(data.pool)
    }

    /// Day data for the last `days` days, newest first
    pub async fn fetch_pool_day_datas(
        &self,
        pool_id: &str,
        days: u32,
    ) -> AprResult<Vec<SubgraphPoolDayData>> {
        if days == 0 {
            return Ok(Vec::new());
        }

        let id = pool_id.to_lowercase();
        let since = Utc::now().timestamp() - days as i64 * SECONDS_PER_DAY;

        let data: PoolDayDatasData = self
            .query(
                "poolDayDatas",
                POOL_DAY_DATAS_QUERY,
                json!({ "pool": id, "first": days, "since": since }),
            )
            .await?;

        if data.pool_day_datas.is_empty() {
            logger::info(
                LogTag::Subgraph,
                &format!("No fee history for {} in the last {} days", id, days),
            );
        }
        Ok(data.pool_day_datas)
    }
}

#[async_trait]
impl PoolDataSource for SubgraphClient {
    async fn get_pool_state(&self, pool_id: &str) -> AprResult<PoolState> {
        match self.fetch_pool(pool_id).await? {
            Some(pool) => pool.into_pool_state(self.default_tick_spacing),
            None => Err(AprError::data_unavailable(
                format!("pool {}", pool_id.to_lowercase()),
                "not found in subgraph",
            )),
        }
    }

    async fn get_historical_fees(
        &self,
        pool_id: &str,
        days: u32,
    ) -> AprResult<Vec<HistoricalFeeSample>> {
        let day_datas = self.fetch_pool_day_datas(pool_id, days).await?;
        let samples = day_datas
            .into_iter()
            .map(SubgraphPoolDayData::into_sample)
            .collect::<AprResult<Vec<_>>>()?;

        if !samples.is_empty() {
            let average = crate::pools::types::average_daily_fees(&samples);
            logger::info(
                LogTag::Subgraph,
                &format!(
                    "Historical daily fees: ${:.2} (based on {} days)",
                    average,
                    samples.len()
                ),
            );
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let config = SubgraphConfig::default();
        assert!(matches!(
            SubgraphClient::new(&config, 60),
            Err(AprError::InvalidConfiguration { .. })
        ));
    }

    #[tokio::test]
    async fn test_client_builds_with_key() {
        let config = SubgraphConfig {
            api_key: "test-key".to_string(),
            ..SubgraphConfig::default()
        };
        let client = SubgraphClient::new(&config, 60).unwrap();
        assert!(client.endpoint.contains("/test-key/subgraphs/id/"));
        // Pool state and fee history are requested together
        assert_eq!(client.rate_limiter.burst(), 2);
        assert_eq!(client.get_stats().await.total_requests, 0);
    }

    #[test]
    fn test_queries_name_the_fields_they_decode() {
        for field in ["feeTier", "tick", "token1Price", "totalValueLockedUSD", "feesUSD"] {
            assert!(POOL_QUERY.contains(field));
        }
        assert!(POOL_DAY_DATAS_QUERY.contains("date_gt"));
        assert!(POOL_DAY_DATAS_QUERY.contains("orderDirection: desc"));
    }
}
