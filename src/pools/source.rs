/// Pool data source abstraction
///
/// The estimator only needs two reads: the current pool snapshot and a short
/// window of daily fee history. Both are independent, so they are issued
/// concurrently and awaited together before any estimation starts.
use crate::errors::AprResult;
use crate::logger::{self, LogTag};
use crate::pools::types::{HistoricalFeeSample, PoolState};
use async_trait::async_trait;

#[async_trait]
pub trait PoolDataSource: Send + Sync {
    /// Fails with `DataUnavailable` when the pool is unknown, `Transport` otherwise
    async fn get_pool_state(&self, pool_id: &str) -> AprResult<PoolState>;

    /// Newest-first, at most `days` entries, possibly empty
    async fn get_historical_fees(
        &self,
        pool_id: &str,
        days: u32,
    ) -> AprResult<Vec<HistoricalFeeSample>>;
}

/// Everything the estimator needs from the data source
#[derive(Debug, Clone)]
pub struct PoolInputs {
    pub pool: PoolState,
    pub fee_samples: Vec<HistoricalFeeSample>,
}

/// Fetch pool state and fee history concurrently
///
/// The subgraph client's limiter allows a burst of two by default, so both
/// reads are in flight together.
///
/// A missing pool is fatal. A failed history read is not: it degrades to an
/// empty window so the estimator falls back to the pool-level fee figure.
pub async fn fetch_pool_inputs(
    source: &dyn PoolDataSource,
    pool_id: &str,
    days: u32,
) -> AprResult<PoolInputs> {
    let (pool_result, history_result) = tokio::join!(
        source.get_pool_state(pool_id),
        source.get_historical_fees(pool_id, days)
    );

    let pool = pool_result?;

    let fee_samples = match history_result {
        Ok(samples) => samples,
        Err(e) => {
            logger::warning(
                LogTag::Subgraph,
                &format!("Historical fee data unavailable for {}: {}", pool_id, e),
            );
            Vec::new()
        }
    };

    logger::debug(
        LogTag::Subgraph,
        &format!(
            "Fetched {} (tick {}, price {:.4}) with {} day(s) of fee history",
            pool.id,
            pool.current_tick,
            pool.current_price,
            fee_samples.len()
        ),
    );

    Ok(PoolInputs { pool, fee_samples })
}


#[cfg(test)]
mod tests {
    use super::testing::{reference_pool, StaticPoolSource};
    use super::*;
    use crate::errors::AprError;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::Ordering;

    fn history(days: usize) -> Vec<HistoricalFeeSample> {
        (0..days)
            .map(|d| HistoricalFeeSample {
                date: Utc.timestamp_opt(1_700_000_000 - d as i64 * 86_400, 0).unwrap(),
                fees_usd: 1500.0,
                volume_usd: 5_000_000.0,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_pool_inputs_issues_both_reads() {
        let source = StaticPoolSource::new(Some(reference_pool()), Ok(history(10)));
        let inputs = fetch_pool_inputs(&source, "0xpool", 7).await.unwrap();

        assert_eq!(inputs.pool.current_tick, -199000);
        assert_eq!(inputs.fee_samples.len(), 7);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_pool_is_unavailable() {
        let source = StaticPoolSource::new(None, Ok(history(7)));
        let err = fetch_pool_inputs(&source, "0xdead", 7).await.unwrap_err();
        assert!(err.is_unavailable());
        assert!(matches!(err, AprError::DataUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_history_failure_degrades_to_empty_window() {
        let source = StaticPoolSource::new(
            Some(reference_pool()),
            Err(AprError::transport("gateway", "connection reset")),
        );
        let inputs = fetch_pool_inputs(&source, "0xpool", 7).await.unwrap();
        assert!(inputs.fee_samples.is_empty());
    }
}
