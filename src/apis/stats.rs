/// Per-client request statistics
use crate::logger::{self, LogTag};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

/// Snapshot of a client's request counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApiStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time_ms: f64,
    pub last_request_time: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl ApiStats {
    /// Percent of requests that succeeded, 0 before the first request
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.successful_requests as f64 / self.total_requests as f64 * 100.0
    }
}

/// Thread-safe accumulator behind [`ApiStats`]
pub struct ApiStatsTracker {
    inner: Mutex<ApiStats>,
}

impl ApiStatsTracker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ApiStats::default()),
        }
    }

    pub async fn record_request(&self, success: bool, elapsed_ms: f64) {
        let mut stats = self.inner.lock().await;
        let previous = stats.total_requests as f64;
        stats.total_requests += 1;
        if success {
            stats.successful_requests += 1;
        } else {
            stats.failed_requests += 1;
        }
        // Running mean over all requests
        stats.average_response_time_ms =
            (stats.average_response_time_ms * previous + elapsed_ms) / stats.total_requests as f64;
        stats.last_request_time = Some(Utc::now());
    }

    /// Remember the error and log it under the API tag
    pub async fn record_error_with_event(&self, api: &str, endpoint: &str, message: String) {
        logger::warning(
            LogTag::Api,
            &format!("{} request to {} failed: {}", api, endpoint, message),
        );
        let mut stats = self.inner.lock().await;
        stats.last_error = Some(message);
    }

    pub async fn get_stats(&self) -> ApiStats {
        self.inner.lock().await.clone()
    }
}

impl Default for ApiStatsTracker {
    fn default() -> Self {
        Self::new()
    }
}
