/// Shared HTTP plumbing: rate limiting and a timeout-bound reqwest client
use crate::errors::{AprError, AprResult};
use reqwest::Client;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

/// Caps request starts at `max_per_minute` on average
///
/// Up to `burst` requests may be in flight and start back to back; the
/// `burst`-th previous start must be at least `burst × 60s / max_per_minute`
/// old before another one begins. A burst of 1 spaces every request evenly.
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    recent_starts: Arc<Mutex<VecDeque<Instant>>>,
    min_interval: Duration,
    max_per_minute: usize,
    burst: usize,
}

impl RateLimiter {
    /// One request at a time; `0` disables spacing
    pub fn new(max_per_minute: usize) -> Self {
        Self::with_burst(max_per_minute, 1)
    }

    /// `burst` is clamped to at least 1
    pub fn with_burst(max_per_minute: usize, burst: usize) -> Self {
        let burst = burst.max(1);
        let min_interval = if max_per_minute > 0 {
            Duration::from_secs_f64(60.0 / max_per_minute as f64)
        } else {
            Duration::ZERO
        };

        Self {
            semaphore: Arc::new(Semaphore::new(burst)),
            recent_starts: Arc::new(Mutex::new(VecDeque::with_capacity(burst))),
            min_interval,
            max_per_minute,
            burst,
        }
    }

    /// Wait for a slot; the returned guard holds it until dropped
    pub async fn acquire(&self) -> AprResult<RateLimitGuard> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AprError::transport("rate_limiter", format!("permit closed: {}", e)))?;

        if !self.min_interval.is_zero() {
            let window = self.min_interval * self.burst as u32;
            let mut recent = self.recent_starts.lock().await;
            if recent.len() >= self.burst {
                if let Some(oldest) = recent.pop_front() {
                    let elapsed = oldest.elapsed();
                    if elapsed < window {
                        tokio::time::sleep(window - elapsed).await;
                    }
                }
            }
            recent.push_back(Instant::now());
        }

        Ok(RateLimitGuard { _permit: permit })
    }

    pub fn max_per_minute(&self) -> usize {
        self.max_per_minute
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn burst(&self) -> usize {
        self.burst
    }
}

/// RAII guard returned by [`RateLimiter::acquire`]
pub struct RateLimitGuard {
    _permit: OwnedSemaphorePermit,
}

/// reqwest client with a fixed per-request timeout
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> AprResult<Self> {
        if timeout_secs == 0 {
            return Err(AprError::invalid_configuration(
                "subgraph.timeout_secs",
                "timeout must be greater than zero",
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AprError::transport("http_client", format!("failed to build: {}", e)))?;

        Ok(Self {
            client,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_interval() {
        assert_eq!(RateLimiter::new(60).min_interval(), Duration::from_secs(1));
        assert_eq!(RateLimiter::new(120).min_interval(), Duration::from_millis(500));
        assert!(RateLimiter::new(0).min_interval().is_zero());
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(600);
        let start = Instant::now();
        drop(limiter.acquire().await.unwrap());
        drop(limiter.acquire().await.unwrap());
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_rate_limiter_burst_lets_paired_reads_overlap() {
        let limiter = RateLimiter::with_burst(600, 2);
        assert_eq!(limiter.burst(), 2);

        let start = Instant::now();
        let (first, second) = tokio::join!(limiter.acquire(), limiter.acquire());
        assert!(start.elapsed() < Duration::from_millis(100));
        drop((first.unwrap(), second.unwrap()));

        // Third start waits until the first is a full window (2 x 100ms) old
        drop(limiter.acquire().await.unwrap());
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[test]
    fn test_zero_burst_is_clamped() {
        assert_eq!(RateLimiter::with_burst(60, 0).burst(), 1);
    }

    #[test]
    fn test_http_client_rejects_zero_timeout() {
        assert!(matches!(
            HttpClient::new(0),
            Err(AprError::InvalidConfiguration { .. })
        ));
        assert_eq!(HttpClient::new(5).unwrap().timeout(), Duration::from_secs(5));
    }
}
