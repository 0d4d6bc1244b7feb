// src/api/rate_limiter.rs
//! Sliding-window quota pools for the DexScreener API.
//!
//! Each pool counts the requests issued in the trailing `window` ending "now"
//! and suspends callers once `limit` requests are in flight for that window.
//! Pools are independent: saturating one never delays admission on another.

use crate::config::Config;
use crate::error::{DexError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Upper bound on the history slots reserved when a pool is created.
const MAX_PREALLOCATED: u32 = 1024;

/// The independent rate budgets exposed by the upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    /// Token profiles, boosts and orders
    TokenMetadata,
    /// Pair lookup by address, by token and search
    PairData,
}

impl PoolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolKind::TokenMetadata => "token_metadata",
            PoolKind::PairData => "pair_data",
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Limit and window for one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaConfig {
    pub limit: u32,
    pub window: Duration,
}

impl QuotaConfig {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window }
    }

    /// A zero limit would block forever and a zero window would never block,
    /// so both are rejected up front.
    pub fn validate(&self, pool: &str) -> Result<()> {
        if self.limit == 0 {
            return Err(DexError::ConfigError(format!(
                "quota pool '{}' has a limit of 0 and would never admit a request",
                pool
            )));
        }
        if self.window.is_zero() {
            return Err(DexError::ConfigError(format!(
                "quota pool '{}' has an empty window",
                pool
            )));
        }
        Ok(())
    }
}

/// One sliding-window rate budget.
#[derive(Debug)]
pub struct QuotaPool {
    name: String,
    config: QuotaConfig,
    /// Serializes admission checks; tokio's mutex wakes waiters in FIFO order.
    turnstile: tokio::sync::Mutex<()>,
    /// Admission timestamps inside the trailing window, oldest first.
    observed: Mutex<VecDeque<Instant>>,
}

impl QuotaPool {
    pub fn new(name: impl Into<String>, config: QuotaConfig) -> Result<Self> {
        let name = name.into();
        config.validate(&name)?;

        info!(
            "Initializing quota pool {}: {} requests per {:?}",
            name, config.limit, config.window
        );

        Ok(Self {
            name,
            config,
            turnstile: tokio::sync::Mutex::new(()),
            observed: Mutex::new(VecDeque::with_capacity(
                config.limit.min(MAX_PREALLOCATED) as usize,
            )),
        })
    }

    /// Suspends until a request may proceed, then records it against the window.
    ///
    /// If the future is dropped while waiting nothing is recorded. Once this
    /// returns the timestamp counts against the window regardless of what the
    /// caller does with the request.
    pub async fn admit(&self) {
        let _turn = self.turnstile.lock().await;

        loop {
            let wait = {
                let mut observed = self.observed.lock().unwrap_or_else(PoisonError::into_inner);
                let now = Instant::now();
                Self::evict(&mut observed, now, self.config.window);

                if observed.len() < self.config.limit as usize {
                    observed.push_back(now);
                    return;
                }

                match observed.front() {
                    Some(oldest) => self.config.window - now.duration_since(*oldest),
                    None => Duration::ZERO,
                }
            };

            debug!(
                "Quota pool {} saturated ({} requests), waiting {:?}",
                self.name, self.config.limit, wait
            );
            sleep(wait).await;
        }
    }

    /// Current window occupancy.
    pub fn usage(&self) -> PoolUsage {
        let mut observed = self.observed.lock().unwrap_or_else(PoisonError::into_inner);
        Self::evict(&mut observed, Instant::now(), self.config.window);

        PoolUsage {
            pool: self.name.clone(),
            in_window: observed.len() as u32,
            limit: self.config.limit,
            window: self.config.window,
        }
    }

    fn evict(observed: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(front) = observed.front() {
            if now.duration_since(*front) >= window {
                observed.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Snapshot of a pool's occupancy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolUsage {
    pub pool: String,
    pub in_window: u32,
    pub limit: u32,
    pub window: Duration,
}

impl fmt::Display for PoolUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} per {:?}",
            self.pool, self.in_window, self.limit, self.window
        )
    }
}

/// The pools used by the dispatcher, one per [`PoolKind`].
#[derive(Debug)]
pub struct QuotaPools {
    token_metadata: QuotaPool,
    pair_data: QuotaPool,
}

impl QuotaPools {
    pub fn new(token_metadata: QuotaConfig, pair_data: QuotaConfig) -> Result<Self> {
        Ok(Self {
            token_metadata: QuotaPool::new(PoolKind::TokenMetadata.as_str(), token_metadata)?,
            pair_data: QuotaPool::new(PoolKind::PairData.as_str(), pair_data)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.token_pool(), config.pair_pool())
    }

    pub fn get(&self, kind: PoolKind) -> &QuotaPool {
        match kind {
            PoolKind::TokenMetadata => &self.token_metadata,
            PoolKind::PairData => &self.pair_data,
        }
    }

    pub async fn admit(&self, kind: PoolKind) {
        self.get(kind).admit().await
    }

    pub fn usage(&self) -> Vec<PoolUsage> {
        vec![self.token_metadata.usage(), self.pair_data.usage()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::timeout;

    fn pool(limit: u32, window_ms: u64) -> Arc<QuotaPool> {
        Arc::new(
            QuotaPool::new("test", QuotaConfig::new(limit, Duration::from_millis(window_ms)))
                .unwrap(),
        )
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = QuotaPool::new("test", QuotaConfig::new(0, Duration::from_secs(1))).unwrap_err();
        assert!(matches!(err, DexError::ConfigError(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn huge_limit_does_not_reserve_history_up_front() {
        let pool = pool(u32::MAX, 1_000);
        pool.admit().await;
        assert_eq!(pool.usage().in_window, 1);
        assert_eq!(pool.usage().limit, u32::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn admits_up_to_limit_without_waiting() {
        let pool = pool(3, 1_000);
        let start = Instant::now();
        for _ in 0..3 {
            pool.admit().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(pool.usage().in_window, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn third_call_waits_for_the_window() {
        let pool = pool(2, 1_000);
        let start = Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    pool.admit().await;
                    start.elapsed()
                })
            })
            .collect();

        let mut elapsed = Vec::new();
        for handle in handles {
            elapsed.push(handle.await.unwrap());
        }
        elapsed.sort();

        assert_eq!(elapsed[0], Duration::ZERO);
        assert_eq!(elapsed[1], Duration::ZERO);
        assert_eq!(elapsed[2], Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_is_measured_from_the_oldest_timestamp() {
        let pool = pool(2, 1_000);
        let start = Instant::now();

        pool.admit().await;
        sleep(Duration::from_millis(400)).await;
        pool.admit().await;
        pool.admit().await;

        assert_eq!(start.elapsed(), Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn never_exceeds_limit_in_any_trailing_window() {
        let pool = pool(3, 500);
        let start = Instant::now();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    pool.admit().await;
                    start.elapsed()
                })
            })
            .collect();

        let mut admitted = Vec::new();
        for handle in handles {
            admitted.push(handle.await.unwrap());
        }
        admitted.sort();

        for (i, t) in admitted.iter().enumerate() {
            let in_window = admitted[i..]
                .iter()
                .take_while(|other| **other < *t + Duration::from_millis(500))
                .count();
            assert!(in_window <= 3, "{} admissions within 500ms of {:?}", in_window, t);
        }
        assert_eq!(*admitted.last().unwrap(), Duration::from_millis(1_500));
    }

    #[tokio::test(start_paused = true)]
    async fn saturated_pool_does_not_block_other_pool() {
        let pools = Arc::new(
            QuotaPools::new(
                QuotaConfig::new(1, Duration::from_secs(60)),
                QuotaConfig::new(1, Duration::from_secs(60)),
            )
            .unwrap(),
        );

        pools.admit(PoolKind::TokenMetadata).await;

        let blocked = {
            let pools = pools.clone();
            tokio::spawn(async move { pools.admit(PoolKind::TokenMetadata).await })
        };
        tokio::task::yield_now().await;

        let start = Instant::now();
        pools.admit(PoolKind::PairData).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(!blocked.is_finished());

        blocked.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_waiter_records_nothing() {
        let pool = pool(1, 1_000);
        pool.admit().await;

        let waited = timeout(Duration::from_millis(100), pool.admit()).await;
        assert!(waited.is_err());
        assert_eq!(pool.usage().in_window, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn usage_evicts_expired_timestamps() {
        let pool = pool(5, 1_000);
        pool.admit().await;
        pool.admit().await;
        sleep(Duration::from_millis(1_000)).await;

        let usage = pool.usage();
        assert_eq!(usage.in_window, 0);
        assert_eq!(usage.to_string(), "test: 0/5 per 1s");
    }
}
