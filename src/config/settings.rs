use crate::api::rate_limiter::QuotaConfig;
use crate::error::{DexError, Result};
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.dexscreener.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub user_agent: String,
    pub token_pool_limit: u32,
    pub token_pool_window_ms: u64,
    pub pair_pool_limit: u32,
    pub pair_pool_window_ms: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: 10_000,
            user_agent: format!("dexscreener-mcp/{}", env!("CARGO_PKG_VERSION")),
            token_pool_limit: 60,
            token_pool_window_ms: 60_000,
            pair_pool_limit: 300,
            pair_pool_window_ms: 60_000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            base_url: env::var("DEXSCREENER_BASE_URL").unwrap_or(defaults.base_url),
            request_timeout_ms: env::var("DEXSCREENER_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_ms),
            user_agent: env::var("DEXSCREENER_USER_AGENT").unwrap_or(defaults.user_agent),
            token_pool_limit: env::var("TOKEN_POOL_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.token_pool_limit),
            token_pool_window_ms: env::var("TOKEN_POOL_WINDOW_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.token_pool_window_ms),
            pair_pool_limit: env::var("PAIR_POOL_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.pair_pool_limit),
            pair_pool_window_ms: env::var("PAIR_POOL_WINDOW_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.pair_pool_window_ms),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }

    /// Quota for profiles, boosts and orders.
    pub fn token_pool(&self) -> QuotaConfig {
        QuotaConfig::new(
            self.token_pool_limit,
            Duration::from_millis(self.token_pool_window_ms),
        )
    }

    /// Quota for pair lookup and search.
    pub fn pair_pool(&self) -> QuotaConfig {
        QuotaConfig::new(
            self.pair_pool_limit,
            Duration::from_millis(self.pair_pool_window_ms),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn parsed_base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url).map_err(|e| {
            DexError::ConfigError(format!("invalid base URL '{}': {}", self.base_url, e))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.parsed_base_url()?;
        self.token_pool().validate("token_metadata")?;
        self.pair_pool().validate("pair_data")?;
        if self.request_timeout_ms == 0 {
            return Err(DexError::ConfigError(
                "DEXSCREENER_TIMEOUT_MS must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn log_settings(&self) {
        log::info!(
            "Configuration loaded: base_url={}, timeout={}ms, token pool={}/{}ms, pair pool={}/{}ms",
            self.base_url,
            self.request_timeout_ms,
            self.token_pool_limit,
            self.token_pool_window_ms,
            self.pair_pool_limit,
            self.pair_pool_window_ms
        );
    }
}
