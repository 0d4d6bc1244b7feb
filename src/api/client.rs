// src/api/client.rs
//! HTTP client for the DexScreener API.
//!
//! Every call resolves its URL, waits for admission on its quota pool, issues a
//! single GET and turns the outcome into a decoded payload or a [`DexError`].
//! There are no retries and no response caching at this layer.

use crate::api::rate_limiter::{PoolKind, QuotaPools};
use crate::config::Config;
use crate::error::{DexError, Result};
use crate::utils::log_timed_request;
use log::{debug, warn};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::error::Error as StdError;
use std::sync::Arc;
use url::Url;

const FALLBACK_ERROR_MESSAGE: &str = "API request failed";

/// A resolved path plus ordered query parameters for one upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl UpstreamRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Substitutes `{name}` placeholders in `template`. Values are inserted
    /// verbatim; callers supply well-formed identifiers.
    pub fn from_template(template: &str, params: &[(&str, &str)]) -> Self {
        let path = params
            .iter()
            .fold(template.to_string(), |path, (name, value)| {
                path.replace(&format!("{{{}}}", name), value)
            });
        Self::new(path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Resolves against `base`, keeping any path prefix the base carries.
    pub fn url(&self, base: &Url) -> Result<Url> {
        let joined = format!("{}{}", base.as_str().trim_end_matches('/'), self.path);
        let mut url = Url::parse(&joined)
            .map_err(|e| DexError::NetworkError(format!("invalid request URL '{}': {}", joined, e)))?;

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

/// Raw result of one HTTP exchange: either the status and body, or the
/// transport failure that prevented a complete response.
pub type RawOutcome = std::result::Result<(StatusCode, Vec<u8>), reqwest::Error>;

#[derive(Debug, Clone)]
pub struct DexScreenerClient {
    http: reqwest::Client,
    base_url: Url,
    pools: Arc<QuotaPools>,
}

impl DexScreenerClient {
    pub fn new(config: &Config, pools: Arc<QuotaPools>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DexError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::with_http(http, config.parsed_base_url()?, pools))
    }

    pub fn with_http(http: reqwest::Client, base_url: Url, pools: Arc<QuotaPools>) -> Self {
        Self {
            http,
            base_url,
            pools,
        }
    }

    pub fn pools(&self) -> &Arc<QuotaPools> {
        &self.pools
    }

    /// Issues `request` through `pool` and decodes the body as `T`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        request: &UpstreamRequest,
        pool: PoolKind,
    ) -> Result<T> {
        let url = request.url(&self.base_url)?;

        self.pools.admit(pool).await;

        debug!("GET {} ({} pool)", url, pool);
        let label = format!("GET {}", request.path);
        let outcome = log_timed_request(&label, self.fetch(url)).await;

        classify(outcome).map_err(|e| {
            warn!("{} failed: {}", label, e);
            e
        })
    }

    async fn fetch(&self, url: Url) -> RawOutcome {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok((status, body.to_vec()))
    }
}

/// Turns a raw HTTP outcome into a decoded payload or a classified error.
/// This is the only place transport and HTTP failures become [`DexError`]s.
pub fn classify<T: DeserializeOwned>(outcome: RawOutcome) -> Result<T> {
    let (status, body) = outcome.map_err(|e| DexError::NetworkError(error_chain(&e)))?;

    if !status.is_success() {
        return Err(DexError::UpstreamError {
            status: status.as_u16(),
            message: upstream_message(status, &body),
        });
    }

    serde_json::from_slice(&body).map_err(|e| DexError::DecodeError(e.to_string()))
}

/// Message for a non-success response: the JSON body's `message` field, else
/// the status reason phrase, else a generic fallback.
fn upstream_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .map(String::from)
        })
        .or_else(|| status.canonical_reason().map(String::from))
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
