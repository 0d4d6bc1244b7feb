// src/api/mod.rs
//! DexScreener API access
//!
//! - Sliding-window quota pools per endpoint group
//! - Upstream HTTP client with a single error-classification point
//! - Static operation table and the dispatcher that routes calls through it

pub mod client;
pub mod dispatcher;
pub mod operations;
pub mod rate_limiter;
pub mod types;

pub use client::{classify, DexScreenerClient, UpstreamRequest};
pub use dispatcher::Dispatcher;
pub use operations::{catalogue, find_operation, Invocation, OperationDescriptor, OperationInfo, OPERATIONS};
pub use rate_limiter::{PoolKind, PoolUsage, QuotaConfig, QuotaPool, QuotaPools};
pub use types::{DexResponse, Pair, Payload, PayloadKind, TokenBoost, TokenOrder, TokenProfile};
