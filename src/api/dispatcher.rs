// src/api/dispatcher.rs
//! Routes a named operation and its arguments to exactly one upstream call.

use crate::api::client::{DexScreenerClient, UpstreamRequest};
use crate::api::operations::{find_operation, Invocation, OperationDescriptor};
use crate::api::rate_limiter::{PoolUsage, QuotaPools};
use crate::api::types::Payload;
use crate::config::Config;
use crate::error::{DexError, Result};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Stateless across calls; the only shared mutable state is the quota pools
/// held by the client.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: DexScreenerClient,
}

impl Dispatcher {
    pub fn new(client: DexScreenerClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let pools = Arc::new(QuotaPools::from_config(config)?);
        Ok(Self::new(DexScreenerClient::new(config, pools)?))
    }

    pub fn pool_usage(&self) -> Vec<PoolUsage> {
        self.client.pools().usage()
    }

    /// Validates `arguments` against the operation `name` and performs the call.
    /// Errors from the client are returned unchanged.
    pub async fn invoke(&self, name: &str, arguments: &HashMap<String, String>) -> Result<Payload> {
        let descriptor = find_operation(name).ok_or_else(|| {
            debug!("Rejected unknown operation {}", name);
            DexError::UnknownOperation(name.to_string())
        })?;

        let invocation = descriptor.bind(arguments).map_err(|e| {
            debug!("Rejected {}: {}", name, e);
            e
        })?;

        let payload = self.execute(descriptor, &invocation).await?;
        info!("{} returned {} records ({:?})", name, payload.len(), payload.kind());
        Ok(payload)
    }

    async fn execute(
        &self,
        descriptor: &OperationDescriptor,
        invocation: &Invocation,
    ) -> Result<Payload> {
        let request: UpstreamRequest = descriptor.request(invocation);
        let body: Value = self.client.call(&request, descriptor.pool).await?;
        Ok(Payload::from_upstream(descriptor.payload, body))
    }
}
