// src/server/mod.rs
//! Newline-delimited JSON-RPC 2.0 loop over a byte stream (stdin/stdout in the
//! binary), exposing the operation catalogue and dispatcher as tools.

use crate::api::{catalogue, Dispatcher};
use crate::error::DexError;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

pub const SERVER_NAME: &str = "dexscreener-mcp-server";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
struct RpcResponse {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<DexError> for RpcError {
    fn from(err: DexError) -> Self {
        match err {
            DexError::UnknownOperation(_) => RpcError::new(codes::METHOD_NOT_FOUND, err.message()),
            DexError::InvalidArguments { .. } => RpcError::new(codes::INVALID_PARAMS, err.message()),
            other => RpcError::new(
                codes::INTERNAL_ERROR,
                format!("DexScreener API error: {}", other.message()),
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Map<String, Value>>,
}

pub struct Server {
    dispatcher: Dispatcher,
}

impl Server {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handles one line of input. Returns the serialized reply, or `None` for
    /// notifications.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Malformed request: {}", e);
                return Some(Self::encode(
                    Value::Null,
                    Err(RpcError::new(codes::PARSE_ERROR, format!("Parse error: {}", e))),
                ));
            }
        };
        let request: RpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                warn!("Invalid request: {}", e);
                return Some(Self::encode(
                    Value::Null,
                    Err(RpcError::new(codes::INVALID_REQUEST, format!("Invalid request: {}", e))),
                ));
            }
        };

        let id = request.id.clone()?;
        let outcome = self.handle(&request.method, request.params).await;
        Some(Self::encode(id, outcome))
    }

    async fn handle(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        debug!("Handling {}", method);
        match method {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") },
            })),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": catalogue() })),
            "tools/call" => self.call_tool(params).await,
            other => Err(RpcError::new(
                codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            )),
        }
    }

    async fn call_tool(&self, params: Value) -> Result<Value, RpcError> {
        let params: CallParams = serde_json::from_value(params)
            .map_err(|e| RpcError::new(codes::INVALID_PARAMS, format!("Invalid params: {}", e)))?;
        let arguments = string_arguments(params.arguments.unwrap_or_default())?;

        let payload = self
            .dispatcher
            .invoke(&params.name, &arguments)
            .await
            .map_err(|e| {
                if e.is_caller_fault() {
                    debug!("Tool call {} rejected: {}", params.name, e);
                } else {
                    warn!("Tool call {} failed: {}", params.name, e);
                }
                e
            })?;
        let text = serde_json::to_string_pretty(payload.body())
            .map_err(|e| RpcError::new(codes::INTERNAL_ERROR, e.to_string()))?;

        Ok(json!({ "content": [{ "type": "text", "text": text }] }))
    }

    fn encode(id: Value, outcome: Result<Value, RpcError>) -> String {
        let (result, error) = match outcome {
            Ok(result) => (Some(result), None),
            Err(error) => (None, Some(error)),
        };
        let response = RpcResponse {
            jsonrpc: "2.0",
            id,
            result,
            error,
        };
        serde_json::to_string(&response).unwrap_or_else(|e| {
            error!("Failed to encode response: {}", e);
            json!({
                "jsonrpc": "2.0",
                "id": Value::Null,
                "error": { "code": codes::INTERNAL_ERROR, "message": e.to_string() },
            })
            .to_string()
        })
    }

    /// Serves requests until `input` reaches EOF. Each request runs as its own
    /// task; replies are written one per line in completion order.
    pub async fn run<R, W>(self: Arc<Self>, input: R, output: W) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let writer = tokio::spawn(async move {
            let mut output = output;
            while let Some(reply) = rx.recv().await {
                output.write_all(reply.as_bytes()).await?;
                output.write_all(b"\n").await?;
                output.flush().await?;
            }
            output.shutdown().await
        });

        info!("{} serving requests", SERVER_NAME);
        let mut lines = BufReader::new(input).lines();
        let mut in_flight = JoinSet::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let server = self.clone();
            let tx = tx.clone();
            in_flight.spawn(async move {
                if let Some(reply) = server.handle_line(&line).await {
                    if tx.send(reply).is_err() {
                        warn!("Output closed, dropping reply");
                    }
                }
            });
        }

        while in_flight.join_next().await.is_some() {}
        drop(tx);

        info!("Input closed, shutting down");
        match writer.await {
            Ok(result) => result,
            Err(e) => Err(std::io::Error::new(std::io::ErrorKind::Other, e)),
        }
    }
}

/// The dispatcher takes string arguments only.
fn string_arguments(raw: Map<String, Value>) -> Result<HashMap<String, String>, RpcError> {
    raw.into_iter()
        .map(|(name, value)| match value {
            Value::String(s) => Ok((name, s)),
            other => Err(RpcError::new(
                codes::INVALID_PARAMS,
                format!("Argument '{}' must be a string, got {}", name, other),
            )),
        })
        .collect()
}
