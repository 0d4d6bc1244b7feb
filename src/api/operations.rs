// src/api/operations.rs
//! Static operation table.
//!
//! Each entry binds an operation name to its required arguments, its quota
//! pool and its upstream path template. Registering an operation means adding
//! an entry here plus the matching [`Invocation`] variant.

use crate::api::client::UpstreamRequest;
use crate::api::rate_limiter::PoolKind;
use crate::api::types::PayloadKind;
use crate::error::{DexError, Result};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArgumentSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// Maps a query-string key to the argument supplying its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryParam {
    pub key: &'static str,
    pub argument: &'static str,
}

/// Immutable description of one operation.
#[derive(Clone, Copy)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// All arguments are required.
    pub arguments: &'static [ArgumentSpec],
    pub pool: PoolKind,
    pub path_template: &'static str,
    pub query: &'static [QueryParam],
    /// Documented shape of the response.
    pub payload: PayloadKind,
    binder: fn(&mut ArgumentReader<'_>) -> Invocation,
}

impl fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("name", &self.name)
            .field("pool", &self.pool)
            .field("path_template", &self.path_template)
            .field("payload", &self.payload)
            .finish()
    }
}

const CHAIN_ID: ArgumentSpec = ArgumentSpec {
    name: "chainId",
    description: "Chain ID (e.g., \"solana\")",
};

pub static OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor {
        name: "get_latest_token_profiles",
        description: "Get the latest token profiles",
        arguments: &[],
        pool: PoolKind::TokenMetadata,
        path_template: "/token-profiles/latest/v1",
        query: &[],
        payload: PayloadKind::TokenProfiles,
        binder: |_| Invocation::LatestTokenProfiles,
    },
    OperationDescriptor {
        name: "get_latest_boosted_tokens",
        description: "Get the latest boosted tokens",
        arguments: &[],
        pool: PoolKind::TokenMetadata,
        path_template: "/token-boosts/latest/v1",
        query: &[],
        payload: PayloadKind::TokenBoosts,
        binder: |_| Invocation::LatestBoostedTokens,
    },
    OperationDescriptor {
        name: "get_top_boosted_tokens",
        description: "Get tokens with most active boosts",
        arguments: &[],
        pool: PoolKind::TokenMetadata,
        path_template: "/token-boosts/top/v1",
        query: &[],
        payload: PayloadKind::TokenBoosts,
        binder: |_| Invocation::TopBoostedTokens,
    },
    OperationDescriptor {
        name: "get_token_orders",
        description: "Check orders paid for a specific token",
        arguments: &[
            CHAIN_ID,
            ArgumentSpec {
                name: "tokenAddress",
                description: "Token address",
            },
        ],
        pool: PoolKind::TokenMetadata,
        path_template: "/orders/v1/{chainId}/{tokenAddress}",
        query: &[],
        payload: PayloadKind::TokenOrders,
        binder: |args| Invocation::TokenOrders {
            chain_id: args.require("chainId"),
            token_address: args.require("tokenAddress"),
        },
    },
    OperationDescriptor {
        name: "get_pairs_by_chain_and_address",
        description: "Get one or multiple pairs by chain and pair address",
        arguments: &[
            CHAIN_ID,
            ArgumentSpec {
                name: "pairId",
                description: "Pair address",
            },
        ],
        pool: PoolKind::PairData,
        path_template: "/latest/dex/pairs/{chainId}/{pairId}",
        query: &[],
        payload: PayloadKind::Pairs,
        binder: |args| Invocation::PairsByChainAndAddress {
            chain_id: args.require("chainId"),
            pair_id: args.require("pairId"),
        },
    },
    OperationDescriptor {
        name: "get_pairs_by_token_addresses",
        description: "Get one or multiple pairs by token address (max 30)",
        arguments: &[ArgumentSpec {
            name: "tokenAddresses",
            description: "Comma-separated token addresses",
        }],
        pool: PoolKind::PairData,
        path_template: "/latest/dex/tokens/{tokenAddresses}",
        query: &[],
        payload: PayloadKind::Pairs,
        binder: |args| Invocation::PairsByTokenAddresses {
            token_addresses: args.require("tokenAddresses"),
        },
    },
    OperationDescriptor {
        name: "search_pairs",
        description: "Search for pairs matching query",
        arguments: &[ArgumentSpec {
            name: "query",
            description: "Search query",
        }],
        pool: PoolKind::PairData,
        path_template: "/latest/dex/search",
        query: &[QueryParam {
            key: "q",
            argument: "query",
        }],
        payload: PayloadKind::Pairs,
        binder: |args| Invocation::SearchPairs {
            query: args.require("query"),
        },
    },
];

pub fn find_operation(name: &str) -> Option<&'static OperationDescriptor> {
    OPERATIONS.iter().find(|op| op.name == name)
}

/// Validated, typed arguments of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    LatestTokenProfiles,
    LatestBoostedTokens,
    TopBoostedTokens,
    TokenOrders {
        chain_id: String,
        token_address: String,
    },
    PairsByChainAndAddress {
        chain_id: String,
        pair_id: String,
    },
    PairsByTokenAddresses {
        token_addresses: String,
    },
    SearchPairs {
        query: String,
    },
}

impl Invocation {
    /// Value of an argument by its wire name.
    pub fn argument(&self, name: &str) -> Option<&str> {
        match (self, name) {
            (Invocation::TokenOrders { chain_id, .. }, "chainId")
            | (Invocation::PairsByChainAndAddress { chain_id, .. }, "chainId") => Some(chain_id),
            (Invocation::TokenOrders { token_address, .. }, "tokenAddress") => Some(token_address),
            (Invocation::PairsByChainAndAddress { pair_id, .. }, "pairId") => Some(pair_id),
            (Invocation::PairsByTokenAddresses { token_addresses }, "tokenAddresses") => {
                Some(token_addresses)
            }
            (Invocation::SearchPairs { query }, "query") => Some(query),
            _ => None,
        }
    }
}

/// Reads required arguments from a raw argument map, remembering which were absent.
pub struct ArgumentReader<'a> {
    raw: &'a HashMap<String, String>,
    missing: Vec<String>,
}

impl<'a> ArgumentReader<'a> {
    fn new(raw: &'a HashMap<String, String>) -> Self {
        Self {
            raw,
            missing: Vec::new(),
        }
    }

    /// Presence check only; the value is not validated.
    fn require(&mut self, name: &str) -> String {
        match self.raw.get(name) {
            Some(value) => value.clone(),
            None => {
                self.missing.push(name.to_string());
                String::new()
            }
        }
    }
}

impl OperationDescriptor {
    pub fn required_arguments(&self) -> Vec<&'static str> {
        self.arguments.iter().map(|arg| arg.name).collect()
    }

    /// Checks every required argument is present and builds the typed invocation.
    pub fn bind(&self, raw: &HashMap<String, String>) -> Result<Invocation> {
        let mut reader = ArgumentReader::new(raw);
        let invocation = (self.binder)(&mut reader);

        if reader.missing.is_empty() {
            Ok(invocation)
        } else {
            Err(DexError::InvalidArguments {
                missing: reader.missing,
            })
        }
    }

    /// Path and query for a bound invocation.
    pub fn request(&self, invocation: &Invocation) -> UpstreamRequest {
        let params: Vec<(&str, &str)> = self
            .arguments
            .iter()
            .filter_map(|arg| invocation.argument(arg.name).map(|value| (arg.name, value)))
            .collect();

        self.query.iter().fold(
            UpstreamRequest::from_template(self.path_template, &params),
            |request, param| match invocation.argument(param.argument) {
                Some(value) => request.with_query(param.key, value),
                None => request,
            },
        )
    }

    /// JSON schema advertised for this operation's arguments.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .arguments
            .iter()
            .map(|arg| {
                (
                    arg.name.to_string(),
                    json!({ "type": "string", "description": arg.description }),
                )
            })
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required_arguments(),
        })
    }

    pub fn info(&self) -> OperationInfo {
        OperationInfo {
            name: self.name,
            description: self.description,
            input_schema: self.input_schema(),
        }
    }
}

/// Catalogue entry as advertised to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

pub fn catalogue() -> Vec<OperationInfo> {
    OPERATIONS.iter().map(OperationDescriptor::info).collect()
}
