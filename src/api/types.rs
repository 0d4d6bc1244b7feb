//! DexScreener API response structures
//!
//! Field names follow the upstream camelCase JSON. Everything the provider
//! documents as optional is an `Option` so that partial records still decode.
//!
//! The structs describe the documented shapes. A [`Payload`] keeps the upstream
//! JSON exactly as received and only checks it against these shapes.

use log::warn;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;

/// Link attached to a token profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenLink {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub url: String,
}

/// Response item of `/token-profiles/latest/v1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenProfile {
    pub url: String,
    pub chain_id: String,
    pub token_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<TokenLink>>,
}

/// Response item of `/token-boosts/latest/v1` and `/token-boosts/top/v1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBoost {
    #[serde(flatten)]
    pub profile: TokenProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderType {
    TokenProfile,
    CommunityTakeover,
    TokenAd,
    TrendingBarAd,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Processing,
    Cancelled,
    OnHold,
    Approved,
    Rejected,
    #[serde(other)]
    Other,
}

/// Response item of `/orders/v1/{chainId}/{tokenAddress}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenOrder {
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub payment_timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liquidity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usd: Option<f64>,
    pub base: f64,
    pub quote: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnCount {
    pub buys: u64,
    pub sells: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Website {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Social {
    #[serde(rename = "type")]
    pub social_type: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub websites: Option<Vec<Website>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socials: Option<Vec<Social>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairBoosts {
    pub active: u64,
}

/// A trading pair as returned by the `/latest/dex/*` endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    pub chain_id: String,
    pub dex_id: String,
    pub url: String,
    pub pair_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    pub base_token: Token,
    pub quote_token: Token,
    pub price_native: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txns: Option<HashMap<String, TxnCount>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<HashMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change: Option<HashMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<Liquidity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fdv: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_created_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<PairInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boosts: Option<PairBoosts>,
}

/// Envelope of the `/latest/dex/*` endpoints. `pairs` keeps upstream order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexResponse {
    pub schema_version: String,
    #[serde(default)]
    pub pairs: Option<Vec<Pair>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair: Option<Pair>,
}

/// Documented shape an operation's response is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    TokenProfiles,
    TokenBoosts,
    TokenOrders,
    Pairs,
}

impl PayloadKind {
    /// Fails with the first mismatch between `body` and the documented shape.
    pub fn check(self, body: &Value) -> Result<(), serde_json::Error> {
        match self {
            PayloadKind::TokenProfiles => Vec::<TokenProfile>::deserialize(body).map(drop),
            PayloadKind::TokenBoosts => Vec::<TokenBoost>::deserialize(body).map(drop),
            PayloadKind::TokenOrders => Vec::<TokenOrder>::deserialize(body).map(drop),
            PayloadKind::Pairs => DexResponse::deserialize(body).map(drop),
        }
    }
}

/// Result of one operation: the upstream JSON, passed through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    kind: PayloadKind,
    body: Value,
}

impl Payload {
    /// Wraps an upstream body. A body that does not match the documented shape
    /// is still returned as-is; the mismatch is only logged.
    pub fn from_upstream(kind: PayloadKind, body: Value) -> Self {
        if let Err(e) = kind.check(&body) {
            warn!("Upstream {:?} response differs from documented shape: {}", kind, e);
        }
        Self { kind, body }
    }

    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Number of records, for logging.
    pub fn len(&self) -> usize {
        match (self.kind, &self.body) {
            (PayloadKind::Pairs, body) => match (body.get("pairs"), body.get("pair")) {
                (Some(Value::Array(pairs)), _) => pairs.len(),
                (_, Some(pair)) if !pair.is_null() => 1,
                _ => 0,
            },
            (_, Value::Array(items)) => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_pair(address: &str) -> serde_json::Value {
        json!({
            "chainId": "solana",
            "dexId": "raydium",
            "url": format!("https://dexscreener.com/solana/{}", address),
            "pairAddress": address,
            "labels": ["CLMM"],
            "baseToken": { "address": "So11111111111111111111111111111111111111112", "name": "Wrapped SOL", "symbol": "SOL" },
            "quoteToken": { "address": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "name": "USD Coin", "symbol": "USDC" },
            "priceNative": "142.51",
            "priceUsd": "142.51",
            "txns": { "h24": { "buys": 10, "sells": 7 } },
            "volume": { "h24": 1250000.5 },
            "liquidity": { "usd": 9000000.0, "base": 30000.0, "quote": 4500000.0 },
            "fdv": 68000000000.0,
            "marketCap": 68000000000.0,
            "pairCreatedAt": 1723699294000u64
        })
    }

    #[test]
    fn dex_response_preserves_pair_order() {
        let body = json!({
            "schemaVersion": "1.0.0",
            "pairs": [sample_pair("A"), sample_pair("B"), sample_pair("C")]
        });
        let response: DexResponse = serde_json::from_value(body).unwrap();
        let pairs = response.pairs.unwrap();
        let order: Vec<_> = pairs.iter().map(|p| p.pair_address.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        assert_eq!(pairs[0].txns.as_ref().unwrap()["h24"].buys, 10);
    }

    #[test]
    fn null_pairs_decode_as_none() {
        let response: DexResponse =
            serde_json::from_value(json!({ "schemaVersion": "1.0.0", "pairs": null })).unwrap();
        assert!(response.pairs.is_none());
    }

    #[test]
    fn boost_flattens_profile_fields() {
        let boost: TokenBoost = serde_json::from_value(json!({
            "url": "https://dexscreener.com/solana/abc",
            "chainId": "solana",
            "tokenAddress": "abc",
            "amount": 100.0,
            "totalAmount": 500.0,
            "links": [{ "type": "twitter", "url": "https://x.com/abc" }]
        }))
        .unwrap();
        assert_eq!(boost.profile.chain_id, "solana");
        assert_eq!(boost.total_amount, Some(500.0));
        assert_eq!(
            boost.profile.links.unwrap()[0].link_type.as_deref(),
            Some("twitter")
        );
    }

    #[test]
    fn unknown_order_status_is_tolerated() {
        let order: TokenOrder = serde_json::from_value(json!({
            "type": "tokenProfile",
            "status": "refunded",
            "paymentTimestamp": 1700000000000u64
        }))
        .unwrap();
        assert_eq!(order.order_type, OrderType::TokenProfile);
        assert_eq!(order.status, OrderStatus::Other);
    }

    #[test]
    fn payload_counts_records_by_kind() {
        let pairs = Payload::from_upstream(
            PayloadKind::Pairs,
            json!({ "schemaVersion": "1.0.0", "pairs": [sample_pair("A"), sample_pair("B")] }),
        );
        assert_eq!(pairs.len(), 2);

        let single = Payload::from_upstream(
            PayloadKind::Pairs,
            json!({ "schemaVersion": "1.0.0", "pairs": null, "pair": sample_pair("A") }),
        );
        assert_eq!(single.len(), 1);

        let none = Payload::from_upstream(
            PayloadKind::Pairs,
            json!({ "schemaVersion": "1.0.0", "pairs": null }),
        );
        assert!(none.is_empty());

        let orders = Payload::from_upstream(PayloadKind::TokenOrders, json!([]));
        assert!(orders.is_empty());
        assert_eq!(orders.kind(), PayloadKind::TokenOrders);
    }

    #[test]
    fn shape_mismatch_keeps_body_untouched() {
        let mut pair = sample_pair("A");
        pair.as_object_mut().unwrap().remove("priceNative");
        pair["info"] = json!({
            "header": "h",
            "imageUrl": "i",
            "socials": [{ "type": "twitter", "url": "https://x.com/p" }]
        });
        let body = json!({ "schemaVersion": "1.0.0", "pairs": [pair] });

        assert!(PayloadKind::Pairs.check(&body).is_err());
        let payload = Payload::from_upstream(PayloadKind::Pairs, body.clone());
        assert_eq!(payload.body(), &body);
        assert_eq!(serde_json::to_string(&payload).unwrap(), body.to_string());
    }

    #[test]
    fn socials_use_upstream_keys() {
        let social: Social =
            serde_json::from_value(json!({ "type": "twitter", "url": "https://x.com/p" })).unwrap();
        assert_eq!(social.social_type, "twitter");
        assert_eq!(
            serde_json::to_value(&social).unwrap(),
            json!({ "type": "twitter", "url": "https://x.com/p" })
        );
    }
}
