//! `tools/call` over the JSON-RPC loop against a mocked DexScreener API.

use dexscreener_mcp::config::Config;
use dexscreener_mcp::server::Server;
use dexscreener_mcp::Dispatcher;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn server_for(upstream: &MockServer) -> Server {
    let config = Config {
        base_url: upstream.uri(),
        ..Config::default()
    };
    Server::new(Dispatcher::from_config(&config).expect("valid test config"))
}

async fn call(server: &Server, line: &str) -> Value {
    let text = server.handle_line(line).await.expect("request has an id");
    serde_json::from_str(&text).unwrap()
}

#[tokio::test]
async fn successful_call_wraps_payload_as_text_content() {
    let upstream = MockServer::start().await;
    let body = json!({
        "schemaVersion": "1.0.0",
        "pairs": [{
            "chainId": "solana",
            "dexId": "raydium",
            "url": "https://dexscreener.com/solana/HxFL",
            "pairAddress": "HxFL",
            "baseToken": { "address": "So11111111111111111111111111111111111111112", "name": "Wrapped SOL", "symbol": "SOL" },
            "quoteToken": { "address": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "name": "USD Coin", "symbol": "USDC" },
            "priceNative": "142.51",
            "info": { "header": "h", "socials": [{ "type": "twitter", "url": "https://x.com/sol" }] }
        }]
    });
    Mock::given(method("GET"))
        .and(path("/latest/dex/search"))
        .and(query_param("q", "SOL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = server_for(&upstream);
    let response = call(
        &server,
        r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"search_pairs","arguments":{"query":"SOL"}}}"#,
    )
    .await;

    assert_eq!(response["id"], 7);
    assert!(response.get("error").is_none(), "{}", response);

    let content = response["result"]["content"].as_array().unwrap();
    assert_eq!(content.len(), 1);
    assert_eq!(content[0]["type"], "text");

    let text = content[0]["text"].as_str().unwrap();
    assert!(text.contains('\n'), "payload text is pretty-printed");
    assert_eq!(serde_json::from_str::<Value>(text).unwrap(), body);
}

#[tokio::test]
async fn upstream_failure_is_reported_as_api_error() {
    let upstream = MockServer::start().await;
    Mock::given(path("/token-boosts/top/v1"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "message": "maintenance" })))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = server_for(&upstream);
    let response = call(
        &server,
        r#"{"jsonrpc":"2.0","id":"x","method":"tools/call","params":{"name":"get_top_boosted_tokens"}}"#,
    )
    .await;

    assert_eq!(response["id"], "x");
    assert!(response.get("result").is_none());
    assert_eq!(response["error"]["code"], -32603);
    assert_eq!(response["error"]["message"], "DexScreener API error: maintenance");
}
