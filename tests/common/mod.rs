#![allow(dead_code)]

use pipedrive::api::testing::ScriptedTransport;
use pipedrive::api::{Params, ResourceClient, ResourceKind, RetryConfig};
use pipedrive::config::Config;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

pub const TOKEN: &str = "token";
pub const ACCESS_TOKEN: &str = "access-token";
pub const API_DOMAIN: &str = "https://company-domain.pipedrive.com";

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        backoff_multiplier: 2.0,
        jitter: false,
        body_error_delay: Duration::from_millis(1),
    }
}

pub fn token_config() -> Config {
    Config::default().with_api_token(TOKEN).with_retry(fast_retry())
}

pub fn oauth_config() -> Config {
    Config::default()
        .with_oauth(ACCESS_TOKEN, API_DOMAIN)
        .with_retry(fast_retry())
}

pub fn scripted(kind: ResourceKind, config: &Config) -> (ResourceClient, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::new());
    let client = ResourceClient::with_transport(kind, config, transport.clone())
        .expect("client should build");
    (client, transport)
}

pub fn params(value: Value) -> Params {
    value.as_object().cloned().expect("params must be a JSON object")
}

/// A listing page in Pipedrive's shape
pub fn page(ids: &[u64], more_items: bool, next_start: u64) -> Value {
    let data: Vec<Value> = ids.iter().map(|id| json!({"id": id, "name": format!("item {}", id)})).collect();
    json!({
        "success": true,
        "data": data,
        "additional_data": {
            "pagination": {
                "start": next_start.saturating_sub(ids.len() as u64),
                "limit": ids.len(),
                "more_items_in_collection": more_items,
                "next_start": next_start,
            }
        }
    })
}

pub fn ids(items: &[Value]) -> Vec<u64> {
    items.iter().filter_map(|item| item["id"].as_u64()).collect()
}
