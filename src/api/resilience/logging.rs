//! Structured request logging for Pipedrive API calls
//!
//! Enabled by the client's `debug` toggle. Secrets never reach the log: the
//! `api_token` query value and credential-bearing headers are redacted.

use crate::api::request::redact_token;
use crate::api::transport::{HttpRequest, HttpResponse};
use log::{debug, info, warn};
use serde_json::{Map, Value, json};
use std::time::{Duration, Instant};

/// Structured logger for API calls on one resource
#[derive(Debug, Clone)]
pub struct RequestLogger {
    enabled: bool,
    entity: String,
}

/// Context for a single call
#[derive(Debug, Clone)]
pub struct CallContext {
    pub method: String,
    pub url: String,
    pub start_time: Instant,
}

impl RequestLogger {
    pub fn new(entity: impl Into<String>, enabled: bool) -> Self {
        Self {
            enabled,
            entity: entity.into(),
        }
    }

    /// Start tracking a call and log the outgoing request
    pub fn log_request(&self, request: &HttpRequest) -> CallContext {
        let context = CallContext {
            method: request.method.to_string(),
            url: redact_token(&request.url),
            start_time: Instant::now(),
        };

        if self.enabled {
            let log_data = json!({
                "event": "http_request",
                "entity": self.entity,
                "method": context.method,
                "url": context.url,
                "query": request.query.iter().map(|(k, v)| format!("{}={}", k, v)).collect::<Vec<_>>(),
                "headers": sanitize_headers(&request.headers),
            });
            debug!("HTTP Request: {}", log_data);
        }

        context
    }

    /// Log the response that completed a call
    pub fn log_response(&self, context: &CallContext, response: &HttpResponse) {
        if !self.enabled {
            return;
        }

        let duration = context.start_time.elapsed();
        let log_data = json!({
            "event": "http_response",
            "entity": self.entity,
            "method": context.method,
            "url": context.url,
            "status_code": response.status,
            "body_bytes": response.body.len(),
            "duration_ms": duration.as_millis(),
        });

        if response.status >= 400 {
            warn!("HTTP Response (Error): {}", log_data);
        } else {
            info!("HTTP Response: {}", log_data);
        }
    }

    /// Log the end of a paginated walk
    pub fn log_pagination_end(&self, pages: u32, items: u64, reason: &str, elapsed: Duration) {
        if !self.enabled {
            return;
        }

        let log_data = json!({
            "event": "pagination_finished",
            "entity": self.entity,
            "pages": pages,
            "items": items,
            "reason": reason,
            "duration_ms": elapsed.as_millis(),
        });
        debug!("Pagination Finished: {}", log_data);
    }
}

fn sanitize_headers(headers: &[(String, String)]) -> Value {
    let mut sanitized = Map::new();

    for (key, value) in headers {
        let key_lower = key.to_lowercase();
        let value = if key_lower.contains("authorization") || key_lower.contains("token") {
            "[REDACTED]".to_string()
        } else {
            value.clone()
        };
        sanitized.insert(key.clone(), Value::String(value));
    }

    Value::Object(sanitized)
}
