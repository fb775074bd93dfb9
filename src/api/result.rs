//! Normalized API results
//!
//! Every call returns an `ApiResult` instead of raising on remote failures.
//! The body map is the parsed JSON object merged with status flags:
//! - 2xx: `success: true`
//! - other: `success: false`, `not_authorized` (401) and `failed` (420)
//!
//! The raw status code is kept next to the map rather than inside it, so the
//! map itself stays exactly what the server sent plus the flags.

use super::constants::result_keys::{
    ADDITIONAL_DATA, DATA, FAILED, MORE_ITEMS, NEXT_START, NOT_AUTHORIZED, PAGINATION, SUCCESS,
};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ApiResult {
    #[serde(skip)]
    status: Option<u16>,
    body: Map<String, Value>,
}

impl ApiResult {
    /// Normalize a raw HTTP response
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed = parse_object(body);

        if (200..300).contains(&status) {
            let mut body = parsed.unwrap_or_default();
            body.insert(SUCCESS.to_string(), Value::Bool(true));
            return Self {
                status: Some(status),
                body,
            };
        }

        let mut body = parsed.unwrap_or_default();
        body.insert(SUCCESS.to_string(), Value::Bool(false));
        body.insert(NOT_AUTHORIZED.to_string(), Value::Bool(status == 401));
        body.insert(FAILED.to_string(), Value::Bool(status == 420));
        Self {
            status: Some(status),
            body,
        }
    }

    pub fn success(&self) -> bool {
        self.flag(SUCCESS)
    }

    pub fn not_authorized(&self) -> bool {
        self.flag(NOT_AUTHORIZED)
    }

    pub fn failed(&self) -> bool {
        self.flag(FAILED)
    }

    /// HTTP status the result was built from
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    pub fn data(&self) -> Option<&Value> {
        self.body.get(DATA).filter(|v| !v.is_null())
    }

    /// Items of a listing page, `None` when `data` is missing, null or not a list
    pub fn items(&self) -> Option<&Vec<Value>> {
        self.data().and_then(Value::as_array)
    }

    pub fn pagination(&self) -> Option<&Map<String, Value>> {
        self.body
            .get(ADDITIONAL_DATA)
            .and_then(|d| d.get(PAGINATION))
            .and_then(Value::as_object)
    }

    pub fn more_items(&self) -> bool {
        self.pagination()
            .and_then(|p| p.get(MORE_ITEMS))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn next_start(&self) -> Option<u64> {
        self.pagination()
            .and_then(|p| p.get(NEXT_START))
            .and_then(Value::as_u64)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.body
    }

    fn flag(&self, key: &str) -> bool {
        self.body.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}

fn parse_object(body: &[u8]) -> Option<Map<String, Value>> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
