//! Request URL construction
//!
//! URL shape: `{origin}[/v1]/{resource}[/{id}][:(field,field,...)][?api_token=...]`.
//! Resource names and ids are inserted verbatim, they are expected to be
//! identifiers chosen by the caller rather than free text. The token is
//! percent-encoded.

use super::auth::Credentials;
use super::constants::{API_TOKEN_PARAM, FIELDS_TO_SELECT};
use serde_json::{Map, Value};

/// Request params: filters, pagination controls and request bodies
pub type Params = Map<String, Value>;

/// Build the request path (everything after the origin).
///
/// The token suffix always comes last so the `:(...)` field selector stays
/// part of the path.
pub fn build_url(
    credentials: &Credentials,
    resource_name: &str,
    entity_id: Option<&str>,
    fields_to_select: Option<&[String]>,
) -> String {
    let mut url = format!("{}/{}", credentials.path_prefix(), resource_name);

    if let Some(id) = entity_id {
        url.push('/');
        url.push_str(id);
    }

    if let Some(fields) = fields_to_select.filter(|f| !f.is_empty()) {
        url.push_str(&format!(":({})", fields.join(",")));
    }

    if let Some(token) = credentials.query_token() {
        url.push_str(&format!("?{}={}", API_TOKEN_PARAM, urlencoding::encode(token)));
    }

    url
}

/// Build the absolute URL for a request
pub fn absolute_url(credentials: &Credentials, path: &str) -> String {
    format!("{}{}", credentials.origin(), path)
}

/// Remove `fields_to_select` from params. Only an array of strings counts as
/// a selection; any other value is dropped.
pub fn take_fields_to_select(params: &mut Params) -> Option<Vec<String>> {
    match params.remove(FIELDS_TO_SELECT)? {
        Value::Array(values) => Some(
            values
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        ),
        _ => None,
    }
}

/// Render params as query pairs. Strings are used as-is, other scalars are
/// rendered as JSON, arrays repeat the key.
pub fn to_query_pairs(params: &Params) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::Array(values) => {
                for v in values {
                    pairs.push((key.clone(), scalar_to_string(v)));
                }
            }
            other => pairs.push((key.clone(), scalar_to_string(other))),
        }
    }
    pairs
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        other => other.to_string(),
    }
}

/// Replace the api_token value so URLs can be logged
pub fn redact_token(url: &str) -> String {
    let marker = format!("{}=", API_TOKEN_PARAM);
    match url.find(&marker) {
        Some(pos) => {
            let start = pos + marker.len();
            let end = url[start..].find('&').map(|i| start + i).unwrap_or(url.len());
            format!("{}[REDACTED]{}", &url[..start], &url[end..])
        }
        None => url.to_string(),
    }
}
