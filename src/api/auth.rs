//! Credential resolution for the two Pipedrive authentication modes
//!
//! A client runs in exactly one mode:
//! - API token mode: requests go to the shared origin under `/v1` and carry
//!   `api_token=<token>` as the last query parameter.
//! - OAuth mode: requests go to the tenant's `api_domain` without a version
//!   prefix and carry an `Authorization: Bearer <access_token>` header.

use super::constants::{self, headers};
use anyhow::{Result, anyhow, bail};
use log::debug;
use serde_json::{Map, Value};
use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    ApiToken(String),
    OAuth {
        access_token: String,
        api_domain: String,
    },
}

impl Credentials {
    /// Validate the raw credential inputs and pick the active mode.
    ///
    /// A non-empty `api_token` wins. Otherwise `oauth_credentials` must be a
    /// mapping with non-empty `access_token` and `api_domain` values. A JSON
    /// `null` counts as absent.
    pub fn resolve(api_token: Option<&str>, oauth_credentials: Option<&Value>) -> Result<Self> {
        if let Some(token) = api_token.filter(|t| !t.is_empty()) {
            if oauth_credentials.is_some_and(|v| !v.is_null()) {
                debug!("Both api_token and oauth_credentials set, using api_token");
            }
            return Ok(Self::ApiToken(token.to_string()));
        }

        match oauth_credentials {
            Some(Value::Null) | None => bail!("api_token or oauth_credentials must be set"),
            Some(oauth) => {
                let map = oauth
                    .as_object()
                    .ok_or_else(|| anyhow!("oauth_credentials must be a mapping"))?;
                let access_token = required_key(map, "access_token")?;
                let api_domain = required_key(map, "api_domain")?;

                Ok(Self::OAuth {
                    access_token,
                    api_domain: api_domain.trim_end_matches('/').to_string(),
                })
            }
        }
    }

    pub fn api_token(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        Self::resolve(Some(&token), None)
    }

    pub fn oauth(access_token: impl Into<String>, api_domain: impl Into<String>) -> Result<Self> {
        let oauth = serde_json::json!({
            "access_token": access_token.into(),
            "api_domain": api_domain.into(),
        });
        Self::resolve(None, Some(&oauth))
    }

    pub fn is_oauth(&self) -> bool {
        matches!(self, Self::OAuth { .. })
    }

    /// Scheme and host every request path is appended to
    pub fn origin(&self) -> &str {
        match self {
            Self::ApiToken(_) => constants::DEFAULT_ORIGIN,
            Self::OAuth { api_domain, .. } => api_domain,
        }
    }

    pub fn path_prefix(&self) -> &'static str {
        match self {
            Self::ApiToken(_) => constants::API_VERSION_PREFIX,
            Self::OAuth { .. } => "",
        }
    }

    /// Token to append as the final query suffix, token mode only
    pub fn query_token(&self) -> Option<&str> {
        match self {
            Self::ApiToken(token) => Some(token),
            Self::OAuth { .. } => None,
        }
    }

    /// Headers added to every request, OAuth mode only
    pub fn auth_headers(&self) -> Vec<(String, String)> {
        match self {
            Self::ApiToken(_) => Vec::new(),
            Self::OAuth { access_token, .. } => vec![(
                headers::AUTHORIZATION.to_string(),
                format!("Bearer {}", access_token),
            )],
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiToken(_) => f.debug_tuple("ApiToken").field(&"<redacted>").finish(),
            Self::OAuth { api_domain, .. } => f
                .debug_struct("OAuth")
                .field("access_token", &"<redacted>")
                .field("api_domain", api_domain)
                .finish(),
        }
    }
}

fn required_key(map: &Map<String, Value>, key: &str) -> Result<String> {
    match map.get(key).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => bail!("oauth_credentials must include a non-empty '{}' value", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_mode() {
        let creds = Credentials::resolve(Some("token"), None).unwrap();
        assert_eq!(creds, Credentials::ApiToken("token".to_string()));
        assert_eq!(creds.origin(), "https://api.pipedrive.com");
        assert_eq!(creds.path_prefix(), "/v1");
        assert_eq!(creds.query_token(), Some("token"));
        assert!(creds.auth_headers().is_empty());
    }

    #[test]
    fn test_oauth_mode() {
        let oauth = json!({"access_token": "access-token", "api_domain": "https://company.pipedrive.com/"});
        let creds = Credentials::resolve(None, Some(&oauth)).unwrap();
        assert!(creds.is_oauth());
        assert_eq!(creds.origin(), "https://company.pipedrive.com");
        assert_eq!(creds.path_prefix(), "");
        assert_eq!(creds.query_token(), None);
        assert_eq!(
            creds.auth_headers(),
            vec![("Authorization".to_string(), "Bearer access-token".to_string())]
        );
    }

    #[test]
    fn test_missing_both() {
        let err = Credentials::resolve(None, None).unwrap_err();
        assert_eq!(err.to_string(), "api_token or oauth_credentials must be set");

        assert!(Credentials::resolve(Some(""), Some(&Value::Null)).is_err());
    }

    #[test]
    fn test_oauth_missing_keys() {
        let no_token = json!({"api_domain": "https://company.pipedrive.com"});
        let err = Credentials::resolve(None, Some(&no_token)).unwrap_err();
        assert!(err.to_string().contains("access_token"));

        let no_domain = json!({"access_token": "access-token"});
        let err = Credentials::resolve(None, Some(&no_domain)).unwrap_err();
        assert!(err.to_string().contains("api_domain"));

        let empty_domain = json!({"access_token": "access-token", "api_domain": ""});
        assert!(Credentials::resolve(None, Some(&empty_domain)).is_err());
    }

    #[test]
    fn test_oauth_not_a_mapping() {
        let err = Credentials::resolve(None, Some(&json!("access-token"))).unwrap_err();
        assert_eq!(err.to_string(), "oauth_credentials must be a mapping");
    }

    #[test]
    fn test_token_takes_precedence() {
        let oauth = json!({"access_token": "access-token", "api_domain": "https://company.pipedrive.com"});
        let creds = Credentials::resolve(Some("token"), Some(&oauth)).unwrap();
        assert!(!creds.is_oauth());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::oauth("secret", "https://company.pipedrive.com").unwrap();
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("company.pipedrive.com"));
    }
}
