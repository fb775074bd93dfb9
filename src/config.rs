//! Client configuration
//!
//! Sources, lowest precedence first: built-in defaults, the TOML config
//! file, `PIPEDRIVE_*` environment variables (a `.env` file is honoured),
//! then whatever the caller sets explicitly.
//!
//! A process-wide default `Config` can be installed with [`set_defaults`].
//! Clients snapshot the defaults when they are built; replacing the defaults
//! later only affects clients built afterwards.

use crate::api::auth::Credentials;
use crate::api::constants::default_user_agent;
use crate::api::resilience::RetryConfig;
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use log::{debug, info};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const ENV_API_TOKEN: &str = "PIPEDRIVE_API_TOKEN";
pub const ENV_ACCESS_TOKEN: &str = "PIPEDRIVE_ACCESS_TOKEN";
pub const ENV_API_DOMAIN: &str = "PIPEDRIVE_API_DOMAIN";
pub const ENV_USER_AGENT: &str = "PIPEDRIVE_USER_AGENT";
pub const ENV_DEBUG: &str = "PIPEDRIVE_DEBUG";

static DEFAULTS: Lazy<ArcSwap<Config>> = Lazy::new(|| ArcSwap::from_pointee(Config::default()));

/// Current process-wide defaults
pub fn defaults() -> Arc<Config> {
    DEFAULTS.load_full()
}

/// Replace the process-wide defaults
pub fn set_defaults(config: Config) {
    debug!("Installing new default client config");
    DEFAULTS.store(Arc::new(config));
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_token: Option<String>,
    /// Mapping with `access_token` and `api_domain`. Kept untyped so a
    /// malformed value is reported when credentials are resolved.
    pub oauth_credentials: Option<Value>,
    pub user_agent: String,
    pub debug: bool,
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_token: None,
            oauth_credentials: None,
            user_agent: default_user_agent(),
            debug: false,
            retry: RetryConfig::default(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("oauth_credentials", &self.oauth_credentials.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("debug", &self.debug)
            .field("retry", &self.retry)
            .finish()
    }
}

impl Config {
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_oauth(mut self, access_token: impl Into<String>, api_domain: impl Into<String>) -> Self {
        self.oauth_credentials = Some(serde_json::json!({
            "access_token": access_token.into(),
            "api_domain": api_domain.into(),
        }));
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Validate the credential settings and pick the authentication mode
    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::resolve(self.api_token.as_deref(), self.oauth_credentials.as_ref())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("pipedrive-cli")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".pipedrive-cli")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load the default config file, falling back to defaults if it is absent
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        if !config_path.exists() {
            info!("Config file doesn't exist, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", path);

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay `PIPEDRIVE_*` variables from the process environment
    pub fn apply_env(&mut self) {
        dotenvy::dotenv().ok();
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay `PIPEDRIVE_*` variables using the given lookup
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(token) = get(ENV_API_TOKEN) {
            debug!("Using api_token from {}", ENV_API_TOKEN);
            self.api_token = Some(token);
        }

        if let Some(access_token) = get(ENV_ACCESS_TOKEN) {
            let api_domain = get(ENV_API_DOMAIN).unwrap_or_default();
            debug!("Using oauth_credentials from {}", ENV_ACCESS_TOKEN);
            self.oauth_credentials = Some(serde_json::json!({
                "access_token": access_token,
                "api_domain": api_domain,
            }));
        }

        if let Some(user_agent) = get(ENV_USER_AGENT) {
            self.user_agent = user_agent;
        }

        if let Some(debug) = get(ENV_DEBUG) {
            self.debug = matches!(debug.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.api_token.is_none());
        assert!(config.user_agent.starts_with("pipedrive-cli/"));
        assert!(!config.debug);
        assert!(config.credentials().is_err());
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(
            r#"
            user_agent = "my-app/1.0"
            debug = true

            [oauth_credentials]
            access_token = "access-token"
            api_domain = "https://company.pipedrive.com"

            [retry]
            max_attempts = 2
            base_delay = 100
            "#,
        )
        .unwrap();

        assert_eq!(config.user_agent, "my-app/1.0");
        assert!(config.debug);
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.base_delay, Duration::from_millis(100));
        assert!(config.credentials().unwrap().is_oauth());
    }

    #[test]
    fn test_malformed_oauth_in_toml() {
        let config = Config::from_toml(r#"oauth_credentials = "not-a-table""#).unwrap();
        let err = config.credentials().unwrap_err();
        assert_eq!(err.to_string(), "oauth_credentials must be a mapping");
    }

    #[test]
    fn test_env_overlay() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_ACCESS_TOKEN, "env-access"),
            (ENV_API_DOMAIN, "https://env.pipedrive.com"),
            (ENV_DEBUG, "true"),
            (ENV_USER_AGENT, ""),
        ]);
        let mut config = Config::default();
        config.apply_env_from(|key| env.get(key).map(|v| v.to_string()));

        assert!(config.debug);
        assert!(config.user_agent.starts_with("pipedrive-cli/"));
        let creds = config.credentials().unwrap();
        assert_eq!(creds.origin(), "https://env.pipedrive.com");
    }

    #[test]
    fn test_env_access_token_without_domain_fails_validation() {
        let mut config = Config::default();
        config.apply_env_from(|key| (key == ENV_ACCESS_TOKEN).then(|| "env-access".to_string()));
        assert!(config.credentials().is_err());
    }

    #[test]
    fn test_debug_output_redacts_credentials() {
        let config = Config::default().with_api_token("secret-token");
        assert!(!format!("{:?}", config).contains("secret-token"));
    }
}
