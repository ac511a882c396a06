//! Top-level application configuration.
//!
//! Configuration is stored in `.nearby/config.yaml` and includes:
//! - API base URL and request timeout
//! - Session access token
//! - Per-list page size and debounce overrides

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{DEFAULT_PAGE_SIZE, ListKind};
use crate::error::{NearbyError, Result};
use crate::paths::config_file;

/// Environment variable that overrides the configured access token
pub const ACCESS_TOKEN_ENV: &str = "NEARBY_ACCESS_TOKEN";

/// Environment variable that overrides the configured API base URL
pub const BASE_URL_ENV: &str = "NEARBY_API_URL";

/// Largest page size the list endpoints accept
pub const MAX_PAGE_SIZE: u32 = 100;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API location
    #[serde(default)]
    pub api: ApiConfig,

    /// Authentication
    #[serde(default)]
    pub auth: AuthConfig,

    /// Remote request timeout in seconds (default: 30)
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout: u64,

    /// Per-list overrides, keyed by list name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lists: BTreeMap<ListKind, ListOverrides>,
}

fn default_remote_timeout() -> u64 {
    30
}

fn default_base_url() -> String {
    "http://localhost:8080/api/".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            remote_timeout: default_remote_timeout(),
            lists: BTreeMap::new(),
        }
    }
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Authentication configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Overrides for a single list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        config_file()
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for (kind, overrides) in &self.lists {
            if let Some(size) = overrides.page_size {
                validate_page_size(size).map_err(|e| {
                    NearbyError::Config(format!("lists.{kind}.page_size: {e}"))
                })?;
            }
        }
        Ok(())
    }

    /// API base URL from environment variable or config
    pub fn base_url(&self) -> String {
        if let Ok(url) = env::var(BASE_URL_ENV)
            && !url.is_empty()
        {
            return url;
        }
        self.api.base_url.clone()
    }

    /// Access token from environment variable or config
    pub fn access_token(&self) -> Option<String> {
        if let Ok(token) = env::var(ACCESS_TOKEN_ENV)
            && !token.is_empty()
        {
            return Some(token);
        }
        self.auth.access_token.clone()
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout)
    }

    /// Effective page size for a list
    pub fn page_size(&self, kind: ListKind) -> u32 {
        self.lists
            .get(&kind)
            .and_then(|o| o.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Effective debounce interval for a list
    pub fn debounce(&self, kind: ListKind) -> Duration {
        self.lists
            .get(&kind)
            .and_then(|o| o.debounce_ms)
            .map(Duration::from_millis)
            .unwrap_or_else(|| kind.default_debounce())
    }

    /// Read a value by dotted key
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match key {
            "api.base_url" => Ok(Some(self.api.base_url.clone())),
            "auth.access_token" => Ok(self.auth.access_token.clone()),
            "remote_timeout" => Ok(Some(self.remote_timeout.to_string())),
            _ => {
                let (kind, field) = parse_list_key(key)?;
                let overrides = self.lists.get(&kind);
                Ok(match field {
                    ListField::PageSize => overrides
                        .and_then(|o| o.page_size)
                        .map(|size| size.to_string()),
                    ListField::DebounceMs => overrides
                        .and_then(|o| o.debounce_ms)
                        .map(|ms| ms.to_string()),
                })
            }
        }
    }

    /// Set a value by dotted key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.base_url" => {
                url::Url::parse(value)?;
                self.api.base_url = value.to_string();
            }
            "auth.access_token" => {
                self.auth.access_token = Some(value.to_string());
            }
            "remote_timeout" => {
                self.remote_timeout = parse_number(key, value)?;
            }
            _ => {
                let (kind, field) = parse_list_key(key)?;
                let overrides = self.lists.entry(kind).or_default();
                match field {
                    ListField::PageSize => {
                        let size: u32 = parse_number(key, value)?;
                        validate_page_size(size)
                            .map_err(|e| NearbyError::Config(format!("{key}: {e}")))?;
                        overrides.page_size = Some(size);
                    }
                    ListField::DebounceMs => {
                        overrides.debounce_ms = Some(parse_number(key, value)?);
                    }
                }
            }
        }
        Ok(())
    }
}

enum ListField {
    PageSize,
    DebounceMs,
}

fn parse_list_key(key: &str) -> Result<(ListKind, ListField)> {
    let unknown = || {
        NearbyError::Config(format!(
            "unknown config key '{key}'. Valid keys: api.base_url, auth.access_token, \
             remote_timeout, lists.<list>.page_size, lists.<list>.debounce_ms"
        ))
    };

    let rest = key.strip_prefix("lists.").ok_or_else(unknown)?;
    let (kind, field) = rest.split_once('.').ok_or_else(unknown)?;
    let kind: ListKind = kind.parse()?;
    let field = match field {
        "page_size" => ListField::PageSize,
        "debounce_ms" => ListField::DebounceMs,
        _ => return Err(unknown()),
    };
    Ok((kind, field))
}

fn parse_number<N: std::str::FromStr>(key: &str, value: &str) -> Result<N> {
    value
        .trim()
        .parse()
        .map_err(|_| NearbyError::Config(format!("{key} must be a non-negative integer, got '{value}'")))
}

fn validate_page_size(size: u32) -> std::result::Result<(), String> {
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(format!("page size must be between 1 and {MAX_PAGE_SIZE}, got {size}"));
    }
    Ok(())
}
