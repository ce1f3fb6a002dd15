//! Client configuration.
//!
//! Defaults are usable as-is; `from_env` overlays `SCHOLAR_*` variables.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: &'static str, reason: String },
}

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL prepended to relative request URIs by the HTTP transport.
    pub api_base_url: String,
    pub guards: GuardConfig,
    pub interceptor: InterceptorConfig,
}

/// Paths and role tags consulted by the route gates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub login_path: String,
    pub profile_path: String,
    /// Landing page of the standard-user area.
    pub home_path: String,
    pub admin_home_path: String,
    /// Roles that belong in the admin area rather than the standard area.
    pub elevated_roles: Vec<String>,
    pub profile_incomplete_message: String,
}

/// Settings for the request interceptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptorConfig {
    /// URL fragments whose requests never toggle the busy indicator.
    pub busy_exclusions: Vec<String>,
    /// Optional scheme prefix for the authorization header (e.g. "Bearer").
    /// `None` sends the raw token.
    pub auth_scheme: Option<String>,
    /// Attach an empty authorization header when no token is held.
    pub attach_empty_token: bool,
    pub propagate_request_id: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            guards: GuardConfig::default(),
            interceptor: InterceptorConfig::default(),
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            profile_path: "/profile/edit".to_string(),
            home_path: "/dashboard".to_string(),
            admin_home_path: "/admin".to_string(),
            elevated_roles: vec!["admin".to_string(), "super_admin".to_string()],
            profile_incomplete_message: "Please complete your profile to continue".to_string(),
        }
    }
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            busy_exclusions: Vec::new(),
            auth_scheme: None,
            attach_empty_token: true,
            propagate_request_id: true,
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `SCHOLAR_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("SCHOLAR_API_URL") {
            config.api_base_url = url;
        }
        if let Some(path) = lookup("SCHOLAR_LOGIN_PATH") {
            config.guards.login_path = path;
        }
        if let Some(path) = lookup("SCHOLAR_PROFILE_PATH") {
            config.guards.profile_path = path;
        }
        if let Some(path) = lookup("SCHOLAR_HOME_PATH") {
            config.guards.home_path = path;
        }
        if let Some(path) = lookup("SCHOLAR_ADMIN_PATH") {
            config.guards.admin_home_path = path;
        }
        if let Some(roles) = lookup("SCHOLAR_ELEVATED_ROLES") {
            config.guards.elevated_roles = split_list(&roles);
        }
        if let Some(list) = lookup("SCHOLAR_BUSY_EXCLUSIONS") {
            config.interceptor.busy_exclusions = split_list(&list);
        }
        if let Some(scheme) = lookup("SCHOLAR_AUTH_SCHEME") {
            let scheme = scheme.trim();
            config.interceptor.auth_scheme = (!scheme.is_empty()).then(|| scheme.to_string());
        }
        if let Some(val) = lookup("SCHOLAR_ATTACH_EMPTY_TOKEN") {
            config.interceptor.attach_empty_token = parse_bool("SCHOLAR_ATTACH_EMPTY_TOKEN", &val)?;
        }
        if let Some(val) = lookup("SCHOLAR_PROPAGATE_REQUEST_ID") {
            config.interceptor.propagate_request_id =
                parse_bool("SCHOLAR_PROPAGATE_REQUEST_ID", &val)?;
        }

        Ok(config)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var,
            reason: format!("expected bool, got '{other}'"),
        }),
    }
}
