// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration management.
//!
//! Configuration may come from a TOML file and includes:
//! - `api_url`: Backend base URL; the socket endpoint is derived from it
//! - `reconnect_base_delay_ms`: Delay before the first reconnection attempt
//! - `max_reconnect_attempts`: Attempts before the connection is marked failed
//! - `status_poll_interval_ms`: How often bindings reconcile connection status
//!
//! `PULSE_API_URL` overrides the file's `api_url`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backoff::ReconnectPolicy;
use crate::env;
use crate::error::{Error, Result};

/// Supplies the backend base URL.
pub trait ApiUrlProvider: Send + Sync {
    /// The base URL, if one is configured.
    fn api_url(&self) -> Option<String>;
}

/// A fixed base URL.
#[derive(Debug, Clone)]
pub struct StaticApiUrl(String);

impl StaticApiUrl {
    pub fn new(url: impl Into<String>) -> Self {
        StaticApiUrl(url.into())
    }
}

impl ApiUrlProvider for StaticApiUrl {
    fn api_url(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Reads `PULSE_API_URL` on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvApiUrl;

impl ApiUrlProvider for EnvApiUrl {
    fn api_url(&self) -> Option<String> {
        env::api_url()
    }
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL (http, https, ws or wss).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Delay before the first reconnection attempt in milliseconds (default: 1000).
    #[serde(default = "default_reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,
    /// Maximum reconnection attempts before giving up (default: 5).
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Binding status poll interval in milliseconds (default: 1000).
    #[serde(default = "default_status_poll_interval_ms")]
    pub status_poll_interval_ms: u64,
}

fn default_reconnect_base_delay_ms() -> u64 {
    1000
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_status_poll_interval_ms() -> u64 {
    1000
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: None,
            reconnect_base_delay_ms: default_reconnect_base_delay_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            status_poll_interval_ms: default_status_poll_interval_ms(),
        }
    }
}

impl ClientConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config.with_env_overrides())
    }

    /// Load from `PULSE_CONFIG` if set, otherwise defaults plus environment.
    pub fn discover() -> Result<Self> {
        match env::config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default().with_env_overrides()),
        }
    }

    /// Apply environment variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = env::api_url() {
            self.api_url = Some(url);
        }
        self
    }

    /// Replace the base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// The reconnection policy described by this config.
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(
            Duration::from_millis(self.reconnect_base_delay_ms),
            self.max_reconnect_attempts,
        )
    }

    /// Binding status poll interval.
    pub fn status_poll_interval(&self) -> Duration {
        Duration::from_millis(self.status_poll_interval_ms)
    }
}

impl ApiUrlProvider for ClientConfig {
    fn api_url(&self) -> Option<String> {
        self.api_url.clone().or_else(env::api_url)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
