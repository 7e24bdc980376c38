// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables read by the client are defined here
//! with typed accessor functions.

use std::path::PathBuf;

/// Environment variable names.
pub mod vars {
    /// Backend base URL.
    pub const PULSE_API_URL: &str = "PULSE_API_URL";
    /// Path to a TOML config file.
    pub const PULSE_CONFIG: &str = "PULSE_CONFIG";
    /// Log filter.
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Returns the value of `PULSE_API_URL` if set and not blank.
pub fn api_url() -> Option<String> {
    std::env::var(vars::PULSE_API_URL)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Returns the value of `PULSE_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    std::env::var(vars::PULSE_CONFIG)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
