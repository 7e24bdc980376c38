// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod listen;
pub mod ping;
pub mod url;

use pulse_client::ClientConfig;
use tracing::debug;

use crate::cli::GlobalArgs;
use crate::error::Result;

/// Resolve client configuration from the global flags.
///
/// Precedence, highest first: `--api-url`, `PULSE_API_URL`, the file named by
/// `--config` (or `PULSE_CONFIG`), defaults.
pub fn resolve_config(global: &GlobalArgs) -> Result<ClientConfig> {
    let config = match &global.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::discover()?,
    };
    let config = match &global.api_url {
        Some(url) => config.with_api_url(url.clone()),
        None => config,
    };
    debug!("resolved config: {:?}", config);
    Ok(config)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
