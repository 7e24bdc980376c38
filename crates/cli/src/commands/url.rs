// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use pulse_client::ApiUrlProvider;
use pulse_core::socket_url;

use crate::cli::GlobalArgs;
use crate::error::Result;

pub fn run(global: &GlobalArgs, user: &str) -> Result<()> {
    if user.trim().is_empty() {
        return Err(pulse_client::Error::EmptyIdentity.into());
    }
    let config = super::resolve_config(global)?;
    let base = config.api_url().unwrap_or_default();
    let url = socket_url(&base, user)?;
    println!("{}", url);
    Ok(())
}
