// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Socket endpoint derivation.
//!
//! The backend publishes one base URL for both REST and real-time traffic.
//! The socket endpoint is that URL with the HTTP scheme swapped for its
//! WebSocket counterpart and the user identity appended as a query parameter:
//!
//! ```text
//! https://api.example.com  + "user-1"  ->  wss://api.example.com/?user_id=user-1
//! ```

use url::Url;

use crate::error::{Error, Result};

/// Query parameter carrying the user identity.
pub const IDENTITY_PARAM: &str = "user_id";

/// Derives the WebSocket URL for `identity` from the backend base URL.
///
/// `http`/`https` map to `ws`/`wss`; `ws`/`wss` are accepted unchanged.
pub fn socket_url(base: &str, identity: &str) -> Result<Url> {
    let base = base.trim();
    if base.is_empty() {
        return Err(Error::MissingApiUrl);
    }

    let mut url = Url::parse(base).map_err(|e| Error::InvalidApiUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(Error::InvalidApiUrl {
                url: base.to_string(),
                reason: format!("unsupported scheme '{}'", other),
            })
        }
    };

    if url.set_scheme(scheme).is_err() {
        return Err(Error::InvalidApiUrl {
            url: base.to_string(),
            reason: format!("cannot switch scheme to '{}'", scheme),
        });
    }

    url.query_pairs_mut().append_pair(IDENTITY_PARAM, identity);
    Ok(url)
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod tests;
