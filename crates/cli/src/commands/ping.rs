// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use pulse_client::{ConnectionManager, EventKind, Message};
use tokio::sync::mpsc;
use tracing::debug;

use crate::cli::GlobalArgs;
use crate::error::{Error, Result};

use super::listen::format_line;

pub async fn run(global: &GlobalArgs, user: &str, timeout_secs: u64) -> Result<()> {
    let config = super::resolve_config(global)?;
    let manager = ConnectionManager::new(config);

    let result = match manager.connect(user).await {
        Ok(()) => round_trip(&manager, Duration::from_secs(timeout_secs)).await,
        Err(e) => Err(e.into()),
    };
    manager.disconnect();

    let pong = result?;
    println!("{}", format_line(&pong)?);
    Ok(())
}

/// Send a ping on an open connection and wait for the first pong.
pub async fn round_trip(manager: &ConnectionManager, timeout: Duration) -> Result<Arc<Message>> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _pong = manager.subscribe(EventKind::Pong, move |msg| {
        let _ = tx.send(msg.clone());
    });

    let sent_at = tokio::time::Instant::now();
    if !manager.ping() {
        return Err(Error::PingNotSent);
    }

    match tokio::time::timeout(timeout, rx.recv()).await {
        Ok(Some(pong)) => {
            debug!("pong after {:?}", sent_at.elapsed());
            Ok(pong)
        }
        _ => Err(Error::Timeout {
            secs: timeout.as_secs(),
        }),
    }
}

#[cfg(test)]
#[path = "ping_tests.rs"]
mod tests;
