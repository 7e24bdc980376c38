// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use pulse_client::{ConnectionManager, ConnectionState, Message, Subscription, Topic};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cli::GlobalArgs;
use crate::error::{Error, Result};

pub async fn run(
    global: &GlobalArgs,
    user: &str,
    kinds: &[String],
    ping_interval: Option<u64>,
) -> Result<()> {
    let topics = parse_topics(kinds)?;
    let config = super::resolve_config(global)?;
    let max_attempts = config.max_reconnect_attempts;
    let mut status = interval(config.status_poll_interval().max(Duration::from_millis(10)));
    status.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let manager = ConnectionManager::new(config);
    let _subscriptions: Vec<Subscription> = topics
        .into_iter()
        .map(|topic| manager.subscribe(topic, print_message))
        .collect();

    match manager.connect(user).await {
        Ok(()) => {}
        Err(pulse_client::Error::Transport(e)) => {
            warn!("initial connection failed, will retry: {}", e);
        }
        Err(e) => return Err(e.into()),
    }

    let mut pinger = ping_interval.filter(|secs| *secs > 0).map(|secs| {
        let mut ticker = interval(Duration::from_secs(secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let outcome = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupted, disconnecting");
                break Ok(());
            }
            _ = status.tick() => {
                if manager.state() == ConnectionState::Failed {
                    break Err(Error::ConnectionFailed { attempts: max_attempts });
                }
            }
            _ = next_tick(&mut pinger) => {
                if !manager.ping() {
                    debug!("skipped keep-alive ping, socket not open");
                }
            }
        }
    };

    manager.disconnect();
    outcome
}

/// Topics to subscribe for the given `--kind` values.
///
/// No values, or any `*`, means a single wildcard subscription so each
/// message prints once.
pub fn parse_topics(kinds: &[String]) -> Result<Vec<Topic>> {
    let mut topics = Vec::new();
    for kind in kinds {
        let topic: Topic = kind.parse()?;
        if topic == Topic::All {
            return Ok(vec![Topic::All]);
        }
        if !topics.contains(&topic) {
            topics.push(topic);
        }
    }
    if topics.is_empty() {
        topics.push(Topic::All);
    }
    Ok(topics)
}

/// One output line for a message.
pub fn format_line(message: &Message) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}

fn print_message(message: &Arc<Message>) {
    match format_line(message) {
        Ok(line) => {
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "{}", line);
            let _ = stdout.flush();
        }
        Err(e) => warn!("failed to format message: {}", e),
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "listen_tests.rs"]
mod tests;
