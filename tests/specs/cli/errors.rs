// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `pulse listen` and `pulse ping` failure paths.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::net::TcpListener;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

fn pulse() -> Command {
    let mut cmd = cargo_bin_cmd!("pulse");
    cmd.env_remove("PULSE_API_URL")
        .env_remove("PULSE_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

/// Base URL of a local port nothing listens on.
fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[test]
fn listen_without_api_url_fails() {
    pulse()
        .args(["listen", "--user", "u1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: api url is not configured"));
}

#[test]
fn listen_rejects_unknown_kind() {
    pulse()
        .args(["listen", "--user", "u1", "--kind", "bogus"])
        .arg("--api-url")
        .arg(closed_port_url())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown event kind: 'bogus'"));
}

#[test]
fn listen_gives_up_after_max_attempts() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("pulse.toml");
    std::fs::write(
        &path,
        "reconnect_base_delay_ms = 10\nmax_reconnect_attempts = 2\nstatus_poll_interval_ms = 10\n",
    )
    .unwrap();

    pulse()
        .args(["listen", "--user", "u1", "--config"])
        .arg(&path)
        .arg("--api-url")
        .arg(closed_port_url())
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("\"type\":\"error\""))
        .stderr(predicate::str::contains("gave up reconnecting after 2 attempts"));
}

#[test]
fn ping_against_closed_port_fails() {
    pulse()
        .args(["ping", "--user", "u1", "--timeout", "1"])
        .arg("--api-url")
        .arg(closed_port_url())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("transport error: connection failed"));
}

#[test]
fn ping_rejects_empty_user() {
    pulse()
        .args(["ping", "--user", "", "--api-url", "http://127.0.0.1:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("identity cannot be empty"));
}
