// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `pulse url`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use yare::parameterized;

fn pulse() -> Command {
    let mut cmd = cargo_bin_cmd!("pulse");
    cmd.env_remove("PULSE_API_URL").env_remove("PULSE_CONFIG");
    cmd
}

#[parameterized(
    http = { "http://localhost:8000", "ws://localhost:8000/?user_id=user-1" },
    https = { "https://api.example.com", "wss://api.example.com/?user_id=user-1" },
    ws = { "ws://localhost:8000", "ws://localhost:8000/?user_id=user-1" },
    wss = { "wss://api.example.com", "wss://api.example.com/?user_id=user-1" },
    with_path = { "https://api.example.com/v1", "wss://api.example.com/v1?user_id=user-1" },
)]
fn url_derives_socket_endpoint(base: &str, expected: &str) {
    pulse()
        .args(["url", "--user", "user-1", "--api-url", base])
        .assert()
        .success()
        .stdout(format!("{}\n", expected));
}

#[test]
fn url_encodes_identity() {
    pulse()
        .args(["url", "--user", "a b@c", "--api-url", "http://localhost:8000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("user_id=a+b%40c"));
}

#[test]
fn url_reads_env() {
    pulse()
        .env("PULSE_API_URL", "https://env.example.com")
        .args(["url", "--user", "u1"])
        .assert()
        .success()
        .stdout("wss://env.example.com/?user_id=u1\n");
}

#[test]
fn url_flag_overrides_env() {
    pulse()
        .env("PULSE_API_URL", "https://env.example.com")
        .args(["url", "--user", "u1", "--api-url", "http://flag:9000"])
        .assert()
        .success()
        .stdout("ws://flag:9000/?user_id=u1\n");
}

#[test]
fn url_reads_config_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("pulse.toml");
    std::fs::write(&path, "api_url = \"http://from-file:8000\"\n").unwrap();

    pulse()
        .args(["url", "--user", "u1", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout("ws://from-file:8000/?user_id=u1\n");
}

#[test]
fn url_reads_config_from_env_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("pulse.toml");
    std::fs::write(&path, "api_url = \"https://from-file.example.com\"\n").unwrap();

    pulse()
        .env("PULSE_CONFIG", &path)
        .args(["url", "--user", "u1"])
        .assert()
        .success()
        .stdout("wss://from-file.example.com/?user_id=u1\n");
}

#[test]
fn url_without_api_url_fails_with_hint() {
    pulse()
        .args(["url", "--user", "u1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: api url is not configured"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn url_rejects_unsupported_scheme() {
    pulse()
        .args(["url", "--user", "u1", "--api-url", "ftp://example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported scheme 'ftp'"));
}

#[test]
fn url_rejects_blank_user() {
    pulse()
        .args(["url", "--user", " ", "--api-url", "http://localhost:8000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("identity cannot be empty"));
}
