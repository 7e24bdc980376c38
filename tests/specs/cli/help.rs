// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for help output.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use yare::parameterized;

fn pulse() -> Command {
    cargo_bin_cmd!("pulse")
}

#[test]
fn help_lists_commands() {
    pulse()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("url"))
        .stdout(predicate::str::contains("listen"))
        .stdout(predicate::str::contains("ping"))
        .stdout(predicate::str::contains("Get started"));
}

#[test]
fn no_arguments_shows_usage_and_fails() {
    pulse()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[parameterized(
    url = { "url" },
    listen = { "listen" },
    ping = { "ping" },
)]
fn command_supports_help_flag(cmd: &str) {
    pulse()
        .args([cmd, "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--user"))
        .stdout(predicate::str::contains("--api-url"));
}

#[test]
fn listen_help_shows_kind_option() {
    pulse()
        .args(["listen", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--kind"))
        .stdout(predicate::str::contains("--ping-interval"));
}

#[test]
fn version_flag() {
    pulse()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("pulse "));
}

#[test]
fn unknown_command_fails() {
    pulse()
        .arg("bogus")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
