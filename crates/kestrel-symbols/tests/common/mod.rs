// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Shared test infrastructure for integration tests.
//!
//! This module is **not** a test file, so it must comply with full clippy
//! rules. Test-specific allowances (like `unwrap_used`) are only permitted in
//! `*_test.rs` files.

#![allow(dead_code, reason = "each test file uses a subset")]

use kestrel_symbols::Environment;
use kestrel_symbols::host::mock::MockHost;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to the test harness, filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A fresh environment and host with tracing enabled.
#[must_use]
pub fn fresh() -> (Environment, MockHost) {
    init_tracing();
    (Environment::new(), MockHost::new())
}

/// A fresh environment with a host that can load `files`.
#[must_use]
pub fn with_files(files: &[(&str, &str)]) -> (Environment, MockHost) {
    init_tracing();
    let host = files
        .iter()
        .fold(MockHost::new(), |host, (name, script)| host.with_file(name, script));
    (Environment::new(), host)
}
