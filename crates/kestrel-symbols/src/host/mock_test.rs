// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the scripted mock host.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::Host;
use super::mock::MockHost;
use crate::alias::SymbolKind;
use crate::env::Environment;

#[test]
fn load_runs_script_and_stamps_source() {
    let mut env = Environment::new();
    let mut host = MockHost::new().with_file("init.ks", "assign greeting hello\nassign target world");

    host.load_file(&mut env, "init.ks");

    assert_eq!(host.load_count("init.ks"), 1);
    assert_eq!(host.loads(), ["init.ks"]);
    assert_eq!(env.variable_text(&mut host, "greeting").as_deref(), Some("hello"));
    assert_eq!(env.package(SymbolKind::Variable, "target").as_deref(), Some("init.ks"));

    let target = env.lookup_variable(&mut host, "target").unwrap();
    assert_eq!(target.source().line, 2);
}

#[test]
fn load_restores_reported_location() {
    let mut env = Environment::new();
    let mut host = MockHost::new().with_file("lib.ks", "assign x 1");
    host.set_location("main.ks", 40);

    host.load_file(&mut env, "lib.ks");

    assert_eq!(host.current_file(), "main.ks");
    assert_eq!(host.current_line(), 40);
}

#[test]
fn missing_file_is_recorded() {
    let mut env = Environment::new();
    let mut host = MockHost::new();

    host.load_file(&mut env, "nope.ks");

    assert_eq!(host.load_count("nope.ks"), 1);
    assert_eq!(host.errors(), ["no such file: nope.ks"]);
}

#[test]
fn positional_arguments_expand() {
    let mut env = Environment::new();
    let mut host = MockHost::new();

    host.run(&mut env, "alias echo {assign last $*}; call echo a b c", "");

    assert!(host.errors().is_empty(), "{:?}", host.errors());
    assert_eq!(host.executed(), [("assign last $*".to_string(), "a b c".to_string())]);
    assert_eq!(env.variable_text(&mut host, "last").as_deref(), Some("a b c"));
}

#[test]
fn variables_expand() {
    let mut env = Environment::new();
    let mut host = MockHost::new();

    host.run(&mut env, "assign a left; assign b ${a}-right; assign c ${missing}x", "");

    assert_eq!(env.variable_text(&mut host, "b").as_deref(), Some("left-right"));
    assert_eq!(env.variable_text(&mut host, "c").as_deref(), Some("x"));
}

#[test]
fn braced_body_holds_several_statements() {
    let mut env = Environment::new();
    let mut host = MockHost::new();

    host.run(&mut env, "alias both {assign one 1; assign two 2}\ncall both", "");

    assert_eq!(env.variable_text(&mut host, "one").as_deref(), Some("1"));
    assert_eq!(env.variable_text(&mut host, "two").as_deref(), Some("2"));
}

#[test]
fn failing_statements_are_collected() {
    let mut env = Environment::new();
    let mut host = MockHost::new();

    host.run(&mut env, "frobnicate; call ghost; assign bad$name 1", "");

    assert_eq!(host.errors().len(), 3);
    assert_eq!(host.errors()[0], "unknown statement: frobnicate");
    assert_eq!(host.errors()[1], "no such alias: ghost");
}
