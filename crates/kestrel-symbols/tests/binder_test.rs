// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Argument lists bound through macro calls.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use kestrel_symbols::{AliasBody, ArgList};

mod common;

#[test]
fn words_and_catchall_split_arguments() {
    let (mut env, mut host) = common::fresh();
    let arglist = ArgList::parse("(a, b words 2, ...)", 32).unwrap();
    let frame = env.stack_mut().push(Some("f"));
    let mut args = "1 2 3 4 5".to_string();

    env.bind_arguments(&mut host, &arglist, &mut args, frame)
        .unwrap();

    assert_eq!(env.variable_text(&mut host, "a").as_deref(), Some("1"));
    assert_eq!(env.variable_text(&mut host, "b").as_deref(), Some("2 3"));
    assert_eq!(args, "4 5");
}

#[test]
fn default_applies_to_missing_argument() {
    let (mut env, mut host) = common::fresh();
    let arglist = ArgList::parse("(x default {foo})", 32).unwrap();
    let frame = env.stack_mut().push(Some("f"));
    let mut args = String::new();

    env.bind_arguments(&mut host, &arglist, &mut args, frame)
        .unwrap();

    assert_eq!(env.variable_text(&mut host, "x").as_deref(), Some("foo"));
}

#[test]
fn catchall_remainder_reaches_the_body() {
    let (mut env, mut host) = common::fresh();
    let arglist = ArgList::parse("(first, ...)", 32).unwrap();
    env.define_command(&host, "split", AliasBody::text("assign head ${first}; assign tail $*"), Some(arglist), false)
        .unwrap();

    assert_eq!(env.call_command(&mut host, "split", "x y z"), Ok(true));
    assert_eq!(env.variable_text(&mut host, "head").as_deref(), Some("x"));
    assert_eq!(env.variable_text(&mut host, "tail").as_deref(), Some("y z"));
}

#[test]
fn default_expands_through_host() {
    let (mut env, mut host) = common::fresh();
    env.define_variable(&host, "fallback", AliasBody::text("from-host"), false)
        .unwrap();
    let arglist = ArgList::parse("(x default ${fallback})", 32).unwrap();
    env.define_command(&host, "show", AliasBody::text("assign shown ${x}"), Some(arglist), false)
        .unwrap();

    env.call_command(&mut host, "show", "").unwrap();
    assert_eq!(env.variable_text(&mut host, "shown").as_deref(), Some("from-host"));
}
