// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Dynamic scoping through the runtime call stack.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

#[test]
fn enclosing_local_visible_from_transparent_frames() {
    let (mut env, mut host) = common::fresh();
    env.stack_mut().push(Some("A"));
    env.define_local(&host, "only_a", "here").unwrap();
    env.stack_mut().push(None);
    env.stack_mut().push(None);

    assert_eq!(env.variable_text(&mut host, "only_a").as_deref(), Some("here"));

    env.stack_mut().pop().unwrap();
    env.stack_mut().pop().unwrap();
    env.stack_mut().pop().unwrap();
    assert!(env.variable_text(&mut host, "only_a").is_none());
}

#[test]
fn named_frame_hides_callers_locals() {
    let (mut env, mut host) = common::fresh();
    env.stack_mut().push(Some("caller"));
    env.define_local(&host, "secret", "1").unwrap();
    env.stack_mut().push(Some("callee"));

    assert!(env.variable_text(&mut host, "secret").is_none());
}

#[test]
fn frames_pushed_on_locked_frame_reattach_to_it() {
    let (mut env, mut host) = common::fresh();
    env.stack_mut().push(Some("waiter"));
    env.define_local(&host, "state", "waiting").unwrap();
    env.stack_mut().lock().unwrap();

    let resumed = env.stack_mut().push(None);
    assert_eq!(env.stack().frame(resumed).unwrap().parent(), Some(0));
    assert_eq!(env.variable_text(&mut host, "state").as_deref(), Some("waiting"));

    assert_eq!(env.stack_mut().unlock(), Some(0));
    env.stack_mut().pop().unwrap();
    env.stack_mut().pop().unwrap();
    assert!(env.stack().is_empty());
}

#[test]
fn macro_run_during_wait_sees_its_own_locals() {
    let (mut env, mut host) = common::fresh();
    env.stack_mut().push(Some("waiter"));
    env.define_local(&host, "state", "waiting").unwrap();
    env.stack_mut().lock().unwrap();

    // A hook fires while the wait is pending and opens a nested block
    env.stack_mut().push(Some("hook"));
    env.define_local(&host, "x", "mine").unwrap();
    let block = env.stack_mut().push(None);

    assert_eq!(env.stack().frame(block).unwrap().parent(), Some(1));
    assert_eq!(env.variable_text(&mut host, "x").as_deref(), Some("mine"));
    assert!(env.variable_text(&mut host, "state").is_none());
}

#[test]
fn bless_turns_top_into_transparent_frame() {
    let (mut env, mut host) = common::fresh();
    env.stack_mut().push(Some("waiter"));
    env.define_local(&host, "state", "kept").unwrap();
    env.stack_mut().lock().unwrap();
    env.stack_mut().push(Some("handler"));

    assert!(env.variable_text(&mut host, "state").is_none());
    env.stack_mut().bless().unwrap();
    assert_eq!(env.variable_text(&mut host, "state").as_deref(), Some("kept"));
}

#[test]
fn stack_dump_reports_current_command() {
    let (mut env, _) = common::fresh();
    env.stack_mut().push(Some("outer"));
    env.stack_mut().set_current_command("echo hi");

    let dump = env.stack().dump().to_string();
    assert!(dump.contains("outer"), "{dump}");
    assert!(dump.contains("echo hi"), "{dump}");

    env.stack_mut().unset_current_command();
    assert!(!env.stack().dump().to_string().contains("echo hi"));
}

#[test]
fn underflow_is_reported() {
    let (mut env, _) = common::fresh();
    assert!(env.stack_mut().pop().is_err());
}
