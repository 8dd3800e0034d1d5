// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the runtime call stack.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;

fn stack() -> RuntimeStack {
    RuntimeStack::new(&EnvConfig::default())
}

fn src() -> SourceLocation {
    SourceLocation::new("test.ks", 7)
}

fn text_of(stack: &RuntimeStack, name: &str) -> Option<String> {
    let (level, id) = stack.find_local(name)?;
    stack.local(level, id)?.text().map(str::to_string)
}

// --- Push / pop ---

#[test]
fn push_and_pop() {
    let mut s = stack();
    assert!(s.is_empty());
    assert_eq!(s.capacity(), 0);

    assert_eq!(s.push(Some("outer")), 0);
    assert_eq!(s.push(None), 1);
    assert_eq!(s.depth(), 2);
    assert_eq!(s.capacity(), 8);
    assert_eq!(s.frame(0).unwrap().name(), Some("outer"));
    assert_eq!(s.frame(1).unwrap().parent(), Some(0));

    s.pop().unwrap();
    s.pop().unwrap();
    assert!(s.is_empty());
}

#[test]
fn named_frames_have_no_parent() {
    let mut s = stack();
    s.push(Some("a"));
    s.push(Some("b"));
    assert_eq!(s.frame(1).unwrap().parent(), None);
}

#[test]
fn capacity_doubles() {
    let mut s = stack();
    for _ in 0..9 {
        s.push(None);
    }
    assert_eq!(s.capacity(), 16);
    for _ in 0..17 {
        s.push(None);
    }
    assert_eq!(s.capacity(), 32);
}

#[test]
fn underflow_returns_dump() {
    let mut s = stack();
    let err = s.pop().unwrap_err();
    assert_eq!(err, StackError::Underflow(StackDump::default()));
    assert!(err.to_string().contains("underflow"));
}

#[test]
fn pop_destroys_locals_and_slot_is_reused_clean() {
    let mut s = stack();
    s.push(Some("f"));
    s.define_local("x", "1", &src()).unwrap();
    s.set_current_command("echo hi");
    s.pop().unwrap();

    s.push(None);
    let frame = s.frame(0).unwrap();
    assert!(frame.locals().is_empty());
    assert_eq!(frame.current_command(), None);
    assert_eq!(frame.name(), None);
}

// --- Scoping ---

#[test]
fn local_visible_through_transparent_frames() {
    let mut s = stack();
    s.push(Some("A"));
    s.define_local("v", "in A", &src()).unwrap();
    s.push(None);
    s.push(None);

    assert_eq!(text_of(&s, "v").as_deref(), Some("in A"));

    s.pop().unwrap();
    s.pop().unwrap();
    s.pop().unwrap();
    s.push(None);
    assert_eq!(text_of(&s, "v"), None);
}

#[test]
fn named_frame_is_a_boundary() {
    let mut s = stack();
    s.push(Some("caller"));
    s.define_local("v", "outer", &src()).unwrap();
    s.push(Some("callee"));

    assert_eq!(text_of(&s, "v"), None);
}

#[test]
fn define_updates_visible_local_in_place() {
    let mut s = stack();
    s.push(Some("f"));
    s.define_local("v", "1", &src()).unwrap();
    s.push(None);

    let (level, _) = s.define_local("V", "2", &src()).unwrap();
    assert_eq!(level, 0);
    assert!(s.frame(1).unwrap().locals().is_empty());
    assert_eq!(text_of(&s, "v").as_deref(), Some("2"));
}

#[test]
fn define_without_frame_fails() {
    let mut s = stack();
    assert_eq!(s.define_local("v", "1", &src()), Err(StackError::NoFrame));
}

#[test]
fn invalid_names_never_resolve() {
    let mut s = stack();
    s.push(Some("f"));
    s.define_local("ok", "1", &src()).unwrap();
    assert!(s.find_local("o-k").is_none());
    assert!(s.find_local("").is_none());
}

#[test]
fn set_local_in_ignores_visibility() {
    let mut s = stack();
    s.push(Some("caller"));
    s.define_local("x", "outer", &src()).unwrap();
    s.push(None);

    s.set_local_in(1, "x", "inner", &src()).unwrap();
    assert_eq!(s.frame(1).unwrap().locals().len(), 1);
    assert_eq!(text_of(&s, "x").as_deref(), Some("inner"));
    assert_eq!(s.set_local_in(5, "x", "y", &src()), Err(StackError::NoFrame));
}

// --- Dotted implicit creation ---

#[test]
fn dotted_name_created_under_declared_prefix() {
    let mut s = stack();
    s.push(Some("f"));
    s.define_local("arr.", "", &src()).unwrap();
    s.push(None);

    assert!(s.find_local("arr.3").is_none());
    let (level, id) = s.lookup_local("arr.3", &src()).unwrap();
    assert_eq!(level, 0);
    assert_eq!(s.local(level, id).unwrap().text(), Some(""));
    assert!(s.find_local("arr.3").is_some());
}

#[test]
fn dotted_name_without_prefix_is_not_created() {
    let mut s = stack();
    s.push(Some("f"));
    s.define_local("arr", "", &src()).unwrap();
    assert!(s.lookup_local("arr.3", &src()).is_none());
}

// --- Function return ---

#[test]
fn function_return_resolves_at_function_level() {
    let mut s = stack();
    s.push(Some("func"));
    s.set_function_level(Some(0));
    s.define_local(FUNCTION_RETURN, "", &src()).unwrap();

    // Nested enclosing frame would normally hide the slot
    s.push(Some("inner"));
    let (level, _) = s.define_local(FUNCTION_RETURN, "42", &src()).unwrap();
    assert_eq!(level, 0);
    s.pop().unwrap();

    assert_eq!(text_of(&s, FUNCTION_RETURN).as_deref(), Some("42"));
}

#[test]
fn popping_function_frame_clears_level() {
    let mut s = stack();
    s.push(Some("func"));
    s.set_function_level(Some(0));
    s.pop().unwrap();
    assert_eq!(s.function_level(), None);
}

#[test]
fn empty_name_pushes_transparent_frame() {
    let mut s = stack();
    s.push(Some("outer"));
    s.define_local("o", "1", &src()).unwrap();
    s.push(Some(""));

    assert_eq!(s.frame(1).unwrap().name(), None);
    assert_eq!(s.frame(1).unwrap().parent(), Some(0));
    assert_eq!(text_of(&s, "o").as_deref(), Some("1"));
}

// --- Locking ---

#[test]
fn lock_is_exclusive() {
    let mut s = stack();
    s.push(Some("a"));
    s.lock().unwrap();
    s.push(Some("b"));
    s.lock().unwrap();

    assert!(!s.frame(0).unwrap().is_locked());
    assert!(s.frame(1).unwrap().is_locked());
    assert_eq!(s.find_locked_frame(), Some(1));

    assert_eq!(s.unlock(), Some(1));
    assert_eq!(s.find_locked_frame(), None);
    assert_eq!(s.unlock(), None);
}

#[test]
fn transparent_push_on_locked_top_attaches_to_it() {
    let mut s = stack();
    s.push(Some("waiter"));
    s.define_local("w", "kept", &src()).unwrap();
    s.lock().unwrap();
    s.push(None);

    assert_eq!(s.frame(1).unwrap().parent(), Some(0));
    assert_eq!(text_of(&s, "w").as_deref(), Some("kept"));
}

#[test]
fn nested_block_above_lock_keeps_its_own_scope() {
    let mut s = stack();
    s.push(Some("waiter"));
    s.define_local("w", "hidden", &src()).unwrap();
    s.lock().unwrap();
    s.push(Some("hook"));
    s.define_local("x", "mine", &src()).unwrap();
    s.push(None);

    assert_eq!(s.frame(2).unwrap().parent(), Some(1));
    assert_eq!(text_of(&s, "x").as_deref(), Some("mine"));
    assert_eq!(text_of(&s, "w"), None);
}

#[test]
fn bless_reparents_top_to_locked_frame() {
    let mut s = stack();
    s.push(Some("waiter"));
    s.define_local("w", "1", &src()).unwrap();
    s.lock().unwrap();
    s.push(Some("resumed"));

    assert_eq!(text_of(&s, "w"), None);
    s.bless().unwrap();
    assert_eq!(s.frame(1).unwrap().name(), None);
    assert_eq!(s.frame(1).unwrap().parent(), Some(0));
    assert_eq!(text_of(&s, "w").as_deref(), Some("1"));
}

#[test]
fn lock_on_empty_stack_fails() {
    let mut s = stack();
    assert_eq!(s.lock(), Err(StackError::NoFrame));
    assert_eq!(s.bless(), Err(StackError::NoFrame));
}

// --- Diagnostics ---

#[test]
fn dump_lists_top_first() {
    let mut s = stack();
    s.push(Some("outer"));
    s.push(None);
    s.set_current_command("/echo");
    s.lock().unwrap();

    let dump = s.dump();
    assert_eq!(dump.frames.len(), 2);
    assert_eq!(dump.frames[0].index, 1);
    assert_eq!(dump.frames[0].current.as_deref(), Some("/echo"));
    assert!(dump.frames[0].locked);
    assert_eq!(dump.frames[1].name.as_deref(), Some("outer"));

    let text = dump.to_string();
    assert!(text.contains("[1] - parent=0 locked"));
    assert!(text.contains("[0] outer"));
}

#[test]
fn visible_locals_follow_chain() {
    let mut s = stack();
    s.push(Some("hidden"));
    s.define_local("h", "1", &src()).unwrap();
    s.push(Some("f"));
    s.define_local("alpha", "1", &src()).unwrap();
    s.push(None);
    s.define_local("beta", "2", &src()).unwrap();

    let names: Vec<_> = s.visible_locals(None).iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["beta", "alpha"]);

    let names: Vec<_> = s.visible_locals(Some("AL")).iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["alpha"]);
}
