// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the alias stack container.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;
use crate::alias::{AliasBody, SourceLocation};

fn saved(name: &str, value: &str) -> SavedAlias {
    let alias = Alias::new(name, None, AliasBody::text(value), SourceLocation::default());
    SavedAlias::new(alias, name, "::")
}

#[test]
fn iter_is_newest_first() {
    let mut stack = AliasStack::new();
    stack.push(saved("a", "1"));
    stack.push(saved("b", "2"));

    let names: Vec<_> = stack.iter().map(SavedAlias::name).collect();
    assert_eq!(names, vec!["b", "a"]);
}

#[test]
fn take_finds_newest_match() {
    let mut stack = AliasStack::new();
    stack.push(saved("x", "old"));
    stack.push(saved("y", "other"));
    stack.push(saved("x", "new"));

    let taken = stack.take("X").unwrap();
    assert_eq!(taken.alias().text(), Some("new"));
    assert_eq!(stack.len(), 2);

    let taken = stack.take("x").unwrap();
    assert_eq!(taken.into_alias().text(), Some("old"));
    assert!(stack.take("x").is_none());
}

#[test]
fn take_missing() {
    let mut stack = AliasStack::new();
    assert!(stack.is_empty());
    assert!(stack.take("nope").is_none());
}
