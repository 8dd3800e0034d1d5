// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Save/restore stack for temporarily shadowing a symbol.
//!
//! Pushing moves an alias out of its namespace table onto the stack; while
//! saved, no namespace refers to it. Popping moves it back (see
//! [`Environment::pop_alias`](crate::env::Environment::pop_alias)).

#[cfg(test)]
mod alias_stack_test;

use crate::alias::Alias;

/// An alias detached from its namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedAlias {
    alias: Alias,
    name: String,
    namespace_path: String,
}

impl SavedAlias {
    /// Wrap a detached alias with the name it was pushed under and the
    /// explicit path of the namespace it came from.
    #[must_use]
    pub fn new(alias: Alias, name: &str, namespace_path: &str) -> Self {
        Self {
            alias,
            name: name.to_string(),
            namespace_path: namespace_path.to_string(),
        }
    }

    /// The saved alias.
    #[inline]
    #[must_use]
    pub const fn alias(&self) -> &Alias {
        &self.alias
    }

    /// Name the alias was pushed under.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit full name of the namespace the alias came from.
    #[inline]
    #[must_use]
    pub fn namespace_path(&self) -> &str {
        &self.namespace_path
    }

    /// Take the alias back out.
    #[must_use]
    pub fn into_alias(self) -> Alias {
        self.alias
    }
}

/// Stack of saved aliases, newest on top.
#[derive(Debug, Default)]
pub struct AliasStack {
    entries: Vec<SavedAlias>,
}

impl AliasStack {
    /// Create an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of saved aliases.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is saved.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Save an alias on top.
    pub fn push(&mut self, saved: SavedAlias) {
        self.entries.push(saved);
    }

    /// Remove and return the newest entry pushed under `name`
    /// (case-insensitive).
    pub fn take(&mut self, name: &str) -> Option<SavedAlias> {
        let position = self
            .entries
            .iter()
            .rposition(|saved| saved.name.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(position))
    }

    /// Saved entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &SavedAlias> {
        self.entries.iter().rev()
    }
}
