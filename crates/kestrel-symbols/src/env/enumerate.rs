// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Listing, globbing and completion.
//!
//! Every operation here is a linear walk over one namespace's ordered list,
//! most recently created first. Nothing here loads stubs.

use super::{Environment, SymbolError};
use crate::alias::{Alias, AliasTable, SymbolKind};
use crate::namespace::Scope;
use crate::text::{starts_with_ignore_case, wild_match};

/// Result of completing a partial command name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// A command with exactly this name exists.
    Exact(String),
    /// Exactly one command starts with the prefix.
    Unique(String),
    /// This many commands start with the prefix.
    Ambiguous(usize),
    /// Nothing starts with the prefix.
    None,
}

impl Environment {
    /// List symbols whose names start with the leaf of `filter`, in the
    /// namespace `filter` is qualified with. Without a filter, list the
    /// whole root namespace.
    ///
    /// # Errors
    ///
    /// Fails on an unresolvable qualifier, and for variables on `:name`
    /// (see [`visible_locals`](Self::visible_locals) instead).
    pub fn list(&self, kind: SymbolKind, filter: Option<&str>) -> Result<Vec<&Alias>, SymbolError> {
        let (table, prefix) = self.table_for(kind, filter.unwrap_or("::"))?;
        Ok(table
            .iter()
            .filter(|alias| starts_with_ignore_case(alias.name(), prefix))
            .collect())
    }

    /// Names starting with `prefix` that have no further `.` after it.
    ///
    /// An unresolvable qualifier yields no names.
    #[must_use]
    pub fn glob(&self, kind: SymbolKind, prefix: &str) -> Vec<String> {
        let Ok((table, prefix)) = self.table_for(kind, prefix) else {
            return Vec::new();
        };
        table
            .iter()
            .map(Alias::name)
            .filter(|name| starts_with_ignore_case(name, prefix))
            .filter(|name| name.get(prefix.len()..).is_some_and(|tail| !tail.contains('.')))
            .map(str::to_string)
            .collect()
    }

    /// Names matching the wildcard `pattern`, skipping names that continue
    /// with a `.` beyond the pattern's length.
    #[must_use]
    pub fn pattern_match(&self, kind: SymbolKind, pattern: &str) -> Vec<String> {
        let Ok((table, pattern)) = self.table_for(kind, pattern) else {
            return Vec::new();
        };
        table
            .iter()
            .map(Alias::name)
            .filter(|name| wild_match(pattern, name))
            .filter(|name| name.get(pattern.len()..).is_none_or(|tail| !tail.contains('.')))
            .map(str::to_string)
            .collect()
    }

    /// One representative per "folder" below `root`.
    ///
    /// ```text
    /// names: a.x.1 a.x.2 a.y a.z.9      root: a
    /// result: a.x a.y a.z
    /// ```
    ///
    /// Consecutive names sharing a folder collapse into one entry.
    #[must_use]
    pub fn subarray(&self, kind: SymbolKind, root: &str) -> Vec<String> {
        let Ok((table, root)) = self.table_for(kind, root) else {
            return Vec::new();
        };
        let prefix = format!("{root}.");

        let mut out: Vec<String> = Vec::new();
        for name in table.iter().map(Alias::name) {
            if !starts_with_ignore_case(name, &prefix) {
                continue;
            }
            let rest = &name[prefix.len()..];
            let end = prefix.len() + rest.find('.').unwrap_or(rest.len());
            let folder = &name[..end];
            if out.last().is_some_and(|last| last.eq_ignore_ascii_case(folder)) {
                continue;
            }
            out.push(folder.to_string());
        }
        out
    }

    /// Complete a partial command name against the current namespace.
    #[must_use]
    pub fn complete_command(&self, partial: &str) -> Completion {
        let Some(namespace) = self.namespaces.get(self.namespaces.current()) else {
            return Completion::None;
        };

        let mut found = None;
        let mut count = 0;
        for alias in namespace.commands().iter() {
            if !starts_with_ignore_case(alias.name(), partial) {
                continue;
            }
            if alias.name().len() == partial.len() {
                return Completion::Exact(alias.name().to_string());
            }
            count += 1;
            found = Some(alias.name());
        }

        match (count, found) {
            (1, Some(name)) => Completion::Unique(name.to_string()),
            (0, _) | (_, None) => Completion::None,
            (n, Some(_)) => Completion::Ambiguous(n),
        }
    }

    /// Locals visible from the top frame, optionally filtered by prefix.
    #[must_use]
    pub fn visible_locals(&self, prefix: Option<&str>) -> Vec<&Alias> {
        self.stack.visible_locals(prefix)
    }

    fn table_for<'a>(
        &self,
        kind: SymbolKind,
        name: &'a str,
    ) -> Result<(&AliasTable, &'a str), SymbolError> {
        let resolved = match kind {
            SymbolKind::Command => self.namespaces.resolve_command(name),
            SymbolKind::Variable => self.namespaces.resolve(name),
        };
        let ns = match resolved.scope {
            Scope::Global(ns) => ns,
            Scope::Local => return Err(SymbolError::LocalScope(name.to_string())),
            Scope::Invalid => return Err(SymbolError::InvalidNamespace(name.to_string())),
        };
        let namespace = self
            .namespaces
            .get(ns)
            .ok_or_else(|| SymbolError::InvalidNamespace(name.to_string()))?;
        Ok((namespace.table(kind), resolved.leaf))
    }
}
