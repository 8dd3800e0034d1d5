// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Temporarily shadowing a symbol with the alias stacks.

use tracing::debug;

use super::Environment;
use super::lookup::Location;
use crate::alias::SymbolKind;
use crate::alias_stack::{AliasStack, SavedAlias};
use crate::host::Host;
use crate::namespace::NamespaceId;

/// What [`Environment::pop_alias`] did with the saved entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopOutcome {
    /// Put back into this namespace, replacing any entry defined since.
    Restored(NamespaceId),
    /// Its namespace no longer exists; the entry was dropped.
    Discarded,
    /// Nothing was saved under that name.
    NotFound,
}

impl Environment {
    /// Detach the symbol `name` from its namespace and save it.
    ///
    /// Stubs are loaded first. Locals cannot be pushed. Returns false if the
    /// name does not resolve to a namespace symbol.
    pub fn push_alias<H: Host + ?Sized>(&mut self, host: &mut H, kind: SymbolKind, name: &str) -> bool {
        let Some(Location::Namespace { ns, kind, id }) = self.locate(host, kind, name, false) else {
            return false;
        };
        let Some(path) = self.namespaces.full_name(ns, true) else {
            return false;
        };
        let Some(mut alias) = self
            .namespaces
            .get_mut(ns)
            .and_then(|namespace| namespace.table_mut(kind).remove(id))
        else {
            return false;
        };

        alias.set_namespace(None);
        debug!(name, kind = kind.label(), namespace = path.as_str(), "alias pushed");
        self.alias_stack_mut(kind).push(SavedAlias::new(alias, name, &path));
        true
    }

    /// Restore the newest entry saved under `name`.
    pub fn pop_alias(&mut self, kind: SymbolKind, name: &str) -> PopOutcome {
        let Some(saved) = self.alias_stack_mut(kind).take(name) else {
            return PopOutcome::NotFound;
        };
        let Some(ns) = self.namespaces.find(saved.namespace_path()) else {
            debug!(name, namespace = saved.namespace_path(), "saved alias discarded");
            return PopOutcome::Discarded;
        };
        let Some(namespace) = self.namespaces.get_mut(ns) else {
            return PopOutcome::Discarded;
        };

        let mut alias = saved.into_alias();
        alias.set_namespace(Some(ns));
        let table = namespace.table_mut(kind);
        if table.remove_named(alias.name()).is_some() {
            debug!(name, kind = kind.label(), "replaced definition made while pushed");
        }
        table.insert(alias);
        debug!(name, kind = kind.label(), "alias popped");
        PopOutcome::Restored(ns)
    }

    /// Saved entries of `kind`, newest first.
    #[must_use]
    pub const fn alias_stack(&self, kind: SymbolKind) -> &AliasStack {
        match kind {
            SymbolKind::Command => &self.command_stack,
            SymbolKind::Variable => &self.variable_stack,
        }
    }

    fn alias_stack_mut(&mut self, kind: SymbolKind) -> &mut AliasStack {
        match kind {
            SymbolKind::Command => &mut self.command_stack,
            SymbolKind::Variable => &mut self.variable_stack,
        }
    }
}
