// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Symbol resolution and lazy stub loading.
//!
//! A hit on a stub deletes the stub, asks the host to load its file and
//! retries the original name. While a name's file is loading, another hit on
//! a stub for that same namespace entry, however it is spelled, drops the
//! stub and reports not-found.

use tracing::{debug, warn};

use super::Environment;
use crate::alias::{Alias, SymbolKind};
use crate::hash::EntryId;
use crate::host::{Host, HostExt};
use crate::namespace::{NamespaceId, Scope};

/// Where a resolved alias lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Location {
    /// In a namespace table.
    Namespace {
        /// Owning namespace.
        ns: NamespaceId,
        /// Table kind.
        kind: SymbolKind,
        /// Entry handle.
        id: EntryId,
    },
    /// Among a frame's locals.
    Local {
        /// Frame index.
        level: usize,
        /// Entry handle.
        id: EntryId,
    },
}

impl Environment {
    /// Look up a command alias, loading it first if it is stubbed.
    pub fn lookup_command<H: Host + ?Sized>(&mut self, host: &mut H, name: &str) -> Option<&Alias> {
        let location = self.locate(host, SymbolKind::Command, name, true)?;
        self.alias_at(location)
    }

    /// Look up a variable, loading it first if it is stubbed.
    ///
    /// Unqualified names check visible locals before the current namespace;
    /// `:name` only checks locals.
    pub fn lookup_variable<H: Host + ?Sized>(&mut self, host: &mut H, name: &str) -> Option<&Alias> {
        let location = self.locate(host, SymbolKind::Variable, name, true)?;
        self.alias_at(location)
    }

    /// Look up a namespace variable, ignoring locals.
    pub fn lookup_global_variable<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        name: &str,
    ) -> Option<&Alias> {
        let location = self.locate(host, SymbolKind::Variable, name, false)?;
        self.alias_at(location)
    }

    /// Look up a visible local.
    ///
    /// A dotted name under a declared `prefix.` local is created on the spot
    /// with empty text.
    pub fn lookup_local<H: Host + ?Sized>(&mut self, host: &H, name: &str) -> Option<&Alias> {
        let name = name.strip_prefix(':').unwrap_or(name);
        let source = host.source_location();
        let (level, id) = self.stack.lookup_local(name, &source)?;
        self.stack.local(level, id)
    }

    /// Text of a variable, as [`lookup_variable`](Self::lookup_variable).
    pub fn variable_text<H: Host + ?Sized>(&mut self, host: &mut H, name: &str) -> Option<String> {
        self.lookup_variable(host, name)?.text().map(str::to_string)
    }

    /// Find where `name` lives without loading stubs or creating locals.
    pub(crate) fn peek(&self, kind: SymbolKind, name: &str) -> Option<Location> {
        let resolved = match kind {
            SymbolKind::Command => self.namespaces.resolve_command(name),
            SymbolKind::Variable => self.namespaces.resolve(name),
        };
        let ns = match resolved.scope {
            Scope::Global(ns) => ns,
            Scope::Local => {
                let (level, id) = self.stack.find_local(resolved.leaf)?;
                return Some(Location::Local { level, id });
            }
            Scope::Invalid => return None,
        };

        if kind == SymbolKind::Variable && !resolved.qualified {
            if let Some((level, id)) = self.stack.find_local(resolved.leaf) {
                return Some(Location::Local { level, id });
            }
        }

        let id = self.namespaces.get(ns)?.table(kind).find(resolved.leaf)?;
        Some(Location::Namespace { ns, kind, id })
    }

    /// Resolve `name` to a location, loading stubs on the way.
    pub(crate) fn locate<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        kind: SymbolKind,
        name: &str,
        with_locals: bool,
    ) -> Option<Location> {
        let resolved = match kind {
            SymbolKind::Command => self.namespaces.resolve_command(name),
            SymbolKind::Variable => self.namespaces.resolve(name),
        };
        let ns = match resolved.scope {
            Scope::Global(ns) => ns,
            Scope::Local if with_locals => {
                let source = host.source_location();
                let (level, id) = self.stack.lookup_local(resolved.leaf, &source)?;
                return Some(Location::Local { level, id });
            }
            Scope::Local | Scope::Invalid => return None,
        };

        if kind == SymbolKind::Variable && with_locals && !resolved.qualified {
            let source = host.source_location();
            if let Some((level, id)) = self.stack.lookup_local(resolved.leaf, &source) {
                return Some(Location::Local { level, id });
            }
        }

        let table = self.namespaces.get_mut(ns)?.table_mut(kind);
        let id = table.find(resolved.leaf)?;
        let Some(file) = table.get(id)?.stub().map(str::to_string) else {
            return Some(Location::Namespace { ns, kind, id });
        };

        // The stub is consumed whether or not the load defines anything
        table.remove(id);

        if self.in_flight(kind, ns, resolved.leaf) {
            warn!(name, file = file.as_str(), "stub resolves to itself");
            return None;
        }

        debug!(name, file = file.as_str(), kind = kind.label(), "loading stub");
        self.unstubbing.push((kind, ns, resolved.leaf.to_string()));
        host.load_file(self, &file);
        let found = self.locate(host, kind, name, with_locals);
        if let Some(position) = self.unstubbing.iter().rposition(|(k, n, leaf)| {
            *k == kind && *n == ns && leaf.eq_ignore_ascii_case(resolved.leaf)
        }) {
            self.unstubbing.remove(position);
        }
        found
    }

    /// Borrow the alias at a location.
    pub(crate) fn alias_at(&self, location: Location) -> Option<&Alias> {
        match location {
            Location::Namespace { ns, kind, id } => self.namespaces.get(ns)?.table(kind).get(id),
            Location::Local { level, id } => self.stack.local(level, id),
        }
    }

    /// Mutably borrow the alias at a location.
    pub(crate) fn alias_at_mut(&mut self, location: Location) -> Option<&mut Alias> {
        match location {
            Location::Namespace { ns, kind, id } => {
                self.namespaces.get_mut(ns)?.table_mut(kind).get_mut(id)
            }
            Location::Local { level, id } => self.stack.local_mut(level, id),
        }
    }
}
