// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Creating, updating, deleting and unloading symbols.

use tracing::{debug, trace, warn};

use super::{Environment, SymbolError};
use crate::alias::{Alias, AliasBody, FUNCTION_RETURN, SymbolKind};
use crate::arglist::ArgList;
use crate::host::{Host, HostExt};
use crate::namespace::{NamespaceError, NamespaceId, Scope};
use crate::stack::StackError;
use crate::text::invalid_identifier_char;

impl Environment {
    /// Define or redefine a command macro.
    ///
    /// A leading single `:` names a root command whose name keeps the colon.
    ///
    /// # Errors
    ///
    /// Fails on an empty name or an unresolvable namespace qualifier; nothing
    /// is changed in that case.
    pub fn define_command<H: Host + ?Sized>(
        &mut self,
        host: &H,
        name: &str,
        body: AliasBody,
        arglist: Option<ArgList>,
        global: bool,
    ) -> Result<(), SymbolError> {
        let resolved = self.namespaces.resolve_command(name);
        let Scope::Global(ns) = resolved.scope else {
            warn!(name, "unknown or invalid namespace");
            return Err(SymbolError::InvalidNamespace(name.to_string()));
        };
        if resolved.leaf.is_empty() {
            return Err(SymbolError::EmptyName);
        }

        let stub = body.is_stub();
        self.store(host, ns, SymbolKind::Command, resolved.leaf, body, global, arglist)?;
        debug!(name, stub, "command defined");
        Ok(())
    }

    /// Define or redefine a variable.
    ///
    /// - `:name` and unqualified names of a visible local update the local.
    /// - `FUNCTION_RETURN` is always a local at the function-call level.
    /// - Empty text deletes the variable.
    ///
    /// # Errors
    ///
    /// Fails on a bad qualifier or identifier, on stubbing a local or the
    /// return variable, and on a local with no active frame.
    pub fn define_variable<H: Host + ?Sized>(
        &mut self,
        host: &H,
        name: &str,
        body: AliasBody,
        global: bool,
    ) -> Result<(), SymbolError> {
        let resolved = self.namespaces.resolve(name);
        let leaf = resolved.leaf;
        let ns = match resolved.scope {
            Scope::Global(ns) => Some(ns),
            Scope::Local => None,
            Scope::Invalid => {
                warn!(name, "unknown or invalid namespace");
                return Err(SymbolError::InvalidNamespace(name.to_string()));
            }
        };
        check_identifier(leaf)?;

        if !resolved.qualified && leaf.eq_ignore_ascii_case(FUNCTION_RETURN) {
            let AliasBody::Text(text) = body else {
                return Err(SymbolError::StubReturn);
            };
            return self.define_return(host, &text);
        }

        let local = match ns {
            None => true,
            Some(_) if resolved.qualified => false,
            Some(_) => self.stack.resolves_local(leaf),
        };
        let Some(ns) = ns.filter(|_| !local) else {
            let AliasBody::Text(text) = body else {
                return Err(SymbolError::LocalScope(name.to_string()));
            };
            return self.define_local(host, leaf, &text);
        };

        if matches!(&body, AliasBody::Text(text) if text.is_empty()) {
            if let Some(namespace) = self.namespaces.get_mut(ns) {
                namespace.table_mut(SymbolKind::Variable).remove_named(leaf);
            }
            debug!(name, "variable deleted by empty assignment");
            return Ok(());
        }

        let stub = body.is_stub();
        self.store(host, ns, SymbolKind::Variable, leaf, body, global, None)?;
        debug!(name, stub, "variable defined");
        Ok(())
    }

    /// Define or update a local.
    ///
    /// The local is updated where it is visible, otherwise created in the
    /// top frame. A leading `:` is accepted and ignored.
    ///
    /// # Errors
    ///
    /// Fails on an invalid identifier or with no active frame.
    pub fn define_local<H: Host + ?Sized>(
        &mut self,
        host: &H,
        name: &str,
        text: &str,
    ) -> Result<(), SymbolError> {
        let name = name.strip_prefix(':').unwrap_or(name);
        check_identifier(name)?;
        let source = host.source_location();
        match self.stack.define_local(name, text, &source) {
            Ok((level, _)) => {
                self.record_definition(name, text.len());
                trace!(name, level, "local defined");
                Ok(())
            }
            Err(StackError::NoFrame) => Err(SymbolError::NoActiveFrame(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a command macro. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Fails on an unresolvable namespace qualifier.
    pub fn delete_command(&mut self, name: &str) -> Result<bool, SymbolError> {
        let resolved = self.namespaces.resolve_command(name);
        let Scope::Global(ns) = resolved.scope else {
            return Err(SymbolError::InvalidNamespace(name.to_string()));
        };
        Ok(self.remove_from(ns, SymbolKind::Command, resolved.leaf))
    }

    /// Delete a namespace variable. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Fails on an unresolvable qualifier and on `:name`, since locals live
    /// until their frame is popped.
    pub fn delete_variable(&mut self, name: &str) -> Result<bool, SymbolError> {
        let resolved = self.namespaces.resolve(name);
        match resolved.scope {
            Scope::Global(ns) => Ok(self.remove_from(ns, SymbolKind::Variable, resolved.leaf)),
            Scope::Local => Err(SymbolError::LocalScope(name.to_string())),
            Scope::Invalid => Err(SymbolError::InvalidNamespace(name.to_string())),
        }
    }

    /// Delete every command and variable, in every namespace, that was last
    /// defined from `file`. Returns how many were deleted.
    pub fn unload(&mut self, file: &str) -> usize {
        let ids: Vec<NamespaceId> = self.namespaces.ids().collect();
        let mut removed = 0;
        for id in ids {
            let Some(namespace) = self.namespaces.get_mut(id) else {
                continue;
            };
            for kind in [SymbolKind::Command, SymbolKind::Variable] {
                removed += namespace
                    .table_mut(kind)
                    .remove_where(|alias| alias.source().file == file);
            }
        }
        debug!(file, removed, "unloaded package");
        removed
    }

    /// Delete every symbol of `kind` in the root namespace. Returns how many
    /// were deleted.
    pub fn dump(&mut self, kind: SymbolKind) -> usize {
        let root = self.namespaces.root();
        let removed = self
            .namespaces
            .get_mut(root)
            .map_or(0, |namespace| namespace.table_mut(kind).clear());
        debug!(kind = kind.label(), removed, "dumped root symbols");
        removed
    }

    /// Source file an existing symbol was defined from.
    ///
    /// Does not load stubs.
    #[must_use]
    pub fn package(&self, kind: SymbolKind, name: &str) -> Option<String> {
        let location = self.peek(kind, name)?;
        Some(self.alias_at(location)?.source().file.clone())
    }

    /// Overwrite the recorded source file of an existing symbol. Returns
    /// false if there is no such symbol.
    pub fn set_package(&mut self, kind: SymbolKind, name: &str, file: &str) -> bool {
        let Some(location) = self.peek(kind, name) else {
            return false;
        };
        let Some(alias) = self.alias_at_mut(location) else {
            return false;
        };
        alias.set_package(file);
        true
    }

    fn define_return<H: Host + ?Sized>(&mut self, host: &H, text: &str) -> Result<(), SymbolError> {
        let level = self
            .stack
            .function_level()
            .or_else(|| self.stack.top())
            .ok_or_else(|| SymbolError::NoActiveFrame(FUNCTION_RETURN.to_string()))?;
        let source = host.source_location();
        self.stack.set_local_in(level, FUNCTION_RETURN, text, &source)?;
        self.record_definition(FUNCTION_RETURN, text.len());
        trace!(level, "return value set");
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn store<H: Host + ?Sized>(
        &mut self,
        host: &H,
        ns: NamespaceId,
        kind: SymbolKind,
        leaf: &str,
        body: AliasBody,
        global: bool,
        arglist: Option<ArgList>,
    ) -> Result<(), SymbolError> {
        let source = host.source_location();
        let bytes = body.len();
        let table = self
            .namespaces
            .get_mut(ns)
            .ok_or(NamespaceError::Unknown(ns))?
            .table_mut(kind);

        match table.find(leaf).and_then(|id| table.get_mut(id)) {
            Some(alias) => {
                alias.set_body(body);
                alias.set_source(source);
                alias.set_global(global);
                alias.set_arglist(arglist);
            }
            None => {
                let mut alias = Alias::new(leaf, Some(ns), body, source);
                alias.set_global(global);
                alias.set_arglist(arglist);
                table.insert(alias);
            }
        }

        self.record_definition(leaf, bytes);
        Ok(())
    }

    fn remove_from(&mut self, ns: NamespaceId, kind: SymbolKind, leaf: &str) -> bool {
        let removed = self
            .namespaces
            .get_mut(ns)
            .and_then(|namespace| namespace.table_mut(kind).remove_named(leaf))
            .is_some();
        if removed {
            debug!(name = leaf, kind = kind.label(), "symbol deleted");
        }
        removed
    }
}

fn check_identifier(name: &str) -> Result<(), SymbolError> {
    if name.is_empty() {
        return Err(SymbolError::EmptyName);
    }
    if let Some(found) = invalid_identifier_char(name) {
        warn!(name, %found, "invalid identifier");
        return Err(SymbolError::InvalidIdentifier {
            name: name.to_string(),
            found,
        });
    }
    Ok(())
}
