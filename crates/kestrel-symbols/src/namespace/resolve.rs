// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Symbol name resolution.
//!
//! ```text
//! name            scope                leaf
//! ----            -----                ----
//! foo             Global(current)      foo
//! :foo            Local                foo
//! ::foo           Global(root)         foo
//! a::b::foo       Global(find "a::b")  foo
//! a:foo           Invalid              foo
//! ```

use super::{NamespaceId, NamespaceTree};

/// Where a symbol name points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// A namespace table.
    Global(NamespaceId),
    /// The runtime call stack's locals.
    Local,
    /// A malformed or unresolvable qualifier.
    Invalid,
}

/// A resolved symbol name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolved<'a> {
    /// Target scope.
    pub scope: Scope,
    /// Name within that scope.
    pub leaf: &'a str,
    /// True if the name carried any qualifier.
    pub qualified: bool,
}

impl NamespaceTree {
    /// Split `name` into target scope and leaf.
    ///
    /// The rightmost `:` ends the qualifier. A single leading `:` selects the
    /// local scope; anything else before the leaf must be a `::`-terminated
    /// namespace path.
    #[must_use]
    pub fn resolve<'a>(&self, name: &'a str) -> Resolved<'a> {
        let Some(colon) = name.rfind(':') else {
            return Resolved {
                scope: Scope::Global(self.current()),
                leaf: name,
                qualified: false,
            };
        };

        let leaf = &name[colon + 1..];
        let scope = if colon == 0 {
            Scope::Local
        } else if name.as_bytes()[colon - 1] != b':' {
            Scope::Invalid
        } else if colon == 1 {
            Scope::Global(self.root())
        } else {
            self.find(&name[..colon - 1])
                .map_or(Scope::Invalid, Scope::Global)
        };

        Resolved {
            scope,
            leaf,
            qualified: true,
        }
    }

    /// Resolve a command alias name.
    ///
    /// Commands have no local scope: a leading `:` denotes a root command
    /// whose name keeps the colon.
    #[must_use]
    pub fn resolve_command<'a>(&self, name: &'a str) -> Resolved<'a> {
        let resolved = self.resolve(name);
        if resolved.scope == Scope::Local {
            return Resolved {
                scope: Scope::Global(self.root()),
                leaf: name,
                qualified: true,
            };
        }
        resolved
    }
}
