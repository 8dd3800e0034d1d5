// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The symbol environment of one interpreter.
//!
//! An [`Environment`] owns everything a command-language interpreter needs
//! to resolve names:
//!
//! ```text
//! Environment
//! ├── NamespaceTree      commands + variables per namespace
//! ├── RuntimeStack       frames with locals
//! ├── AliasStack ×2      shadowed commands / variables
//! └── stub guard         names whose stub file is loading
//! ```
//!
//! There is no global state. Operations that may call back into the host
//! (stub loading, default expansion, macro execution) take the [`Host`] as
//! an argument.
//!
//! The methods are split across files by concern:
//! - `define.rs` - creating, deleting and unloading symbols
//! - `lookup.rs` - resolution and stub loading
//! - `enumerate.rs` - listing, globbing and completion
//! - `call.rs` - argument binding and macro calls
//! - `shadow.rs` - the alias stacks
//!
//! [`Host`]: crate::host::Host

mod call;
mod define;
mod enumerate;
mod lookup;
mod shadow;


pub use enumerate::Completion;
pub use shadow::PopOutcome;

use tracing::debug;

use crate::alias::SymbolKind;
use crate::alias_stack::AliasStack;
use crate::config::EnvConfig;
use crate::namespace::{NamespaceError, NamespaceId, NamespaceTree};
use crate::stack::{RuntimeStack, StackError};

/// Errors from symbol operations.
///
/// Lookups that simply find nothing are not errors; they return `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    /// The namespace qualifier is malformed or names no namespace.
    InvalidNamespace(String),
    /// An empty symbol name.
    EmptyName,
    /// A variable name contains a character names may not contain.
    InvalidIdentifier {
        /// The rejected name.
        name: String,
        /// The first offending character.
        found: char,
    },
    /// A local-scope name was used where a namespace is required.
    LocalScope(String),
    /// The return-value variable cannot be stubbed.
    StubReturn,
    /// A local was defined with no active stack frame.
    NoActiveFrame(String),
    /// Namespace tree error.
    Namespace(NamespaceError),
    /// Call stack error.
    Stack(StackError),
}

impl core::fmt::Display for SymbolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidNamespace(name) => write!(f, "unknown or invalid namespace in {name}"),
            Self::EmptyName => write!(f, "symbol names may not be empty"),
            Self::InvalidIdentifier { name, found } => {
                write!(f, "names may not contain '{found}' (you asked for [{name}])")
            }
            Self::LocalScope(name) => write!(f, "{name} refers to the local scope"),
            Self::StubReturn => write!(f, "the FUNCTION_RETURN variable cannot be stubbed"),
            Self::NoActiveFrame(name) => write!(f, "no stack frame to hold local {name}"),
            Self::Namespace(e) => write!(f, "{e}"),
            Self::Stack(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SymbolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Namespace(e) => Some(e),
            Self::Stack(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NamespaceError> for SymbolError {
    fn from(e: NamespaceError) -> Self {
        Self::Namespace(e)
    }
}

impl From<StackError> for SymbolError {
    fn from(e: StackError) -> Self {
        Self::Stack(e)
    }
}

/// Running totals of definition activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnvStats {
    /// Definitions handled (creations and updates).
    pub definitions: u64,
    /// Bytes of name and body text stored by those definitions.
    pub bytes: u64,
}

/// Interpreter symbol environment.
#[derive(Debug)]
pub struct Environment {
    config: EnvConfig,
    namespaces: NamespaceTree,
    stack: RuntimeStack,
    command_stack: AliasStack,
    variable_stack: AliasStack,
    /// Entries whose stub file is being loaded right now.
    unstubbing: Vec<(SymbolKind, NamespaceId, String)>,
    stats: EnvStats,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create an environment with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EnvConfig::default())
    }

    /// Create an environment with a custom configuration.
    #[must_use]
    pub fn with_config(config: EnvConfig) -> Self {
        Self {
            config,
            namespaces: NamespaceTree::new(&config),
            stack: RuntimeStack::new(&config),
            command_stack: AliasStack::new(),
            variable_stack: AliasStack::new(),
            unstubbing: Vec::new(),
            stats: EnvStats::default(),
        }
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// The namespace tree.
    #[inline]
    #[must_use]
    pub const fn namespaces(&self) -> &NamespaceTree {
        &self.namespaces
    }

    /// The namespace tree, mutably.
    #[inline]
    pub fn namespaces_mut(&mut self) -> &mut NamespaceTree {
        &mut self.namespaces
    }

    /// The runtime call stack.
    #[inline]
    #[must_use]
    pub const fn stack(&self) -> &RuntimeStack {
        &self.stack
    }

    /// The runtime call stack, mutably.
    #[inline]
    pub fn stack_mut(&mut self) -> &mut RuntimeStack {
        &mut self.stack
    }

    /// Definition statistics.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> EnvStats {
        self.stats
    }

    /// The current namespace.
    #[inline]
    #[must_use]
    pub const fn current_namespace(&self) -> NamespaceId {
        self.namespaces.current()
    }

    /// Make the namespace at `path` current.
    ///
    /// # Errors
    ///
    /// Fails if the path does not resolve.
    pub fn switch_namespace(&mut self, path: &str) -> Result<NamespaceId, SymbolError> {
        Ok(self.namespaces.switch(path)?)
    }

    /// Create a namespace under the current one.
    ///
    /// # Errors
    ///
    /// Fails on invalid, overlong or duplicate names.
    pub fn create_namespace(&mut self, name: &str) -> Result<NamespaceId, SymbolError> {
        Ok(self.namespaces.create(name)?)
    }

    /// Queue the namespace at `path` for destruction at the next safe point.
    ///
    /// # Errors
    ///
    /// Fails if the path does not resolve or names the root.
    pub fn unload_namespace(&mut self, path: &str) -> Result<NamespaceId, SymbolError> {
        let id = self
            .namespaces
            .find(path)
            .ok_or_else(|| NamespaceError::NotFound(path.to_string()))?;
        self.namespaces.schedule_destroy(id)?;
        debug!(namespace = path, "namespace scheduled for destruction");
        Ok(id)
    }

    /// Run deferred namespace destruction. Call between top-level commands.
    pub fn flush_pending(&mut self) -> usize {
        self.namespaces.flush_pending()
    }

    fn record_definition(&mut self, name: &str, bytes: usize) {
        self.stats.definitions += 1;
        self.stats.bytes += (name.len() + bytes) as u64;
    }

    fn in_flight(&self, kind: SymbolKind, ns: NamespaceId, leaf: &str) -> bool {
        self.unstubbing
            .iter()
            .any(|(k, n, l)| *k == kind && *n == ns && l.eq_ignore_ascii_case(leaf))
    }
}
