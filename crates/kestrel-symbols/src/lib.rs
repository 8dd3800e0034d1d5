// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # Kestrel Symbols
//!
//! Symbol environment for the Kestrel command language.
//!
//! This crate provides:
//! - A generic chained hash index with case-folding keys
//! - The namespace tree with per-namespace command and variable tables
//! - Command macros and variables, including stubs loaded on first use
//! - The runtime call stack with transparent, enclosing and locked frames
//! - Argument list parsing and binding
//! - Alias stacks for temporarily shadowing a symbol
//!
//! Parsing and evaluating the language itself is left to the embedding
//! interpreter, which plugs in through the [`Host`] trait.

pub mod alias;
pub mod alias_stack;
pub mod arglist;
pub mod config;
pub mod env;
pub mod hash;
pub mod host;
pub mod namespace;
pub mod stack;
pub mod text;

// Re-export commonly used types at crate root
pub use alias::{Alias, AliasBody, FUNCTION_RETURN, SourceLocation, SymbolKind};
pub use arglist::{ArgList, ArgListError};
pub use config::EnvConfig;
pub use env::{Completion, EnvStats, Environment, PopOutcome, SymbolError};
pub use host::{Host, HostExt};
pub use namespace::{NamespaceError, NamespaceId, Scope};
pub use stack::{RuntimeStack, StackDump, StackError};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
