// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Collaborators the symbol environment calls back into.
//!
//! The environment does no I/O and does not evaluate the command language.
//! Loading stub files, expanding default expressions and running macro
//! bodies are delegated to a [`Host`], which receives the environment so it
//! can define symbols as a side effect.

#[cfg(test)]
mod mock_test;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

use crate::alias::SourceLocation;
use crate::env::Environment;

/// The interpreter around a symbol environment.
pub trait Host {
    /// Load `file`, defining whatever it contains into `env`.
    fn load_file(&mut self, env: &mut Environment, file: &str);

    /// Expand `text` with `args` as the positional arguments.
    fn expand(&mut self, env: &mut Environment, text: &str, args: &str) -> String;

    /// Execute a macro body with `args` as the positional arguments.
    fn execute(&mut self, env: &mut Environment, body: &str, args: &str);

    /// File currently being read, stamped onto new definitions.
    fn current_file(&self) -> &str;

    /// Line currently being read.
    fn current_line(&self) -> u32;
}

/// Convenience methods derived from [`Host`].
pub trait HostExt: Host {
    /// Current file and line as a [`SourceLocation`].
    fn source_location(&self) -> SourceLocation {
        SourceLocation::new(self.current_file(), self.current_line())
    }
}

impl<T: Host + ?Sized> HostExt for T {}
