// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Argument binding and macro invocation.
//!
//! ```text
//! call_command("greet", "bob")
//!   push frame "greet"          enclosing boundary
//!   current := alias namespace
//!   bind arglist -> locals
//!   host.execute(body, rest)
//!   current := caller namespace
//!   pop frame
//! ```

use tracing::{debug, warn};

use super::{Environment, SymbolError};
use crate::alias::{Alias, FUNCTION_RETURN};
use crate::arglist::{ArgList, ArgTail, ExtractMode};
use crate::host::{Host, HostExt};
use crate::text::take_words;

impl Environment {
    /// Bind positional `args` to the slots of `arglist` as locals of frame
    /// `frame`.
    ///
    /// Consumed words are removed from the front of `args`. The last slot
    /// takes everything that is left unless the list ends in `void` or
    /// `...`; with `void` the remainder is discarded, with `...` it is kept.
    /// A slot that receives nothing gets its expanded default, or empty text.
    ///
    /// # Errors
    ///
    /// Fails if `frame` is not an active frame.
    pub fn bind_arguments<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        arglist: &ArgList,
        args: &mut String,
        frame: usize,
    ) -> Result<(), SymbolError> {
        let slots = arglist.slots();
        let last = slots.len().checked_sub(1);

        for (position, slot) in slots.iter().enumerate() {
            let value = if arglist.tail() == ArgTail::Last && Some(position) == last {
                core::mem::take(args)
            } else {
                let quoted = match slot.mode {
                    ExtractMode::Word => self.config.double_quoted_words,
                    ExtractMode::UWord => false,
                    ExtractMode::DWord => true,
                };
                let (span, rest) = take_words(args, slot.words, quoted);
                let span = span.to_string();
                *args = rest.to_string();
                span
            };

            let value = match (&slot.default, value.is_empty()) {
                (Some(default), true) => host.expand(self, default, args),
                _ => value,
            };

            let source = host.source_location();
            self.stack.set_local_in(frame, &slot.name, &value, &source)?;
            self.record_definition(&slot.name, value.len());
        }

        if arglist.tail() == ArgTail::Void {
            args.clear();
        }
        Ok(())
    }

    /// Call the command macro `name` with `args`.
    ///
    /// Returns false if there is no such command.
    ///
    /// # Errors
    ///
    /// Fails if argument binding fails or the call leaves the stack
    /// unbalanced.
    pub fn call_command<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        name: &str,
        args: &str,
    ) -> Result<bool, SymbolError> {
        let Some(alias) = self.lookup_command(host, name).cloned() else {
            debug!(name, "call to unknown command");
            return Ok(false);
        };
        self.invoke(host, &alias, args, false)?;
        Ok(true)
    }

    /// Call the command macro `name` as a function and return the value it
    /// left in `FUNCTION_RETURN`.
    ///
    /// Returns `None` if there is no such command.
    ///
    /// # Errors
    ///
    /// As [`call_command`](Self::call_command).
    pub fn call_function<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        name: &str,
        args: &str,
    ) -> Result<Option<String>, SymbolError> {
        let Some(alias) = self.lookup_command(host, name).cloned() else {
            debug!(name, "function call to unknown command");
            return Ok(None);
        };
        Ok(Some(self.invoke(host, &alias, args, true)?.unwrap_or_default()))
    }

    /// Run an anonymous `body` in a new frame named `name` and return the
    /// value it left in `FUNCTION_RETURN`.
    ///
    /// Unlike [`call_function`](Self::call_function) there is no argument
    /// list and the current namespace is left alone.
    ///
    /// # Errors
    ///
    /// Fails if the body leaves the stack unbalanced.
    pub fn run_with_return<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        name: &str,
        body: &str,
        args: &str,
    ) -> Result<String, SymbolError> {
        let frame = self.stack.push(Some(name));
        let result = self.run_returning(host, frame, body, args);
        self.stack.pop()?;
        result
    }

    fn invoke<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        alias: &Alias,
        args: &str,
        function: bool,
    ) -> Result<Option<String>, SymbolError> {
        let caller = self.namespaces.current();
        let frame = self.stack.push(Some(alias.name()));
        debug!(name = alias.name(), frame, function, "calling macro");

        let result = self.invoke_in_frame(host, alias, frame, args, function);

        if let Err(e) = self.namespaces.set_current(caller) {
            warn!(error = %e, "caller namespace vanished during call");
        }
        self.stack.pop()?;
        result
    }

    fn invoke_in_frame<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        alias: &Alias,
        frame: usize,
        args: &str,
        function: bool,
    ) -> Result<Option<String>, SymbolError> {
        if let Some(ns) = alias.namespace() {
            self.namespaces.set_current(ns)?;
        }

        let mut args = args.to_string();
        if let Some(arglist) = alias.arglist() {
            self.bind_arguments(host, arglist, &mut args, frame)?;
        }

        let body = alias.text().unwrap_or_default();
        if function {
            self.run_returning(host, frame, body, &args).map(Some)
        } else {
            host.execute(self, body, &args);
            Ok(None)
        }
    }

    fn run_returning<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        frame: usize,
        body: &str,
        args: &str,
    ) -> Result<String, SymbolError> {
        let saved = self.stack.set_function_level(Some(frame));
        let source = host.source_location();
        let result = match self.stack.set_local_in(frame, FUNCTION_RETURN, "", &source) {
            Ok(_) => {
                host.execute(self, body, args);
                Ok(self.return_value(frame))
            }
            Err(e) => Err(e.into()),
        };
        self.stack.set_function_level(saved);
        result
    }

    fn return_value(&self, frame: usize) -> String {
        self.stack
            .frame(frame)
            .and_then(|f| f.locals().lookup(FUNCTION_RETURN))
            .and_then(Alias::text)
            .unwrap_or_default()
            .to_string()
    }
}
