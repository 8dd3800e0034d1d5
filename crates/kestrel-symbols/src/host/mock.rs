// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! In-memory host for testing.
//!
//! Files are scripts held in memory. A script is a list of statements
//! separated by `;` or newlines outside braces:
//!
//! ```text
//! alias NAME [(DECL)] BODY     define a command macro
//! assign NAME VALUE            define a variable (empty VALUE deletes)
//! local NAME VALUE             define a local
//! return VALUE                 set FUNCTION_RETURN
//! stub alias|assign NAME FILE  define a stub
//! namespace PATH               switch the current namespace
//! call NAME ARGS               call a command macro
//! ```
//!
//! Values are expanded before use: `$*` becomes the positional arguments and
//! `${name}` the value of a variable. Macro bodies are stored unexpanded; a
//! body wrapped in `{...}` may hold several statements.

use std::collections::HashMap;

use tracing::warn;

use super::Host;
use crate::alias::{AliasBody, FUNCTION_RETURN};
use crate::arglist::ArgList;
use crate::env::Environment;
use crate::text::{matching_bracket, next_word};

/// A scripted host that records what the environment asked of it.
#[derive(Debug, Default)]
pub struct MockHost {
    files: HashMap<String, String>,
    file: String,
    line: u32,
    loads: Vec<String>,
    executed: Vec<(String, String)>,
    errors: Vec<String>,
}

impl MockHost {
    /// Create a host with no files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_file`](Self::add_file).
    #[must_use]
    pub fn with_file(mut self, name: &str, script: &str) -> Self {
        self.add_file(name, script);
        self
    }

    /// Register a loadable file.
    pub fn add_file(&mut self, name: &str, script: &str) {
        self.files.insert(name.to_string(), script.to_string());
    }

    /// Set the reported source location.
    pub fn set_location(&mut self, file: &str, line: u32) {
        file.clone_into(&mut self.file);
        self.line = line;
    }

    /// Every file load requested, in order.
    #[must_use]
    pub fn loads(&self) -> &[String] {
        &self.loads
    }

    /// How often `file` was loaded.
    #[must_use]
    pub fn load_count(&self, file: &str) -> usize {
        self.loads.iter().filter(|f| *f == file).count()
    }

    /// Every `(body, args)` executed, in order.
    #[must_use]
    pub fn executed(&self) -> &[(String, String)] {
        &self.executed
    }

    /// Errors raised by script statements.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Run a script with `args` as positional arguments.
    pub fn run(&mut self, env: &mut Environment, script: &str, args: &str) {
        for statement in split_statements(script) {
            let Some((verb, rest)) = next_word(statement) else {
                continue;
            };
            self.line += 1;
            if let Err(message) = self.statement(env, verb, rest, args) {
                warn!(statement, %message, "mock statement failed");
                self.errors.push(message);
            }
        }
    }

    fn statement(
        &mut self,
        env: &mut Environment,
        verb: &str,
        rest: &str,
        args: &str,
    ) -> Result<(), String> {
        let (name, value) = next_word(rest).unwrap_or(("", ""));
        match verb.to_ascii_lowercase().as_str() {
            "alias" => self.alias(env, name, value),
            "assign" => {
                let value = self.expand_text(env, value, args);
                env.define_variable(&*self, name, AliasBody::Text(value), false)
                    .map_err(|e| e.to_string())
            }
            "local" => {
                let value = self.expand_text(env, value, args);
                env.define_local(&*self, name, &value)
                    .map_err(|e| e.to_string())
            }
            "return" => {
                let value = self.expand_text(env, rest, args);
                env.define_variable(&*self, FUNCTION_RETURN, AliasBody::Text(value), false)
                    .map_err(|e| e.to_string())
            }
            "stub" => {
                let (target, file) = next_word(value).unwrap_or(("", ""));
                let body = AliasBody::stub(file.trim());
                let result = if name.eq_ignore_ascii_case("alias") {
                    env.define_command(&*self, target, body, None, false)
                } else {
                    env.define_variable(&*self, target, body, false)
                };
                result.map_err(|e| e.to_string())
            }
            "namespace" => env
                .switch_namespace(name)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            "call" => {
                let value = self.expand_text(env, value, args);
                match env.call_command(self, name, &value) {
                    Ok(true) => Ok(()),
                    Ok(false) => Err(format!("no such alias: {name}")),
                    Err(e) => Err(e.to_string()),
                }
            }
            other => Err(format!("unknown statement: {other}")),
        }
    }

    fn alias(&mut self, env: &mut Environment, name: &str, value: &str) -> Result<(), String> {
        let (arglist, body) = match value.strip_prefix('(') {
            Some(inner) => {
                let close = matching_bracket(inner, '(', ')')
                    .ok_or_else(|| format!("unterminated argument list for {name}"))?;
                let arglist = ArgList::parse(&inner[..close], env.config().max_arglist_slots)
                    .map_err(|e| e.to_string())?;
                (Some(arglist), inner[close + 1..].trim())
            }
            None => (None, value),
        };
        let body = body
            .strip_prefix('{')
            .and_then(|b| b.strip_suffix('}'))
            .unwrap_or(body);
        env.define_command(&*self, name, AliasBody::text(body), arglist, false)
            .map_err(|e| e.to_string())
    }

    fn expand_text(&mut self, env: &mut Environment, text: &str, args: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(dollar) = rest.find('$') {
            out.push_str(&rest[..dollar]);
            let after = &rest[dollar + 1..];

            if let Some(tail) = after.strip_prefix('*') {
                out.push_str(args);
                rest = tail;
                continue;
            }
            if let Some(inner) = after.strip_prefix('{') {
                if let Some(close) = inner.find('}') {
                    if let Some(value) = env.variable_text(self, &inner[..close]) {
                        out.push_str(&value);
                    }
                    rest = &inner[close + 1..];
                    continue;
                }
            }
            out.push('$');
            rest = after;
        }

        out.push_str(rest);
        out
    }
}

fn split_statements(script: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (offset, c) in script.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ';' | '\n' if depth == 0 => {
                out.push(script[start..offset].trim());
                start = offset + 1;
            }
            _ => {}
        }
    }
    out.push(script[start..].trim());
    out
}

impl Host for MockHost {
    fn load_file(&mut self, env: &mut Environment, file: &str) {
        self.loads.push(file.to_string());
        let Some(script) = self.files.get(file).cloned() else {
            self.errors.push(format!("no such file: {file}"));
            return;
        };

        let saved = (
            core::mem::replace(&mut self.file, file.to_string()),
            core::mem::replace(&mut self.line, 0),
        );
        self.run(env, &script, "");
        (self.file, self.line) = saved;
    }

    fn expand(&mut self, env: &mut Environment, text: &str, args: &str) -> String {
        self.expand_text(env, text, args)
    }

    fn execute(&mut self, env: &mut Environment, body: &str, args: &str) {
        self.executed.push((body.to_string(), args.to_string()));
        self.run(env, body, args);
    }

    fn current_file(&self) -> &str {
        &self.file
    }

    fn current_line(&self) -> u32 {
        self.line
    }
}
