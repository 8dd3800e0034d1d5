// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Parameter lists of command macros.
//!
//! A declaration is a comma-separated list of parameters:
//!
//! ```text
//! (nick, channel default {#lobby}, reason dwords 2, ...)
//!  ^^^^  ^^^^^^^^^^^^^^^^^^^^^^^^  ^^^^^^^^^^^^^^^  ^^^
//!  slot  slot with default         2 quoted words   catch-all tail
//! ```
//!
//! `void` or `...` ends the list. Binding is done by
//! [`Environment::bind_arguments`](crate::env::Environment::bind_arguments).


use tracing::warn;

use crate::text::{next_value, next_word, split_comma_list};

/// How a slot pulls words out of the argument text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractMode {
    /// Plain words; quotes honoured only when configured.
    Word,
    /// Plain words, never quote-aware.
    UWord,
    /// Quote-aware words.
    DWord,
}

/// What happens to argument text after the last slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgTail {
    /// The last slot swallows everything left.
    Last,
    /// Leftover text is discarded (`void`).
    Void,
    /// Leftover text is kept for the caller (`...`).
    Catchall,
}

/// One declared parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgSlot {
    /// Local variable the value is bound to.
    pub name: String,
    /// Expression expanded when no value was supplied.
    pub default: Option<String>,
    /// Number of words taken.
    pub words: usize,
    /// Word extraction mode.
    pub mode: ExtractMode,
}

impl ArgSlot {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            default: None,
            words: 1,
            mode: ExtractMode::Word,
        }
    }
}

/// Errors from parsing a parameter declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgListError {
    /// More parameters than the configured maximum.
    TooManySlots {
        /// Maximum allowed slots.
        max: usize,
    },
    /// An empty term between two commas.
    EmptyTerm {
        /// Zero-based term position.
        position: usize,
    },
}

impl core::fmt::Display for ArgListError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooManySlots { max } => {
                write!(f, "argument list exceeds {max} parameters")
            }
            Self::EmptyTerm { position } => {
                write!(f, "empty parameter at position {position}")
            }
        }
    }
}

impl std::error::Error for ArgListError {}

/// A parsed parameter declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgList {
    slots: Vec<ArgSlot>,
    tail: ArgTail,
}

impl ArgList {
    /// Parse a declaration, with or without its surrounding parentheses.
    ///
    /// Unknown modifiers are reported and skipped. A modifier without a value
    /// ends that term.
    ///
    /// # Errors
    ///
    /// Fails on more than `max_slots` parameters or on an empty term in a
    /// non-empty list.
    pub fn parse(declaration: &str, max_slots: usize) -> Result<Self, ArgListError> {
        let mut decl = declaration.trim();
        if let Some(inner) = decl.strip_prefix('(').and_then(|d| d.strip_suffix(')')) {
            decl = inner.trim();
        }

        let mut arglist = Self {
            slots: Vec::new(),
            tail: ArgTail::Last,
        };
        if decl.is_empty() {
            return Ok(arglist);
        }

        for (position, term) in split_comma_list(decl).into_iter().enumerate() {
            let Some((name, mut rest)) = next_word(term) else {
                return Err(ArgListError::EmptyTerm { position });
            };

            if name.eq_ignore_ascii_case("void") {
                arglist.tail = ArgTail::Void;
                break;
            }
            if name == "..." {
                arglist.tail = ArgTail::Catchall;
                break;
            }
            if arglist.slots.len() == max_slots {
                return Err(ArgListError::TooManySlots { max: max_slots });
            }

            let mut slot = ArgSlot::new(name);
            while let Some((modifier, after)) = next_word(rest) {
                let Some((value, after)) = next_value(after) else {
                    break;
                };
                rest = after;
                apply_modifier(&mut slot, modifier, value);
            }
            arglist.slots.push(slot);
        }

        Ok(arglist)
    }

    /// Declared slots in order.
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[ArgSlot] {
        &self.slots
    }

    /// Tail behaviour.
    #[inline]
    #[must_use]
    pub const fn tail(&self) -> ArgTail {
        self.tail
    }

    /// Returns true if the list declares no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn apply_modifier(slot: &mut ArgSlot, modifier: &str, value: &str) {
    let mode = match modifier.to_ascii_lowercase().as_str() {
        "default" => {
            slot.default = Some(value.to_string());
            return;
        }
        "words" => ExtractMode::Word,
        "uwords" => ExtractMode::UWord,
        "dwords" => ExtractMode::DWord,
        _ => {
            warn!(parameter = slot.name.as_str(), modifier, "bad modifier");
            return;
        }
    };
    slot.mode = mode;
    slot.words = value.parse().unwrap_or(0);
}

impl core::fmt::Display for ArgList {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "(")?;
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", slot.name)?;
            let keyword = match slot.mode {
                ExtractMode::Word => "words",
                ExtractMode::UWord => "uwords",
                ExtractMode::DWord => "dwords",
            };
            if slot.words != 1 || slot.mode != ExtractMode::Word {
                write!(f, " {keyword} {}", slot.words)?;
            }
            if let Some(default) = &slot.default {
                write!(f, " default {{{default}}}")?;
            }
        }
        let tail = match self.tail {
            ArgTail::Last => None,
            ArgTail::Void => Some("void"),
            ArgTail::Catchall => Some("..."),
        };
        if let Some(tail) = tail {
            if !self.slots.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "{tail}")?;
        }
        write!(f, ")")
    }
}
