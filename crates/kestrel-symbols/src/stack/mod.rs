// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Runtime call stack with dynamically scoped locals.
//!
//! Frames sit in a growable arena; the active frames are the first `depth`
//! slots. Scope is a separate chain through parent indices:
//!
//! ```text
//! index  name    parent   scope chain seen from frame 3
//! 3      -       2        3 ─┐
//! 2      -       1        2 ◄┘─┐
//! 1      "foo"   -        1 ◄──┘  (named: stop here)
//! 0      "bar"   -
//! ```
//!
//! A named frame is *enclosing*: it starts a new visibility boundary. An
//! unnamed frame is *transparent* and chains to the frame below it, or to the
//! locked frame if one exists, so scopes opened while an external scheduler
//! waits reattach where the wait began.
//!
//! Slots are reused after a pop; a slot's local table survives and is only
//! cleared.

#[cfg(test)]
mod stack_test;

use tracing::{debug, error, trace, warn};

use crate::alias::{Alias, AliasBody, AliasTable, FUNCTION_RETURN, SourceLocation};
use crate::config::EnvConfig;
use crate::hash::EntryId;
use crate::text::{invalid_identifier_char, starts_with_ignore_case};

/// One level of the call stack.
#[derive(Debug)]
pub struct Frame {
    name: Option<String>,
    current: Option<String>,
    locals: AliasTable,
    locked: bool,
    parent: Option<usize>,
}

impl Frame {
    fn new(config: &EnvConfig) -> Self {
        Self {
            name: None,
            current: None,
            locals: AliasTable::new(config.frame_buckets, config.hash_key_len),
            locked: false,
            parent: None,
        }
    }

    /// Frame name; `Some` marks an enclosing frame.
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Line currently being executed in this frame.
    #[inline]
    #[must_use]
    pub fn current_command(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Local variables owned by this frame.
    #[inline]
    #[must_use]
    pub const fn locals(&self) -> &AliasTable {
        &self.locals
    }

    /// Whether this frame is the reattachment point of a blocking wait.
    #[inline]
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Scope parent, `None` for a fresh boundary.
    #[inline]
    #[must_use]
    pub const fn parent(&self) -> Option<usize> {
        self.parent
    }
}

/// Snapshot of one frame for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSummary {
    /// Stack index.
    pub index: usize,
    /// Frame name.
    pub name: Option<String>,
    /// Current command text.
    pub current: Option<String>,
    /// Locked flag.
    pub locked: bool,
    /// Scope parent.
    pub parent: Option<usize>,
    /// Number of locals.
    pub locals: usize,
}

/// Snapshot of the whole stack, top frame first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackDump {
    /// Frames from top to bottom.
    pub frames: Vec<FrameSummary>,
}

impl core::fmt::Display for StackDump {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.frames.is_empty() {
            return write!(f, "call stack is empty");
        }
        writeln!(f, "call stack")?;
        for frame in &self.frames {
            write!(f, "  [{}] {}", frame.index, frame.name.as_deref().unwrap_or("-"))?;
            if let Some(parent) = frame.parent {
                write!(f, " parent={parent}")?;
            }
            if frame.locked {
                write!(f, " locked")?;
            }
            write!(f, " locals={}", frame.locals)?;
            if let Some(current) = &frame.current {
                write!(f, " current={current:?}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Errors from call stack discipline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    /// Pop with no active frame. Carries the stack state at the time.
    Underflow(StackDump),
    /// An operation that needs a frame found the stack empty.
    NoFrame,
}

impl core::fmt::Display for StackError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Underflow(dump) => write!(f, "call stack underflow\n{dump}"),
            Self::NoFrame => write!(f, "no active stack frame"),
        }
    }
}

impl std::error::Error for StackError {}

/// Outcome of a scope-chain search.
enum LocalHit {
    Found(usize, EntryId),
    /// Not present, but the frame holds a `prefix.` entry so the dotted
    /// name may be created there.
    Implicit(usize),
}

/// The runtime call stack.
#[derive(Debug)]
pub struct RuntimeStack {
    frames: Vec<Frame>,
    depth: usize,
    function_level: Option<usize>,
    config: EnvConfig,
}

impl RuntimeStack {
    /// Create an empty stack. No frame slots are allocated until the first
    /// push.
    #[must_use]
    pub fn new(config: &EnvConfig) -> Self {
        Self {
            frames: Vec::new(),
            depth: 0,
            function_level: None,
            config: *config,
        }
    }

    /// Number of active frames.
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Returns true if no frame is active.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.depth == 0
    }

    /// Allocated frame slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    /// Index of the top frame.
    #[inline]
    #[must_use]
    pub const fn top(&self) -> Option<usize> {
        self.depth.checked_sub(1)
    }

    /// Borrow an active frame.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        if index >= self.depth {
            return None;
        }
        self.frames.get(index)
    }

    /// The function-call level that `FUNCTION_RETURN` resolves against.
    #[inline]
    #[must_use]
    pub const fn function_level(&self) -> Option<usize> {
        self.function_level
    }

    /// Set the function-call level, returning the previous one.
    pub fn set_function_level(&mut self, level: Option<usize>) -> Option<usize> {
        core::mem::replace(&mut self.function_level, level)
    }

    /// Push a frame and return its index.
    ///
    /// A frame with a non-empty name is enclosing. Any other frame is
    /// transparent and chains to the frame active before the push, which is
    /// the locked frame while a wait is on top. Reattaching across enclosing
    /// frames above a locked frame is left to [`Self::bless`].
    pub fn push(&mut self, name: Option<&str>) -> usize {
        let name = name.filter(|name| !name.is_empty());
        let index = self.depth;
        if index == self.frames.len() {
            let grown = if self.frames.is_empty() {
                self.config.initial_stack_capacity.max(1)
            } else {
                self.frames.len() * 2
            };
            let config = self.config;
            self.frames.resize_with(grown, || Frame::new(&config));
        }

        let parent = match name {
            Some(_) => None,
            None => self.top(),
        };

        let frame = &mut self.frames[index];
        if !frame.locals.is_empty() {
            warn!(index, locals = frame.locals.len(), "reused stack frame is not empty");
            frame.locals.clear();
        }
        frame.name = name.map(str::to_string);
        frame.current = None;
        frame.locked = false;
        frame.parent = parent;

        self.depth += 1;
        trace!(index, ?name, ?parent, "pushed frame");
        index
    }

    /// Pop the top frame, destroying its locals.
    ///
    /// # Errors
    ///
    /// Popping an empty stack is a discipline violation: the stack dump is
    /// logged and returned as [`StackError::Underflow`]. Callers should treat
    /// it as fatal.
    pub fn pop(&mut self) -> Result<(), StackError> {
        let Some(index) = self.top() else {
            let dump = self.dump();
            error!(%dump, "call stack underflow");
            return Err(StackError::Underflow(dump));
        };

        let frame = &mut self.frames[index];
        frame.locals.clear();
        frame.current = None;
        frame.name = None;
        frame.locked = false;

        self.depth = index;
        if self.function_level.is_some_and(|level| level >= index) {
            self.function_level = None;
        }
        trace!(index, "popped frame");
        Ok(())
    }

    /// Mark the top frame as locked. Any other lock is released first.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::NoFrame`] on an empty stack.
    pub fn lock(&mut self) -> Result<(), StackError> {
        let top = self.top().ok_or(StackError::NoFrame)?;
        for frame in &mut self.frames[..self.depth] {
            frame.locked = false;
        }
        self.frames[top].locked = true;
        debug!(index = top, "locked stack frame");
        Ok(())
    }

    /// Release the locked frame. Returns its index, if any.
    pub fn unlock(&mut self) -> Option<usize> {
        let index = self.find_locked_frame()?;
        self.frames[index].locked = false;
        debug!(index, "unlocked stack frame");
        Some(index)
    }

    /// Lowest active locked frame.
    #[must_use]
    pub fn find_locked_frame(&self) -> Option<usize> {
        self.frames[..self.depth].iter().position(|frame| frame.locked)
    }

    /// Turn the top frame into a transparent frame chained to the locked
    /// frame below it.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::NoFrame`] on an empty stack.
    pub fn bless(&mut self) -> Result<(), StackError> {
        let top = self.top().ok_or(StackError::NoFrame)?;
        let locked = self.frames[..top].iter().position(|frame| frame.locked);
        let frame = &mut self.frames[top];
        frame.name = None;
        frame.parent = locked;
        Ok(())
    }

    /// Record the line the top frame is executing.
    pub fn set_current_command(&mut self, line: &str) {
        if let Some(top) = self.top() {
            self.frames[top].current = Some(line.to_string());
        }
    }

    /// Clear the top frame's current line.
    pub fn unset_current_command(&mut self) {
        if let Some(top) = self.top() {
            self.frames[top].current = None;
        }
    }

    /// Borrow a local by location.
    #[must_use]
    pub fn local(&self, level: usize, id: EntryId) -> Option<&Alias> {
        self.frame(level)?.locals.get(id)
    }

    /// Mutably borrow a local by location.
    pub fn local_mut(&mut self, level: usize, id: EntryId) -> Option<&mut Alias> {
        if level >= self.depth {
            return None;
        }
        self.frames.get_mut(level)?.locals.get_mut(id)
    }

    /// Find a visible local without creating anything.
    #[must_use]
    pub fn find_local(&self, name: &str) -> Option<(usize, EntryId)> {
        match self.search(name)? {
            LocalHit::Found(level, id) => Some((level, id)),
            LocalHit::Implicit(_) => None,
        }
    }

    /// Returns true if [`lookup_local`](Self::lookup_local) would find or
    /// implicitly create `name`.
    #[must_use]
    pub fn resolves_local(&self, name: &str) -> bool {
        self.search(name).is_some()
    }

    /// Find a visible local.
    ///
    /// If `name` is dotted and some frame on the chain holds the prefix up to
    /// and including the first dot (`arr.` for `arr.3`), the full name is
    /// created in that frame with empty text.
    pub fn lookup_local(&mut self, name: &str, source: &SourceLocation) -> Option<(usize, EntryId)> {
        match self.search(name)? {
            LocalHit::Found(level, id) => Some((level, id)),
            LocalHit::Implicit(level) => {
                let alias = Alias::new(name, None, AliasBody::Text(String::new()), source.clone());
                let id = self.frames[level].locals.insert(alias);
                trace!(name, level, "implicitly created dotted local");
                Some((level, id))
            }
        }
    }

    /// Set a local: update it where visible, otherwise create it in the top
    /// frame.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::NoFrame`] on an empty stack.
    pub fn define_local(
        &mut self,
        name: &str,
        text: &str,
        source: &SourceLocation,
    ) -> Result<(usize, EntryId), StackError> {
        let top = self.top().ok_or(StackError::NoFrame)?;
        if let Some((level, id)) = self.lookup_local(name, source) {
            if let Some(alias) = self.frames[level].locals.get_mut(id) {
                alias.set_body(AliasBody::text(text));
                alias.set_source(source.clone());
            }
            return Ok((level, id));
        }
        Ok((top, self.insert_local(top, name, text, source)))
    }

    /// Set a local directly in frame `level`, ignoring visibility.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::NoFrame`] if `level` is not active.
    pub fn set_local_in(
        &mut self,
        level: usize,
        name: &str,
        text: &str,
        source: &SourceLocation,
    ) -> Result<EntryId, StackError> {
        if level >= self.depth {
            return Err(StackError::NoFrame);
        }
        let locals = &mut self.frames[level].locals;
        if let Some(id) = locals.find(name) {
            if let Some(alias) = locals.get_mut(id) {
                alias.set_body(AliasBody::text(text));
                alias.set_source(source.clone());
            }
            return Ok(id);
        }
        Ok(self.insert_local(level, name, text, source))
    }

    /// Locals visible from the top frame, nearest frame first, optionally
    /// restricted to names starting with `prefix` (case-insensitive).
    #[must_use]
    pub fn visible_locals(&self, prefix: Option<&str>) -> Vec<&Alias> {
        let mut out = Vec::new();
        for level in self.chain() {
            out.extend(self.frames[level].locals.iter().filter(|alias| {
                prefix.is_none_or(|p| starts_with_ignore_case(alias.name(), p))
            }));
        }
        out
    }

    /// Diagnostic snapshot, top frame first.
    #[must_use]
    pub fn dump(&self) -> StackDump {
        let frames = self.frames[..self.depth]
            .iter()
            .enumerate()
            .rev()
            .map(|(index, frame)| FrameSummary {
                index,
                name: frame.name.clone(),
                current: frame.current.clone(),
                locked: frame.locked,
                parent: frame.parent,
                locals: frame.locals.len(),
            })
            .collect();
        StackDump { frames }
    }

    /// Destroy every frame and release the slots.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.depth = 0;
        self.function_level = None;
    }

    fn insert_local(&mut self, level: usize, name: &str, text: &str, source: &SourceLocation) -> EntryId {
        let alias = Alias::new(name, None, AliasBody::text(text), source.clone());
        self.frames[level].locals.insert(alias)
    }

    /// Frame indices along the scope chain from the top.
    fn chain(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cursor = self.top();
        while let Some(level) = cursor {
            out.push(level);
            cursor = self.frames[level].parent.filter(|&parent| parent < level);
        }
        out
    }

    fn search(&self, name: &str) -> Option<LocalHit> {
        let top = self.top()?;
        if name.is_empty() || invalid_identifier_char(name).is_some() {
            return None;
        }

        let mut level = if name.eq_ignore_ascii_case(FUNCTION_RETURN) {
            self.function_level.filter(|&level| level <= top).unwrap_or(top)
        } else {
            top
        };

        loop {
            trace!(name, level, "looking for local");
            let frame = &self.frames[level];
            if let Some(id) = frame.locals.find(name) {
                trace!(name, level, "found local");
                return Some(LocalHit::Found(level, id));
            }
            if let Some(dot) = name.find('.') {
                if frame.locals.find(&name[..=dot]).is_some() {
                    return Some(LocalHit::Implicit(level));
                }
            }

            if frame.name.is_some() {
                break;
            }
            match frame.parent {
                Some(parent) if parent < level => level = parent,
                _ => break,
            }
        }

        trace!(name, level, "local not found");
        None
    }
}
