// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Aliases and the tables that hold them.
//!
//! An [`Alias`] is either a command macro or a variable. Its body is literal
//! text or a stub naming a file that will define it on first use; the two
//! are mutually exclusive.
//!
//! An [`AliasTable`] pairs a case-insensitive [`HashIndex`] with an ordered
//! list of the same entries, most recently created first. The hash answers
//! point lookups; the list drives enumeration.


use crate::arglist::ArgList;
use crate::hash::{EntryId, HashIndex, compare_ignore_case, hash_flags};
use crate::namespace::NamespaceId;

/// Name of the local that carries a function's return value.
pub const FUNCTION_RETURN: &str = "FUNCTION_RETURN";

/// The two symbol tables every namespace carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Command macros (`alias`).
    Command,
    /// Variables (`assign`).
    Variable,
}

impl SymbolKind {
    /// User-facing name of the kind.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Command => "alias",
            Self::Variable => "assign",
        }
    }
}

/// Where a definition came from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file (the "package").
    pub file: String,
    /// Line within that file.
    pub line: u32,
}

impl SourceLocation {
    /// Create a source location.
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// Body of an alias.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AliasBody {
    /// Literal text.
    Text(String),
    /// File to load the real definition from.
    Stub(String),
}

impl AliasBody {
    /// Literal text body.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Stub body.
    #[must_use]
    pub fn stub(file: impl Into<String>) -> Self {
        Self::Stub(file.into())
    }

    /// Returns true for a stub body.
    #[must_use]
    pub const fn is_stub(&self) -> bool {
        matches!(self, Self::Stub(_))
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(s) | Self::Stub(s) => s.len(),
        }
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A command macro or variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alias {
    name: String,
    namespace: Option<NamespaceId>,
    body: AliasBody,
    source: SourceLocation,
    global: bool,
    arglist: Option<ArgList>,
}

impl Alias {
    /// Create an alias.
    ///
    /// `namespace` is `None` for stack-frame locals.
    #[must_use]
    pub fn new(
        name: &str,
        namespace: Option<NamespaceId>,
        body: AliasBody,
        source: SourceLocation,
    ) -> Self {
        Self {
            name: name.to_string(),
            namespace,
            body,
            source,
            global: false,
            arglist: None,
        }
    }

    /// Name within the owning table.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning namespace, `None` for locals and detached entries.
    #[inline]
    #[must_use]
    pub const fn namespace(&self) -> Option<NamespaceId> {
        self.namespace
    }

    pub(crate) fn set_namespace(&mut self, namespace: Option<NamespaceId>) {
        self.namespace = namespace;
    }

    /// The body.
    #[inline]
    #[must_use]
    pub const fn body(&self) -> &AliasBody {
        &self.body
    }

    /// Literal text, if this alias is not a stub.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            AliasBody::Text(text) => Some(text),
            AliasBody::Stub(_) => None,
        }
    }

    /// Stub file, if this alias is a stub.
    #[must_use]
    pub fn stub(&self) -> Option<&str> {
        match &self.body {
            AliasBody::Stub(file) => Some(file),
            AliasBody::Text(_) => None,
        }
    }

    /// Returns true if the alias is a stub.
    #[must_use]
    pub const fn is_stub(&self) -> bool {
        matches!(self.body, AliasBody::Stub(_))
    }

    /// Replace the body. Setting text drops any stub and vice versa.
    pub fn set_body(&mut self, body: AliasBody) {
        self.body = body;
    }

    /// Where this alias was last defined.
    #[inline]
    #[must_use]
    pub const fn source(&self) -> &SourceLocation {
        &self.source
    }

    /// Restamp the source location.
    pub fn set_source(&mut self, source: SourceLocation) {
        self.source = source;
    }

    /// Overwrite the recorded source file only.
    pub fn set_package(&mut self, file: &str) {
        file.clone_into(&mut self.source.file);
    }

    /// Whether the alias was defined while loading globally.
    #[inline]
    #[must_use]
    pub const fn is_global(&self) -> bool {
        self.global
    }

    /// Set the global flag.
    pub fn set_global(&mut self, global: bool) {
        self.global = global;
    }

    /// Parameter list of a command macro.
    #[inline]
    #[must_use]
    pub const fn arglist(&self) -> Option<&ArgList> {
        self.arglist.as_ref()
    }

    /// Replace the parameter list.
    pub fn set_arglist(&mut self, arglist: Option<ArgList>) {
        self.arglist = arglist;
    }
}

fn alias_key(alias: &Alias) -> &[u8] {
    alias.name.as_bytes()
}

/// Hash index plus creation-ordered list of aliases.
#[derive(Debug)]
pub struct AliasTable {
    index: HashIndex<Alias>,
    /// Most recently inserted first.
    order: Vec<EntryId>,
}

impl AliasTable {
    /// Create an empty table.
    #[must_use]
    pub fn new(buckets: usize, key_len: usize) -> Self {
        Self {
            index: HashIndex::new(
                buckets,
                alias_key,
                key_len,
                hash_flags::NOCASE | hash_flags::STRING,
                Some(compare_ignore_case),
            ),
            order: Vec::new(),
        }
    }

    /// Number of aliases.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the table is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Find an alias by name (case-insensitive).
    #[must_use]
    pub fn find(&self, name: &str) -> Option<EntryId> {
        self.index.find(name.as_bytes())
    }

    /// Borrow the alias named `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Alias> {
        self.get(self.find(name)?)
    }

    /// Borrow an alias by handle.
    #[must_use]
    pub fn get(&self, id: EntryId) -> Option<&Alias> {
        self.index.get(id)
    }

    /// Mutably borrow an alias by handle.
    ///
    /// Renaming through this reference corrupts the table.
    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Alias> {
        self.index.get_mut(id)
    }

    /// Insert an alias at the front of the ordered list.
    ///
    /// Callers check for an existing entry of the same name first.
    pub fn insert(&mut self, alias: Alias) -> EntryId {
        let id = self.index.insert(alias);
        self.order.insert(0, id);
        id
    }

    /// Remove an alias by handle.
    pub fn remove(&mut self, id: EntryId) -> Option<Alias> {
        let alias = self.index.remove(id)?;
        self.order.retain(|&other| other != id);
        Some(alias)
    }

    /// Remove the alias named `name`.
    pub fn remove_named(&mut self, name: &str) -> Option<Alias> {
        let id = self.find(name)?;
        self.remove(id)
    }

    /// Remove every alias matching `pred`. Returns how many were removed.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&Alias) -> bool) -> usize {
        let doomed: Vec<EntryId> = self
            .iter_ids()
            .filter(|&id| self.index.get(id).is_some_and(&mut pred))
            .collect();
        doomed
            .into_iter()
            .filter(|&id| self.remove(id).is_some())
            .count()
    }

    /// Remove every alias. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.index.len();
        self.index.clear();
        self.order.clear();
        count
    }

    /// Aliases in list order, most recently created first.
    pub fn iter(&self) -> impl Iterator<Item = &Alias> {
        self.order.iter().filter_map(|&id| self.index.get(id))
    }

    /// Handles in list order.
    pub fn iter_ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.order.iter().copied()
    }

    /// Hash chain lengths, for diagnostics.
    #[must_use]
    pub fn chain_lengths(&self) -> Vec<usize> {
        self.index.chain_lengths()
    }
}
