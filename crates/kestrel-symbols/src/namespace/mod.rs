// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Hierarchical namespace tree.
//!
//! Namespaces are addressed by `::`-joined paths. The unnamed root is created
//! with the tree and can never be destroyed.
//!
//! ```text
//!          (root)              "::"
//!          /    \
//!       util    net            "::util", "::net"
//!               /
//!             irc              "::net::irc"
//! ```
//!
//! Nodes live in an arena addressed by [`NamespaceId`]. Parents own their
//! children through id lists and children point back through a plain id, so
//! there are no ownership cycles. Arena slots are never reused: an id of a
//! destroyed namespace stays dead forever. Destruction drops the node and its
//! tables but leaves an empty slot behind, so the arena grows by one slot per
//! namespace ever created. Embedders that churn namespaces without bound
//! should recreate the environment instead.
//!
//! Destruction requested while code may still be running inside a namespace
//! goes through [`NamespaceTree::schedule_destroy`] and takes effect at the
//! next [`NamespaceTree::flush_pending`].

mod resolve;


pub use resolve::{Resolved, Scope};

use tracing::{debug, warn};

use crate::alias::{AliasTable, SymbolKind};
use crate::config::EnvConfig;

/// The path separator and root qualifier.
pub const QUALIFIER: &str = "::";

/// Handle to a namespace in a [`NamespaceTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(u32);

impl NamespaceId {
    /// Arena index of this namespace.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Errors from namespace tree mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    /// Namespace name exceeds the configured maximum.
    NameTooLong {
        /// The rejected name.
        name: String,
        /// Maximum allowed length.
        max: usize,
    },
    /// Namespace name is empty or contains `:`.
    InvalidName(String),
    /// A sibling with the same name already exists.
    Duplicate(String),
    /// The root namespace cannot be destroyed.
    RootProtected,
    /// The id does not name a live namespace.
    Unknown(NamespaceId),
    /// No namespace matches the path.
    NotFound(String),
}

impl core::fmt::Display for NamespaceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NameTooLong { name, max } => {
                write!(f, "namespace name {name:?} exceeds {max} characters")
            }
            Self::InvalidName(name) => write!(f, "invalid namespace name {name:?}"),
            Self::Duplicate(name) => write!(f, "namespace {name:?} already exists"),
            Self::RootProtected => write!(f, "the root namespace cannot be destroyed"),
            Self::Unknown(id) => write!(f, "no live namespace with id {}", id.0),
            Self::NotFound(path) => write!(f, "no such namespace: {path}"),
        }
    }
}

impl std::error::Error for NamespaceError {}

/// A single namespace node.
#[derive(Debug)]
pub struct Namespace {
    name: String,
    parent: Option<NamespaceId>,
    /// Most recently created first.
    children: Vec<NamespaceId>,
    commands: AliasTable,
    variables: AliasTable,
}

impl Namespace {
    fn new(name: &str, parent: Option<NamespaceId>, config: &EnvConfig) -> Self {
        Self {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            commands: AliasTable::new(config.namespace_buckets, config.hash_key_len),
            variables: AliasTable::new(config.namespace_buckets, config.hash_key_len),
        }
    }

    /// The namespace's own name (empty for root).
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent namespace, `None` only for root.
    #[inline]
    #[must_use]
    pub const fn parent(&self) -> Option<NamespaceId> {
        self.parent
    }

    /// Child namespaces, most recently created first.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NamespaceId] {
        &self.children
    }

    /// Command aliases defined in this namespace.
    #[inline]
    #[must_use]
    pub const fn commands(&self) -> &AliasTable {
        &self.commands
    }

    /// Variables defined in this namespace.
    #[inline]
    #[must_use]
    pub const fn variables(&self) -> &AliasTable {
        &self.variables
    }

    /// Table for the given symbol kind.
    #[must_use]
    pub const fn table(&self, kind: SymbolKind) -> &AliasTable {
        match kind {
            SymbolKind::Command => &self.commands,
            SymbolKind::Variable => &self.variables,
        }
    }

    /// Mutable table for the given symbol kind.
    pub fn table_mut(&mut self, kind: SymbolKind) -> &mut AliasTable {
        match kind {
            SymbolKind::Command => &mut self.commands,
            SymbolKind::Variable => &mut self.variables,
        }
    }
}

/// One line of the tree-listing diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceSummary {
    /// Namespace handle.
    pub id: NamespaceId,
    /// Explicit full name (`::a::b`).
    pub full_name: String,
    /// Distance from root.
    pub depth: usize,
    /// Number of immediate children.
    pub children: usize,
    /// Live command aliases.
    pub commands: usize,
    /// Live variables.
    pub variables: usize,
}

/// The namespace tree with its "current" cursor.
#[derive(Debug)]
pub struct NamespaceTree {
    nodes: Vec<Option<Namespace>>,
    current: NamespaceId,
    pending: Vec<NamespaceId>,
    config: EnvConfig,
}

impl NamespaceTree {
    /// The root is always the first arena slot.
    const ROOT: NamespaceId = NamespaceId(0);

    /// Create a tree holding only the root, which becomes current.
    #[must_use]
    pub fn new(config: &EnvConfig) -> Self {
        Self {
            nodes: vec![Some(Namespace::new("", None, config))],
            current: Self::ROOT,
            pending: Vec::new(),
            config: *config,
        }
    }

    /// The root namespace.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> NamespaceId {
        Self::ROOT
    }

    /// The current namespace.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> NamespaceId {
        self.current
    }

    /// Make `id` the current namespace.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceError::Unknown`] if `id` is not live.
    pub fn set_current(&mut self, id: NamespaceId) -> Result<(), NamespaceError> {
        if !self.contains(id) {
            return Err(NamespaceError::Unknown(id));
        }
        self.current = id;
        Ok(())
    }

    /// Make the namespace at `path` current.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceError::NotFound`] if the path does not resolve.
    pub fn switch(&mut self, path: &str) -> Result<NamespaceId, NamespaceError> {
        let id = self
            .find(path)
            .ok_or_else(|| NamespaceError::NotFound(path.to_string()))?;
        self.current = id;
        debug!(namespace = path, "switched namespace");
        Ok(id)
    }

    /// Returns true if `id` names a live namespace.
    #[must_use]
    pub fn contains(&self, id: NamespaceId) -> bool {
        matches!(self.nodes.get(id.index()), Some(Some(_)))
    }

    /// Borrow a namespace.
    #[must_use]
    pub fn get(&self, id: NamespaceId) -> Option<&Namespace> {
        self.nodes.get(id.index())?.as_ref()
    }

    /// Mutably borrow a namespace.
    pub fn get_mut(&mut self, id: NamespaceId) -> Option<&mut Namespace> {
        self.nodes.get_mut(id.index())?.as_mut()
    }

    /// Number of live namespaces, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Always false: the root cannot be removed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Ids of every live namespace in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NamespaceId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_some())
            .map(|(index, _)| NamespaceId(index as u32))
    }

    /// Create a namespace as a child of the current namespace.
    ///
    /// # Errors
    ///
    /// Rejects names that are empty, contain `:`, exceed the maximum length,
    /// or collide with an existing sibling (case-insensitively).
    pub fn create(&mut self, name: &str) -> Result<NamespaceId, NamespaceError> {
        self.create_in(self.current, name)
    }

    /// Create a namespace as a child of `parent`.
    ///
    /// # Errors
    ///
    /// As [`create`](Self::create), plus [`NamespaceError::Unknown`] if
    /// `parent` is not live.
    pub fn create_in(
        &mut self,
        parent: NamespaceId,
        name: &str,
    ) -> Result<NamespaceId, NamespaceError> {
        if name.is_empty() || name.contains(':') {
            warn!(name, "rejected namespace name");
            return Err(NamespaceError::InvalidName(name.to_string()));
        }
        if name.len() > self.config.namespace_max_len {
            warn!(name, max = self.config.namespace_max_len, "namespace name too long");
            return Err(NamespaceError::NameTooLong {
                name: name.to_string(),
                max: self.config.namespace_max_len,
            });
        }
        if !self.contains(parent) {
            return Err(NamespaceError::Unknown(parent));
        }
        if self.child(parent, name).is_some() {
            return Err(NamespaceError::Duplicate(name.to_string()));
        }

        let id = NamespaceId(self.nodes.len() as u32);
        self.nodes.push(Some(Namespace::new(name, Some(parent), &self.config)));
        if let Some(node) = self.get_mut(parent) {
            node.children.insert(0, id);
        }

        debug!(namespace = name, id = id.0, "namespace created");
        Ok(id)
    }

    /// Find the immediate child of `parent` named `name` (case-insensitive).
    #[must_use]
    pub fn child(&self, parent: NamespaceId, name: &str) -> Option<NamespaceId> {
        self.get(parent)?.children.iter().copied().find(|&child| {
            self.get(child)
                .is_some_and(|node| node.name.eq_ignore_ascii_case(name))
        })
    }

    /// Resolve a namespace path.
    ///
    /// A leading `::` starts at root, anything else at the current namespace.
    /// Each `::`-separated component must name an immediate child of the
    /// node reached so far. A lone `:` inside a component is malformed.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<NamespaceId> {
        let (mut node, rest) = match path.strip_prefix(QUALIFIER) {
            Some(rest) => (Self::ROOT, rest),
            None => (self.current, path),
        };
        if rest.is_empty() {
            return Some(node);
        }

        for component in rest.split(QUALIFIER) {
            if component.contains(':') {
                warn!(path, component, "malformed namespace qualifier");
                return None;
            }
            node = self.child(node, component)?;
        }
        Some(node)
    }

    /// Render the full `::`-joined name of a namespace.
    ///
    /// The root's empty name is omitted unless `explicit` is set, in which
    /// case the result starts with `::` (and root alone renders as `::`).
    #[must_use]
    pub fn full_name(&self, id: NamespaceId, explicit: bool) -> Option<String> {
        let mut parts = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.get(current)?;
            if node.parent.is_some() {
                parts.push(node.name.as_str());
            }
            cursor = node.parent;
        }
        parts.reverse();

        let joined = parts.join(QUALIFIER);
        Some(if explicit {
            format!("{QUALIFIER}{joined}")
        } else {
            joined
        })
    }

    /// Destroy a namespace and everything below it, immediately.
    ///
    /// Children are destroyed before their parents. If the current namespace
    /// lies in the destroyed subtree, the destroyed node's parent becomes
    /// current.
    ///
    /// # Errors
    ///
    /// Refuses the root and ids that are not live.
    pub fn destroy(&mut self, id: NamespaceId) -> Result<(), NamespaceError> {
        if id == Self::ROOT {
            warn!("refusing to destroy the root namespace");
            return Err(NamespaceError::RootProtected);
        }
        let parent = self
            .get(id)
            .ok_or(NamespaceError::Unknown(id))?
            .parent
            .unwrap_or(Self::ROOT);

        let doomed = self.subtree_post_order(id);
        let current_doomed = doomed.contains(&self.current);

        if let Some(node) = self.get_mut(parent) {
            node.children.retain(|&child| child != id);
        }
        for victim in doomed {
            if let Some(node) = self.nodes.get_mut(victim.index()).and_then(Option::take) {
                debug!(
                    namespace = node.name.as_str(),
                    commands = node.commands.len(),
                    variables = node.variables.len(),
                    "namespace destroyed"
                );
            }
        }
        if current_doomed {
            self.current = parent;
        }
        Ok(())
    }

    /// Queue a namespace for destruction at the next safe point.
    ///
    /// # Errors
    ///
    /// Refuses the root and ids that are not live.
    pub fn schedule_destroy(&mut self, id: NamespaceId) -> Result<(), NamespaceError> {
        if id == Self::ROOT {
            return Err(NamespaceError::RootProtected);
        }
        if !self.contains(id) {
            return Err(NamespaceError::Unknown(id));
        }
        if !self.pending.contains(&id) {
            self.pending.push(id);
        }
        Ok(())
    }

    /// Namespaces waiting for destruction.
    #[must_use]
    pub fn pending(&self) -> &[NamespaceId] {
        &self.pending
    }

    /// Destroy every queued namespace. Returns how many were destroyed.
    ///
    /// Entries already gone (for example because an ancestor was queued
    /// first) are skipped.
    pub fn flush_pending(&mut self) -> usize {
        let pending = core::mem::take(&mut self.pending);
        pending
            .into_iter()
            .filter(|&id| self.destroy(id).is_ok())
            .count()
    }

    /// Pre-order listing of the whole tree with per-node counts.
    #[must_use]
    pub fn tree(&self) -> Vec<NamespaceSummary> {
        let mut out = Vec::new();
        let mut todo = vec![(Self::ROOT, 0usize)];
        while let Some((id, depth)) = todo.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            out.push(NamespaceSummary {
                id,
                full_name: self.full_name(id, true).unwrap_or_default(),
                depth,
                children: node.children.len(),
                commands: node.commands.len(),
                variables: node.variables.len(),
            });
            // Reverse so the first child is visited first
            todo.extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
        }
        out
    }

    fn subtree_post_order(&self, id: NamespaceId) -> Vec<NamespaceId> {
        let mut out = Vec::new();
        let mut todo = vec![(id, false)];
        while let Some((node, expanded)) = todo.pop() {
            if expanded {
                out.push(node);
                continue;
            }
            todo.push((node, true));
            if let Some(ns) = self.get(node) {
                todo.extend(ns.children.iter().map(|&child| (child, false)));
            }
        }
        out
    }
}
