// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tunables for a symbol environment.

/// Initial bucket count of a namespace's command and variable tables.
pub const NAMESPACE_BUCKETS: usize = 16;

/// Initial bucket count of a stack frame's local table.
pub const FRAME_BUCKETS: usize = 4;

/// Number of leading name bytes fed to the hash function.
///
/// Longer names stay distinct (the comparator sees the whole name), they just
/// share a hash with every name that has the same prefix.
pub const HASH_SANITY_LEN: usize = 32;

/// Maximum length of a single namespace name.
pub const NAMESPACE_MAX_LEN: usize = 32;

/// Maximum number of parameter slots in an argument list.
pub const MAX_ARGLIST_SLOTS: usize = 32;

/// Number of frame slots allocated on the first push.
pub const INITIAL_STACK_CAPACITY: usize = 8;

/// Symbol environment configuration.
///
/// The defaults match the limits the command language has always used; they
/// are exposed so embedders and tests can shrink tables to force growth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnvConfig {
    /// Initial bucket count for namespace tables.
    pub namespace_buckets: usize,
    /// Initial bucket count for frame-local tables.
    pub frame_buckets: usize,
    /// Hashed key prefix length.
    pub hash_key_len: usize,
    /// Frame slots allocated on first use of the call stack.
    pub initial_stack_capacity: usize,
    /// Maximum namespace name length.
    pub namespace_max_len: usize,
    /// Maximum parameter slots per argument list.
    pub max_arglist_slots: usize,
    /// Whether plain `words` extraction honours double quotes.
    ///
    /// `uwords` never does and `dwords` always does.
    pub double_quoted_words: bool,
}

impl EnvConfig {
    /// Configuration with the standard limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            namespace_buckets: NAMESPACE_BUCKETS,
            frame_buckets: FRAME_BUCKETS,
            hash_key_len: HASH_SANITY_LEN,
            initial_stack_capacity: INITIAL_STACK_CAPACITY,
            namespace_max_len: NAMESPACE_MAX_LEN,
            max_arglist_slots: MAX_ARGLIST_SLOTS,
            double_quoted_words: false,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}
