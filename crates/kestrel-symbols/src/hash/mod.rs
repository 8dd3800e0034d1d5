// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Generic open-chained hash index.
//!
//! The index owns its entries and hands out [`EntryId`] handles. Keys are
//! never stored separately: a key accessor picks the key bytes out of each
//! entry, so the index can hash any entry type without knowing its layout.
//!
//! ```text
//! buckets                       slots (generational)
//! ┌───┐
//! │ 0 │ ─► [id 3] ─► [id 0]     [0] gen 0  Some(entry)
//! │ 1 │                          [1] gen 2  None  ◄─ free list
//! │ 2 │ ─► [id 2]                [2] gen 0  Some(entry)
//! │ 3 │                          [3] gen 1  Some(entry)
//! └───┘
//! ```
//!
//! Chains grow at the head by default. Once the table holds twice as many
//! entries as buckets it rehashes into four times as many buckets, so inserts
//! stay amortized O(1). The bucket count never shrinks.

#[cfg(test)]
mod hash_test;

use core::cmp::Ordering;
use core::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

static NEXT_TABLE: AtomicU32 = AtomicU32::new(0);

/// Table behaviour flags.
pub mod hash_flags {
    /// Fold ASCII case before hashing.
    pub const NOCASE: u32 = 0x1;
    /// Key is a string: hash up to the first NUL or the key length, whichever
    /// comes first.
    pub const STRING: u32 = 0x2;
    /// Insert new entries at the head of their bucket (the default).
    pub const INSERT_HEAD: u32 = 0x4;
    /// Insert new entries at the tail of their bucket.
    pub const INSERT_TAIL: u32 = 0x8;
}

/// Extracts the key bytes from an entry.
pub type KeyFn<T> = fn(&T) -> &[u8];

/// Three-way key comparison.
///
/// Called as `compare(entry_key, search_key, key_len)`; `Ordering::Equal`
/// means the entry matches.
pub type Comparator = fn(&[u8], &[u8], usize) -> Ordering;

/// Compare the first `len` bytes of both keys.
#[must_use]
pub fn compare_bytes(a: &[u8], b: &[u8], len: usize) -> Ordering {
    let a = &a[..a.len().min(len)];
    let b = &b[..b.len().min(len)];
    a.cmp(b)
}

/// Compare two whole keys ignoring ASCII case.
#[must_use]
pub fn compare_ignore_case(a: &[u8], b: &[u8], _len: usize) -> Ordering {
    let lower = |c: &u8| c.to_ascii_lowercase();
    a.iter().map(lower).cmp(b.iter().map(lower))
}

/// Stable handle to an entry in a [`HashIndex`].
///
/// Handles carry a generation so that a handle to a removed entry never
/// aliases whatever later reuses its slot, and the tag of the index that
/// issued them so another index never accepts them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntryId {
    table: u32,
    index: u32,
    generation: u32,
}

/// Position of a match inside a bucket chain, for [`HashIndex::find_next`].
///
/// A cursor is only meaningful until the next mutation of the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashCursor {
    bucket: usize,
    position: usize,
}

struct Slot<T> {
    generation: u32,
    entry: Option<T>,
}

/// Open-chained hash index over entries of type `T`.
pub struct HashIndex<T> {
    tag: u32,
    buckets: Vec<Vec<EntryId>>,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    entries: usize,
    key_of: KeyFn<T>,
    key_len: usize,
    flags: u32,
    compare: Comparator,
}

impl<T> HashIndex<T> {
    /// Create an index with `buckets` buckets.
    ///
    /// `key_len` bounds how many key bytes are hashed (and, for the default
    /// comparator, compared). Without a comparator, keys are compared
    /// bytewise over `key_len` bytes.
    #[must_use]
    pub fn new(
        buckets: usize,
        key_of: KeyFn<T>,
        key_len: usize,
        flags: u32,
        compare: Option<Comparator>,
    ) -> Self {
        let buckets = buckets.max(1);
        Self {
            tag: NEXT_TABLE.fetch_add(1, AtomicOrdering::Relaxed),
            buckets: (0..buckets).map(|_| Vec::new()).collect(),
            slots: Vec::new(),
            free: Vec::new(),
            entries: 0,
            key_of,
            key_len: key_len.max(1),
            flags,
            compare: compare.unwrap_or(compare_bytes),
        }
    }

    /// Number of live entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries
    }

    /// Returns true if the index holds no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Current number of buckets.
    #[inline]
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket index of `key` under the current bucket count.
    #[must_use]
    pub fn bucket_of(&self, key: &[u8]) -> usize {
        let mut len = self.key_len.min(key.len());
        if self.flags & hash_flags::STRING != 0 {
            if let Some(nul) = key[..len].iter().position(|&b| b == 0) {
                len = nul;
            }
        }

        let nocase = self.flags & hash_flags::NOCASE != 0;
        let hash = key[..len].iter().fold(0u32, |hash, &b| {
            let b = if nocase { b.to_ascii_lowercase() } else { b };
            hash.wrapping_mul(33).wrapping_add(u32::from(b))
        });

        hash as usize % self.buckets.len()
    }

    /// Insert an entry and return its handle.
    ///
    /// Triggers a rehash into four times as many buckets once the table holds
    /// twice as many entries as buckets.
    pub fn insert(&mut self, entry: T) -> EntryId {
        let id = self.alloc_slot(entry);
        self.link(id);
        self.entries += 1;

        if self.entries >= self.buckets.len() * 2 {
            self.resize(self.buckets.len() * 4);
        }

        id
    }

    /// Rehash every entry into `buckets` buckets.
    ///
    /// Requests that would not grow the table are ignored.
    pub fn resize(&mut self, buckets: usize) {
        if buckets <= self.buckets.len() {
            return;
        }

        let old = core::mem::replace(
            &mut self.buckets,
            (0..buckets).map(|_| Vec::new()).collect(),
        );
        for id in old.into_iter().flatten() {
            self.link(id);
        }
    }

    /// Remove the entry with the given handle.
    ///
    /// Removal is by identity, not by key. Returns `None` (and leaves the
    /// index untouched) if the handle does not name a live entry of this
    /// index.
    pub fn remove(&mut self, id: EntryId) -> Option<T> {
        let bucket = {
            let entry = self.get(id)?;
            self.bucket_of((self.key_of)(entry))
        };

        let chain = &mut self.buckets[bucket];
        let position = chain.iter().position(|&other| other == id)?;
        chain.remove(position);
        self.entries -= 1;

        let slot = &mut self.slots[id.index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        slot.entry.take()
    }

    /// Borrow the entry with the given handle.
    #[must_use]
    pub fn get(&self, id: EntryId) -> Option<&T> {
        if id.table != self.tag {
            return None;
        }
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    /// Mutably borrow the entry with the given handle.
    ///
    /// The caller must not change the entry's key; the entry would then sit
    /// in the wrong bucket.
    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut T> {
        if id.table != self.tag {
            return None;
        }
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    /// Returns true if the handle names a live entry.
    #[must_use]
    pub fn contains(&self, id: EntryId) -> bool {
        self.get(id).is_some()
    }

    /// Find the first entry matching `key`.
    #[must_use]
    pub fn find(&self, key: &[u8]) -> Option<EntryId> {
        self.find_first(key).map(|(id, _)| id)
    }

    /// Find the first entry matching `key`, with a cursor for `find_next`.
    #[must_use]
    pub fn find_first(&self, key: &[u8]) -> Option<(EntryId, HashCursor)> {
        let bucket = self.bucket_of(key);
        self.scan(key, bucket, 0)
    }

    /// Find the next entry matching `key` after `cursor`.
    #[must_use]
    pub fn find_next(&self, key: &[u8], cursor: HashCursor) -> Option<(EntryId, HashCursor)> {
        self.scan(key, cursor.bucket, cursor.position + 1)
    }

    /// All entries matching `key`, in chain order.
    pub fn find_all<'a>(&'a self, key: &'a [u8]) -> impl Iterator<Item = EntryId> + 'a {
        let mut next = self.find_first(key);
        core::iter::from_fn(move || {
            let (id, cursor) = next?;
            next = self.find_next(key, cursor);
            Some(id)
        })
    }

    /// Iterate over all live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let entry = slot.entry.as_ref()?;
            let id = EntryId {
                table: self.tag,
                index: index as u32,
                generation: slot.generation,
            };
            Some((id, entry))
        })
    }

    /// Remove every entry, keeping the bucket count.
    pub fn clear(&mut self) {
        for chain in &mut self.buckets {
            chain.clear();
        }
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.entry.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.entries = 0;
    }

    /// Length of every bucket chain, for diagnostics.
    #[must_use]
    pub fn chain_lengths(&self) -> Vec<usize> {
        self.buckets.iter().map(Vec::len).collect()
    }

    fn scan(&self, key: &[u8], bucket: usize, start: usize) -> Option<(EntryId, HashCursor)> {
        let chain = self.buckets.get(bucket)?;
        chain
            .iter()
            .enumerate()
            .skip(start)
            .find(|&(_, &id)| {
                self.get(id).is_some_and(|entry| {
                    (self.compare)((self.key_of)(entry), key, self.key_len) == Ordering::Equal
                })
            })
            .map(|(position, &id)| (id, HashCursor { bucket, position }))
    }

    fn alloc_slot(&mut self, entry: T) -> EntryId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            return EntryId {
                table: self.tag,
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        EntryId {
            table: self.tag,
            index,
            generation: 0,
        }
    }

    fn link(&mut self, id: EntryId) {
        let Some(entry) = self.get(id) else {
            return;
        };
        let bucket = self.bucket_of((self.key_of)(entry));
        let chain = &mut self.buckets[bucket];
        if self.flags & hash_flags::INSERT_TAIL != 0 {
            chain.push(id);
        } else {
            chain.insert(0, id);
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for HashIndex<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashIndex")
            .field("buckets", &self.buckets.len())
            .field("entries", &self.entries)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
