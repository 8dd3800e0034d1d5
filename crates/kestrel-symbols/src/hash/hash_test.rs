// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the hash index.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Item {
    name: String,
    value: u32,
}

fn item(name: &str, value: u32) -> Item {
    Item {
        name: name.to_string(),
        value,
    }
}

fn name_key(item: &Item) -> &[u8] {
    item.name.as_bytes()
}

fn string_table(buckets: usize) -> HashIndex<Item> {
    HashIndex::new(
        buckets,
        name_key,
        32,
        hash_flags::NOCASE | hash_flags::STRING,
        Some(compare_ignore_case),
    )
}

// --- Hashing ---

#[test]
fn hash_is_case_folded_when_nocase() {
    let table = string_table(16);
    assert_eq!(table.bucket_of(b"Hello"), table.bucket_of(b"hELLO"));
}

#[test]
fn hash_respects_case_without_nocase() {
    let table: HashIndex<Item> = HashIndex::new(1024, name_key, 32, 0, None);
    // "a" and "A" differ by 32, which is not a multiple of 1024
    assert_ne!(table.bucket_of(b"a"), table.bucket_of(b"A"));
}

#[test]
fn hash_matches_times_33_formula() {
    let table: HashIndex<Item> = HashIndex::new(1_000_003, name_key, 32, 0, None);
    let expected = (u32::from(b'a') * 33 + u32::from(b'b')) as usize;
    assert_eq!(table.bucket_of(b"ab"), expected);
}

#[test]
fn hash_stops_at_key_len() {
    let table: HashIndex<Item> = HashIndex::new(97, name_key, 4, 0, None);
    assert_eq!(table.bucket_of(b"abcdXXXX"), table.bucket_of(b"abcdYYYY"));
}

#[test]
fn string_key_stops_at_nul() {
    let table: HashIndex<Item> = HashIndex::new(97, name_key, 32, hash_flags::STRING, None);
    assert_eq!(table.bucket_of(b"abc\0def"), table.bucket_of(b"abc"));
}

// --- Insert / find ---

#[test]
fn insert_and_find() {
    let mut table = string_table(4);
    let id = table.insert(item("alpha", 1));

    assert_eq!(table.len(), 1);
    assert_eq!(table.find(b"alpha"), Some(id));
    assert_eq!(table.find(b"ALPHA"), Some(id));
    assert_eq!(table.get(id).unwrap().value, 1);
}

#[test]
fn find_missing_key() {
    let mut table = string_table(4);
    table.insert(item("alpha", 1));
    assert_eq!(table.find(b"beta"), None);
}

#[test]
fn default_comparator_is_case_sensitive() {
    let mut table: HashIndex<Item> = HashIndex::new(4, name_key, 32, hash_flags::NOCASE, None);
    table.insert(item("alpha", 1));
    // Same bucket thanks to NOCASE, but memcmp-style compare rejects it
    assert_eq!(table.find(b"ALPHA"), None);
    assert!(table.find(b"alpha").is_some());
}

#[test]
fn get_mut_updates_entry() {
    let mut table = string_table(4);
    let id = table.insert(item("alpha", 1));
    table.get_mut(id).unwrap().value = 9;
    assert_eq!(table.get(id).unwrap().value, 9);
}

// --- Removal ---

#[test]
fn remove_by_identity() {
    let mut table = string_table(4);
    let first = table.insert(item("dup", 1));
    let second = table.insert(item("dup", 2));

    // Head insertion: the newest entry is found first
    assert_eq!(table.find(b"dup"), Some(second));

    let removed = table.remove(first).unwrap();
    assert_eq!(removed.value, 1);
    assert_eq!(table.len(), 1);
    assert_eq!(table.find(b"dup"), Some(second));
}

#[test]
fn remove_missing_is_noop() {
    let mut table = string_table(4);
    let id = table.insert(item("alpha", 1));
    assert!(table.remove(id).is_some());

    // Second removal of the same handle does nothing
    assert!(table.remove(id).is_none());
    assert_eq!(table.len(), 0);
}

#[test]
fn stale_handle_does_not_alias_reused_slot() {
    let mut table = string_table(4);
    let old = table.insert(item("alpha", 1));
    table.remove(old);

    let new = table.insert(item("beta", 2));
    assert_ne!(old, new);
    assert!(table.get(old).is_none());
    assert!(table.remove(old).is_none());
    assert_eq!(table.len(), 1);
}

#[test]
fn handle_from_another_index_is_rejected() {
    let mut a = string_table(4);
    let mut b = string_table(4);
    let from_a = a.insert(item("alpha", 1));
    b.insert(item("beta", 2));

    assert!(b.get(from_a).is_none());
    assert!(b.remove(from_a).is_none());
    assert_eq!(b.len(), 1);
    assert!(b.find(b"beta").is_some());
    assert_eq!(a.get(from_a).unwrap().value, 1);
}

// --- Insertion order ---

#[test]
fn insert_tail_keeps_arrival_order() {
    let mut table: HashIndex<Item> = HashIndex::new(
        64,
        name_key,
        32,
        hash_flags::STRING | hash_flags::INSERT_TAIL,
        None,
    );
    let first = table.insert(item("k", 1));
    let second = table.insert(item("k", 2));

    let all: Vec<_> = table.find_all(b"k").collect();
    assert_eq!(all, vec![first, second]);
}

#[test]
fn find_first_and_next_walk_duplicates() {
    let mut table = string_table(64);
    let a = table.insert(item("k", 1));
    let b = table.insert(item("k", 2));
    table.insert(item("other", 3));

    let (first, cursor) = table.find_first(b"k").unwrap();
    let (second, cursor) = table.find_next(b"k", cursor).unwrap();
    assert!(table.find_next(b"k", cursor).is_none());

    let mut found = vec![first, second];
    found.sort_by_key(|id| table.get(*id).unwrap().value);
    assert_eq!(found, vec![a, b]);
}

// --- Growth ---

#[test]
fn resize_triggers_at_twice_bucket_count() {
    let mut table = string_table(4);
    for i in 0..7 {
        table.insert(item(&format!("k{i}"), i));
    }
    assert_eq!(table.bucket_count(), 4);

    table.insert(item("k7", 7));
    assert_eq!(table.bucket_count(), 16);
}

#[test]
fn growth_preserves_membership() {
    let mut table = string_table(2);
    let ids: Vec<_> = (0..64)
        .map(|i| (i, table.insert(item(&format!("name{i}"), i))))
        .collect();

    assert!(table.bucket_count() >= 32);
    for (i, id) in ids {
        assert_eq!(table.find(format!("name{i}").as_bytes()), Some(id));
    }
    assert_eq!(table.chain_lengths().iter().sum::<usize>(), 64);
}

#[test]
fn resize_never_shrinks() {
    let mut table = string_table(16);
    table.resize(4);
    assert_eq!(table.bucket_count(), 16);
}

#[test]
fn zero_buckets_is_clamped() {
    let mut table = string_table(0);
    assert_eq!(table.bucket_count(), 1);
    let id = table.insert(item("a", 1));
    assert_eq!(table.find(b"a"), Some(id));
}

// --- Iteration / clear ---

#[test]
fn iter_visits_live_entries() {
    let mut table = string_table(4);
    let a = table.insert(item("a", 1));
    let b = table.insert(item("b", 2));
    table.remove(a);

    let ids: Vec<_> = table.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![b]);
}

#[test]
fn clear_empties_table() {
    let mut table = string_table(4);
    let id = table.insert(item("a", 1));
    table.insert(item("b", 2));
    table.clear();

    assert!(table.is_empty());
    assert!(table.get(id).is_none());
    assert_eq!(table.find(b"a"), None);
    assert!(table.chain_lengths().iter().all(|&n| n == 0));
}
