/*
 * Created on Tue Mar 05 2024
 *
 * This file is a part of Skytable
 * Skytable (formerly known as TerrabaseDB or Skybase) is a free and open-source
 * NoSQL database written by Sayan Nandan ("the Author") with the
 * vision to provide flexibility in data modelling without compromising
 * on performance, queryability or scalability.
 *
 * Copyright (c) 2024, Sayan Nandan <nandansayan@outlook.com>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! The array-hash-table: an open-addressed hash table whose slots are packed byte arenas rather
//! than linked chains. Each slot holds zero or more `(varint keylen, key bytes, value)` records
//! back to back; a lookup hashes the key to a slot and then linearly scans that slot's arena.
//!
//! This is the structure a trie leaf (a "bucket") is built from; this module knows nothing about
//! tries, byte stripping or burst thresholds, all of that lives in [`crate::trie`].

pub mod iter;

use crate::{
    hash::ByteHasher,
    mem::scanner::{push_varint, ArenaScanner, VALUE_WIDTH},
};
use std::{marker::PhantomData, ptr};

/// A guard handed out by [`AhTable::value_mut`] and [`AhTable::get_or_insert_with`].
///
/// The value cell inside a slot's arena is not guaranteed to be `usize`-aligned (the arena is a
/// packed `Vec<u8>`), so this reads the value out with an unaligned load, hands out a properly
/// aligned local copy through `Deref`/`DerefMut`, and writes it back on drop.
pub struct ValueMut<'a> {
    cell: *mut u8,
    cached: usize,
    _marker: PhantomData<&'a mut ()>,
}

impl std::ops::Deref for ValueMut<'_> {
    type Target = usize;
    fn deref(&self) -> &usize {
        &self.cached
    }
}

impl std::ops::DerefMut for ValueMut<'_> {
    fn deref_mut(&mut self) -> &mut usize {
        &mut self.cached
    }
}

impl Drop for ValueMut<'_> {
    fn drop(&mut self) {
        unsafe {
            // UNSAFE(@ohsayan): `cell` was computed from a slot's arena that outlives this guard
            // (the guard borrows the table mutably); the write is unaligned because the arena
            // packs records byte-for-byte.
            ptr::write_unaligned(self.cell as *mut usize, self.cached);
        }
    }
}

pub struct AhTable<H: ByteHasher = crate::hash::Fnv1a> {
    slots: Vec<Vec<u8>>,
    len: usize,
    _hasher: PhantomData<H>,
}

impl<H: ByteHasher> AhTable<H> {
    /// Build a table with (at least) `slots` slots, rounded up to a power of two.
    pub fn with_capacity(slots: usize) -> Self {
        let n = slots.max(1).next_power_of_two();
        Self {
            slots: vec![Vec::new(); n],
            len: 0,
            _hasher: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn slot_of(&self, key: &[u8]) -> usize {
        (H::hash_one(key) as usize) & (self.slots.len() - 1)
    }

    /// Locate a record by key. Returns `(slot, record_start, value_cell_start, record_end)`.
    fn find(&self, slot: usize, key: &[u8]) -> Option<(usize, usize, usize)> {
        let arena = &self.slots[slot];
        let mut sc = ArenaScanner::new(arena);
        while !sc.eof() {
            let start = sc.cursor();
            let (_, k, _) = sc.next_record();
            if k == key {
                let end = sc.cursor();
                let val_start = end - VALUE_WIDTH;
                return Some((start, val_start, end));
            }
        }
        None
    }

    pub fn get(&self, key: &[u8]) -> Option<usize> {
        let slot = self.slot_of(key);
        let (_, val_start, _) = self.find(slot, key)?;
        let bytes = &self.slots[slot][val_start..val_start + VALUE_WIDTH];
        Some(usize::from_ne_bytes(bytes.try_into().unwrap()))
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        let slot = self.slot_of(key);
        self.find(slot, key).is_some()
    }

    /// Insert `key`, overwriting any existing value and returning it.
    pub fn insert(&mut self, key: &[u8], value: usize) -> Option<usize> {
        let slot = self.slot_of(key);
        if let Some((_, val_start, _)) = self.find(slot, key) {
            let arena = &mut self.slots[slot];
            let old = usize::from_ne_bytes(arena[val_start..val_start + VALUE_WIDTH].try_into().unwrap());
            arena[val_start..val_start + VALUE_WIDTH].copy_from_slice(&value.to_ne_bytes());
            return Some(old);
        }
        self.append_new(slot, key, value);
        self.len += 1;
        self.maybe_rehash();
        None
    }

    fn append_new(&mut self, slot: usize, key: &[u8], value: usize) {
        let arena = &mut self.slots[slot];
        push_varint(arena, key.len());
        arena.extend_from_slice(key);
        arena.extend_from_slice(&value.to_ne_bytes());
    }

    /// Return a mutable handle to `key`'s value, inserting it with `default()` first if absent.
    pub fn get_or_insert_with(&mut self, key: &[u8], default: impl FnOnce() -> usize) -> ValueMut<'_> {
        let slot = self.slot_of(key);
        if self.find(slot, key).is_none() {
            self.append_new(slot, key, default());
            self.len += 1;
            self.maybe_rehash();
        }
        let slot = self.slot_of(key);
        let (_, val_start, _) = self.find(slot, key).expect("just inserted");
        let arena = &mut self.slots[slot];
        let cached = usize::from_ne_bytes(arena[val_start..val_start + VALUE_WIDTH].try_into().unwrap());
        let cell = unsafe { arena.as_mut_ptr().add(val_start) };
        ValueMut {
            cell,
            cached,
            _marker: PhantomData,
        }
    }

    /// Return a mutable handle to `key`'s value, or `None` if the key isn't present.
    pub fn value_mut(&mut self, key: &[u8]) -> Option<ValueMut<'_>> {
        let slot = self.slot_of(key);
        let (_, val_start, _) = self.find(slot, key)?;
        let arena = &mut self.slots[slot];
        let cached = usize::from_ne_bytes(arena[val_start..val_start + VALUE_WIDTH].try_into().unwrap());
        let cell = unsafe { arena.as_mut_ptr().add(val_start) };
        Some(ValueMut {
            cell,
            cached,
            _marker: PhantomData,
        })
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<usize> {
        let slot = self.slot_of(key);
        let (start, val_start, end) = self.find(slot, key)?;
        let value = usize::from_ne_bytes(self.slots[slot][val_start..val_start + VALUE_WIDTH].try_into().unwrap());
        self.slots[slot].drain(start..end);
        self.len -= 1;
        Some(value)
    }

    fn maybe_rehash(&mut self) {
        if self.len > self.slots.len() {
            self.rehash(self.slots.len() * 2);
        }
    }

    fn rehash(&mut self, new_slot_count: usize) {
        log::trace!(
            "ahtable: rehashing from {} to {} slots ({} records)",
            self.slots.len(),
            new_slot_count,
            self.len
        );
        let mut fresh: Vec<Vec<u8>> = vec![Vec::new(); new_slot_count.max(1).next_power_of_two()];
        for arena in &self.slots {
            let mut sc = ArenaScanner::new(arena);
            while !sc.eof() {
                let (_, k, v) = sc.next_record();
                let slot = (H::hash_one(k) as usize) & (fresh.len() - 1);
                push_varint(&mut fresh[slot], k.len());
                fresh[slot].extend_from_slice(k);
                fresh[slot].extend_from_slice(&v.to_ne_bytes());
            }
        }
        self.slots = fresh;
    }

    pub fn iter(&self) -> iter::Iter<'_> {
        iter::Iter::new(&self.slots)
    }

    /// Every entry, sorted lexicographically by key. Allocates.
    pub fn sorted_entries(&self) -> Vec<(Vec<u8>, usize)> {
        let mut v: Vec<(Vec<u8>, usize)> = self.iter().map(|(k, v)| (k.to_vec(), v)).collect();
        v.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Fnv1a;

    type Table = AhTable<Fnv1a>;

    #[test]
    fn insert_get_overwrite() {
        let mut t = Table::with_capacity(4);
        assert_eq!(t.insert(b"foo", 1), None);
        assert_eq!(t.get(b"foo"), Some(1));
        assert_eq!(t.insert(b"foo", 2), Some(1));
        assert_eq!(t.get(b"foo"), Some(2));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn remove_and_reinsert() {
        let mut t = Table::with_capacity(4);
        t.insert(b"foo", 1);
        t.insert(b"bar", 2);
        assert_eq!(t.remove(b"foo"), Some(1));
        assert_eq!(t.get(b"foo"), None);
        assert_eq!(t.get(b"bar"), Some(2));
        assert_eq!(t.insert(b"foo", 9), None);
        assert_eq!(t.get(b"foo"), Some(9));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn value_mut_mutates_in_place() {
        let mut t = Table::with_capacity(4);
        t.insert(b"k", 10);
        {
            let mut v = t.value_mut(b"k").unwrap();
            *v += 5;
        }
        assert_eq!(t.get(b"k"), Some(15));
    }

    #[test]
    fn get_or_insert_with_autovivifies() {
        let mut t = Table::with_capacity(4);
        {
            let mut v = t.get_or_insert_with(b"k", || 0);
            *v += 1;
        }
        {
            let mut v = t.get_or_insert_with(b"k", || 0);
            *v += 1;
        }
        assert_eq!(t.get(b"k"), Some(2));
    }

    #[test]
    fn grows_past_initial_capacity_without_losing_entries() {
        let mut t = Table::with_capacity(1);
        for i in 0..5000usize {
            t.insert(&i.to_le_bytes(), i);
        }
        assert_eq!(t.len(), 5000);
        assert!(t.slot_count() > 1);
        for i in 0..5000usize {
            assert_eq!(t.get(&i.to_le_bytes()), Some(i));
        }
    }

    #[test]
    fn empty_key_is_a_valid_key() {
        let mut t = Table::with_capacity(4);
        assert_eq!(t.insert(b"", 7), None);
        assert_eq!(t.get(b""), Some(7));
    }

    #[test]
    fn sorted_entries_are_ordered() {
        let mut t = Table::with_capacity(4);
        for k in [b"zz".as_slice(), b"aa", b"mm"] {
            t.insert(k, 0);
        }
        let keys: Vec<_> = t.sorted_entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![b"aa".to_vec(), b"mm".to_vec(), b"zz".to_vec()]);
    }
}
