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

//! Compile-time tunables for a [`crate::trie::HatTrie`], in the same spirit as the storage
//! engine's `Config` trait: a zero-sized marker type carries a bundle of associated constants so
//! the tuning knobs cost nothing at runtime and get checked at monomorphization time.

use crate::hash::{ByteHasher, Fnv1a};

/// Tuning knobs for a [`crate::trie::HatTrie`]. Implement this on a unit struct to build a trie
/// with non-default parameters; [`DefaultConfig`] is the one most callers want.
pub trait TrieConfig {
    /// Byte hasher used to distribute keys across an array-hash-table bucket's slots.
    type Hasher: ByteHasher;

    /// Slot count a freshly-burst or freshly-rehashed array-hash-table starts out with.
    const AHTABLE_INIT_SIZE: usize;
    /// A bucket bursts once it holds this many records.
    const TRIE_BUCKET_SIZE: usize;
    /// Highest byte value the trie fans out on; bytes above this collapse into one overflow slot.
    /// Kept at 255 (the full byte range) unless a caller knows its keyspace is narrower.
    const TRIE_MAXCHAR: u8;
    /// Size in bytes of a single slab backing the trie node allocator. Must be a power of two.
    const SLAB_SIZE: usize;
    /// Whether freshly-created slabs rotate their starting offset to spread same-shaped
    /// allocations across cache sets.
    const MEM_COLORING: bool;
}

/// The parameters this crate ships with: a 4096-slot initial array-hash-table, bursting at
/// 16384 entries, full byte-range fan-out, 64 KiB slabs, with cache coloring enabled.
pub struct DefaultConfig;

impl TrieConfig for DefaultConfig {
    type Hasher = Fnv1a;

    const AHTABLE_INIT_SIZE: usize = 4096;
    const TRIE_BUCKET_SIZE: usize = 16384;
    const TRIE_MAXCHAR: u8 = 255;
    const SLAB_SIZE: usize = 65536;
    const MEM_COLORING: bool = true;
}
