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

//! # hattrie
//!
//! An ordered associative container mapping byte strings to `usize` values: a HAT-trie, combining
//! a 256-way branching trie near the root with cache-friendly array-hash-table buckets at the
//! leaves. Buckets that grow past a configurable size burst into finer trie structure, so lookup
//! cost degrades gracefully as the key set grows and skews.
//!
//! ```
//! use hattrie::HatTrie;
//!
//! let mut t: HatTrie = HatTrie::new();
//! *t.get_mut(b"hello") = 1;
//! *t.get_mut(b"world") = 2;
//! assert_eq!(t.get(b"hello"), Some(1));
//! assert_eq!(t.iter_sorted().collect::<Vec<_>>(), vec![
//!     (b"hello".to_vec(), 1),
//!     (b"world".to_vec(), 2),
//! ]);
//! ```

pub mod ahtable;
pub mod config;
pub mod hash;
pub(crate) mod mem;
pub mod trie;

pub use config::{DefaultConfig, TrieConfig};
pub use hash::{ByteHasher, Fnv1a};
pub use trie::HatTrie;
