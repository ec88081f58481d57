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

//! End-to-end scenarios exercising the trie across its full public surface: creation, burst,
//! delete/reinsert, full-alphabet fan-out, and the empty-suffix-at-a-trie-node edge case.

use hattrie::{ByteHasher, Fnv1a, HatTrie, TrieConfig};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn empty_trie_behaves() {
    init_logging();
    let t: HatTrie = HatTrie::new();
    assert_eq!(t.len(), 0);
    assert!(t.is_empty());
    assert_eq!(t.get(b"x"), None);
}

#[test]
fn empty_trie_remove_is_false() {
    let mut t: HatTrie = HatTrie::new();
    assert!(!t.remove(b"x"));
}

#[test]
fn five_key_mixed_scenario() {
    let mut t: HatTrie = HatTrie::new();
    for (k, v) in [(&b"a"[..], 1usize), (b"b", 2), (b"ab", 3), (b"aa", 4), (b"", 5)] {
        *t.get_mut(k) = v;
    }
    assert_eq!(t.len(), 5);
    let sorted: Vec<_> = t.iter_sorted().collect();
    assert_eq!(
        sorted,
        vec![
            (b"".to_vec(), 5),
            (b"a".to_vec(), 1),
            (b"aa".to_vec(), 4),
            (b"ab".to_vec(), 3),
            (b"b".to_vec(), 2),
        ]
    );
    let mut unsorted: Vec<_> = t.iter().collect();
    unsorted.sort();
    assert_eq!(unsorted, sorted);
}

/// 20000 distinct 8-byte random keys, forcing multiple bucket bursts under the default config.
#[test]
fn twenty_thousand_random_keys_survive_bursts() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut keys: Vec<[u8; 8]> = Vec::with_capacity(20_000);
    let mut seen = std::collections::HashSet::new();
    while keys.len() < 20_000 {
        let mut k = [0u8; 8];
        rand::RngCore::fill_bytes(&mut rng, &mut k);
        if seen.insert(k) {
            keys.push(k);
        }
    }
    keys.shuffle(&mut rng);

    let mut t: HatTrie = HatTrie::new();
    for (i, k) in keys.iter().enumerate() {
        *t.get_mut(k) = i;
    }
    assert_eq!(t.len(), 20_000);
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(t.get(k), Some(i));
    }

    let mut expect: Vec<Vec<u8>> = keys.iter().map(|k| k.to_vec()).collect();
    expect.sort();
    let got: Vec<Vec<u8>> = t.iter_sorted().map(|(k, _)| k).collect();
    assert_eq!(got, expect);
}

#[test]
fn insert_delete_reinsert_foo() {
    let mut t: HatTrie = HatTrie::new();
    *t.get_mut(b"foo") = 1;
    assert!(t.remove(b"foo"));
    assert_eq!(t.get(b"foo"), None);
    assert_eq!(t.len(), 0);
    assert_eq!(*t.get_mut(b"foo"), 0);
    assert_eq!(t.len(), 1);
}

#[test]
fn every_single_byte_key() {
    let mut t: HatTrie = HatTrie::new();
    for b in 0u16..256 {
        *t.get_mut(&[b as u8]) = b as usize;
    }
    assert_eq!(t.len(), 256);
    let got: Vec<_> = t.iter_sorted().collect();
    let expect: Vec<_> = (0u16..256).map(|b| (vec![b as u8], b as usize)).collect();
    assert_eq!(got, expect);
}

struct TinyBucket;

impl TrieConfig for TinyBucket {
    type Hasher = Fnv1a;
    const AHTABLE_INIT_SIZE: usize = 4;
    const TRIE_BUCKET_SIZE: usize = 4;
    const TRIE_MAXCHAR: u8 = 255;
    const SLAB_SIZE: usize = 4096;
    const MEM_COLORING: bool = true;
}

/// `"prefix_A"`..`"prefix_Z"` plus `"prefix_"` itself: the latter lands as a value on a trie node
/// promoted by a Case A burst, not in any bucket.
#[test]
fn prefix_with_trailing_underscore_lands_on_trie_node() {
    let mut t: HatTrie<TinyBucket> = HatTrie::new();
    for c in b'A'..=b'Z' {
        let mut k = b"prefix_".to_vec();
        k.push(c);
        *t.get_mut(&k) = c as usize;
    }
    *t.get_mut(b"prefix_") = 0;

    assert_eq!(t.len(), 27);
    assert_eq!(t.get(b"prefix_"), Some(0));
    for c in b'A'..=b'Z' {
        let mut k = b"prefix_".to_vec();
        k.push(c);
        assert_eq!(t.get(&k), Some(c as usize));
    }

    let mut got: Vec<_> = t.iter().map(|(k, _)| k).collect();
    got.sort();
    let mut expect: Vec<Vec<u8>> = (b'A'..=b'Z')
        .map(|c| {
            let mut k = b"prefix_".to_vec();
            k.push(c);
            k
        })
        .collect();
    expect.push(b"prefix_".to_vec());
    expect.sort();
    assert_eq!(got, expect);
}

#[test]
fn custom_hasher_is_pluggable() {
    struct AllZero;
    impl ByteHasher for AllZero {
        fn new() -> Self {
            Self
        }
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        }
    }
    struct DegenerateConfig;
    impl TrieConfig for DegenerateConfig {
        type Hasher = AllZero;
        const AHTABLE_INIT_SIZE: usize = 2;
        const TRIE_BUCKET_SIZE: usize = 8;
        const TRIE_MAXCHAR: u8 = 255;
        const SLAB_SIZE: usize = 4096;
        const MEM_COLORING: bool = false;
    }
    // Every key collides into the same array-hash-table slot; correctness must not depend on
    // hash quality, only on the linear arena scan within the slot.
    let mut t: HatTrie<DegenerateConfig> = HatTrie::new();
    for i in 0..50usize {
        *t.get_mut(&i.to_le_bytes()) = i;
    }
    assert_eq!(t.len(), 50);
    for i in 0..50usize {
        assert_eq!(t.get(&i.to_le_bytes()), Some(i));
    }
}
