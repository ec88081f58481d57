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

//! Stack-based depth-first iteration over a [`super::HatTrie`].
//!
//! The stack holds two kinds of frame: a trie node still waiting to have its children pushed, and
//! a bucket whose records are being drained one at a time. Children are pushed in descending byte
//! order so popping them (a LIFO stack) yields ascending order, which combined with per-bucket
//! sorted records gives strict lexicographic order when `sorted` is set.

use super::{Child, TrieNode};
use crate::config::TrieConfig;
use std::rc::Rc;

enum Frame<'a, C: TrieConfig> {
    Node(&'a TrieNode<C>, Vec<u8>),
    Entries(Vec<u8>, std::vec::IntoIter<(Vec<u8>, usize)>),
}

pub struct Iter<'a, C: TrieConfig> {
    stack: Vec<Frame<'a, C>>,
    sorted: bool,
}

impl<'a, C: TrieConfig> Iter<'a, C> {
    pub(super) fn new(root: &'a TrieNode<C>, sorted: bool) -> Self {
        Self {
            stack: vec![Frame::Node(root, Vec::new())],
            sorted,
        }
    }

    fn push_child(&mut self, child: &'a Child<C>, byte: usize, parent_prefix: &[u8]) {
        match child {
            Child::Trie(ptr) => {
                let mut prefix = parent_prefix.to_vec();
                prefix.push(byte as u8);
                // UNSAFE(@ohsayan): this pointer was handed out by the owning trie's slab and
                // outlives `'a` because mutating the trie requires `&mut`, which an active `Iter`
                // (borrowing `&'a HatTrie`) forbids.
                let node = unsafe { &**ptr };
                self.stack.push(Frame::Node(node, prefix));
            }
            Child::Pure(bucket) => {
                let mut prefix = parent_prefix.to_vec();
                prefix.push(byte as u8);
                let entries = self.collect_entries(bucket);
                self.stack.push(Frame::Entries(prefix, entries.into_iter()));
            }
            Child::Hybrid(rc) => {
                let entries = self.collect_entries(&rc.borrow());
                self.stack.push(Frame::Entries(parent_prefix.to_vec(), entries.into_iter()));
            }
        }
    }

    fn collect_entries(&self, bucket: &crate::ahtable::AhTable<C::Hasher>) -> Vec<(Vec<u8>, usize)> {
        if self.sorted {
            bucket.sorted_entries()
        } else {
            bucket.iter().map(|(k, v)| (k.to_vec(), v)).collect()
        }
    }
}

impl<'a, C: TrieConfig> Iterator for Iter<'a, C> {
    type Item = (Vec<u8>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.pop()? {
                Frame::Node(node, prefix) => {
                    let maxc = C::TRIE_MAXCHAR as usize;
                    let mut c = maxc;
                    loop {
                        let skip = c < maxc
                            && matches!(
                                (&node.children[c], &node.children[c + 1]),
                                (Child::Hybrid(a), Child::Hybrid(b)) if Rc::ptr_eq(a, b)
                            );
                        if !skip {
                            self.push_child(&node.children[c], c, &prefix);
                        }
                        if c == 0 {
                            break;
                        }
                        c -= 1;
                    }
                    if node.has_value {
                        return Some((prefix, node.value));
                    }
                }
                Frame::Entries(prefix, mut it) => {
                    if let Some((subkey, v)) = it.next() {
                        let mut full = prefix.clone();
                        full.extend_from_slice(&subkey);
                        self.stack.push(Frame::Entries(prefix, it));
                        return Some((full, v));
                    }
                }
            }
        }
    }
}
