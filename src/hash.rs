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

//! The byte-hashing primitive is an external collaborator as far as the array-hash-table is
//! concerned: [`ByteHasher`] is the seam, and [`Fnv1a`] is the one implementation this crate
//! carries so it's usable out of the box.

/// Any type implementing this can be used to distribute keys across an [`crate::ahtable::AhTable`]'s
/// slots. Shaped like [`std::hash::Hasher`] (construct-from-nothing, feed bytes incrementally,
/// read back a digest) rather than a single-shot function, so an implementation can carry running
/// state across more than one `write` call. Implementations should be high-quality (low collision
/// rate, fast) but need not be cryptographically secure; this container never exposes the hash
/// value itself.
pub trait ByteHasher {
    /// A fresh hasher with no bytes written yet.
    fn new() -> Self;
    /// Feed more bytes into the running hash.
    fn write(&mut self, bytes: &[u8]);
    /// Read the digest accumulated so far. Does not reset the hasher.
    fn finish(&self) -> u64;

    /// Hash a single byte string in one shot: `new`, `write`, `finish`.
    fn hash_one(bytes: &[u8]) -> u64
    where
        Self: Sized,
    {
        let mut h = Self::new();
        h.write(bytes);
        h.finish()
    }
}

/// FNV-1a, 64-bit variant. The default hasher for every [`crate::config::TrieConfig`] that
/// doesn't override it.
pub struct Fnv1a {
    hash: u64,
}

impl Fnv1a {
    const OFFSET: u64 = 0xCBF29CE484222325;
    const PRIME: u64 = 0x100000001B3;
}

impl ByteHasher for Fnv1a {
    fn new() -> Self {
        Self { hash: Self::OFFSET }
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.hash ^= byte as u64;
            self.hash = self.hash.wrapping_mul(Self::PRIME);
        }
    }

    fn finish(&self) -> u64 {
        self.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_and_sensitive_to_content() {
        assert_eq!(Fnv1a::hash_one(b"abc"), Fnv1a::hash_one(b"abc"));
        assert_ne!(Fnv1a::hash_one(b"abc"), Fnv1a::hash_one(b"abd"));
        assert_ne!(Fnv1a::hash_one(b""), Fnv1a::hash_one(b"\0"));
    }

    #[test]
    fn incremental_write_matches_single_shot() {
        let mut h = Fnv1a::new();
        h.write(b"ab");
        h.write(b"c");
        assert_eq!(h.finish(), Fnv1a::hash_one(b"abc"));
    }
}
