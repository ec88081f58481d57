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

//! Unordered, slot-major iteration over an [`super::AhTable`]'s records.

use crate::mem::scanner::ArenaScanner;

pub struct Iter<'a> {
    slots: &'a [Vec<u8>],
    slot_idx: usize,
    scanner: ArenaScanner<'a>,
}

impl<'a> Iter<'a> {
    pub(super) fn new(slots: &'a [Vec<u8>]) -> Self {
        let scanner = match slots.first() {
            Some(s) => ArenaScanner::new(s),
            None => ArenaScanner::new(&[]),
        };
        Self {
            slots,
            slot_idx: 0,
            scanner,
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a [u8], usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if !self.scanner.eof() {
                let (_, k, v) = self.scanner.next_record();
                return Some((k, v));
            }
            self.slot_idx += 1;
            let next_slot = self.slots.get(self.slot_idx)?;
            self.scanner = ArenaScanner::new(next_slot);
        }
    }
}
