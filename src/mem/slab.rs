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

//! A fixed-size-object slab allocator, used to recycle trie node allocations.
//!
//! Each slab is a single `SLAB_SIZE`-aligned block. The header lives at offset 0, so the owning
//! slab of any item handed out by the cache can be recovered in O(1) by masking the pointer with
//! `!(SLAB_SIZE - 1)` instead of a side-table lookup.

use super::unsafe_apis;
use crate::config::TrieConfig;
use std::{alloc::Layout, marker::PhantomData, mem, ptr};

/// An intrusive free-list node. Only ever written into storage belonging to a free item, never
/// read back as a `T`.
struct FreeNode {
    next: *mut FreeNode,
}

#[repr(C)]
struct SlabHeader<T> {
    /// number of item slots in this slab
    capacity: usize,
    /// number of currently-free item slots
    free_count: usize,
    /// head of this slab's intrusive free list, or null if the slab is full
    free: *mut FreeNode,
    /// the slab list (free/full) this header is currently linked into
    prev: *mut SlabHeader<T>,
    next: *mut SlabHeader<T>,
    _marker: PhantomData<T>,
}

impl<T> SlabHeader<T> {
    const ITEM_SIZE: usize = {
        let t = mem::size_of::<T>();
        let f = mem::size_of::<FreeNode>();
        if t > f {
            t
        } else {
            f
        }
    };
    const ITEM_ALIGN: usize = {
        let t = mem::align_of::<T>();
        let f = mem::align_of::<FreeNode>();
        if t > f {
            t
        } else {
            f
        }
    };
    const HEADER_SIZE: usize = mem::size_of::<Self>();
    /// the first item-aligned offset at or after the header
    const ITEMS_OFFSET: usize = {
        let rem = Self::HEADER_SIZE % Self::ITEM_ALIGN;
        if rem == 0 {
            Self::HEADER_SIZE
        } else {
            Self::HEADER_SIZE + (Self::ITEM_ALIGN - rem)
        }
    };
}

/// A fixed-size-object allocator that hands out `*mut T`s backed by `SLAB_SIZE`-aligned slabs.
///
/// Not thread-safe; not `Send`/`Sync`. One `SlabAllocator` owns every item it has ever handed
/// out, and every item must be returned to the *same* allocator via [`SlabAllocator::dealloc`]
/// before the allocator is dropped, or it leaks (trie nodes are POD-ish and don't need `Drop` run
/// through this path; see [`crate::trie`] for how the trie walks its own structure to run value
/// drops before returning nodes here).
pub struct SlabAllocator<T, C: TrieConfig> {
    /// slabs with at least one free item
    slabs_free: *mut SlabHeader<T>,
    /// slabs with zero free items
    slabs_full: *mut SlabHeader<T>,
    /// rotates across slab creations when cache coloring is enabled
    color_tick: usize,
    _cfg: PhantomData<C>,
}

impl<T, C: TrieConfig> SlabAllocator<T, C> {
    const _SLAB_SIZE_IS_POW2: () = assert!(C::SLAB_SIZE.is_power_of_two());
    const _SLAB_FITS_HEADER_AND_ONE_ITEM: () =
        assert!(C::SLAB_SIZE > SlabHeader::<T>::ITEMS_OFFSET + SlabHeader::<T>::ITEM_SIZE);

    pub const fn new() -> Self {
        let _ = Self::_SLAB_SIZE_IS_POW2;
        let _ = Self::_SLAB_FITS_HEADER_AND_ONE_ITEM;
        Self {
            slabs_free: ptr::null_mut(),
            slabs_full: ptr::null_mut(),
            color_tick: 0,
            _cfg: PhantomData,
        }
    }

    fn slab_layout() -> Layout {
        Layout::from_size_align(C::SLAB_SIZE, C::SLAB_SIZE).expect("bad slab layout")
    }

    /// Number of distinct coloring offsets we rotate through; bounded so that even a tiny slab
    /// (few items) always has room for at least half its items after the color offset is applied.
    fn color_range_items(capacity: usize) -> usize {
        if C::MEM_COLORING {
            (capacity / 4).max(1).min(16)
        } else {
            1
        }
    }

    unsafe fn create_slab(&mut self) -> *mut SlabHeader<T> {
        log::trace!(
            "slab: allocating a new {}-byte slab for items of size {}",
            C::SLAB_SIZE,
            SlabHeader::<T>::ITEM_SIZE
        );
        let base = unsafe_apis::alloc_layout::<u8>(Self::slab_layout());
        let hdr = base as *mut SlabHeader<T>;
        let raw_capacity =
            (C::SLAB_SIZE - SlabHeader::<T>::ITEMS_OFFSET) / SlabHeader::<T>::ITEM_SIZE;
        let color_n = Self::color_range_items(raw_capacity);
        let color = self.color_tick % color_n;
        self.color_tick = self.color_tick.wrapping_add(1);
        let capacity = raw_capacity - color;
        let items_base = base.add(SlabHeader::<T>::ITEMS_OFFSET + color * SlabHeader::<T>::ITEM_SIZE);
        unsafe {
            // UNSAFE: `hdr` points at a fresh SLAB_SIZE-aligned allocation; writing the header
            // fields is the first use of that memory.
            ptr::write(
                hdr,
                SlabHeader {
                    capacity,
                    free_count: capacity,
                    free: ptr::null_mut(),
                    prev: ptr::null_mut(),
                    next: ptr::null_mut(),
                    _marker: PhantomData,
                },
            );
            // thread every item slot onto the intrusive free list
            let mut free = ptr::null_mut();
            for i in (0..capacity).rev() {
                let slot = items_base.add(i * SlabHeader::<T>::ITEM_SIZE) as *mut FreeNode;
                // UNSAFE: `slot` is within the freshly-allocated item region, correctly aligned
                // for `FreeNode` (ITEM_ALIGN >= align_of::<FreeNode>()).
                ptr::write(slot, FreeNode { next: free });
                free = slot;
            }
            (*hdr).free = free;
        }
        hdr
    }

    unsafe fn unlink(list: &mut *mut SlabHeader<T>, node: *mut SlabHeader<T>) {
        unsafe {
            let prev = (*node).prev;
            let next = (*node).next;
            if !prev.is_null() {
                (*prev).next = next;
            } else {
                *list = next;
            }
            if !next.is_null() {
                (*next).prev = prev;
            }
            (*node).prev = ptr::null_mut();
            (*node).next = ptr::null_mut();
        }
    }

    unsafe fn push_front(list: &mut *mut SlabHeader<T>, node: *mut SlabHeader<T>) {
        unsafe {
            (*node).prev = ptr::null_mut();
            (*node).next = *list;
            if !list.is_null() {
                (**list).prev = node;
            }
            *list = node;
        }
    }

    unsafe fn item_ptr(hdr: *mut SlabHeader<T>, free_node: *mut FreeNode) -> *mut T {
        let _ = hdr;
        free_node as *mut T
    }

    /// Allocate one `T`-sized slot and move `val` into it.
    pub fn alloc(&mut self, val: T) -> *mut T {
        unsafe {
            if self.slabs_free.is_null() {
                let fresh = self.create_slab();
                Self::push_front(&mut self.slabs_free, fresh);
            }
            let hdr = self.slabs_free;
            debug_assert!(!hdr.is_null());
            debug_assert!((*hdr).free_count > 0);
            let node = (*hdr).free;
            (*hdr).free = (*node).next;
            (*hdr).free_count -= 1;
            let slot = Self::item_ptr(hdr, node);
            ptr::write(slot, val);
            if (*hdr).free_count == 0 {
                Self::unlink(&mut self.slabs_free, hdr);
                Self::push_front(&mut self.slabs_full, hdr);
            }
            slot
        }
    }

    /// Recover the owning slab of `ptr` and return its item to the free list.
    ///
    /// ## Safety
    /// `ptr` must have been returned by [`alloc`](Self::alloc) on `self` and not already freed.
    pub unsafe fn dealloc(&mut self, ptr: *mut T) {
        unsafe {
            ptr::drop_in_place(ptr);
            let mask = !(C::SLAB_SIZE - 1);
            let hdr = (ptr as usize & mask) as *mut SlabHeader<T>;
            let node = ptr as *mut FreeNode;
            let was_full = (*hdr).free_count == 0;
            (*node).next = (*hdr).free;
            (*hdr).free = node;
            (*hdr).free_count += 1;
            if was_full {
                Self::unlink(&mut self.slabs_full, hdr);
                Self::push_front(&mut self.slabs_free, hdr);
            }
        }
    }

    /// Free every fully-empty slab currently in the free list.
    pub fn reap(&mut self) {
        unsafe {
            let mut cur = self.slabs_free;
            while !cur.is_null() {
                let next = (*cur).next;
                if (*cur).free_count == (*cur).capacity {
                    Self::unlink(&mut self.slabs_free, cur);
                    unsafe_apis::dealloc_layout(cur as *mut u8, Self::slab_layout());
                }
                cur = next;
            }
        }
    }

    fn free_all_in(list: *mut SlabHeader<T>) {
        unsafe {
            let mut cur = list;
            while !cur.is_null() {
                let next = (*cur).next;
                unsafe_apis::dealloc_layout(cur as *mut u8, Self::slab_layout());
                cur = next;
            }
        }
    }
}

impl<T, C: TrieConfig> Drop for SlabAllocator<T, C> {
    fn drop(&mut self) {
        Self::free_all_in(self.slabs_free);
        Self::free_all_in(self.slabs_full);
    }
}
