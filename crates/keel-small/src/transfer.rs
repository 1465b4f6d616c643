//! Copy, move-assign and swap under the allocator's propagation policy.
//!
//! Whether storage can change hands depends on the allocator:
//!
//! | Operation | Storage changes hands when | Otherwise |
//! |-----------|----------------------------|-----------|
//! | `clone` | never | new storage from `select_on_copy` |
//! | `clone_from` | never | target keeps or adopts allocator per `PROPAGATE_ON_COPY` |
//! | `move_assign` | `PROPAGATE_ON_MOVE` or equal allocators | elements moved one by one |
//! | `swap` | `PROPAGATE_ON_SWAP` or equal allocators | elements exchanged one by one |
//!
//! A storage exchange between two small vectors is not always a pointer
//! swap, because inline elements live inside the vector itself:
//!
//! 1. both spilled: the two heap blocks trade places;
//! 2. both inline: the common prefix is swapped slot by slot and the
//!    longer side's surplus moves across;
//! 3. one of each: the heap block moves to the formerly inline side and
//!    the inline elements move into the other side's inline array.
//!
//! An empty side is just case 2 or 3 with nothing to move.

use std::cmp;
use std::mem;
use std::ptr;

use keel_core::{can_steal_on_move, can_swap_storage, Allocator};

use crate::storage::Storage;
use crate::SmallVec;

impl<T: Clone, const N: usize, A: Allocator> Clone for SmallVec<T, N, A> {
    fn clone(&self) -> Self {
        Self::from_slice_in(self, self.alloc.select_on_copy())
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign_clone(source, &source.alloc);
    }
}

impl<T, const N: usize, A: Allocator> SmallVec<T, N, A> {
    /// Move-assign: replace the contents of `self` with those of `source`.
    ///
    /// Steals `source`'s storage when the allocator propagates on move or
    /// the two allocators are equal; `self` then also takes `source`'s
    /// allocator if it propagates. Otherwise `self` keeps its allocator
    /// and the elements are moved across one at a time.
    pub fn move_assign(&mut self, mut source: Self) {
        self.clear();
        if can_steal_on_move(&self.alloc, &source.alloc) {
            self.release_storage();
            mem::swap(&mut self.storage, &mut source.storage);
            mem::swap(&mut self.len, &mut source.len);
            if A::PROPAGATE_ON_MOVE {
                // `source` now holds our empty inline storage, so it can
                // leave with our old allocator.
                mem::swap(&mut self.alloc, &mut source.alloc);
            }
        } else {
            self.reserve(source.len);
            let n = mem::replace(&mut source.len, 0);
            // SAFETY: `source` has given up its n elements; `self` is empty
            // with room for them.
            unsafe { self.take_elements(source.as_ptr(), n) };
        }
    }

    /// Build a vector with `alloc` holding the elements of `source`.
    ///
    /// Reuses `source`'s heap block when `alloc` is equal to its
    /// allocator, otherwise moves the elements one by one.
    pub fn from_moved_in(mut source: Self, alloc: A) -> Self {
        if alloc.is_equal(&source.alloc) {
            let mut v = Self::new_in(alloc);
            mem::swap(&mut v.storage, &mut source.storage);
            mem::swap(&mut v.len, &mut source.len);
            return v;
        }
        let n = mem::replace(&mut source.len, 0);
        let mut v = Self::with_capacity_in(n, alloc);
        // SAFETY: as in `move_assign`.
        unsafe { v.take_elements(source.as_ptr(), n) };
        v
    }

    /// Construct `n` elements read from `src` at the end of `self`.
    ///
    /// # Safety
    ///
    /// `src[..n]` are initialized and no longer owned by anyone else;
    /// `self` has room for `n` more elements.
    unsafe fn take_elements(&mut self, src: *const T, n: usize) {
        let dst = self.as_mut_ptr();
        for i in 0..n {
            // SAFETY: caller contract.
            unsafe {
                self.alloc.construct(dst.add(self.len), ptr::read(src.add(i)));
            }
            self.len += 1;
        }
    }

    /// Exchange the contents of two vectors.
    ///
    /// Allocators are exchanged too when they propagate on swap. With
    /// unequal non-propagating allocators each vector keeps its own
    /// storage and allocator: the common prefix is exchanged in place and
    /// the longer side's surplus is constructed on the shorter side through
    /// its allocator.
    pub fn swap(&mut self, other: &mut Self) {
        if can_swap_storage(&self.alloc, &other.alloc) {
            self.swap_storage(other);
            if A::PROPAGATE_ON_SWAP {
                mem::swap(&mut self.alloc, &mut other.alloc);
            }
        } else {
            self.swap_elements(other);
        }
    }

    fn swap_storage(&mut self, other: &mut Self) {
        mem::swap(&mut self.len, &mut other.len);
        if let (Storage::Inline(a), Storage::Inline(b)) = (&mut self.storage, &mut other.storage) {
            // SAFETY: both arrays have N slots; the lengths were already
            // exchanged, so `other.len` is what `a` holds now.
            unsafe {
                swap_prefixes(
                    a.as_mut_ptr().cast::<T>(),
                    other.len,
                    b.as_mut_ptr().cast::<T>(),
                    self.len,
                );
            }
            return;
        }
        // At least one block is on the heap. Moving the enum carries the
        // pointer across and moves inline elements bitwise.
        mem::swap(&mut self.storage, &mut other.storage);
    }

    fn swap_elements(&mut self, other: &mut Self) {
        let (short, long) = if self.len <= other.len {
            (self, other)
        } else {
            (other, self)
        };
        let common = short.len;
        let surplus = long.len - common;
        short.reserve(surplus);
        // SAFETY: separate buffers, both holding at least `common` elements.
        unsafe { ptr::swap_nonoverlapping(short.as_mut_ptr(), long.as_mut_ptr(), common) };
        long.len = common;
        // SAFETY: `long` no longer counts [common, common + surplus), and
        // `short` reserved room for them.
        unsafe { short.take_elements(long.as_ptr().add(common), surplus) };
    }
}

/// Swap `[0, min)` in place and move the longer side's surplus across.
///
/// # Safety
///
/// `a` and `b` do not overlap, hold `a_len` and `b_len` live elements, and
/// both have room for `max(a_len, b_len)`.
unsafe fn swap_prefixes<T>(a: *mut T, a_len: usize, b: *mut T, b_len: usize) {
    let common = cmp::min(a_len, b_len);
    // SAFETY: caller contract.
    unsafe {
        ptr::swap_nonoverlapping(a, b, common);
        if a_len > b_len {
            ptr::copy_nonoverlapping(a.add(common), b.add(common), a_len - common);
        } else {
            ptr::copy_nonoverlapping(b.add(common), a.add(common), b_len - common);
        }
    }
}
