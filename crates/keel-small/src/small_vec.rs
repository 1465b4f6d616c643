//! [`SmallVec`]: the vector type and its core operations.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::ops::{Bound, Deref, DerefMut, RangeBounds};
use std::ptr;
use std::slice;

use keel_core::growth::{max_len, next_capacity, required_len};
use keel_core::{destroy_range, infallible, Allocator, CapacityError, Global, InsertError, OutOfRange, RawBuf};

use crate::storage::{Storage, StorageMode};

/// A vector that stores up to `N` elements inline and spills to a block
/// from `A` beyond that.
///
/// Once spilled, the vector stays on the heap until [`shrink_to_fit`]
/// is called with at most `N` elements left. Emptying it with [`clear`]
/// keeps the heap block for reuse.
///
/// Element construction and destruction go through the allocator's
/// [`construct`](Allocator::construct) and [`destroy`](Allocator::destroy)
/// hooks. Moving existing elements between slots is a bitwise copy.
///
/// [`shrink_to_fit`]: SmallVec::shrink_to_fit
/// [`clear`]: SmallVec::clear
pub struct SmallVec<T, const N: usize, A: Allocator = Global> {
    pub(crate) len: usize,
    pub(crate) storage: Storage<T, N>,
    pub(crate) alloc: A,
}

impl<T, const N: usize, A: Allocator + Default> SmallVec<T, N, A> {
    /// An empty vector in inline mode.
    #[inline]
    pub fn new() -> Self {
        Self::new_in(A::default())
    }

    /// An empty vector that can hold `capacity` elements without growing.
    ///
    /// Stays inline when `capacity <= N`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, A::default())
    }

    /// `n` clones of `elem`.
    pub fn from_elem(elem: T, n: usize) -> Self
    where
        T: Clone,
    {
        let mut v = Self::with_capacity(n);
        v.resize(n, elem);
        v
    }

    /// Clones of every element of `slice`.
    pub fn from_slice(slice: &[T]) -> Self
    where
        T: Clone,
    {
        Self::from_slice_in(slice, A::default())
    }
}

impl<T, const N: usize, A: Allocator> SmallVec<T, N, A> {
    /// Number of elements held inline before the vector spills.
    pub const INLINE_CAPACITY: usize = N;

    /// An empty vector using `alloc` for any heap storage.
    #[inline]
    pub const fn new_in(alloc: A) -> Self {
        Self {
            len: 0,
            storage: Storage::inline(),
            alloc,
        }
    }

    /// See [`with_capacity`](Self::with_capacity).
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        infallible(Self::try_with_capacity_in(capacity, alloc))
    }

    /// Fallible [`with_capacity_in`](Self::with_capacity_in).
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, CapacityError> {
        let storage = if capacity <= N {
            Storage::inline()
        } else {
            Storage::Dynamic(RawBuf::try_with_capacity(&alloc, capacity)?)
        };
        Ok(Self {
            len: 0,
            storage,
            alloc,
        })
    }

    /// Clones of every element of `slice`, using `alloc`.
    pub fn from_slice_in(slice: &[T], alloc: A) -> Self
    where
        T: Clone,
    {
        let mut v = Self::with_capacity_in(slice.len(), alloc);
        v.extend_from_slice(slice);
        v
    }

    /// Collect `iter` into a vector using `alloc`.
    pub fn from_iter_in<I: IntoIterator<Item = T>>(iter: I, alloc: A) -> Self {
        infallible(Self::try_from_iter_in(iter, alloc))
    }

    /// Fallible [`from_iter_in`](Self::from_iter_in).
    ///
    /// Fails up front with [`CapacityError::LengthExceeded`] when the
    /// iterator's lower size bound is already too long to represent.
    pub fn try_from_iter_in<I: IntoIterator<Item = T>>(
        iter: I,
        alloc: A,
    ) -> Result<Self, CapacityError> {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let max = max_len::<T>();
        if lower > max {
            return Err(CapacityError::LengthExceeded {
                requested: lower,
                max,
            });
        }
        let mut v = Self::try_with_capacity_in(lower, alloc)?;
        for value in iter {
            v.try_push(value).map_err(|e| e.error)?;
        }
        Ok(v)
    }

    /// Number of elements.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the vector holds no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slots available without reallocating: `N` inline, the block size
    /// once spilled.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Which buffer currently holds the elements.
    #[inline]
    pub fn storage_mode(&self) -> StorageMode {
        self.storage.mode()
    }

    /// Whether the elements live on the heap.
    #[inline]
    pub fn spilled(&self) -> bool {
        matches!(self.storage, Storage::Dynamic(_))
    }

    /// Largest length this vector can ever reach.
    #[inline]
    pub const fn max_len(&self) -> usize {
        max_len::<T>()
    }

    /// The allocator backing heap storage.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Raw pointer to the first element.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// Mutable raw pointer to the first element.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.storage.as_mut_ptr()
    }

    /// The elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots [0, len) are initialized.
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    /// The elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: slots [0, len) are initialized.
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }

    /// Bounds-checked access.
    pub fn at(&self, index: usize) -> Result<&T, OutOfRange> {
        let len = self.len;
        self.as_slice().get(index).ok_or(OutOfRange { index, len })
    }

    /// Bounds-checked mutable access.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRange> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(OutOfRange { index, len })
    }

    // ── capacity ────────────────────────────────────────────────

    /// Move the elements into a heap block of exactly `new_cap` slots.
    ///
    /// Requires `new_cap > N` and `new_cap >= len`. On failure nothing
    /// changes.
    fn try_grow_to(&mut self, new_cap: usize) -> Result<(), CapacityError> {
        debug_assert!(new_cap > N && new_cap >= self.len);
        match &mut self.storage {
            Storage::Inline(slots) => {
                let buf = RawBuf::try_with_capacity(&self.alloc, new_cap)?;
                // SAFETY: the inline slots [0, len) are initialized and the
                // fresh block has room for them. The enum assignment below
                // drops only `MaybeUninit`s, so the elements are moved, not
                // duplicated.
                unsafe {
                    ptr::copy_nonoverlapping(slots.as_ptr().cast::<T>(), buf.ptr(), self.len);
                }
                self.storage = Storage::Dynamic(buf);
                Ok(())
            }
            // SAFETY: the block came from `self.alloc`; [0, len) are initialized.
            Storage::Dynamic(buf) => unsafe { buf.try_relocate(&self.alloc, self.len, new_cap) },
        }
    }

    /// Make room for at least `additional` more elements, growing
    /// geometrically.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), CapacityError> {
        let required = required_len::<T>(self.len, additional)?;
        let cap = self.capacity();
        if required <= cap {
            return Ok(());
        }
        self.try_grow_to(next_capacity::<T>(cap, required)?)
    }

    /// See [`try_reserve`](Self::try_reserve). Panics on length overflow
    /// and aborts on allocation failure.
    pub fn reserve(&mut self, additional: usize) {
        if self.capacity() - self.len < additional {
            infallible(self.try_reserve(additional));
        }
    }

    /// Make room for exactly `additional` more elements.
    pub fn try_reserve_exact(&mut self, additional: usize) -> Result<(), CapacityError> {
        let required = required_len::<T>(self.len, additional)?;
        if required <= self.capacity() {
            return Ok(());
        }
        self.try_grow_to(required)
    }

    /// See [`try_reserve_exact`](Self::try_reserve_exact).
    pub fn reserve_exact(&mut self, additional: usize) {
        infallible(self.try_reserve_exact(additional));
    }

    /// Release unused heap capacity.
    ///
    /// A spilled vector with at most `N` elements moves back inline and
    /// frees its block. A longer one reallocates to exactly its length.
    pub fn shrink_to_fit(&mut self) {
        let Storage::Dynamic(buf) = &mut self.storage else {
            return;
        };
        if self.len <= N {
            let mut inline = Storage::<T, N>::inline();
            let mut buf = buf.take();
            // SAFETY: [0, len) move from the block into the inline array,
            // then the block is released through the allocator it came from.
            unsafe {
                ptr::copy_nonoverlapping(buf.ptr(), inline.as_mut_ptr(), self.len);
                buf.deallocate(&self.alloc);
            }
            self.storage = inline;
        } else if self.len < buf.capacity() {
            // SAFETY: the block came from `self.alloc`; [0, len) are initialized.
            infallible(unsafe { buf.try_relocate(&self.alloc, self.len, self.len) });
        }
    }

    /// Free the heap block, if any, and return to inline mode.
    ///
    /// Must only be called with `len == 0`.
    pub(crate) fn release_storage(&mut self) {
        debug_assert_eq!(self.len, 0);
        if let Storage::Dynamic(buf) = &mut self.storage {
            // SAFETY: the block came from `self.alloc` and holds no elements.
            unsafe { buf.deallocate(&self.alloc) };
            self.storage = Storage::inline();
        }
    }

    // ── insertion ───────────────────────────────────────────────

    /// Construct `value` in the slot at `len` and bump the length.
    ///
    /// # Safety
    ///
    /// `len < capacity`.
    #[inline]
    unsafe fn push_unchecked(&mut self, value: T) -> &mut T {
        // SAFETY: caller guarantees the slot exists and is uninitialized.
        unsafe {
            let slot = self.as_mut_ptr().add(self.len);
            self.alloc.construct(slot, value);
            self.len += 1;
            &mut *slot
        }
    }

    /// Append `value`, growing if needed.
    #[inline]
    pub fn push(&mut self, value: T) {
        if self.len == self.capacity() {
            infallible(self.try_reserve(1));
        }
        // SAFETY: just ensured len < capacity.
        unsafe { self.push_unchecked(value) };
    }

    /// Append `value`, or hand it back if the vector cannot grow.
    pub fn try_push(&mut self, value: T) -> Result<(), InsertError<T>> {
        if let Err(error) = self.try_reserve(1) {
            return Err(InsertError { value, error });
        }
        // SAFETY: just ensured len < capacity.
        unsafe { self.push_unchecked(value) };
        Ok(())
    }

    /// Append the value built by `make`, returning a reference to it.
    ///
    /// Room is made before `make` runs, so the value is built once and
    /// never moved afterwards.
    pub fn emplace_back<F: FnOnce() -> T>(&mut self, make: F) -> &mut T {
        self.reserve(1);
        let value = make();
        // SAFETY: reserved above; `make` cannot touch `self`.
        unsafe { self.push_unchecked(value) }
    }

    /// Remove and return the last element.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` was initialized and is now outside the live range.
        Some(unsafe { ptr::read(self.as_ptr().add(self.len)) })
    }

    /// Insert `value` at `index`, shifting later elements right.
    ///
    /// # Panics
    ///
    /// If `index > len`.
    pub fn insert(&mut self, index: usize, value: T) {
        self.emplace(index, || value);
    }

    /// Fallible [`insert`](Self::insert); hands the value back on failure.
    ///
    /// # Panics
    ///
    /// If `index > len`.
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<(), InsertError<T>> {
        assert_index_le(index, self.len);
        if let Err(error) = self.try_reserve(1) {
            return Err(InsertError { value, error });
        }
        // SAFETY: index <= len < capacity.
        unsafe { self.insert_unchecked(index, value) };
        Ok(())
    }

    /// Insert the value built by `make` at `index`, returning a reference
    /// to it.
    ///
    /// # Panics
    ///
    /// If `index > len`.
    pub fn emplace<F: FnOnce() -> T>(&mut self, index: usize, make: F) -> &mut T {
        assert_index_le(index, self.len);
        self.reserve(1);
        let value = make();
        // SAFETY: index <= len < capacity.
        unsafe { self.insert_unchecked(index, value) }
    }

    /// # Safety
    ///
    /// `index <= len < capacity`.
    unsafe fn insert_unchecked(&mut self, index: usize, value: T) -> &mut T {
        // SAFETY: the tail [index, len) shifts into [index + 1, len + 1),
        // which is in bounds; the vacated slot is then constructed.
        unsafe {
            let slot = self.as_mut_ptr().add(index);
            ptr::copy(slot, slot.add(1), self.len - index);
            self.alloc.construct(slot, value);
            self.len += 1;
            &mut *slot
        }
    }

    /// Remove and return the element at `index`, shifting later elements
    /// left.
    ///
    /// # Panics
    ///
    /// If `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(index < len, "removal index (is {index}) should be < len (is {len})");
        // SAFETY: index is in bounds; the tail closes the gap.
        unsafe {
            let slot = self.as_mut_ptr().add(index);
            let value = ptr::read(slot);
            ptr::copy(slot.add(1), slot, len - index - 1);
            self.len = len - 1;
            value
        }
    }

    /// Remove the element at `index`, replacing it with the last element.
    ///
    /// # Panics
    ///
    /// If `index >= len`.
    pub fn swap_remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(index < len, "swap_remove index (is {index}) should be < len (is {len})");
        // SAFETY: index and len - 1 are in bounds; the last slot leaves the
        // live range.
        unsafe {
            let base = self.as_mut_ptr();
            let value = ptr::read(base.add(index));
            ptr::copy(base.add(len - 1), base.add(index), 1);
            self.len = len - 1;
            value
        }
    }

    /// Drop every element from `new_len` on. No-op if already shorter.
    pub fn truncate(&mut self, new_len: usize) {
        let old_len = self.len;
        if new_len >= old_len {
            return;
        }
        self.len = new_len;
        // SAFETY: [new_len, old_len) were initialized and are no longer live.
        unsafe {
            let first = self.as_mut_ptr().add(new_len);
            destroy_range(&self.alloc, first, old_len - new_len);
        }
    }

    /// Drop every element. A heap block is kept for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Drop the elements in `range`, shifting the tail left.
    ///
    /// # Panics
    ///
    /// If the range is decreasing or ends past `len`.
    pub fn remove_range<R: RangeBounds<usize>>(&mut self, range: R) {
        let (start, end) = bounds(range, self.len);
        if start == end {
            return;
        }
        let old_len = self.len;
        self.len = start;

        // Closes the gap even if a destructor panics.
        struct CloseGap<'a, T, const N: usize, A: Allocator> {
            vec: &'a mut SmallVec<T, N, A>,
            start: usize,
            end: usize,
            old_len: usize,
        }

        impl<T, const N: usize, A: Allocator> Drop for CloseGap<'_, T, N, A> {
            fn drop(&mut self) {
                let tail = self.old_len - self.end;
                // SAFETY: [end, old_len) are live and move down to `start`.
                unsafe {
                    let base = self.vec.as_mut_ptr();
                    ptr::copy(base.add(self.end), base.add(self.start), tail);
                }
                self.vec.len = self.start + tail;
            }
        }

        let mut gap = CloseGap {
            vec: self,
            start,
            end,
            old_len,
        };
        // SAFETY: [start, end) are initialized and outside the live range.
        unsafe {
            let first = gap.vec.as_mut_ptr().add(start);
            destroy_range(&gap.vec.alloc, first, end - start);
        }
    }

    /// Keep only the elements for which `keep` returns `true`, in order.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) {
        self.retain_mut(|x| keep(x));
    }

    /// [`retain`](Self::retain) with mutable access to each element.
    pub fn retain_mut<F: FnMut(&mut T) -> bool>(&mut self, mut keep: F) {
        let len = self.len;
        self.len = 0;

        // Compacts the unvisited tail if `keep` or a destructor panics.
        struct Compact<'a, T, const N: usize, A: Allocator> {
            vec: &'a mut SmallVec<T, N, A>,
            visited: usize,
            removed: usize,
            len: usize,
        }

        impl<T, const N: usize, A: Allocator> Drop for Compact<'_, T, N, A> {
            fn drop(&mut self) {
                if self.removed > 0 {
                    // SAFETY: [visited, len) are live and slide down over
                    // the holes left by removed elements.
                    unsafe {
                        let base = self.vec.as_mut_ptr();
                        ptr::copy(
                            base.add(self.visited),
                            base.add(self.visited - self.removed),
                            self.len - self.visited,
                        );
                    }
                }
                self.vec.len = self.len - self.removed;
            }
        }

        let mut c = Compact {
            vec: self,
            visited: 0,
            removed: 0,
            len,
        };
        let base = c.vec.as_mut_ptr();
        while c.visited < len {
            // SAFETY: `visited < len`, so the slot is live and not aliased.
            let cur = unsafe { base.add(c.visited) };
            if keep(unsafe { &mut *cur }) {
                if c.removed > 0 {
                    // SAFETY: the destination is a hole left by a removal.
                    unsafe { ptr::copy_nonoverlapping(cur, cur.sub(c.removed), 1) };
                }
                c.visited += 1;
            } else {
                c.visited += 1;
                c.removed += 1;
                // SAFETY: the slot is now counted as removed and never read again.
                unsafe { c.vec.alloc.destroy(cur) };
            }
        }
    }

    /// Resize to `new_len`, filling new slots with values from `make`.
    pub fn resize_with<F: FnMut() -> T>(&mut self, new_len: usize, mut make: F) {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        self.reserve(new_len - self.len);
        while self.len < new_len {
            let value = make();
            // SAFETY: reserved up to new_len.
            unsafe { self.push_unchecked(value) };
        }
    }

    /// Move every element of `other` onto the end of `self`, leaving
    /// `other` empty.
    pub fn append<const M: usize>(&mut self, other: &mut SmallVec<T, M, A>) {
        let n = other.len;
        self.reserve(n);
        other.len = 0;
        let src = other.as_ptr();
        for i in 0..n {
            // SAFETY: src[i] was live in `other`, whose length is already 0,
            // so ownership passes to `self`; reserved above.
            unsafe { self.push_unchecked(ptr::read(src.add(i))) };
        }
    }

    /// Replace the contents with the items of `iter`.
    pub fn assign<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.clear();
        self.extend(iter);
    }

    /// Split off `[at, len)` into a new vector with a clone of the allocator.
    ///
    /// # Panics
    ///
    /// If `at > len`.
    pub fn split_off(&mut self, at: usize) -> Self {
        assert_index_le(at, self.len);
        let n = self.len - at;
        let mut tail = Self::with_capacity_in(n, self.alloc.clone());
        self.len = at;
        // SAFETY: [at, at + n) leave `self` and become tail's [0, n).
        unsafe {
            ptr::copy_nonoverlapping(self.as_ptr().add(at), tail.as_mut_ptr(), n);
        }
        tail.len = n;
        tail
    }
}

impl<T: Clone, const N: usize, A: Allocator> SmallVec<T, N, A> {
    /// Resize to `new_len`, filling new slots with clones of `value`.
    pub fn resize(&mut self, new_len: usize, value: T) {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        self.reserve(new_len - self.len);
        while self.len + 1 < new_len {
            let v = value.clone();
            // SAFETY: reserved up to new_len.
            unsafe { self.push_unchecked(v) };
        }
        // SAFETY: as above; the last slot takes `value` itself.
        unsafe { self.push_unchecked(value) };
    }

    /// Append clones of every element of `other`.
    pub fn extend_from_slice(&mut self, other: &[T]) {
        self.reserve(other.len());
        for x in other {
            let v = x.clone();
            // SAFETY: reserved above.
            unsafe { self.push_unchecked(v) };
        }
    }

    /// Insert clones of `other` at `index`, shifting later elements right.
    ///
    /// # Panics
    ///
    /// If `index > len`.
    pub fn insert_from_slice(&mut self, index: usize, other: &[T]) {
        assert_index_le(index, self.len);
        let n = other.len();
        if n == 0 {
            return;
        }
        self.reserve(n);
        let tail = self.len - index;
        // SAFETY: tail [index, len) moves up by n, still within capacity.
        unsafe {
            let base = self.as_mut_ptr();
            ptr::copy(base.add(index), base.add(index + n), tail);
        }
        self.len = index;

        // Moves the tail back against the clones written so far.
        struct Fill<'a, T, const N: usize, A: Allocator> {
            vec: &'a mut SmallVec<T, N, A>,
            index: usize,
            written: usize,
            n: usize,
            tail: usize,
        }

        impl<T, const N: usize, A: Allocator> Drop for Fill<'_, T, N, A> {
            fn drop(&mut self) {
                if self.written < self.n {
                    // SAFETY: the shifted tail slides down to close the
                    // unwritten part of the gap.
                    unsafe {
                        let base = self.vec.as_mut_ptr();
                        ptr::copy(
                            base.add(self.index + self.n),
                            base.add(self.index + self.written),
                            self.tail,
                        );
                    }
                }
                self.vec.len = self.index + self.written + self.tail;
            }
        }

        let mut fill = Fill {
            vec: self,
            index,
            written: 0,
            n,
            tail,
        };
        let base = fill.vec.as_mut_ptr();
        for x in other {
            let v = x.clone();
            // SAFETY: the slot is inside the gap opened above.
            unsafe { fill.vec.alloc.construct(base.add(index + fill.written), v) };
            fill.written += 1;
        }
    }

    /// Copy-assign from a slice, adopting `source_alloc` when the allocator
    /// propagates on copy.
    pub(crate) fn assign_clone(&mut self, source: &[T], source_alloc: &A) {
        if A::PROPAGATE_ON_COPY {
            if !self.alloc.is_equal(source_alloc) {
                // The old block must go back to the allocator that made it.
                self.clear();
                self.release_storage();
            }
            self.alloc = source_alloc.clone();
        }
        self.truncate(source.len());
        let (init, rest) = source.split_at(self.len);
        for (dst, src) in self.as_mut_slice().iter_mut().zip(init) {
            dst.clone_from(src);
        }
        self.extend_from_slice(rest);
    }
}

#[inline]
#[track_caller]
fn assert_index_le(index: usize, len: usize) {
    assert!(index <= len, "insertion index (is {index}) should be <= len (is {len})");
}

/// Resolve a range against `len`, panicking like slice indexing does.
#[track_caller]
pub(crate) fn bounds<R: RangeBounds<usize>>(range: R, len: usize) -> (usize, usize) {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    };
    assert!(start <= end, "range start {start} is greater than end {end}");
    assert!(end <= len, "range end {end} out of bounds for length {len}");
    (start, end)
}

impl<T, const N: usize, A: Allocator> Drop for SmallVec<T, N, A> {
    fn drop(&mut self) {
        // Frees the block even if an element destructor panics.
        struct Release<'a, T, const N: usize, A: Allocator>(&'a mut SmallVec<T, N, A>);

        impl<T, const N: usize, A: Allocator> Drop for Release<'_, T, N, A> {
            fn drop(&mut self) {
                self.0.len = 0;
                self.0.release_storage();
            }
        }

        let len = mem::replace(&mut self.len, 0);
        let mut release = Release(self);
        // SAFETY: [0, len) are initialized; the length is already zero.
        unsafe {
            let first = release.0.as_mut_ptr();
            destroy_range(&release.0.alloc, first, len);
        }
    }
}

impl<T, const N: usize, A: Allocator> Deref for SmallVec<T, N, A> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize, A: Allocator> DerefMut for SmallVec<T, N, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, const N: usize, A: Allocator> AsRef<[T]> for SmallVec<T, N, A> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, const N: usize, A: Allocator> AsMut<[T]> for SmallVec<T, N, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, const N: usize, A: Allocator> std::borrow::Borrow<[T]> for SmallVec<T, N, A> {
    fn borrow(&self) -> &[T] {
        self
    }
}

impl<T, const N: usize, A: Allocator + Default> Default for SmallVec<T, N, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, const N: usize, A: Allocator> fmt::Debug for SmallVec<T, N, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, U, const N: usize, const M: usize, A, B> PartialEq<SmallVec<U, M, B>> for SmallVec<T, N, A>
where
    T: PartialEq<U>,
    A: Allocator,
    B: Allocator,
{
    fn eq(&self, other: &SmallVec<U, M, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq<U>, U, const N: usize, A: Allocator> PartialEq<[U]> for SmallVec<T, N, A> {
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq<U>, U, const N: usize, A: Allocator> PartialEq<&[U]> for SmallVec<T, N, A> {
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T: PartialEq<U>, U, const N: usize, const M: usize, A: Allocator> PartialEq<[U; M]>
    for SmallVec<T, N, A>
{
    fn eq(&self, other: &[U; M]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq<U>, U, const N: usize, A: Allocator> PartialEq<Vec<U>> for SmallVec<T, N, A> {
    fn eq(&self, other: &Vec<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, const N: usize, A: Allocator> Eq for SmallVec<T, N, A> {}

impl<T: PartialOrd, const N: usize, A: Allocator> PartialOrd for SmallVec<T, N, A> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord, const N: usize, A: Allocator> Ord for SmallVec<T, N, A> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash, const N: usize, A: Allocator> Hash for SmallVec<T, N, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T, const N: usize, A: Allocator> Extend<T> for SmallVec<T, N, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let mut iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve(lower);
        // Fill the free slots without capacity checks, then fall back to push.
        while self.len < self.capacity() {
            match iter.next() {
                // SAFETY: len < capacity.
                Some(value) => unsafe {
                    self.push_unchecked(value);
                },
                None => return,
            }
        }
        for value in iter {
            self.push(value);
        }
    }
}

impl<'a, T: Copy + 'a, const N: usize, A: Allocator> Extend<&'a T> for SmallVec<T, N, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, const N: usize, A: Allocator + Default> FromIterator<T> for SmallVec<T, N, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iter_in(iter, A::default())
    }
}

impl<T, const N: usize, const M: usize, A: Allocator + Default> From<[T; M]> for SmallVec<T, N, A> {
    fn from(array: [T; M]) -> Self {
        Self::from_iter_in(array, A::default())
    }
}

impl<T, const N: usize, A: Allocator + Default> From<Vec<T>> for SmallVec<T, N, A> {
    fn from(vec: Vec<T>) -> Self {
        Self::from_iter_in(vec, A::default())
    }
}

impl<T: Clone, const N: usize, A: Allocator + Default> From<&[T]> for SmallVec<T, N, A> {
    fn from(slice: &[T]) -> Self {
        Self::from_slice(slice)
    }
}

impl<T, const N: usize, A: Allocator> From<SmallVec<T, N, A>> for Vec<T> {
    fn from(v: SmallVec<T, N, A>) -> Self {
        v.into_iter().collect()
    }
}

impl<'a, T, const N: usize, A: Allocator> IntoIterator for &'a SmallVec<T, N, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const N: usize, A: Allocator> IntoIterator for &'a mut SmallVec<T, N, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type V4 = SmallVec<i32, 4>;

    #[test]
    fn new_is_inline_and_empty() {
        let v = V4::new();
        assert!(v.is_empty());
        assert_eq!(v.capacity(), 4);
        assert_eq!(v.storage_mode(), StorageMode::Inline);
        assert_eq!(V4::INLINE_CAPACITY, 4);
    }

    #[test]
    fn spills_on_the_push_past_n() {
        let mut v = V4::new();
        for i in 0..4 {
            v.push(i);
        }
        assert!(!v.spilled());
        v.push(4);
        assert!(v.spilled());
        assert!(v.capacity() > 4);
        assert_eq!(v, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn with_capacity_picks_the_mode() {
        assert!(!V4::with_capacity(4).spilled());
        let v = V4::with_capacity(5);
        assert!(v.spilled());
        assert_eq!(v.capacity(), 5);
    }

    #[test]
    fn clear_keeps_the_heap_block() {
        let mut v: V4 = (0..10).collect();
        let cap = v.capacity();
        v.clear();
        assert!(v.spilled());
        assert_eq!(v.capacity(), cap);
    }

    #[test]
    fn shrink_to_fit_returns_inline_only_when_it_fits() {
        let mut v: V4 = (0..10).collect();
        v.truncate(6);
        v.shrink_to_fit();
        assert!(v.spilled());
        assert_eq!(v.capacity(), 6);
        v.truncate(4);
        v.shrink_to_fit();
        assert!(!v.spilled());
        assert_eq!(v, [0, 1, 2, 3]);
    }

    #[test]
    fn zero_inline_capacity_spills_immediately() {
        let mut v = SmallVec::<i32, 0>::new();
        assert_eq!(v.capacity(), 0);
        v.push(1);
        assert!(v.spilled());
        v.pop();
        v.shrink_to_fit();
        assert!(!v.spilled());
        assert_eq!(v.capacity(), 0);
    }

    #[test]
    fn large_inline_capacity_stays_inline() {
        let mut v = SmallVec::<i32, 2000>::new();
        for i in 0..2000 {
            v.push(i);
        }
        assert!(!v.spilled());
        v.push(2000);
        assert!(v.spilled());
        assert_eq!(v[2000], 2000);
    }

    #[test]
    fn zero_sized_elements() {
        let mut v = SmallVec::<(), 2>::new();
        for _ in 0..100 {
            v.push(());
        }
        assert_eq!(v.len(), 100);
        assert!(v.spilled());
        v.truncate(1);
        v.shrink_to_fit();
        assert!(!v.spilled());
    }

    #[test]
    fn at_reports_out_of_range() {
        let v: V4 = (0..3).collect();
        assert_eq!(v.at(2), Ok(&2));
        assert_eq!(v.at(3), Err(OutOfRange { index: 3, len: 3 }));
    }

    #[test]
    #[should_panic(expected = "insertion index (is 4) should be <= len (is 3)")]
    fn insert_past_end_panics() {
        let mut v: V4 = (0..3).collect();
        v.insert(4, 0);
    }

    #[test]
    fn try_from_iter_rejects_impossible_hint() {
        struct Liar;
        impl Iterator for Liar {
            type Item = u64;
            fn next(&mut self) -> Option<u64> {
                None
            }
            fn size_hint(&self) -> (usize, Option<usize>) {
                (usize::MAX, None)
            }
        }
        let r = SmallVec::<u64, 4>::try_from_iter_in(Liar, Global);
        assert!(matches!(r, Err(CapacityError::LengthExceeded { .. })));
    }

    #[test]
    fn try_reserve_overflow_leaves_vector_intact() {
        let mut v: V4 = (0..6).collect();
        let cap = v.capacity();
        assert!(v.try_reserve(usize::MAX).is_err());
        assert_eq!(v.capacity(), cap);
        assert_eq!(v, [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn split_off_and_append() {
        let mut v: V4 = (0..9).collect();
        let mut tail = v.split_off(3);
        assert_eq!(v, [0, 1, 2]);
        assert_eq!(tail, [3, 4, 5, 6, 7, 8]);
        v.append(&mut tail);
        assert!(tail.is_empty());
        assert_eq!(v.len(), 9);
    }

    #[test]
    fn ordering_and_hash_follow_slices() {
        use std::collections::hash_map::DefaultHasher;

        let a: V4 = (0..3).collect();
        let b: SmallVec<i32, 4> = (0..4).collect();
        assert!(a < b);
        let mut h1 = DefaultHasher::new();
        let mut h2 = DefaultHasher::new();
        a.hash(&mut h1);
        [0, 1, 2][..].hash(&mut h2);
        assert_eq!(h1.finish(), h2.finish());
    }

    #[test]
    fn debug_lists_elements() {
        let v: V4 = (1..4).collect();
        assert_eq!(format!("{v:?}"), "[1, 2, 3]");
    }

    #[test]
    fn bounds_resolves_all_forms() {
        assert_eq!(bounds(.., 5), (0, 5));
        assert_eq!(bounds(1..=2, 5), (1, 3));
        assert_eq!(bounds(3.., 5), (3, 5));
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn capacity_mode_holds_after_pushes(n in 0usize..40) {
                let mut v = SmallVec::<u8, 8>::new();
                for i in 0..n {
                    v.push(i as u8);
                    match v.storage_mode() {
                        StorageMode::Inline => prop_assert!(v.len() <= 8),
                        StorageMode::Dynamic => prop_assert!(v.capacity() > 8),
                    }
                }
                prop_assert_eq!(v.len(), n);
            }

            #[test]
            fn insert_from_slice_matches_vec(
                base in proptest::collection::vec(any::<i16>(), 0..20),
                ins in proptest::collection::vec(any::<i16>(), 0..20),
                at in any::<usize>(),
            ) {
                let at = at % (base.len() + 1);
                let mut v = SmallVec::<i16, 6>::from_slice(&base);
                v.insert_from_slice(at, &ins);
                let mut want = base.clone();
                want.splice(at..at, ins.iter().copied());
                prop_assert_eq!(v.as_slice(), want.as_slice());
            }
        }
    }
}
