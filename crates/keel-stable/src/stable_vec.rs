//! [`StableVec`]: the vector type and its core operations.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Bound, Index, IndexMut, RangeBounds};
use std::ptr;
use std::slice;

use keel_core::growth::{max_len, next_capacity, required_len};
use keel_core::{infallible, Allocator, CapacityError, Global, InsertError, OutOfRange, RawBuf};

use crate::iter::{Iter, IterMut};
use crate::node::{alloc_node, free_node, free_nodes, take_node, try_alloc_node, NodePtr};

/// A vector whose elements never move.
///
/// Each element is allocated on its own; the vector keeps a contiguous
/// index of pointers to them. Inserting or removing elsewhere shifts
/// pointers in the index, never the elements, so a `&T` obtained before
/// the mutation would still point at the same element (the borrow checker
/// stops you from holding one across `&mut self`; use a
/// [`StableRef`](crate::StableRef) for that).
///
/// `capacity`, `reserve` and `shrink_to_fit` concern the index only.
pub struct StableVec<T, A: Allocator = Global> {
    pub(crate) index: RawBuf<NodePtr<T>>,
    pub(crate) len: usize,
    pub(crate) alloc: A,
    pub(crate) _owns: PhantomData<T>,
}

// SAFETY: the vector uniquely owns its nodes and index, like `Vec<Box<T>>`.
unsafe impl<T: Send, A: Allocator + Send> Send for StableVec<T, A> {}
unsafe impl<T: Sync, A: Allocator + Sync> Sync for StableVec<T, A> {}

impl<T, A: Allocator + Default> StableVec<T, A> {
    /// An empty vector. Allocates nothing.
    #[inline]
    pub fn new() -> Self {
        Self::new_in(A::default())
    }

    /// An empty vector whose index has room for `capacity` elements.
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
}

impl<T, A: Allocator> StableVec<T, A> {
    /// An empty vector using `alloc` for the index and the nodes.
    #[inline]
    pub const fn new_in(alloc: A) -> Self {
        Self {
            index: RawBuf::dangling(),
            len: 0,
            alloc,
            _owns: PhantomData,
        }
    }

    /// See [`with_capacity`](Self::with_capacity).
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        infallible(Self::try_with_capacity_in(capacity, alloc))
    }

    /// Fallible [`with_capacity_in`](Self::with_capacity_in).
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, CapacityError> {
        let index = RawBuf::try_with_capacity(&alloc, capacity)?;
        Ok(Self {
            index,
            len: 0,
            alloc,
            _owns: PhantomData,
        })
    }

    /// Collect `iter` using `alloc`.
    pub fn from_iter_in<I: IntoIterator<Item = T>>(iter: I, alloc: A) -> Self {
        infallible(Self::try_from_iter_in(iter, alloc))
    }

    /// Fallible [`from_iter_in`](Self::from_iter_in). Fails up front with
    /// [`CapacityError::LengthExceeded`] if the iterator's lower size bound
    /// cannot be represented.
    pub fn try_from_iter_in<I: IntoIterator<Item = T>>(
        iter: I,
        alloc: A,
    ) -> Result<Self, CapacityError> {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let max = max_len::<NodePtr<T>>();
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

    /// Whether there are no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index slots available without reallocating the index.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.index.capacity()
    }

    /// Largest length this vector can ever reach.
    #[inline]
    pub const fn max_len(&self) -> usize {
        max_len::<NodePtr<T>>()
    }

    /// The allocator for the index and the nodes.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    #[inline]
    pub(crate) fn slots(&self) -> &[NodePtr<T>] {
        // SAFETY: index entries [0, len) are initialized.
        unsafe { slice::from_raw_parts(self.index.ptr(), self.len) }
    }

    /// # Safety
    ///
    /// `i < len`.
    #[inline]
    pub(crate) unsafe fn node_at(&self, i: usize) -> NodePtr<T> {
        // SAFETY: caller contract.
        unsafe { *self.index.ptr().add(i) }
    }

    /// Rewrite the back-reference of every node from `from` to the end.
    fn fix_back_refs(&mut self, from: usize) {
        for i in from..self.len {
            // SAFETY: i < len, nodes are live and uniquely owned.
            unsafe { (*self.node_at(i).as_ptr()).slot = i };
        }
    }

    #[inline]
    pub(crate) fn debug_check(&self) {
        #[cfg(all(feature = "invariant-checks", debug_assertions))]
        {
            if let Err(e) = self.check_invariants() {
                panic!("StableVec invariant violated: {e}");
            }
        }
    }

    // ── access ──────────────────────────────────────────────────

    /// The element at `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len {
            // SAFETY: in bounds; the node is live for as long as `&self`.
            Some(unsafe { &(*self.node_at(index).as_ptr()).value })
        } else {
            None
        }
    }

    /// The element at `index`, mutably.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len {
            // SAFETY: in bounds; `&mut self` makes the access unique.
            Some(unsafe { &mut (*self.node_at(index).as_ptr()).value })
        } else {
            None
        }
    }

    /// Bounds-checked access.
    pub fn at(&self, index: usize) -> Result<&T, OutOfRange> {
        let len = self.len;
        self.get(index).ok_or(OutOfRange { index, len })
    }

    /// Bounds-checked mutable access.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRange> {
        let len = self.len;
        self.get_mut(index).ok_or(OutOfRange { index, len })
    }

    /// The first element.
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// The last element.
    pub fn last(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    /// The first element, mutably.
    pub fn first_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// The last element, mutably.
    pub fn last_mut(&mut self) -> Option<&mut T> {
        match self.len.checked_sub(1) {
            Some(i) => self.get_mut(i),
            None => None,
        }
    }

    /// Iterator over the elements in order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.slots())
    }

    /// Mutable iterator over the elements in order.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.slots())
    }

    // ── index capacity ──────────────────────────────────────────

    /// Make room in the index for at least `additional` more elements.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), CapacityError> {
        let required = required_len::<NodePtr<T>>(self.len, additional)?;
        let cap = self.capacity();
        if required <= cap {
            return Ok(());
        }
        let new_cap = next_capacity::<NodePtr<T>>(cap, required)?;
        // SAFETY: the index came from `self.alloc`; [0, len) are initialized.
        unsafe { self.index.try_relocate(&self.alloc, self.len, new_cap) }
    }

    /// See [`try_reserve`](Self::try_reserve).
    pub fn reserve(&mut self, additional: usize) {
        if self.capacity() - self.len < additional {
            infallible(self.try_reserve(additional));
        }
    }

    /// Make room in the index for exactly `additional` more elements.
    pub fn try_reserve_exact(&mut self, additional: usize) -> Result<(), CapacityError> {
        let required = required_len::<NodePtr<T>>(self.len, additional)?;
        if required <= self.capacity() {
            return Ok(());
        }
        // SAFETY: as in `try_reserve`.
        unsafe { self.index.try_relocate(&self.alloc, self.len, required) }
    }

    /// See [`try_reserve_exact`](Self::try_reserve_exact).
    pub fn reserve_exact(&mut self, additional: usize) {
        infallible(self.try_reserve_exact(additional));
    }

    /// Shrink the index to the current length. Elements are untouched.
    pub fn shrink_to_fit(&mut self) {
        if self.len == self.capacity() {
            return;
        }
        if self.len == 0 {
            // SAFETY: the index came from `self.alloc` and is empty.
            unsafe { self.index.deallocate(&self.alloc) };
        } else {
            // SAFETY: as in `try_reserve`.
            infallible(unsafe { self.index.try_relocate(&self.alloc, self.len, self.len) });
        }
    }

    /// Free the index. Requires `len == 0`.
    pub(crate) fn release_index(&mut self) {
        debug_assert_eq!(self.len, 0);
        // SAFETY: the index came from `self.alloc` and holds no entries.
        unsafe { self.index.deallocate(&self.alloc) };
    }

    // ── insertion ───────────────────────────────────────────────

    /// Put an already built node at `index`, shifting later entries right.
    ///
    /// # Safety
    ///
    /// `index <= len < capacity`; `node` is owned by nobody else.
    unsafe fn link(&mut self, index: usize, node: NodePtr<T>) -> &mut T {
        // SAFETY: the tail shifts into capacity reserved by the caller.
        unsafe {
            let at = self.index.ptr().add(index);
            ptr::copy(at, at.add(1), self.len - index);
            at.write(node);
        }
        self.len += 1;
        self.fix_back_refs(index);
        self.debug_check();
        // SAFETY: the node is live and owned by `self`.
        unsafe { &mut (*node.as_ptr()).value }
    }

    /// Append `value`.
    pub fn push(&mut self, value: T) {
        self.reserve(1);
        let node = alloc_node(&self.alloc, value, self.len);
        // SAFETY: reserved above.
        unsafe { self.link(self.len, node) };
    }

    /// Append `value`, or hand it back if the index or node cannot be
    /// allocated.
    pub fn try_push(&mut self, value: T) -> Result<(), InsertError<T>> {
        let len = self.len;
        self.try_insert(len, value)
    }

    /// Append the value built by `make`, returning a reference to it.
    pub fn emplace_back<F: FnOnce() -> T>(&mut self, make: F) -> &mut T {
        let len = self.len;
        self.emplace(len, make)
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the entry just left the live range.
        let value = unsafe { take_node(&self.alloc, self.node_at(self.len)) };
        self.debug_check();
        Some(value)
    }

    /// Insert `value` at `index`. Existing elements keep their addresses.
    ///
    /// # Panics
    ///
    /// If `index > len`.
    pub fn insert(&mut self, index: usize, value: T) {
        self.emplace(index, || value);
    }

    /// Fallible [`insert`](Self::insert); hands the value back on failure
    /// and leaves the vector unchanged.
    ///
    /// # Panics
    ///
    /// If `index > len`.
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<(), InsertError<T>> {
        assert_index_le(index, self.len);
        let node = try_alloc_node(&self.alloc, value, index)?;
        if let Err(error) = self.try_reserve(1) {
            // SAFETY: the node was never linked.
            let value = unsafe { take_node(&self.alloc, node) };
            return Err(InsertError { value, error });
        }
        // SAFETY: reserved above.
        unsafe { self.link(index, node) };
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
        let node = alloc_node(&self.alloc, make(), index);
        // SAFETY: reserved above.
        unsafe { self.link(index, node) }
    }

    // ── removal ─────────────────────────────────────────────────

    /// Remove and return the element at `index`. Other elements keep their
    /// addresses.
    ///
    /// # Panics
    ///
    /// If `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(index < len, "removal index (is {index}) should be < len (is {len})");
        // SAFETY: in bounds; the tail closes the gap.
        let node = unsafe {
            let at = self.index.ptr().add(index);
            let node = *at;
            ptr::copy(at.add(1), at, len - index - 1);
            node
        };
        self.len = len - 1;
        self.fix_back_refs(index);
        self.debug_check();
        // SAFETY: unlinked above.
        unsafe { take_node(&self.alloc, node) }
    }

    /// Remove the element at `index`, moving the last entry into its slot.
    ///
    /// # Panics
    ///
    /// If `index >= len`.
    pub fn swap_remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(index < len, "swap_remove index (is {index}) should be < len (is {len})");
        // SAFETY: index and len - 1 are in bounds.
        let node = unsafe {
            let base = self.index.ptr();
            let node = *base.add(index);
            let last = *base.add(len - 1);
            base.add(index).write(last);
            (*last.as_ptr()).slot = index;
            node
        };
        self.len = len - 1;
        self.debug_check();
        // SAFETY: unlinked above.
        unsafe { take_node(&self.alloc, node) }
    }

    /// Drop every element from `new_len` on.
    pub fn truncate(&mut self, new_len: usize) {
        let old_len = self.len;
        if new_len >= old_len {
            return;
        }
        self.len = new_len;
        // SAFETY: entries [new_len, old_len) left the live range.
        unsafe {
            free_nodes(&self.alloc, self.index.ptr().add(new_len), old_len - new_len);
        }
        self.debug_check();
    }

    /// Drop every element. The index keeps its capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Drop the elements in `range`, shifting later entries left.
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
        struct CloseGap<'a, T, A: Allocator> {
            vec: &'a mut StableVec<T, A>,
            start: usize,
            end: usize,
            old_len: usize,
        }

        impl<T, A: Allocator> Drop for CloseGap<'_, T, A> {
            fn drop(&mut self) {
                let tail = self.old_len - self.end;
                // SAFETY: entries [end, old_len) are live and move down.
                unsafe {
                    let base = self.vec.index.ptr();
                    ptr::copy(base.add(self.end), base.add(self.start), tail);
                }
                self.vec.len = self.start + tail;
                self.vec.fix_back_refs(self.start);
                self.vec.debug_check();
            }
        }

        let gap = CloseGap {
            vec: self,
            start,
            end,
            old_len,
        };
        // SAFETY: entries [start, end) are outside the live range.
        unsafe {
            free_nodes(&gap.vec.alloc, gap.vec.index.ptr().add(start), end - start);
        }
    }

    /// Keep only the elements for which `keep` returns `true`.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) {
        self.retain_mut(|x| keep(x));
    }

    /// [`retain`](Self::retain) with mutable access to each element.
    pub fn retain_mut<F: FnMut(&mut T) -> bool>(&mut self, mut keep: F) {
        let len = self.len;
        self.len = 0;

        // Compacts the unvisited tail if `keep` or a destructor panics.
        struct Compact<'a, T, A: Allocator> {
            vec: &'a mut StableVec<T, A>,
            visited: usize,
            removed: usize,
            len: usize,
        }

        impl<T, A: Allocator> Drop for Compact<'_, T, A> {
            fn drop(&mut self) {
                let kept = self.visited - self.removed;
                if self.removed > 0 {
                    // SAFETY: unvisited entries slide down over the holes.
                    unsafe {
                        let base = self.vec.index.ptr();
                        ptr::copy(base.add(self.visited), base.add(kept), self.len - self.visited);
                    }
                }
                self.vec.len = self.len - self.removed;
                self.vec.fix_back_refs(kept);
                self.vec.debug_check();
            }
        }

        let mut c = Compact {
            vec: self,
            visited: 0,
            removed: 0,
            len,
        };
        let base = c.vec.index.ptr();
        while c.visited < len {
            // SAFETY: visited < len; the node is live and uniquely owned.
            let node = unsafe { *base.add(c.visited) };
            // SAFETY: nothing else reaches the node while `keep` runs.
            if keep(unsafe { &mut (*node.as_ptr()).value }) {
                let to = c.visited - c.removed;
                // SAFETY: `to` is a hole or the entry's own slot.
                unsafe {
                    base.add(to).write(node);
                    (*node.as_ptr()).slot = to;
                }
                c.visited += 1;
            } else {
                c.visited += 1;
                c.removed += 1;
                // SAFETY: the entry is now counted as removed.
                unsafe { free_node(&c.vec.alloc, node) };
            }
        }
    }

    /// Resize to `new_len`, building new elements with `make`.
    pub fn resize_with<F: FnMut() -> T>(&mut self, new_len: usize, mut make: F) {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        self.reserve(new_len - self.len);
        while self.len < new_len {
            let node = alloc_node(&self.alloc, make(), self.len);
            // SAFETY: reserved above.
            unsafe { self.link(self.len, node) };
        }
    }

    /// Replace the contents with the items of `iter`.
    pub fn assign<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.clear();
        self.extend(iter);
    }

    /// Move every element of `other` to the end of `self`.
    ///
    /// Nodes are relinked, not reallocated, when the allocators are equal,
    /// so addresses survive the move.
    pub fn append(&mut self, other: &mut Self) {
        let n = other.len;
        self.reserve(n);
        other.len = 0;
        let same = self.alloc.is_equal(&other.alloc);
        for i in 0..n {
            // SAFETY: other's entries [0, n) were unlinked above.
            let node = unsafe { other.node_at(i) };
            let node = if same {
                node
            } else {
                // SAFETY: the node came from `other.alloc`.
                let value = unsafe { take_node(&other.alloc, node) };
                alloc_node(&self.alloc, value, self.len)
            };
            // SAFETY: reserved above.
            unsafe { self.link(self.len, node) };
        }
        other.debug_check();
    }
}

impl<T: Clone, A: Allocator> StableVec<T, A> {
    /// Resize to `new_len`, filling new slots with clones of `value`.
    pub fn resize(&mut self, new_len: usize, value: T) {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        self.reserve(new_len - self.len);
        while self.len + 1 < new_len {
            self.push(value.clone());
        }
        self.push(value);
    }

    /// Append clones of every element of `other`.
    pub fn extend_from_slice(&mut self, other: &[T]) {
        self.reserve(other.len());
        for x in other {
            self.push(x.clone());
        }
    }

    /// Insert clones of `other` at `index`.
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
        // SAFETY: the tail moves up by n within capacity.
        unsafe {
            let base = self.index.ptr();
            ptr::copy(base.add(index), base.add(index + n), tail);
        }
        self.len = index;

        // Moves the tail back against the nodes written so far.
        struct Fill<'a, T, A: Allocator> {
            vec: &'a mut StableVec<T, A>,
            index: usize,
            written: usize,
            n: usize,
            tail: usize,
        }

        impl<T, A: Allocator> Drop for Fill<'_, T, A> {
            fn drop(&mut self) {
                let filled = self.index + self.written;
                if self.written < self.n {
                    // SAFETY: the tail slides down over the unwritten gap.
                    unsafe {
                        let base = self.vec.index.ptr();
                        ptr::copy(base.add(self.index + self.n), base.add(filled), self.tail);
                    }
                }
                self.vec.len = filled + self.tail;
                self.vec.fix_back_refs(filled);
                self.vec.debug_check();
            }
        }

        let mut fill = Fill {
            vec: self,
            index,
            written: 0,
            n,
            tail,
        };
        for x in other {
            let slot = index + fill.written;
            let node = alloc_node(&fill.vec.alloc, x.clone(), slot);
            // SAFETY: the slot is inside the gap opened above.
            unsafe { fill.vec.index.ptr().add(slot).write(node) };
            fill.written += 1;
        }
    }

    /// Clones of every element, in a `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

#[inline]
#[track_caller]
fn assert_index_le(index: usize, len: usize) {
    assert!(index <= len, "insertion index (is {index}) should be <= len (is {len})");
}

#[track_caller]
fn bounds<R: RangeBounds<usize>>(range: R, len: usize) -> (usize, usize) {
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

impl<T, A: Allocator> Drop for StableVec<T, A> {
    fn drop(&mut self) {
        // Frees the index even if an element destructor panics.
        struct Release<'a, T, A: Allocator>(&'a mut StableVec<T, A>);

        impl<T, A: Allocator> Drop for Release<'_, T, A> {
            fn drop(&mut self) {
                self.0.release_index();
            }
        }

        let len = std::mem::replace(&mut self.len, 0);
        let release = Release(self);
        // SAFETY: entries [0, len) are live and no longer counted.
        unsafe { free_nodes(&release.0.alloc, release.0.index.ptr(), len) };
    }
}

impl<T, A: Allocator> Index<usize> for StableVec<T, A> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        let len = self.len;
        match self.get(index) {
            Some(x) => x,
            None => panic!("index out of bounds: the len is {len} but the index is {index}"),
        }
    }
}

impl<T, A: Allocator> IndexMut<usize> for StableVec<T, A> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(x) => x,
            None => panic!("index out of bounds: the len is {len} but the index is {index}"),
        }
    }
}

impl<T, A: Allocator + Default> Default for StableVec<T, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for StableVec<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq<U>, U, A: Allocator, B: Allocator> PartialEq<StableVec<U, B>> for StableVec<T, A> {
    fn eq(&self, other: &StableVec<U, B>) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: PartialEq<U>, U, A: Allocator> PartialEq<[U]> for StableVec<T, A> {
    fn eq(&self, other: &[U]) -> bool {
        self.len == other.len() && self.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl<T: PartialEq<U>, U, A: Allocator> PartialEq<&[U]> for StableVec<T, A> {
    fn eq(&self, other: &&[U]) -> bool {
        *self == **other
    }
}

impl<T: PartialEq<U>, U, const M: usize, A: Allocator> PartialEq<[U; M]> for StableVec<T, A> {
    fn eq(&self, other: &[U; M]) -> bool {
        *self == other[..]
    }
}

impl<T: PartialEq<U>, U, A: Allocator> PartialEq<Vec<U>> for StableVec<T, A> {
    fn eq(&self, other: &Vec<U>) -> bool {
        *self == other[..]
    }
}

impl<T: Eq, A: Allocator> Eq for StableVec<T, A> {}

impl<T: PartialOrd, A: Allocator> PartialOrd for StableVec<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, A: Allocator> Ord for StableVec<T, A> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, A: Allocator> Hash for StableVec<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        for x in self {
            x.hash(state);
        }
    }
}

impl<T, A: Allocator> Extend<T> for StableVec<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.push(value);
        }
    }
}

impl<'a, T: Copy + 'a, A: Allocator> Extend<&'a T> for StableVec<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, A: Allocator + Default> FromIterator<T> for StableVec<T, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iter_in(iter, A::default())
    }
}

impl<T, const M: usize, A: Allocator + Default> From<[T; M]> for StableVec<T, A> {
    fn from(array: [T; M]) -> Self {
        Self::from_iter_in(array, A::default())
    }
}

impl<T, A: Allocator + Default> From<Vec<T>> for StableVec<T, A> {
    fn from(vec: Vec<T>) -> Self {
        Self::from_iter_in(vec, A::default())
    }
}

impl<T: Clone, A: Allocator + Default> From<&[T]> for StableVec<T, A> {
    fn from(slice: &[T]) -> Self {
        let mut v = Self::with_capacity(slice.len());
        v.extend_from_slice(slice);
        v
    }
}

impl<T, A: Allocator> From<StableVec<T, A>> for Vec<T> {
    fn from(v: StableVec<T, A>) -> Self {
        v.into_iter().collect()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a StableVec<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut StableVec<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(v: &StableVec<i32>) -> Vec<*const i32> {
        v.iter().map(|x| x as *const i32).collect()
    }

    #[test]
    fn new_allocates_nothing() {
        let v = StableVec::<u64>::new();
        assert_eq!(v.capacity(), 0);
        assert!(v.is_empty());
    }

    #[test]
    fn insert_front_keeps_addresses() {
        let mut v: StableVec<i32> = (0..10).collect();
        let before = addrs(&v);
        v.insert(0, -1);
        v.insert(5, -2);
        let after = addrs(&v);
        assert_eq!(&after[1..5], &before[0..4]);
        assert_eq!(&after[6..], &before[4..]);
        v.check_invariants().unwrap();
    }

    #[test]
    fn remove_keeps_other_addresses() {
        let mut v: StableVec<i32> = (0..10).collect();
        let before = addrs(&v);
        assert_eq!(v.remove(3), 3);
        assert_eq!(v.swap_remove(0), 0);
        let after = addrs(&v);
        assert_eq!(after[0], before[9]);
        assert_eq!(&after[1..3], &before[1..3]);
        assert_eq!(&after[3..], &before[4..9]);
        v.check_invariants().unwrap();
    }

    #[test]
    fn index_growth_moves_pointers_only() {
        let mut v = StableVec::<i32>::new();
        v.push(7);
        let p = &v[0] as *const i32;
        for i in 0..1000 {
            v.push(i);
        }
        assert_eq!(&v[0] as *const i32, p);
    }

    #[test]
    fn shrink_to_fit_trims_the_index() {
        let mut v: StableVec<i32> = StableVec::with_capacity(50);
        v.extend(0..5);
        v.shrink_to_fit();
        assert_eq!(v.capacity(), 5);
        v.clear();
        v.shrink_to_fit();
        assert_eq!(v.capacity(), 0);
    }

    #[test]
    fn append_relinks_nodes() {
        let mut a: StableVec<i32> = (0..3).collect();
        let mut b: StableVec<i32> = (3..6).collect();
        let p = &b[1] as *const i32;
        a.append(&mut b);
        assert!(b.is_empty());
        assert_eq!(a, [0, 1, 2, 3, 4, 5]);
        assert_eq!(&a[4] as *const i32, p);
        a.check_invariants().unwrap();
    }

    #[test]
    fn index_panics_past_end() {
        let v: StableVec<i32> = (0..2).collect();
        let r = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| v[2]));
        assert!(r.is_err());
    }

    #[test]
    fn ordering_is_lexicographic() {
        let a: StableVec<i32> = StableVec::from([1, 2]);
        let b: StableVec<i32> = StableVec::from([1, 3]);
        assert!(a < b);
        assert_eq!(a.cmp(&a.clone()), std::cmp::Ordering::Equal);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn back_references_follow_random_inserts(
                positions in proptest::collection::vec(any::<usize>(), 0..60),
            ) {
                let mut v = StableVec::<usize>::new();
                let mut model = Vec::new();
                for (n, p) in positions.into_iter().enumerate() {
                    let at = p % (v.len() + 1);
                    v.insert(at, n);
                    model.insert(at, n);
                    prop_assert!(v.check_invariants().is_ok());
                }
                prop_assert_eq!(v.to_vec(), model);
            }
        }
    }
}
