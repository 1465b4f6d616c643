//! Borrowing and owning iterators.
//!
//! The borrowing iterators walk the index with a `slice::Iter` and
//! dereference each node pointer, so `nth`, `nth_back` and `len` are O(1)
//! like their slice counterparts.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::slice;

use keel_core::Allocator;

use crate::node::{free_nodes, take_node, NodePtr};
use crate::StableVec;

/// Shared iterator over a [`StableVec`].
pub struct Iter<'a, T> {
    slots: slice::Iter<'a, NodePtr<T>>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(slots: &'a [NodePtr<T>]) -> Self {
        Self { slots: slots.iter() }
    }

    #[inline]
    fn value(node: &NodePtr<T>) -> &'a T {
        // SAFETY: the node outlives the borrow of the vector.
        unsafe { &(*node.as_ptr()).value }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        self.slots.next().map(Self::value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<&'a T> {
        self.slots.nth(n).map(Self::value)
    }

    #[inline]
    fn count(self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.slots.next_back().map(Self::value)
    }

    #[inline]
    fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
        self.slots.nth_back(n).map(Self::value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Mutable iterator over a [`StableVec`].
pub struct IterMut<'a, T> {
    slots: slice::Iter<'a, NodePtr<T>>,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T> IterMut<'a, T> {
    pub(crate) fn new(slots: &'a [NodePtr<T>]) -> Self {
        Self {
            slots: slots.iter(),
            _marker: PhantomData,
        }
    }

    #[inline]
    fn value(node: &NodePtr<T>) -> &'a mut T {
        // SAFETY: built from `&mut StableVec`; each node is yielded once.
        unsafe { &mut (*node.as_ptr()).value }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        self.slots.next().map(Self::value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<&'a mut T> {
        self.slots.nth(n).map(Self::value)
    }

    #[inline]
    fn count(self) -> usize {
        self.slots.len()
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.slots.next_back().map(Self::value)
    }

    #[inline]
    fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
        self.slots.nth_back(n).map(Self::value)
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

impl<T> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("remaining", &self.slots.len()).finish()
    }
}

// SAFETY: Iter behaves like `&[&T]`, IterMut like `&mut [&mut T]`.
unsafe impl<T: Sync> Send for Iter<'_, T> {}
unsafe impl<T: Sync> Sync for Iter<'_, T> {}
unsafe impl<T: Send> Send for IterMut<'_, T> {}
unsafe impl<T: Sync> Sync for IterMut<'_, T> {}

/// Iterator that moves elements out of a [`StableVec`].
///
/// The vector is held with its length set to zero; `[start, end)` are the
/// index entries whose nodes have not been yielded yet.
pub struct IntoIter<T, A: Allocator = keel_core::Global> {
    vec: StableVec<T, A>,
    start: usize,
    end: usize,
}

impl<T, A: Allocator> IntoIter<T, A> {
    /// The elements not yet yielded.
    pub fn as_iter(&self) -> Iter<'_, T> {
        // SAFETY: [start, end) are in the index and still owned here.
        let rest = unsafe {
            slice::from_raw_parts(self.vec.index.ptr().add(self.start), self.end - self.start)
        };
        Iter::new(rest)
    }

    /// The allocator of the drained vector.
    pub fn allocator(&self) -> &A {
        self.vec.allocator()
    }
}

impl<T, A: Allocator> IntoIterator for StableVec<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(mut self) -> IntoIter<T, A> {
        let end = std::mem::replace(&mut self.len, 0);
        IntoIter {
            vec: self,
            start: 0,
            end,
        }
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: `start` is unyielded and leaves the range here.
        let node = unsafe { *self.vec.index.ptr().add(self.start) };
        self.start += 1;
        // SAFETY: the node is no longer reachable from the range.
        Some(unsafe { take_node(&self.vec.alloc, node) })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.start;
        (n, Some(n))
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: `end` was the last unyielded entry.
        unsafe {
            let node = *self.vec.index.ptr().add(self.end);
            Some(take_node(&self.vec.alloc, node))
        }
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: Allocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let (start, end) = (self.start, self.end);
        self.start = end;
        // SAFETY: [start, end) were never yielded and are skipped from now on.
        unsafe { free_nodes(&self.vec.alloc, self.vec.index.ptr().add(start), end - start) };
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::StableVec;

    #[test]
    fn nth_skips_without_walking() {
        let v: StableVec<i32> = (0..100).collect();
        let mut it = v.iter();
        assert_eq!(it.nth(10), Some(&10));
        assert_eq!(it.nth_back(9), Some(&90));
        assert_eq!(it.len(), 100 - 11 - 10);
        assert_eq!(it.last(), Some(&89));
    }

    #[test]
    fn iter_mut_writes_through() {
        let mut v: StableVec<i32> = (0..5).collect();
        for x in v.iter_mut().rev() {
            *x += 10;
        }
        assert_eq!(v, [10, 11, 12, 13, 14]);
    }

    #[test]
    fn into_iter_from_both_ends() {
        let v: StableVec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let mut it = v.into_iter();
        assert_eq!(it.next().as_deref(), Some("a"));
        assert_eq!(it.next_back().as_deref(), Some("d"));
        assert_eq!(format!("{it:?}"), r#"IntoIter(["b", "c"])"#);
        assert_eq!(it.collect::<Vec<_>>(), ["b", "c"]);
    }

    #[test]
    fn dropping_early_frees_the_rest() {
        let rc = Rc::new(());
        let v: StableVec<Rc<()>> = (0..5).map(|_| Rc::clone(&rc)).collect();
        let mut it = v.into_iter();
        let kept = it.next_back();
        drop(it);
        assert_eq!(Rc::strong_count(&rc), 2);
        drop(kept);
        assert_eq!(Rc::strong_count(&rc), 1);
    }
}
