//! Owning iterator.

use std::fmt;
use std::iter::FusedIterator;
use std::ptr;
use std::slice;

use keel_core::{destroy_range, Allocator};

use crate::SmallVec;

/// Iterator that moves elements out of a [`SmallVec`].
///
/// Holds the vector with its length set to zero, so only the storage is
/// released when the vector itself drops; `[start, end)` are the elements
/// not yet yielded.
pub struct IntoIter<T, const N: usize, A: Allocator> {
    vec: SmallVec<T, N, A>,
    start: usize,
    end: usize,
}

impl<T, const N: usize, A: Allocator> IntoIter<T, N, A> {
    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: [start, end) are still initialized and owned here.
        unsafe { slice::from_raw_parts(self.vec.as_ptr().add(self.start), self.end - self.start) }
    }

    /// The remaining elements, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as for `as_slice`.
        unsafe {
            slice::from_raw_parts_mut(self.vec.as_mut_ptr().add(self.start), self.end - self.start)
        }
    }

    /// The allocator of the drained vector.
    pub fn allocator(&self) -> &A {
        self.vec.allocator()
    }
}

impl<T, const N: usize, A: Allocator> IntoIterator for SmallVec<T, N, A> {
    type Item = T;
    type IntoIter = IntoIter<T, N, A>;

    fn into_iter(mut self) -> Self::IntoIter {
        let end = std::mem::replace(&mut self.len, 0);
        IntoIter {
            vec: self,
            start: 0,
            end,
        }
    }
}

impl<T, const N: usize, A: Allocator> Iterator for IntoIter<T, N, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: `start` is inside the unyielded range and leaves it.
        let value = unsafe { ptr::read(self.vec.as_ptr().add(self.start)) };
        self.start += 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.start;
        (n, Some(n))
    }

    #[inline]
    fn count(self) -> usize {
        self.len()
    }
}

impl<T, const N: usize, A: Allocator> DoubleEndedIterator for IntoIter<T, N, A> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: `end` was the last unyielded slot.
        Some(unsafe { ptr::read(self.vec.as_ptr().add(self.end)) })
    }
}

impl<T, const N: usize, A: Allocator> ExactSizeIterator for IntoIter<T, N, A> {}

impl<T, const N: usize, A: Allocator> FusedIterator for IntoIter<T, N, A> {}

impl<T, const N: usize, A: Allocator> Drop for IntoIter<T, N, A> {
    fn drop(&mut self) {
        let (start, end) = (self.start, self.end);
        self.start = end;
        // SAFETY: [start, end) were never yielded; `start` is already moved
        // past them so they are not touched again.
        unsafe {
            let first = self.vec.as_mut_ptr().add(start);
            destroy_range(&self.vec.alloc, first, end - start);
        }
    }
}

impl<T: fmt::Debug, const N: usize, A: Allocator> fmt::Debug for IntoIter<T, N, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
