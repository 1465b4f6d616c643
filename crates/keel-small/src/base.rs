//! A view of a small vector that does not name its inline capacity.
//!
//! `SmallVec<T, 4>` and `SmallVec<T, 16>` are different types. Code that
//! only needs to read, append or clear can take `&mut dyn SmallVecBase<T>`
//! and accept either.

use keel_core::{Allocator, Global};

use crate::{SmallVec, StorageMode};

/// Object-safe operations shared by every `SmallVec<T, N, A>`.
pub trait SmallVecBase<T, A: Allocator = Global> {
    /// The elements.
    fn as_slice(&self) -> &[T];

    /// The elements, mutably.
    fn as_mut_slice(&mut self) -> &mut [T];

    /// Slots available without reallocating.
    fn capacity(&self) -> usize;

    /// The `N` of the underlying vector.
    fn inline_capacity(&self) -> usize;

    /// Which buffer holds the elements.
    fn storage_mode(&self) -> StorageMode;

    /// The allocator backing heap storage.
    fn allocator(&self) -> &A;

    /// Append `value`.
    fn push(&mut self, value: T);

    /// Remove the last element.
    fn pop(&mut self) -> Option<T>;

    /// Drop everything from `len` on.
    fn truncate(&mut self, len: usize);

    /// Make room for `additional` more elements.
    fn reserve(&mut self, additional: usize);

    /// Number of elements.
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether there are no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every element.
    fn clear(&mut self) {
        self.truncate(0);
    }
}

impl<T, const N: usize, A: Allocator> SmallVecBase<T, A> for SmallVec<T, N, A> {
    fn as_slice(&self) -> &[T] {
        SmallVec::as_slice(self)
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        SmallVec::as_mut_slice(self)
    }

    fn capacity(&self) -> usize {
        SmallVec::capacity(self)
    }

    fn inline_capacity(&self) -> usize {
        N
    }

    fn storage_mode(&self) -> StorageMode {
        SmallVec::storage_mode(self)
    }

    fn allocator(&self) -> &A {
        SmallVec::allocator(self)
    }

    fn push(&mut self, value: T) {
        SmallVec::push(self, value);
    }

    fn pop(&mut self) -> Option<T> {
        SmallVec::pop(self)
    }

    fn truncate(&mut self, len: usize) {
        SmallVec::truncate(self, len);
    }

    fn reserve(&mut self, additional: usize) {
        SmallVec::reserve(self, additional);
    }
}

impl<T: Clone, const N: usize, A: Allocator> SmallVec<T, N, A> {
    /// Copy-construct from a small vector of any inline capacity.
    ///
    /// The allocator comes from the source's
    /// [`select_on_copy`](Allocator::select_on_copy).
    pub fn from_base<B: SmallVecBase<T, A> + ?Sized>(base: &B) -> Self {
        Self::from_slice_in(base.as_slice(), base.allocator().select_on_copy())
    }

    /// Copy-assign from a small vector of any inline capacity, with the
    /// same allocator handling as [`clone_from`](Clone::clone_from).
    pub fn assign_from_base<B: SmallVecBase<T, A> + ?Sized>(&mut self, base: &B) {
        self.assign_clone(base.as_slice(), base.allocator());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(v: &mut dyn SmallVecBase<i32>, n: i32) {
        v.clear();
        for i in 0..n {
            v.push(i);
        }
    }

    #[test]
    fn erases_the_inline_capacity() {
        let mut a = SmallVec::<i32, 2>::new();
        let mut b = SmallVec::<i32, 16>::new();
        fill(&mut a, 5);
        fill(&mut b, 5);
        assert_eq!(a.as_slice(), b.as_slice());
        assert_eq!(SmallVecBase::storage_mode(&a), StorageMode::Dynamic);
        assert_eq!(SmallVecBase::storage_mode(&b), StorageMode::Inline);
        let base: &dyn SmallVecBase<i32> = &b;
        assert_eq!(base.inline_capacity(), 16);
        assert_eq!(base.len(), 5);
    }

    #[test]
    fn from_and_assign_from_base() {
        let src: SmallVec<i32, 8> = (0..6).collect();
        let copy = SmallVec::<i32, 3>::from_base(&src);
        assert_eq!(copy, [0, 1, 2, 3, 4, 5]);
        assert!(copy.spilled());

        let mut dst: SmallVec<i32, 3> = (10..20).collect();
        let short: SmallVec<i32, 1> = (7..9).collect();
        dst.assign_from_base(&short);
        assert_eq!(dst, [7, 8]);
    }
}
