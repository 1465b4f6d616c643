//! The two storage modes of a [`SmallVec`](crate::SmallVec).

use std::mem::MaybeUninit;

use keel_core::RawBuf;

/// Which buffer currently holds a small vector's elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageMode {
    /// Elements live in the array embedded in the vector itself.
    Inline,
    /// Elements live in a block obtained from the allocator.
    Dynamic,
}

/// Exactly one buffer is authoritative at a time.
///
/// A `Dynamic` buffer always has a capacity greater than `N`: the vector
/// never keeps a heap block it could fit inline.
pub(crate) enum Storage<T, const N: usize> {
    Inline([MaybeUninit<T>; N]),
    Dynamic(RawBuf<T>),
}

impl<T, const N: usize> Storage<T, N> {
    #[inline]
    pub(crate) const fn inline() -> Self {
        Storage::Inline([const { MaybeUninit::uninit() }; N])
    }

    #[inline]
    pub(crate) fn mode(&self) -> StorageMode {
        match self {
            Storage::Inline(_) => StorageMode::Inline,
            Storage::Dynamic(_) => StorageMode::Dynamic,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        match self {
            Storage::Inline(_) => N,
            Storage::Dynamic(buf) => buf.capacity(),
        }
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const T {
        match self {
            Storage::Inline(slots) => slots.as_ptr().cast(),
            Storage::Dynamic(buf) => buf.ptr(),
        }
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut T {
        match self {
            Storage::Inline(slots) => slots.as_mut_ptr().cast(),
            Storage::Dynamic(buf) => buf.ptr(),
        }
    }
}
