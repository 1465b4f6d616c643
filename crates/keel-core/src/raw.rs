//! Allocator-backed contiguous storage without length tracking.
//!
//! [`RawBuf`] owns a pointer and a capacity, nothing else. It does not hold
//! an allocator and does not free itself: the owning container passes its
//! allocator into every call and decides when the block is released. This
//! keeps the allocator in one place so it can be propagated or kept
//! independently of the storage during copy, move, and swap.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};

use crate::alloc::Allocator;
use crate::error::CapacityError;
use crate::growth::max_len;

/// An uninitialized block of `capacity` slots of `T`.
///
/// Zero-sized `T` never touches the allocator and reports a capacity of
/// `usize::MAX` once "allocated".
pub struct RawBuf<T> {
    ptr: NonNull<T>,
    cap: usize,
    _marker: PhantomData<T>,
}

impl<T> RawBuf<T> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// An unallocated buffer with capacity zero.
    #[inline]
    pub const fn dangling() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            _marker: PhantomData,
        }
    }

    /// Allocate room for exactly `capacity` elements.
    ///
    /// A zero `capacity` yields [`RawBuf::dangling`].
    pub fn try_with_capacity<A: Allocator>(
        alloc: &A,
        capacity: usize,
    ) -> Result<Self, CapacityError> {
        if capacity == 0 {
            return Ok(Self::dangling());
        }
        if Self::IS_ZST {
            return Ok(Self {
                ptr: NonNull::dangling(),
                cap: usize::MAX,
                _marker: PhantomData,
            });
        }
        let layout = Self::layout_for(capacity)?;
        let ptr = alloc
            .allocate(layout)
            .map_err(|_| CapacityError::AllocationFailure { layout })?;
        Ok(Self {
            ptr: ptr.cast(),
            cap: capacity,
            _marker: PhantomData,
        })
    }

    fn layout_for(capacity: usize) -> Result<Layout, CapacityError> {
        Layout::array::<T>(capacity).map_err(|_| CapacityError::LengthExceeded {
            requested: capacity,
            max: max_len::<T>(),
        })
    }

    /// Pointer to the first slot.
    #[inline]
    pub const fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Number of slots in the block.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.cap
    }

    /// Whether a real block is held (always `false` for zero-sized `T`).
    #[inline]
    pub const fn is_allocated(&self) -> bool {
        !Self::IS_ZST && self.cap != 0
    }

    /// Move the first `len` slots into a fresh block of `new_capacity`.
    ///
    /// On failure `self` is untouched (strong guarantee).
    ///
    /// # Safety
    ///
    /// `len <= self.capacity()`, `len <= new_capacity`, and the slots
    /// `[0, len)` are initialized. `alloc` must be the allocator this buffer
    /// was obtained from (or an equal one).
    pub unsafe fn try_relocate<A: Allocator>(
        &mut self,
        alloc: &A,
        len: usize,
        new_capacity: usize,
    ) -> Result<(), CapacityError> {
        debug_assert!(len <= self.cap && len <= new_capacity);
        let fresh = Self::try_with_capacity(alloc, new_capacity)?;
        // SAFETY: distinct blocks, both valid for `len` elements.
        unsafe {
            ptr::copy_nonoverlapping(self.ptr(), fresh.ptr(), len);
            self.deallocate(alloc);
        }
        *self = fresh;
        Ok(())
    }

    /// Release the block and reset to [`RawBuf::dangling`].
    ///
    /// Elements still in the block are forgotten, not dropped.
    ///
    /// # Safety
    ///
    /// `alloc` must be the allocator this buffer was obtained from (or an
    /// equal one).
    pub unsafe fn deallocate<A: Allocator>(&mut self, alloc: &A) {
        if self.is_allocated() {
            // SAFETY: cap was accepted by `layout_for` when the block was made.
            let layout = unsafe { Layout::array::<T>(self.cap).unwrap_unchecked() };
            unsafe { alloc.deallocate(self.ptr.cast(), layout) };
        }
        *self = Self::dangling();
    }

    /// Take the block out, leaving [`RawBuf::dangling`] behind.
    #[inline]
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::dangling())
    }
}

/// Destroy `len` consecutive values starting at `first` through `alloc`.
///
/// If one destructor panics the remaining values are still destroyed before
/// the panic continues.
///
/// # Safety
///
/// `[first, first + len)` must hold initialized values that are not used
/// afterwards.
pub unsafe fn destroy_range<T, A: Allocator>(alloc: &A, first: *mut T, len: usize) {
    struct Rest<'a, T, A: Allocator> {
        alloc: &'a A,
        next: *mut T,
        end: *mut T,
    }

    impl<T, A: Allocator> Drop for Rest<'_, T, A> {
        fn drop(&mut self) {
            while self.next != self.end {
                let slot = self.next;
                // SAFETY: slots in [next, end) are initialized and owned here.
                unsafe {
                    self.next = self.next.add(1);
                    self.alloc.destroy(slot);
                }
            }
        }
    }

    // SAFETY: caller guarantees the range is in bounds.
    let mut rest = Rest {
        alloc,
        next: first,
        end: unsafe { first.add(len) },
    };
    while rest.next != rest.end {
        let slot = rest.next;
        // SAFETY: as above; `rest` finishes the range if this destructor panics.
        unsafe {
            rest.next = rest.next.add(1);
            alloc.destroy(slot);
        }
    }
}

impl<T> std::fmt::Debug for RawBuf<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBuf")
            .field("ptr", &self.ptr)
            .field("capacity", &self.cap)
            .finish()
    }
}

// SAFETY: RawBuf is a uniquely owned block; thread-safety follows T.
unsafe impl<T: Send> Send for RawBuf<T> {}
unsafe impl<T: Sync> Sync for RawBuf<T> {}
