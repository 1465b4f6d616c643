//! The allocator capability injected into every Keel container.
//!
//! Containers are generic over an [`Allocator`]. The trait bundles the block
//! allocation primitives with the element construction hooks and the three
//! propagation policies that decide what happens to the allocator itself
//! when a container is copied, move-assigned, or swapped.

use std::alloc::Layout;
use std::ptr::{self, NonNull};

use crate::error::AllocError;

/// A source of memory blocks plus its ownership-transfer policy.
///
/// # Propagation
///
/// | Constant | Consulted by | `true` | `false` |
/// |----------|--------------|--------|---------|
/// | [`PROPAGATE_ON_COPY`](Self::PROPAGATE_ON_COPY) | `clone_from` | target adopts the source allocator | target keeps its allocator |
/// | [`PROPAGATE_ON_MOVE`](Self::PROPAGATE_ON_MOVE) | `move_assign` | storage is stolen | storage is stolen only if [`is_equal`](Self::is_equal), else elements are moved one by one |
/// | [`PROPAGATE_ON_SWAP`](Self::PROPAGATE_ON_SWAP) | `swap` | allocators are exchanged with the storage | storage is exchanged only if [`is_equal`](Self::is_equal), else contents are exchanged element-wise |
///
/// Plain construction by clone always asks the source for
/// [`select_on_copy`](Self::select_on_copy).
///
/// # Safety
///
/// Implementors must return blocks that are valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and that stay valid
/// until passed to [`deallocate`](Self::deallocate) on this allocator or on
/// one for which [`is_equal`](Self::is_equal) returns `true`. Cloning an
/// allocator must produce one that compares equal to the original.
pub unsafe trait Allocator: Clone {
    /// Whether `clone_from` transfers the source's allocator.
    const PROPAGATE_ON_COPY: bool = false;

    /// Whether `move_assign` transfers the source's allocator.
    const PROPAGATE_ON_MOVE: bool = true;

    /// Whether `swap` exchanges allocators.
    const PROPAGATE_ON_SWAP: bool = false;

    /// Allocate a block for `layout`. `layout.size()` is never zero.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Return a block obtained from [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must have been allocated by this allocator (or an equal one)
    /// with exactly `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Move `value` into the uninitialized slot at `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must be valid for writes and properly aligned.
    #[inline]
    unsafe fn construct<T>(&self, slot: *mut T, value: T) {
        unsafe { slot.write(value) }
    }

    /// Run the destructor of the value at `slot`, leaving it uninitialized.
    ///
    /// # Safety
    ///
    /// `slot` must hold an initialized value that is not used afterwards.
    #[inline]
    unsafe fn destroy<T>(&self, slot: *mut T) {
        unsafe { ptr::drop_in_place(slot) }
    }

    /// The allocator a freshly cloned container should use.
    #[inline]
    fn select_on_copy(&self) -> Self {
        self.clone()
    }

    /// Whether blocks from `self` may be freed through `other` and vice versa.
    fn is_equal(&self, other: &Self) -> bool;
}

/// The process-wide heap, via [`std::alloc`].
///
/// Stateless: every instance is equal to every other, so all container
/// transfers are O(1) pointer exchanges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Global;

unsafe impl Allocator for Global {
    const PROPAGATE_ON_COPY: bool = true;
    const PROPAGATE_ON_MOVE: bool = true;
    const PROPAGATE_ON_SWAP: bool = true;

    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() != 0, "zero-sized allocation");
        // SAFETY: layout has non-zero size (callers never request ZST blocks).
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller guarantees ptr came from `allocate` with `layout`.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }

    #[inline]
    fn is_equal(&self, _other: &Self) -> bool {
        true
    }
}

/// Whether two containers with these allocators may exchange raw storage
/// during a move-assignment.
#[inline]
pub fn can_steal_on_move<A: Allocator>(dst: &A, src: &A) -> bool {
    A::PROPAGATE_ON_MOVE || dst.is_equal(src)
}

/// Whether two containers with these allocators may exchange raw storage
/// during a swap.
#[inline]
pub fn can_swap_storage<A: Allocator>(a: &A, b: &A) -> bool {
    A::PROPAGATE_ON_SWAP || a.is_equal(b)
}
