//! Individually allocated element nodes.
//!
//! Every element lives in its own [`Node`] obtained from the container's
//! allocator. The node never moves; only pointers to it are shuffled in
//! the index. `slot` is the back-reference: the node's current position in
//! the index. `generation` is drawn from a process-wide counter when the
//! node is made, so a node allocated at a freed node's address is still
//! told apart from it.

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

use keel_core::{Allocator, CapacityError, InsertError};

#[repr(C)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) slot: usize,
    pub(crate) generation: u64,
}

/// Source of node generations. Never reused within a process.
static NODE_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NODE_GENERATION.fetch_add(1, Ordering::Relaxed)
}

pub(crate) type NodePtr<T> = NonNull<Node<T>>;

#[inline]
fn layout<T>() -> Layout {
    Layout::new::<Node<T>>()
}

/// Allocate a node holding `value` at `slot`, or hand `value` back.
pub(crate) fn try_alloc_node<T, A: Allocator>(
    alloc: &A,
    value: T,
    slot: usize,
) -> Result<NodePtr<T>, InsertError<T>> {
    let layout = layout::<T>();
    match alloc.allocate(layout) {
        Ok(raw) => {
            let node = raw.cast::<Node<T>>();
            // SAFETY: fresh block sized and aligned for Node<T>.
            unsafe {
                alloc.construct(&raw mut (*node.as_ptr()).value, value);
                (&raw mut (*node.as_ptr()).slot).write(slot);
                (&raw mut (*node.as_ptr()).generation).write(next_generation());
            }
            Ok(node)
        }
        Err(_) => Err(InsertError {
            value,
            error: CapacityError::AllocationFailure { layout },
        }),
    }
}

/// [`try_alloc_node`], aborting on allocation failure like `Box::new`.
pub(crate) fn alloc_node<T, A: Allocator>(alloc: &A, value: T, slot: usize) -> NodePtr<T> {
    match try_alloc_node(alloc, value, slot) {
        Ok(node) => node,
        Err(e) => e.error.handle(),
    }
}

/// Move the value out of `node` and release the node.
///
/// # Safety
///
/// `node` came from `alloc` (or an equal allocator), holds a live value,
/// and is not used afterwards.
pub(crate) unsafe fn take_node<T, A: Allocator>(alloc: &A, node: NodePtr<T>) -> T {
    // SAFETY: caller contract.
    unsafe {
        let value = (&raw const (*node.as_ptr()).value).read();
        alloc.deallocate(node.cast(), layout::<T>());
        value
    }
}

/// Destroy the value in `node` and release the node, even if the
/// destructor panics.
///
/// # Safety
///
/// As for [`take_node`].
pub(crate) unsafe fn free_node<T, A: Allocator>(alloc: &A, node: NodePtr<T>) {
    struct Release<'a, T, A: Allocator>(&'a A, NodePtr<T>);

    impl<T, A: Allocator> Drop for Release<'_, T, A> {
        fn drop(&mut self) {
            // SAFETY: the node came from this allocator with this layout.
            unsafe { self.0.deallocate(self.1.cast(), layout::<T>()) }
        }
    }

    let _release = Release(alloc, node);
    // SAFETY: caller contract.
    unsafe { alloc.destroy(&raw mut (*node.as_ptr()).value) }
}

/// Free `count` nodes listed from `first` on. If one destructor panics the
/// rest are still freed.
///
/// # Safety
///
/// Every listed node satisfies [`free_node`]'s contract.
pub(crate) unsafe fn free_nodes<T, A: Allocator>(alloc: &A, first: *const NodePtr<T>, count: usize) {
    struct Rest<'a, T, A: Allocator> {
        alloc: &'a A,
        next: *const NodePtr<T>,
        end: *const NodePtr<T>,
    }

    impl<T, A: Allocator> Drop for Rest<'_, T, A> {
        fn drop(&mut self) {
            while self.next != self.end {
                // SAFETY: entries in [next, end) are still owned here.
                unsafe {
                    let node = *self.next;
                    self.next = self.next.add(1);
                    free_node(self.alloc, node);
                }
            }
        }
    }

    // SAFETY: caller guarantees `count` entries from `first`.
    let mut rest = Rest {
        alloc,
        next: first,
        end: unsafe { first.add(count) },
    };
    while rest.next != rest.end {
        // SAFETY: as above; `rest` finishes the list if this one panics.
        unsafe {
            let node = *rest.next;
            rest.next = rest.next.add(1);
            free_node(alloc, node);
        }
    }
}
