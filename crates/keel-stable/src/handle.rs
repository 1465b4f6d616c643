//! Element handles that survive mutation of the vector.
//!
//! A `&T` into a [`StableVec`] cannot be held across `&mut self` calls even
//! though the element would not move. A [`StableRef`] names the element's
//! node instead: it is `Copy`, holds no borrow, and stays meaningful for
//! as long as the element is in the vector, wherever its position moves.
//! The node's generation travels with it, in the spirit of a
//! generation-scoped arena handle.

use std::fmt;
use std::hash::{Hash, Hasher};

use keel_core::Allocator;

use crate::node::NodePtr;
use crate::StableVec;

/// Identity of one element of a [`StableVec`].
///
/// Becomes dangling once the element is removed or the vector is dropped.
/// The safe [`StableVec::resolve`] and [`StableVec::get_by_ref`] check
/// membership before touching the node and compare the node's generation,
/// so a stale handle fails to resolve even when a new element has been
/// allocated at the old address.
pub struct StableRef<T> {
    node: NodePtr<T>,
    generation: u64,
}

impl<T> Clone for StableRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StableRef<T> {}

impl<T> PartialEq for StableRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.generation == other.generation
    }
}

impl<T> Eq for StableRef<T> {}

impl<T> Hash for StableRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for StableRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StableRef")
            .field("node", &self.node.as_ptr())
            .field("generation", &self.generation)
            .finish()
    }
}

impl<T, A: Allocator> StableVec<T, A> {
    /// A handle to the element at `index`.
    pub fn stable_ref(&self, index: usize) -> Option<StableRef<T>> {
        self.slots().get(index).map(|&node| StableRef {
            node,
            // SAFETY: listed nodes are live.
            generation: unsafe { (*node.as_ptr()).generation },
        })
    }

    /// Current position of the element `r` names, or `None` if it is not in
    /// this vector. O(len).
    pub fn resolve(&self, r: StableRef<T>) -> Option<usize> {
        self.slots().iter().position(|&node| {
            // SAFETY: listed nodes are live.
            node == r.node && unsafe { (*node.as_ptr()).generation } == r.generation
        })
    }

    /// The element `r` names, if it is in this vector.
    pub fn get_by_ref(&self, r: StableRef<T>) -> Option<&T> {
        self.resolve(r).and_then(|i| self.get(i))
    }

    /// Mutable [`get_by_ref`](Self::get_by_ref).
    pub fn get_by_ref_mut(&mut self, r: StableRef<T>) -> Option<&mut T> {
        match self.resolve(r) {
            Some(i) => self.get_mut(i),
            None => None,
        }
    }

    /// Current position of `r`'s element in O(1), read from the node's
    /// back-reference.
    ///
    /// # Safety
    ///
    /// `r` was taken from this vector and its element has not been removed.
    pub unsafe fn position_unchecked(&self, r: StableRef<T>) -> usize {
        // SAFETY: caller contract; the node is live.
        unsafe { (*r.node.as_ptr()).slot }
    }

    /// The element `r` names, without a membership check.
    ///
    /// # Safety
    ///
    /// As for [`position_unchecked`](Self::position_unchecked).
    pub unsafe fn get_ref(&self, r: StableRef<T>) -> &T {
        // SAFETY: caller contract.
        unsafe { &(*r.node.as_ptr()).value }
    }

    /// Mutable [`get_ref`](Self::get_ref).
    ///
    /// # Safety
    ///
    /// As for [`position_unchecked`](Self::position_unchecked).
    pub unsafe fn get_ref_mut(&mut self, r: StableRef<T>) -> &mut T {
        // SAFETY: caller contract; `&mut self` makes the access unique.
        unsafe { &mut (*r.node.as_ptr()).value }
    }
}
