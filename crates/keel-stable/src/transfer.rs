//! Copy, move-assign and swap under the allocator's propagation policy.
//!
//! A stable vector owns two kinds of memory from its allocator: the index
//! and one node per element. Handing storage to another vector therefore
//! hands over all of it, and is only allowed when the receiving side will
//! free it through an allocator equal to the one that made it. When that
//! is not the case the values themselves travel, each into a fresh node
//! from the receiving side's allocator, and their addresses change.

use std::mem;

use keel_core::{can_steal_on_move, can_swap_storage, Allocator};

use crate::node::{alloc_node, take_node};
use crate::StableVec;

impl<T: Clone, A: Allocator> Clone for StableVec<T, A> {
    fn clone(&self) -> Self {
        let mut v = Self::with_capacity_in(self.len, self.alloc.select_on_copy());
        v.extend_cloned(self.iter());
        v
    }

    fn clone_from(&mut self, source: &Self) {
        if A::PROPAGATE_ON_COPY {
            if !self.alloc.is_equal(&source.alloc) {
                // Nodes and index go back to the allocator that made them.
                self.clear();
                self.release_index();
            }
            self.alloc = source.alloc.clone();
        }
        self.truncate(source.len);
        let kept = self.len;
        for (dst, src) in self.iter_mut().zip(source.iter()) {
            dst.clone_from(src);
        }
        self.extend_cloned(source.iter().skip(kept));
    }
}

impl<T: Clone, A: Allocator> StableVec<T, A> {
    fn extend_cloned<'a, I>(&mut self, iter: I)
    where
        I: ExactSizeIterator<Item = &'a T>,
        T: 'a,
    {
        self.reserve(iter.len());
        for x in iter {
            self.push(x.clone());
        }
    }
}

impl<T, A: Allocator> StableVec<T, A> {
    /// Move-assign: replace the contents of `self` with those of `source`.
    ///
    /// When the allocator propagates on move or the two are equal, `self`
    /// takes over `source`'s index and nodes, so every element keeps its
    /// address. Otherwise `self` keeps its allocator and each value moves
    /// into a new node.
    pub fn move_assign(&mut self, mut source: Self) {
        self.clear();
        if can_steal_on_move(&self.alloc, &source.alloc) {
            self.release_index();
            mem::swap(&mut self.index, &mut source.index);
            mem::swap(&mut self.len, &mut source.len);
            if A::PROPAGATE_ON_MOVE {
                mem::swap(&mut self.alloc, &mut source.alloc);
            }
        } else {
            self.take_values(&mut source);
        }
        self.debug_check();
    }

    /// Build a vector with `alloc` holding the elements of `source`.
    ///
    /// Nodes are adopted as they are when `alloc` equals `source`'s
    /// allocator; otherwise every value is moved into a node from `alloc`.
    pub fn from_moved_in(mut source: Self, alloc: A) -> Self {
        let mut v = Self::new_in(alloc);
        if v.alloc.is_equal(&source.alloc) {
            mem::swap(&mut v.index, &mut source.index);
            mem::swap(&mut v.len, &mut source.len);
        } else {
            v.take_values(&mut source);
        }
        v
    }

    /// Move every value of `source` into new nodes at the end of `self`.
    fn take_values(&mut self, source: &mut Self) {
        let n = mem::replace(&mut source.len, 0);
        self.reserve(n);
        for i in 0..n {
            // SAFETY: i < n; `source` no longer counts these entries.
            let value = unsafe { take_node(&source.alloc, source.node_at(i)) };
            let node = alloc_node(&self.alloc, value, self.len);
            // SAFETY: reserved above.
            unsafe { self.index.ptr().add(self.len).write(node) };
            self.len += 1;
        }
    }

    /// Exchange the contents of two vectors.
    ///
    /// With equal or swap-propagating allocators this is O(1) and no
    /// element moves; allocators are exchanged too when they propagate.
    /// With unequal non-propagating allocators each side keeps its
    /// allocator: values over the common prefix are swapped in place and
    /// the longer side's surplus moves into new nodes on the other side.
    pub fn swap(&mut self, other: &mut Self) {
        if can_swap_storage(&self.alloc, &other.alloc) {
            mem::swap(&mut self.index, &mut other.index);
            mem::swap(&mut self.len, &mut other.len);
            if A::PROPAGATE_ON_SWAP {
                mem::swap(&mut self.alloc, &mut other.alloc);
            }
            return;
        }
        let (short, long) = if self.len <= other.len {
            (self, other)
        } else {
            (other, self)
        };
        let common = short.len;
        for (a, b) in short.iter_mut().zip(long.iter_mut()) {
            mem::swap(a, b);
        }
        let surplus = long.len - common;
        short.reserve(surplus);
        long.len = common;
        for i in common..common + surplus {
            // SAFETY: entries [common, old long.len) left `long` above.
            let value = unsafe { take_node(&long.alloc, long.node_at(i)) };
            let node = alloc_node(&short.alloc, value, short.len);
            // SAFETY: reserved above.
            unsafe { short.index.ptr().add(short.len).write(node) };
            short.len += 1;
        }
        short.debug_check();
        long.debug_check();
    }
}
