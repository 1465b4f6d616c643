//! Structural self-check.
//!
//! With the `invariant-checks` feature and debug assertions on, every
//! mutating operation ends with [`StableVec::check_invariants`] and panics
//! on the first violation. The check is always callable directly.

use std::error::Error;
use std::fmt;

use indexmap::IndexSet;
use keel_core::Allocator;

use crate::StableVec;

/// A broken structural invariant of a [`StableVec`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// More elements than index slots.
    LengthExceedsCapacity {
        /// Element count.
        len: usize,
        /// Index capacity.
        capacity: usize,
    },
    /// The same node is listed at two positions.
    DuplicateNode {
        /// Earlier position.
        first: usize,
        /// Later position.
        second: usize,
    },
    /// A node's back-reference does not match its position.
    BackReference {
        /// Position in the index.
        slot: usize,
        /// Position the node has on record.
        recorded: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthExceedsCapacity { len, capacity } => {
                write!(f, "length {len} exceeds index capacity {capacity}")
            }
            Self::DuplicateNode { first, second } => {
                write!(f, "node at slot {second} already listed at slot {first}")
            }
            Self::BackReference { slot, recorded } => {
                write!(f, "node at slot {slot} records slot {recorded}")
            }
        }
    }
}

impl Error for InvariantViolation {}

impl<T, A: Allocator> StableVec<T, A> {
    /// Verify that the index and the nodes agree. O(len).
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.len > self.capacity() {
            return Err(InvariantViolation::LengthExceedsCapacity {
                len: self.len,
                capacity: self.capacity(),
            });
        }
        let mut seen = IndexSet::with_capacity(self.len);
        for (slot, node) in self.slots().iter().enumerate() {
            let (first, fresh) = seen.insert_full(node.as_ptr() as usize);
            if !fresh {
                return Err(InvariantViolation::DuplicateNode {
                    first,
                    second: slot,
                });
            }
            // SAFETY: listed nodes are live.
            let recorded = unsafe { (*node.as_ptr()).slot };
            if recorded != slot {
                return Err(InvariantViolation::BackReference { slot, recorded });
            }
        }
        Ok(())
    }
}
