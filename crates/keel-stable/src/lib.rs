//! A vector whose elements keep their addresses.
//!
//! [`StableVec<T, A>`](StableVec) stores every element in its own node and
//! orders them through a contiguous index of node pointers:
//!
//! ```text
//! StableVec<T, A>
//! ├── index: RawBuf<NodePtr<T>>   grows by doubling, moves pointers only
//! ├── len
//! └── A: Allocator                index and nodes come from here
//!
//!   index [ p0 | p1 | p2 | ... ]
//!            │    │    │
//!            ▼    ▼    ▼
//!          Node { value, slot, generation }   slot == position in the index
//! ```
//!
//! Inserting or removing at one position shifts index entries and rewrites
//! the `slot` back-reference of each shifted node; the nodes themselves
//! never move. Only removing an element invalidates its address.
//!
//! Use [`StableRef`] to keep hold of an element across mutations.
//!
//! # Features
//!
//! - `invariant-checks`: run [`StableVec::check_invariants`] after every
//!   mutation in debug builds.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod check;
pub mod handle;
pub mod iter;
mod macros;
mod node;
mod stable_vec;
pub mod transfer;

pub use check::InvariantViolation;
pub use handle::StableRef;
pub use iter::{IntoIter, Iter, IterMut};
pub use stable_vec::StableVec;

pub use keel_core::{Allocator, CapacityError, Global, InsertError, OutOfRange};
