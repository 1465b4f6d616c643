//! A vector with inline storage for small sizes.
//!
//! [`SmallVec<T, N, A>`](SmallVec) keeps up to `N` elements inside the
//! value itself and moves them to a block from the allocator `A` when it
//! grows past that. Apart from the storage mode it behaves like `Vec<T>`.
//!
//! ```text
//! SmallVec<T, N, A>
//! ├── len
//! ├── Storage<T, N>
//! │   ├── Inline([MaybeUninit<T>; N])   capacity == N
//! │   └── Dynamic(RawBuf<T>)            capacity  > N
//! └── A: Allocator                      propagated per its policy
//! ```
//!
//! # Storage modes
//!
//! The vector starts [`Inline`](StorageMode::Inline). The first growth past
//! `N` spills every element to the heap, after which the usual doubling
//! applies. Only [`shrink_to_fit`](SmallVec::shrink_to_fit) brings a
//! vector back inline, and only if at most `N` elements remain.
//!
//! # Allocators
//!
//! See the [`transfer`] module for how `clone_from`, `move_assign` and
//! `swap` treat allocators that do or do not propagate.
//!
//! [`SmallVecBase`] erases `N` so functions can accept a small vector of
//! any inline capacity.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod base;
pub mod iter;
mod macros;
mod small_vec;
mod storage;
pub mod transfer;

pub use base::SmallVecBase;
pub use iter::IntoIter;
pub use small_vec::SmallVec;
pub use storage::StorageMode;

pub use keel_core::{Allocator, CapacityError, Global, InsertError, OutOfRange};
