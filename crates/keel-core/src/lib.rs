//! Core building blocks for the Keel containers.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! pieces both sequence types are built from:
//!
//! ```text
//! Allocator (capability + propagation policy)
//! ├── Global            (std::alloc, always equal, always propagates)
//! └── RawBuf<T>         (ptr + capacity, allocator passed in per call)
//!
//! growth::next_capacity (2x doubling, never below the request)
//! destroy_range         (panic-safe bulk destruction through the allocator)
//! CapacityError / InsertError<T> / OutOfRange / AllocError
//! ```
//!
//! Containers own their allocator and one or more [`RawBuf`]s. Keeping the
//! allocator outside the buffer lets a container decide, per operation,
//! whether storage and allocator travel together.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod alloc;
pub mod error;
pub mod growth;
pub mod raw;

pub use alloc::{can_steal_on_move, can_swap_storage, Allocator, Global};
pub use error::{infallible, AllocError, CapacityError, InsertError, OutOfRange};
pub use raw::{destroy_range, RawBuf};
