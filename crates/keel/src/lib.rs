//! Keel: allocator-aware vectors with inline storage or stable addresses.
//!
//! This facade re-exports the public API of the keel sub-crates. Most users
//! only need this crate and its [`prelude`].
//!
//! # Quick start
//!
//! ```rust
//! use keel::prelude::*;
//!
//! // Up to four elements live inside the vector itself.
//! let mut small: SmallVec<u32, 4> = small_vec![1, 2, 3];
//! small.push(4);
//! assert_eq!(small.storage_mode(), StorageMode::Inline);
//! small.push(5);
//! assert!(small.spilled());
//!
//! // Elements of a StableVec never move.
//! let mut stable: StableVec<String> = stable_vec!["b".to_string()];
//! let b = stable.stable_ref(0).unwrap();
//! let addr: *const String = &stable[0];
//! stable.insert(0, "a".to_string());
//! assert_eq!(stable.resolve(b), Some(1));
//! assert!(std::ptr::eq(&stable[1], addr));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`raw`] | `keel-core` | `Allocator`, `Global`, `RawBuf`, growth policy, errors |
//! | [`small`] | `keel-small` | `SmallVec`, `SmallVecBase`, owning iterator |
//! | [`stable`] | `keel-stable` | `StableVec`, `StableRef`, iterators, invariant checker |
//!
//! # Features
//!
//! - `invariant-checks`: forwarded to `keel-stable`; re-verifies every
//!   `StableVec` after each mutation in debug builds.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Allocator capability, raw buffer and errors (`keel-core`).
///
/// Implement [`raw::Allocator`] to plug a custom allocator into either
/// container.
pub use keel_core as raw;

/// Vector with inline storage for `N` elements (`keel-small`).
pub use keel_small as small;

/// Vector whose elements keep their addresses (`keel-stable`).
pub use keel_stable as stable;

pub use keel_small::small_vec;
pub use keel_stable::stable_vec;

/// Common imports.
///
/// ```rust
/// use keel::prelude::*;
/// ```
pub mod prelude {
    // Allocators
    pub use keel_core::{Allocator, Global};

    // Errors
    pub use keel_core::{CapacityError, InsertError, OutOfRange};

    // Containers
    pub use keel_small::{SmallVec, SmallVecBase, StorageMode};
    pub use keel_stable::{StableRef, StableVec};

    // Macros
    pub use keel_small::small_vec;
    pub use keel_stable::stable_vec;
}
