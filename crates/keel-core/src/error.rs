//! Error types shared by the Keel containers.
//!
//! Failures fall into three groups: the allocator refused a block, a
//! requested length cannot be represented, or a checked access was out of
//! bounds. Element panics are never caught or translated.

use std::alloc::Layout;
use std::error::Error;
use std::fmt;

/// The allocator could not satisfy a request.
///
/// Carries no detail: the allocator decides whether to retry, the
/// containers never do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memory allocation failed")
    }
}

impl Error for AllocError {}

/// Errors from operations that may grow a container's storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapacityError {
    /// The allocator returned [`AllocError`] for `layout`.
    AllocationFailure {
        /// The layout that was requested.
        layout: Layout,
    },
    /// The requested length exceeds what the container can represent.
    LengthExceeded {
        /// Number of elements requested.
        requested: usize,
        /// Largest representable element count.
        max: usize,
    },
}

impl CapacityError {
    /// Convert to the standard library's failure behaviour.
    ///
    /// `LengthExceeded` panics with "capacity overflow";
    /// `AllocationFailure` calls [`std::alloc::handle_alloc_error`].
    #[cold]
    #[track_caller]
    pub fn handle(self) -> ! {
        match self {
            Self::LengthExceeded { .. } => panic!("capacity overflow"),
            Self::AllocationFailure { layout } => std::alloc::handle_alloc_error(layout),
        }
    }
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailure { layout } => {
                write!(
                    f,
                    "allocation of {} bytes (align {}) failed",
                    layout.size(),
                    layout.align()
                )
            }
            Self::LengthExceeded { requested, max } => {
                write!(f, "length {requested} exceeds maximum {max}")
            }
        }
    }
}

impl Error for CapacityError {}

/// A checked access named a position past the end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfRange {
    /// The position requested.
    pub index: usize,
    /// The container length at the time of the access.
    pub len: usize,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index {} out of range for length {}", self.index, self.len)
    }
}

impl Error for OutOfRange {}

/// A fallible insertion failed; the value is handed back untouched.
#[derive(Clone, PartialEq, Eq)]
pub struct InsertError<T> {
    /// The element that could not be inserted.
    pub value: T,
    /// Why the container could not make room.
    pub error: CapacityError,
}

impl<T> InsertError<T> {
    /// Recover the rejected element.
    #[inline]
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> fmt::Debug for InsertError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for InsertError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "insert failed: {}", self.error)
    }
}

impl<T> Error for InsertError<T> {}

/// Unwrap a growth result the way `Vec` does: panic or abort, never return.
#[inline]
#[track_caller]
pub fn infallible<T>(result: Result<T, CapacityError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => e.handle(),
    }
}
