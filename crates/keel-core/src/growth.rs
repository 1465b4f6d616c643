//! Capacity growth policy shared by both containers.
//!
//! Capacity doubles on each reallocation, never falls below the requested
//! length, and starts at a small minimum so tiny vectors do not reallocate
//! on every push. Any super-linear factor keeps `push` amortized O(1); two
//! is used throughout.

use std::mem;

use crate::error::CapacityError;

/// Multiplier applied to the current capacity on growth.
pub const GROWTH_FACTOR: usize = 2;

/// Smallest non-zero capacity for elements up to [`LARGE_ELEMENT_BYTES`].
pub const MIN_NON_ZERO_CAP: usize = 4;

/// Elements larger than this start with a capacity of one.
pub const LARGE_ELEMENT_BYTES: usize = 1024;

/// Largest element count a contiguous buffer of `T` can describe.
///
/// Zero-sized types are bounded only by `usize`.
#[inline]
pub const fn max_len<T>() -> usize {
    let size = mem::size_of::<T>();
    if size == 0 {
        usize::MAX
    } else {
        isize::MAX as usize / size
    }
}

#[inline]
const fn min_non_zero_cap<T>() -> usize {
    if mem::size_of::<T>() > LARGE_ELEMENT_BYTES {
        1
    } else {
        MIN_NON_ZERO_CAP
    }
}

/// `len + additional`, or `LengthExceeded` if it overflows or passes
/// [`max_len`].
#[inline]
pub fn required_len<T>(len: usize, additional: usize) -> Result<usize, CapacityError> {
    let max = max_len::<T>();
    match len.checked_add(additional) {
        Some(required) if required <= max => Ok(required),
        Some(required) => Err(CapacityError::LengthExceeded { requested: required, max }),
        None => Err(CapacityError::LengthExceeded {
            requested: usize::MAX,
            max,
        }),
    }
}

/// The capacity to allocate when `current` cannot hold `required` elements.
///
/// Returns at least `required`, at least `current * GROWTH_FACTOR` (clamped
/// to [`max_len`]), and at least the minimum non-zero capacity.
#[inline]
pub fn next_capacity<T>(current: usize, required: usize) -> Result<usize, CapacityError> {
    let max = max_len::<T>();
    if required > max {
        return Err(CapacityError::LengthExceeded { requested: required, max });
    }
    let doubled = current.saturating_mul(GROWTH_FACTOR).min(max);
    Ok(doubled.max(required).max(min_non_zero_cap::<T>().min(max)))
}
