//! Deterministic workloads for the keel benchmarks.
//!
//! Every generator is seeded, so two runs of a benchmark touch the same
//! positions in the same order:
//!
//! - [`lengths`]: final lengths clustered around an inline capacity
//! - [`positions`]: insertion or removal points for a growing sequence
//! - [`Edit`] / [`edit_script`]: mixed insert/remove traffic

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed used by every benchmark unless it sweeps seeds itself.
pub const DEFAULT_SEED: u64 = 0x6b65_656c;

/// `count` lengths in `[0, 2 * around]`, so roughly half fit inline.
pub fn lengths(count: usize, around: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let span = 2 * around as u64 + 1;
    (0..count).map(|_| (rng.next_u64() % span) as usize).collect()
}

/// Positions for `count` successive insertions into a sequence that starts
/// empty: the i-th position is in `[0, i]`.
pub fn positions(count: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|i| (rng.next_u64() % (i as u64 + 1)) as usize)
        .collect()
}

/// One step of mixed traffic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edit {
    /// Insert at this position.
    Insert(usize),
    /// Remove at this position.
    Remove(usize),
}

/// A valid edit script starting from `initial` elements. Inserts outnumber
/// removals two to one; removals only happen on a non-empty sequence.
pub fn edit_script(initial: usize, count: usize, seed: u64) -> Vec<Edit> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut len = initial;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let roll = rng.next_u32() % 3;
        if roll == 0 && len > 0 {
            out.push(Edit::Remove((rng.next_u64() % len as u64) as usize));
            len -= 1;
        } else {
            out.push(Edit::Insert((rng.next_u64() % (len as u64 + 1)) as usize));
            len += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generators_are_deterministic() {
        assert_eq!(lengths(50, 8, 1), lengths(50, 8, 1));
        assert_eq!(positions(50, 2), positions(50, 2));
        assert_eq!(edit_script(5, 50, 3), edit_script(5, 50, 3));
    }

    #[test]
    fn lengths_stay_in_range() {
        assert!(lengths(1000, 8, DEFAULT_SEED).iter().all(|&n| n <= 16));
    }

    #[test]
    fn positions_are_valid_for_a_growing_sequence() {
        for (i, &p) in positions(500, DEFAULT_SEED).iter().enumerate() {
            assert!(p <= i);
        }
    }

    #[test]
    fn edit_scripts_replay_against_a_vec() {
        let mut v: Vec<u32> = (0..10).collect();
        for e in edit_script(10, 2000, DEFAULT_SEED) {
            match e {
                Edit::Insert(i) => v.insert(i, 0),
                Edit::Remove(i) => {
                    v.remove(i);
                }
            }
        }
    }
}
