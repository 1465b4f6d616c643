//! Random operation scripts for model-based property tests.
//!
//! A script is a `Vec<Op>`. Positions are stored raw and reduced modulo the
//! current length when applied, so every generated script is valid for any
//! container state. Apply the same script to the container under test and
//! to a `Vec<i32>` via [`Op::apply_to_vec`], then compare.

use proptest::prelude::*;

/// One mutation of a sequence of `i32`.
#[derive(Clone, Debug)]
pub enum Op {
    /// `push(x)`.
    Push(i32),
    /// `pop()`.
    Pop,
    /// `insert(pos, x)`; raw position.
    Insert(usize, i32),
    /// `remove(pos)`; raw position.
    Remove(usize),
    /// `swap_remove(pos)`; raw position.
    SwapRemove(usize),
    /// `truncate(len)`.
    Truncate(usize),
    /// `resize(len, x)`.
    Resize(usize, i32),
    /// `remove_range(a..b)`; raw bounds.
    RemoveRange(usize, usize),
    /// `reserve(additional)`.
    Reserve(usize),
    /// `shrink_to_fit()`.
    ShrinkToFit,
    /// `clear()`.
    Clear,
}

impl Op {
    /// Position for an insertion into a sequence of length `len`.
    pub fn insert_pos(raw: usize, len: usize) -> usize {
        raw % (len + 1)
    }

    /// Position of an existing element, or `None` if the sequence is empty.
    pub fn elem_pos(raw: usize, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(raw % len)
        }
    }

    /// Ordered `start..end` inside `0..=len`.
    pub fn range(a: usize, b: usize, len: usize) -> (usize, usize) {
        let a = a % (len + 1);
        let b = b % (len + 1);
        (a.min(b), a.max(b))
    }

    /// Apply to the reference model.
    pub fn apply_to_vec(&self, v: &mut Vec<i32>) {
        match *self {
            Op::Push(x) => v.push(x),
            Op::Pop => {
                v.pop();
            }
            Op::Insert(i, x) => {
                let i = Op::insert_pos(i, v.len());
                v.insert(i, x);
            }
            Op::Remove(i) => {
                if let Some(i) = Op::elem_pos(i, v.len()) {
                    v.remove(i);
                }
            }
            Op::SwapRemove(i) => {
                if let Some(i) = Op::elem_pos(i, v.len()) {
                    v.swap_remove(i);
                }
            }
            Op::Truncate(n) => v.truncate(n),
            Op::Resize(n, x) => v.resize(n, x),
            Op::RemoveRange(a, b) => {
                let (a, b) = Op::range(a, b, v.len());
                v.drain(a..b);
            }
            Op::Reserve(n) => v.reserve(n),
            Op::ShrinkToFit => v.shrink_to_fit(),
            Op::Clear => v.clear(),
        }
    }
}

/// Strategy for a single [`Op`], with lengths kept small enough that
/// scripts stay fast while still crossing small inline capacities.
pub fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i32>().prop_map(Op::Push),
        2 => Just(Op::Pop),
        3 => (any::<usize>(), any::<i32>()).prop_map(|(i, x)| Op::Insert(i, x)),
        2 => any::<usize>().prop_map(Op::Remove),
        1 => any::<usize>().prop_map(Op::SwapRemove),
        1 => (0usize..48).prop_map(Op::Truncate),
        1 => (0usize..48, any::<i32>()).prop_map(|(n, x)| Op::Resize(n, x)),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::RemoveRange(a, b)),
        1 => (0usize..32).prop_map(Op::Reserve),
        1 => Just(Op::ShrinkToFit),
        1 => Just(Op::Clear),
    ]
}

/// Strategy for a script of up to `max_len` operations.
pub fn script(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(op(), 0..max_len)
}
