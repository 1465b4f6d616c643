//! Random operation scripts against a `Vec<i32>` model, with the
//! structural check after every step.

use keel_stable::StableVec;
use keel_test_utils::ops::{script, Op};
use proptest::prelude::*;

fn apply(op: &Op, v: &mut StableVec<i32>) {
    match *op {
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
            v.remove_range(a..b);
        }
        Op::Reserve(n) => v.reserve(n),
        Op::ShrinkToFit => v.shrink_to_fit(),
        Op::Clear => v.clear(),
    }
}

proptest! {
    #[test]
    fn follows_the_model(ops in script(80)) {
        let mut v = StableVec::new();
        let mut model = Vec::new();
        for op in &ops {
            apply(op, &mut v);
            op.apply_to_vec(&mut model);
            prop_assert_eq!(&v, &model, "after {:?}", op);
            prop_assert!(v.check_invariants().is_ok(), "structure after {:?}", op);
        }
    }

    #[test]
    fn surviving_elements_keep_their_addresses(ops in script(60)) {
        let mut v: StableVec<i32> = (0..16).map(|i| 1000 + i).collect();
        let handles: Vec<_> = (0..16).map(|i| (v.stable_ref(i).unwrap(), &v[i] as *const i32)).collect();
        for op in &ops {
            apply(op, &mut v);
        }
        for (h, p) in handles {
            if let Some(i) = v.resolve(h) {
                prop_assert_eq!(&v[i] as *const i32, p);
            }
        }
    }

    #[test]
    fn swap_exchanges_any_two_states(a in script(30), b in script(30)) {
        let mut v = StableVec::new();
        let mut w = StableVec::new();
        for op in &a {
            apply(op, &mut v);
        }
        for op in &b {
            apply(op, &mut w);
        }
        let (old_v, old_w) = (v.to_vec(), w.to_vec());
        v.swap(&mut w);
        prop_assert_eq!(&v, &old_w);
        prop_assert_eq!(&w, &old_v);
    }
}
