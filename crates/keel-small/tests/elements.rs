//! Mobility profiles, in-place construction and panic safety.

use std::panic::{catch_unwind, AssertUnwindSafe};

use keel_small::{small_vec, SmallVec};
use keel_test_utils::elements::{
    CopyableInt, EmplaceInt, Ledger, MoveConstructInt, MovableAndCopyableInt, MovableInt,
    NonCopyMovableInt, Tracked,
};

#[test]
fn copyable_round_trip() {
    let v: SmallVec<CopyableInt, 3> = (0..7).map(CopyableInt::new).collect();
    let c = v.clone();
    assert_eq!(c, v);
    let back: Vec<CopyableInt> = c.into();
    assert_eq!(back.len(), 7);
}

#[test]
fn movable_and_copyable_round_trip() {
    let v: SmallVec<MovableAndCopyableInt, 3> = small_vec![
        MovableAndCopyableInt::new(1),
        MovableAndCopyableInt::new(2),
    ];
    let c = v.clone();
    assert_eq!(c, v);
}

#[test]
fn movable_only_supports_every_move_operation() {
    let mut v: SmallVec<MovableInt, 2> = SmallVec::new();
    v.push(MovableInt::new(1));
    v.insert(0, MovableInt::new(0));
    v.push(MovableInt::new(2));
    assert_eq!(v.remove(1), 1);
    let mut w = SmallVec::new();
    w.move_assign(v);
    assert_eq!(w, [MovableInt::new(0), MovableInt::new(2)]);
}

#[test]
fn move_constructible_without_default() {
    let mut v: SmallVec<MoveConstructInt, 2> = SmallVec::new();
    v.resize_with(5, || MoveConstructInt::new(7));
    assert!(v.iter().all(|x| *x == 7));
    v.truncate(1);
    assert_eq!(v.len(), 1);
}

#[test]
fn non_copy_movable_built_in_place() {
    let mut v: SmallVec<NonCopyMovableInt, 4> = SmallVec::new();
    for i in 0..6 {
        v.emplace_back(|| NonCopyMovableInt::new(i));
    }
    v.resize_with(9, NonCopyMovableInt::default);
    v.truncate(3);
    let values: Vec<i32> = v.iter().map(NonCopyMovableInt::value).collect();
    assert_eq!(values, [0, 1, 2]);
}

#[test]
fn emplace_builds_each_value_once() {
    let mut v: SmallVec<EmplaceInt, 2> = SmallVec::new();
    let args: [&[i32]; 6] = [&[], &[1], &[1, 2], &[1, 2, 3], &[1, 2, 3, 4], &[1, 2, 3, 4, 5]];
    for a in args {
        EmplaceInt::reset_constructions();
        let e = v.emplace_back(|| EmplaceInt::with_args(a));
        assert!(e.matches(a));
        assert_eq!(EmplaceInt::constructions(), 1);
    }
    EmplaceInt::reset_constructions();
    let e = v.emplace(2, || EmplaceInt::with_args(&[9, 9]));
    assert!(e.matches(&[9, 9]));
    assert_eq!(EmplaceInt::constructions(), 1);
    assert!(v[3].matches(&[1, 2]));
}

fn tracked(values: std::ops::Range<i32>, ledger: &std::rc::Rc<Ledger>) -> Vec<Tracked> {
    values.map(|i| Tracked::new(i, ledger)).collect()
}

#[test]
fn extend_from_slice_panic_keeps_what_was_cloned() {
    let ledger = Ledger::new();
    let src = tracked(0..3, &ledger);
    let mut v: SmallVec<Tracked, 2> = SmallVec::new();
    ledger.panic_after_clones(1);
    let r = catch_unwind(AssertUnwindSafe(|| v.extend_from_slice(&src)));
    assert!(r.is_err());
    assert_eq!(v.len(), 1);
    assert_eq!(v[0], 0);
    drop(v);
    drop(src);
    assert_eq!(ledger.live(), 0);
}

#[test]
fn insert_from_slice_panic_closes_the_gap() {
    let ledger = Ledger::new();
    let mut v: SmallVec<Tracked, 2> = tracked(10..13, &ledger).into_iter().collect();
    let src = tracked(0..3, &ledger);
    ledger.panic_after_clones(1);
    let r = catch_unwind(AssertUnwindSafe(|| v.insert_from_slice(1, &src)));
    assert!(r.is_err());
    let values: Vec<i32> = v.iter().map(Tracked::value).collect();
    assert_eq!(values, [10, 0, 11, 12]);
    drop(v);
    drop(src);
    assert_eq!(ledger.live(), 0);
}

#[test]
fn resize_panic_leaves_valid_prefix() {
    let ledger = Ledger::new();
    let mut v: SmallVec<Tracked, 4> = SmallVec::new();
    ledger.panic_after_clones(3);
    let r = catch_unwind(AssertUnwindSafe(|| v.resize(10, Tracked::new(5, &ledger))));
    assert!(r.is_err());
    assert_eq!(v.len(), 3);
    drop(v);
    assert_eq!(ledger.live(), 0);
}

#[test]
fn clone_panic_does_not_leak() {
    let ledger = Ledger::new();
    let v: SmallVec<Tracked, 2> = tracked(0..6, &ledger).into_iter().collect();
    ledger.panic_after_clones(4);
    let r = catch_unwind(AssertUnwindSafe(|| v.clone()));
    assert!(r.is_err());
    assert_eq!(ledger.live(), 6);
    drop(v);
    assert_eq!(ledger.live(), 0);
}

#[test]
fn retain_panic_compacts_the_rest() {
    let ledger = Ledger::new();
    let mut v: SmallVec<Tracked, 3> = tracked(0..6, &ledger).into_iter().collect();
    let r = catch_unwind(AssertUnwindSafe(|| {
        v.retain(|t| {
            assert_ne!(t.value(), 3, "predicate gave up");
            t.value() % 2 == 1
        })
    }));
    assert!(r.is_err());
    let values: Vec<i32> = v.iter().map(Tracked::value).collect();
    assert_eq!(values, [1, 3, 4, 5]);
    assert_eq!(ledger.live(), 4);
}

#[test]
fn remove_range_and_truncate_drop_exactly_once() {
    let ledger = Ledger::new();
    let mut v: SmallVec<Tracked, 3> = tracked(0..10, &ledger).into_iter().collect();
    v.remove_range(2..5);
    assert_eq!(ledger.live(), 7);
    v.truncate(4);
    assert_eq!(ledger.live(), 4);
    let values: Vec<i32> = v.iter().map(Tracked::value).collect();
    assert_eq!(values, [0, 1, 5, 6]);
    v.shrink_to_fit();
    assert!(v.spilled());
    assert_eq!(v.capacity(), 4);
    drop(v);
    assert_eq!(ledger.live(), 0);
}
