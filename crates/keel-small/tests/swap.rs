//! Swap across every combination of storage modes and allocator policies.

use keel_small::{SmallVec, StorageMode};
use keel_test_utils::{AllocLedger, NonPropagatingAllocator, PropagatingAllocator};

type V = SmallVec<i32, 8>;

fn dynamic() -> V {
    let mut v = V::new();
    let cap = v.capacity();
    for i in 0..=cap as i32 {
        v.push(i);
    }
    assert_eq!(v.storage_mode(), StorageMode::Dynamic);
    v
}

fn inline(n: i32) -> V {
    let v: V = (100..100 + n).collect();
    assert_eq!(v.storage_mode(), StorageMode::Inline);
    v
}

#[test]
fn dynamic_vs_empty() {
    let mut v = dynamic();
    let mut w = V::new();
    let v_size = v.len();
    let w_size = w.len();
    v.swap(&mut w);
    assert_eq!(v.len(), w_size);
    assert_eq!(w.len(), v_size);
    assert_eq!(w.storage_mode(), StorageMode::Dynamic);
}

#[test]
fn inline_vs_empty() {
    let mut v = inline(5);
    let mut w = V::new();
    v.swap(&mut w);
    assert_eq!(v.len(), 0);
    assert_eq!(w, [100, 101, 102, 103, 104]);
    assert_eq!(w.storage_mode(), StorageMode::Inline);
}

#[test]
fn inline_vs_inline() {
    let mut v = inline(2);
    let mut w: V = (0..7).collect();
    v.swap(&mut w);
    assert_eq!(v, [0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(w, [100, 101]);
    v.swap(&mut w);
    assert_eq!(v, [100, 101]);
    assert_eq!(w.len(), 7);
}

#[test]
fn dynamic_vs_dynamic() {
    let mut v = dynamic();
    let mut w: V = (0..30).collect();
    v.swap(&mut w);
    assert_eq!(v.len(), 30);
    assert_eq!(w.len(), 9);
    assert!(v.spilled() && w.spilled());
}

#[test]
fn dynamic_vs_inline() {
    let mut v = dynamic();
    let mut w = inline(3);
    v.swap(&mut w);
    assert_eq!(v, [100, 101, 102]);
    assert!(!v.spilled());
    assert_eq!(w.len(), 9);
    assert!(w.spilled());
}

#[test]
fn strings_survive_every_case() {
    let make = |n: usize, tag: &str| -> SmallVec<String, 3> {
        (0..n).map(|i| format!("{tag}{i}")).collect()
    };
    for (a, b) in [(0, 0), (1, 3), (3, 1), (2, 9), (9, 2), (12, 20)] {
        let mut v = make(a, "v");
        let mut w = make(b, "w");
        v.swap(&mut w);
        assert_eq!(v.len(), b);
        assert_eq!(w.len(), a);
        assert!(v.iter().all(|s| s.starts_with('w')));
        assert!(w.iter().all(|s| s.starts_with('v')));
    }
}

#[test]
fn propagating_allocators_are_exchanged() {
    let ledger = AllocLedger::shared();
    {
        let a = PropagatingAllocator::with_ledger(1, &ledger);
        let b = PropagatingAllocator::with_ledger(2, &ledger);
        let mut v = SmallVec::<i32, 2, _>::from_iter_in(0..10, a);
        let mut w = SmallVec::<i32, 2, _>::from_iter_in(0..1, b);
        v.swap(&mut w);
        assert_eq!(v.allocator().id(), 2);
        assert_eq!(w.allocator().id(), 1);
        assert_eq!(w.len(), 10);
        assert_eq!(ledger.borrow().live_count_for(1), 1);
    }
    ledger.borrow().assert_clean();
}

#[test]
fn unequal_non_propagating_allocators_swap_elementwise() {
    let ledger = AllocLedger::shared();
    {
        let a = NonPropagatingAllocator::with_ledger(1, &ledger);
        let b = NonPropagatingAllocator::with_ledger(2, &ledger);
        let mut v = SmallVec::<i32, 2, _>::from_iter_in(0..10, a);
        let mut w = SmallVec::<i32, 2, _>::from_iter_in(50..51, b);
        let v_block = v.as_ptr();
        v.swap(&mut w);

        assert_eq!(v.allocator().id(), 1);
        assert_eq!(w.allocator().id(), 2);
        assert_eq!(v, [50]);
        assert_eq!(w, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        // v keeps its own block; w had to grow its own.
        assert_eq!(v.as_ptr(), v_block);
        assert_eq!(ledger.borrow().live_count_for(1), 1);
        assert_eq!(ledger.borrow().live_count_for(2), 1);
    }
    ledger.borrow().assert_clean();
}

#[test]
fn elementwise_swap_constructs_the_surplus_through_the_receiver() {
    let ledger = AllocLedger::shared();
    {
        let a = NonPropagatingAllocator::with_ledger(1, &ledger);
        let b = NonPropagatingAllocator::with_ledger(2, &ledger);
        let mut v = SmallVec::<String, 2, _>::from_iter_in((0..3).map(|i| i.to_string()), a);
        let mut w = SmallVec::<String, 2, _>::from_iter_in((0..10).map(|i| format!("w{i}")), b);

        let constructs = ledger.borrow().constructs();
        v.swap(&mut w);
        assert_eq!(ledger.borrow().constructs() - constructs, 7);
        assert_eq!(v.len(), 10);
        assert_eq!(v[9], "w9");
        assert_eq!(w, ["0", "1", "2"]);

        let constructs = ledger.borrow().constructs();
        v.swap(&mut w);
        assert_eq!(ledger.borrow().constructs() - constructs, 7);
        assert_eq!(v, ["0", "1", "2"]);
        assert_eq!(w[0], "w0");
    }
    ledger.borrow().assert_clean();
}

#[test]
fn equal_non_propagating_allocators_swap_storage() {
    let ledger = AllocLedger::shared();
    {
        let a = NonPropagatingAllocator::with_ledger(7, &ledger);
        let mut v = SmallVec::<i32, 2, _>::from_iter_in(0..10, a.clone());
        let mut w = SmallVec::<i32, 2, _>::from_iter_in(0..20, a);
        let (pv, pw) = (v.as_ptr(), w.as_ptr());
        v.swap(&mut w);
        assert_eq!(v.as_ptr(), pw);
        assert_eq!(w.as_ptr(), pv);
    }
    ledger.borrow().assert_clean();
}
