//! Index and node ownership under each allocator policy.

use keel_stable::{CapacityError, StableVec};
use keel_test_utils::{AllocLedger, FailingAllocator, NonPropagatingAllocator, PropagatingAllocator};

#[test]
fn one_block_per_element_plus_the_index() {
    let a = PropagatingAllocator::new(1);
    let probe = a.clone();
    {
        let mut v = StableVec::<String, _>::new_in(a);
        assert_eq!(probe.ledger().live_count(), 0);
        for i in 0..10 {
            v.push(i.to_string());
        }
        assert_eq!(probe.ledger().live_count(), 11);
        v.remove(4);
        v.truncate(5);
        assert_eq!(probe.ledger().live_count(), 6);
        assert_eq!(probe.ledger().constructs(), 10);
        assert_eq!(probe.ledger().destroys(), 4);
        v.clear();
        v.shrink_to_fit();
        assert_eq!(probe.ledger().live_count(), 0);
    }
    probe.ledger().assert_clean();
}

#[test]
fn clone_uses_select_on_copy() {
    let v = StableVec::<i32, _>::from_iter_in(0..5, NonPropagatingAllocator::new(7));
    let c = v.clone();
    assert_eq!(c.allocator().id(), 7);
    assert_eq!(c, v);
}

#[test]
fn clone_from_adopts_a_propagating_allocator() {
    let ledger = AllocLedger::shared();
    {
        let src = StableVec::<i32, _>::from_iter_in(0..4, PropagatingAllocator::with_ledger(1, &ledger));
        let mut dst =
            StableVec::<i32, _>::from_iter_in(10..20, PropagatingAllocator::with_ledger(2, &ledger));
        dst.clone_from(&src);
        assert_eq!(dst.allocator().id(), 1);
        assert_eq!(dst, [0, 1, 2, 3]);
        assert_eq!(ledger.borrow().live_count_for(2), 0);
    }
    ledger.borrow().assert_clean();
}

#[test]
fn clone_from_keeps_a_non_propagating_allocator() {
    let ledger = AllocLedger::shared();
    {
        let src =
            StableVec::<i32, _>::from_iter_in(0..4, NonPropagatingAllocator::with_ledger(1, &ledger));
        let mut dst = StableVec::<i32, _>::new_in(NonPropagatingAllocator::with_ledger(2, &ledger));
        dst.clone_from(&src);
        assert_eq!(dst.allocator().id(), 2);
        assert_eq!(ledger.borrow().live_count_for(2), 5);
    }
    ledger.borrow().assert_clean();
}

#[test]
fn move_assign_adopts_nodes_and_a_propagating_allocator() {
    let ledger = AllocLedger::shared();
    {
        let mut dst = StableVec::<i32, _>::from_iter_in(0..3, PropagatingAllocator::with_ledger(1, &ledger));
        let src = StableVec::<i32, _>::from_iter_in(0..8, PropagatingAllocator::with_ledger(2, &ledger));
        let p = &src[5] as *const i32;
        dst.move_assign(src);
        assert_eq!(&dst[5] as *const i32, p);
        assert_eq!(dst.allocator().id(), 2);
        assert_eq!(ledger.borrow().live_count_for(1), 0);
    }
    ledger.borrow().assert_clean();
}

#[test]
fn move_assign_between_unequal_non_propagating_rebuilds_nodes() {
    let ledger = AllocLedger::shared();
    {
        let mut dst = StableVec::<String, _>::new_in(NonPropagatingAllocator::with_ledger(1, &ledger));
        let src = StableVec::<String, _>::from_iter_in(
            (0..6).map(|i| i.to_string()),
            NonPropagatingAllocator::with_ledger(2, &ledger),
        );
        dst.move_assign(src);
        assert_eq!(dst.allocator().id(), 1);
        assert_eq!(dst, ["0", "1", "2", "3", "4", "5"]);
        assert_eq!(ledger.borrow().live_count_for(2), 0);
        assert_eq!(ledger.borrow().live_count_for(1), 7);
        dst.check_invariants().unwrap();
    }
    ledger.borrow().assert_clean();
}

#[test]
fn from_moved_in_adopts_or_rebuilds() {
    let a = NonPropagatingAllocator::new(1);
    let src = StableVec::<i32, _>::from_iter_in(0..5, a.clone());
    let p = &src[2] as *const i32;
    let same = StableVec::from_moved_in(src, a);
    assert_eq!(&same[2] as *const i32, p);

    let other = StableVec::from_moved_in(same, NonPropagatingAllocator::new(2));
    assert_eq!(other.allocator().id(), 2);
    assert_eq!(other, [0, 1, 2, 3, 4]);
    other.check_invariants().unwrap();
}

#[test]
fn swap_with_propagating_allocators_exchanges_them() {
    let mut a = StableVec::<i32, _>::from_iter_in(0..2, PropagatingAllocator::new(1));
    let mut b = StableVec::<i32, _>::from_iter_in(5..10, PropagatingAllocator::new(2));
    a.swap(&mut b);
    assert_eq!(a.allocator().id(), 2);
    assert_eq!(b.allocator().id(), 1);
    assert_eq!(a, [5, 6, 7, 8, 9]);
    assert_eq!(b, [0, 1]);
}

#[test]
fn swap_between_unequal_non_propagating_keeps_ownership() {
    let ledger = AllocLedger::shared();
    {
        for (n, m) in [(0, 0), (0, 5), (3, 3), (7, 2), (1, 9)] {
            let mut a = StableVec::<String, _>::from_iter_in(
                (0..n).map(|i| format!("a{i}")),
                NonPropagatingAllocator::with_ledger(1, &ledger),
            );
            let mut b = StableVec::<String, _>::from_iter_in(
                (0..m).map(|i| format!("b{i}")),
                NonPropagatingAllocator::with_ledger(2, &ledger),
            );
            a.swap(&mut b);
            assert_eq!(a.allocator().id(), 1);
            assert_eq!(b.allocator().id(), 2);
            assert!(a.iter().cloned().eq((0..m).map(|i| format!("b{i}"))));
            assert!(b.iter().cloned().eq((0..n).map(|i| format!("a{i}"))));
            a.check_invariants().unwrap();
            b.check_invariants().unwrap();
        }
        assert!(ledger.borrow().violations().is_empty());
    }
    ledger.borrow().assert_clean();
}

#[test]
fn append_between_unequal_allocators_rebuilds_nodes() {
    let ledger = AllocLedger::shared();
    {
        let mut a = StableVec::<i32, _>::from_iter_in(0..2, NonPropagatingAllocator::with_ledger(1, &ledger));
        let mut b = StableVec::<i32, _>::from_iter_in(2..5, NonPropagatingAllocator::with_ledger(2, &ledger));
        a.append(&mut b);
        assert_eq!(a, [0, 1, 2, 3, 4]);
        assert!(b.is_empty());
        assert_eq!(ledger.borrow().live_count_for(1), 6);
        assert_eq!(ledger.borrow().live_count_for(2), 1);
    }
    ledger.borrow().assert_clean();
}

#[test]
fn failed_node_allocation_hands_the_value_back() {
    let alloc = FailingAllocator::new(0);
    let mut v = StableVec::<String, _>::new_in(alloc.clone());
    let err = v.try_push("x".into()).unwrap_err();
    assert!(matches!(err.error, CapacityError::AllocationFailure { .. }));
    assert_eq!(err.into_inner(), "x");
    assert!(v.is_empty());
}

#[test]
fn failed_index_growth_releases_the_new_node() {
    let alloc = FailingAllocator::new(1);
    let mut v = StableVec::<u32, _>::new_in(alloc.clone());
    let err = v.try_insert(0, 9).unwrap_err();
    assert_eq!(err.value, 9);
    assert_eq!(alloc.remaining(), 0);
    assert!(v.is_empty());
    assert_eq!(v.capacity(), 0);

    alloc.set_budget(2);
    v.try_push(1).unwrap();
    assert_eq!(v, [1]);
}

#[test]
fn try_with_capacity_reports_failure() {
    let r = StableVec::<u64, _>::try_with_capacity_in(8, FailingAllocator::new(0));
    assert!(matches!(r, Err(CapacityError::AllocationFailure { .. })));
    let r = StableVec::<u64, _>::try_with_capacity_in(usize::MAX, FailingAllocator::new(1));
    assert!(matches!(r, Err(CapacityError::LengthExceeded { .. })));
}
