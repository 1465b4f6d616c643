//! Element addresses survive every mutation that does not remove them.

use keel_stable::{StableRef, StableVec};

fn addr<T>(v: &StableVec<T>, i: usize) -> *const T {
    &v[i] as *const T
}

#[test]
fn front_inserts_do_not_move_elements() {
    let mut v: StableVec<u64> = StableVec::new();
    v.push(42);
    let p = addr(&v, 0);
    for i in 0..500 {
        v.insert(0, i);
    }
    assert_eq!(v[500], 42);
    assert_eq!(addr(&v, 500), p);
    v.check_invariants().unwrap();
}

#[test]
fn removals_elsewhere_do_not_move_elements() {
    let mut v: StableVec<String> = (0..100).map(|i| i.to_string()).collect();
    let h = v.stable_ref(50).unwrap();
    let p = addr(&v, 50);
    v.remove(0);
    v.swap_remove(10);
    v.remove_range(60..80);
    v.retain(|s| s.len() == 2);
    v.truncate(45);
    let at = v.resolve(h).expect("element 50 is still present");
    assert_eq!(v[at], "50");
    assert_eq!(addr(&v, at), p);
    assert_eq!(unsafe { v.position_unchecked(h) }, at);
    v.check_invariants().unwrap();
}

#[test]
fn index_reallocation_keeps_every_address() {
    let mut v: StableVec<[u8; 32]> = StableVec::new();
    let mut addrs = Vec::new();
    for i in 0..300u16 {
        v.push([i as u8; 32]);
        addrs.push(addr(&v, i as usize));
    }
    v.shrink_to_fit();
    v.reserve(10_000);
    for (i, &p) in addrs.iter().enumerate() {
        assert_eq!(addr(&v, i), p);
    }
}

#[test]
fn insert_from_slice_shifts_handles() {
    let mut v: StableVec<i32> = (0..6).collect();
    let handles: Vec<StableRef<i32>> = (0..6).map(|i| v.stable_ref(i).unwrap()).collect();
    v.insert_from_slice(2, &[-1, -2, -3]);
    let positions: Vec<usize> = handles.iter().map(|&h| v.resolve(h).unwrap()).collect();
    assert_eq!(positions, [0, 1, 5, 6, 7, 8]);
    for &h in &handles {
        assert_eq!(unsafe { v.position_unchecked(h) }, v.resolve(h).unwrap());
    }
}

#[test]
fn handles_survive_an_equal_allocator_move() {
    let mut v: StableVec<i32> = (0..10).collect();
    let h = v.stable_ref(3).unwrap();
    let mut w = StableVec::new();
    w.move_assign(std::mem::take(&mut v));
    assert_eq!(w.resolve(h), Some(3));
    assert_eq!(w.get_by_ref(h), Some(&3));
}

#[test]
fn mutating_through_a_handle() {
    let mut v: StableVec<Vec<u8>> = StableVec::new();
    v.push(Vec::new());
    let h = v.stable_ref(0).unwrap();
    for _ in 0..20 {
        v.insert(0, vec![0]);
        v.get_by_ref_mut(h).unwrap().push(1);
    }
    assert_eq!(unsafe { v.get_ref(h) }.len(), 20);
    assert_eq!(v.last().unwrap().len(), 20);
}
