//! Shared sequence conformance suite.
//!
//! Both containers expose the same method names, so one suite can drive
//! either of them. The macro expands to a module of `#[test]`s that compare
//! the container against a `Vec` model after every step.

/// Generate a conformance test module for a sequence container.
///
/// ```ignore
/// keel_test_utils::sequence_conformance! {
///     name: small_i32,
///     container: SmallVec<i32, 10>,
///     elem: i32,
///     make: |i: i32| i,
///     value: |e: &i32| *e,
/// }
/// ```
///
/// `make` builds an element from an `i32`; `value` reads it back. Prefix
/// with `@clone` to add the tests that need `Clone` elements.
#[macro_export]
macro_rules! sequence_conformance {
    (
        @clone
        name: $name:ident,
        container: $cont:ty,
        elem: $elem:ty,
        make: $make:expr,
        value: $value:expr $(,)?
    ) => {
        $crate::sequence_conformance! {
            name: $name,
            container: $cont,
            elem: $elem,
            make: $make,
            value: $value,
            extra: {
                #[test]
                fn clone_is_equal_and_independent() {
                    let v: $cont = (0..40).map(make).collect();
                    let mut c = v.clone();
                    assert!(check_equal(v.iter(), c.iter()));
                    c.push(make(99));
                    assert_eq!(v.len(), 40);
                    assert_eq!(c.len(), 41);
                }

                #[test]
                fn clone_from_longer_and_shorter() {
                    let long: $cont = (0..30).map(make).collect();
                    let short: $cont = (0..3).map(make).collect();
                    let mut t: $cont = (100..110).map(make).collect();
                    t.clone_from(&long);
                    assert!(check_equal(t.iter(), long.iter()));
                    t.clone_from(&short);
                    assert!(check_equal(t.iter(), short.iter()));
                }

                #[test]
                fn resize_with_value() {
                    let mut v: $cont = <$cont>::new();
                    v.resize(25, make(7));
                    assert_eq!(v.len(), 25);
                    assert!(v.iter().all(|e| value(e) == 7));
                    v.resize(4, make(0));
                    assert_eq!(v.len(), 4);
                }

                #[test]
                fn extend_and_insert_from_slice() {
                    let mut v: $cont = (0..5).map(make).collect();
                    let mut model: Vec<$elem> = (0..5).map(make).collect();
                    let extra: Vec<$elem> = (10..20).map(make).collect();
                    v.extend_from_slice(&extra);
                    model.extend_from_slice(&extra);
                    assert!(check_equal(v.iter(), model.iter()));
                    v.insert_from_slice(3, &extra[..4]);
                    let tail = model.split_off(3);
                    model.extend_from_slice(&extra[..4]);
                    model.extend(tail);
                    assert!(check_equal(v.iter(), model.iter()));
                }

                #[test]
                fn assign_replaces_contents() {
                    let mut v: $cont = (0..50).map(make).collect();
                    v.assign((7..10).map(make));
                    let model: Vec<$elem> = (7..10).map(make).collect();
                    assert!(check_equal(v.iter(), model.iter()));
                }
            }
        }
    };
    (
        name: $name:ident,
        container: $cont:ty,
        elem: $elem:ty,
        make: $make:expr,
        value: $value:expr $(,)?
    ) => {
        $crate::sequence_conformance! {
            name: $name,
            container: $cont,
            elem: $elem,
            make: $make,
            value: $value,
            extra: {}
        }
    };
    (
        name: $name:ident,
        container: $cont:ty,
        elem: $elem:ty,
        make: $make:expr,
        value: $value:expr,
        extra: { $($extra:tt)* }
    ) => {
        #[allow(clippy::redundant_closure_call)]
        mod $name {
            #[allow(unused_imports)]
            use super::*;
            #[allow(unused_imports)]
            use $crate::check::check_equal;

            fn make(i: i32) -> $elem {
                ($make)(i)
            }

            #[allow(dead_code)]
            fn value(e: &$elem) -> i32 {
                ($value)(e)
            }

            fn model(range: std::ops::Range<i32>) -> Vec<$elem> {
                range.map(make).collect()
            }

            #[test]
            fn push_and_pop_follow_model() {
                let mut v: $cont = <$cont>::new();
                let mut m: Vec<$elem> = Vec::new();
                assert!(v.is_empty());
                for i in 0..50 {
                    v.push(make(i));
                    m.push(make(i));
                    assert_eq!(v.len(), m.len());
                }
                assert!(check_equal(v.iter(), m.iter()));
                for _ in 0..20 {
                    assert_eq!(v.pop().map(|e| value(&e)), m.pop().map(|e| value(&e)));
                }
                assert!(check_equal(v.iter(), m.iter()));
                while v.pop().is_some() {}
                assert!(v.is_empty());
                assert!(v.pop().is_none());
            }

            #[test]
            fn insert_at_front_middle_and_back() {
                let mut v: $cont = <$cont>::new();
                let mut m: Vec<$elem> = Vec::new();
                for i in 0..30 {
                    let pos = match i % 3 {
                        0 => 0,
                        1 => m.len() / 2,
                        _ => m.len(),
                    };
                    v.insert(pos, make(i));
                    m.insert(pos, make(i));
                }
                assert!(check_equal(v.iter(), m.iter()));
            }

            #[test]
            fn remove_and_swap_remove() {
                let mut v: $cont = (0..20).map(make).collect();
                let mut m = model(0..20);
                assert_eq!(value(&v.remove(0)), value(&m.remove(0)));
                assert_eq!(value(&v.remove(7)), value(&m.remove(7)));
                let last = v.len() - 1;
                assert_eq!(value(&v.remove(last)), value(&m.remove(last)));
                assert_eq!(value(&v.swap_remove(2)), value(&m.swap_remove(2)));
                assert!(check_equal(v.iter(), m.iter()));
            }

            #[test]
            #[should_panic]
            fn remove_past_end_panics() {
                let mut v: $cont = (0..3).map(make).collect();
                v.remove(3);
            }

            #[test]
            fn truncate_clear_and_remove_range() {
                let mut v: $cont = (0..40).map(make).collect();
                let mut m = model(0..40);
                v.truncate(100);
                assert_eq!(v.len(), 40);
                v.truncate(30);
                m.truncate(30);
                assert!(check_equal(v.iter(), m.iter()));
                v.remove_range(5..12);
                m.drain(5..12);
                assert!(check_equal(v.iter(), m.iter()));
                v.remove_range(..3);
                m.drain(..3);
                assert!(check_equal(v.iter(), m.iter()));
                v.remove_range(4..);
                m.drain(4..);
                assert!(check_equal(v.iter(), m.iter()));
                v.clear();
                assert!(v.is_empty());
            }

            #[test]
            fn retain_keeps_matching_in_order() {
                let mut v: $cont = (0..33).map(make).collect();
                v.retain(|e| value(e) % 3 != 0);
                let kept: Vec<i32> = v.iter().map(value).collect();
                let want: Vec<i32> = (0..33).filter(|i| i % 3 != 0).collect();
                assert_eq!(kept, want);
            }

            #[test]
            fn emplace_returns_the_new_element() {
                let mut v: $cont = <$cont>::new();
                for i in 0..12 {
                    let e = v.emplace_back(|| make(i));
                    assert_eq!(value(e), i);
                }
                let e = v.emplace(3, || make(-1));
                assert_eq!(value(e), -1);
                assert_eq!(value(&v[3]), -1);
                assert_eq!(value(&v[4]), 3);
                assert_eq!(v.len(), 13);
            }

            #[test]
            fn resize_with_grows_and_shrinks() {
                let mut v: $cont = <$cont>::new();
                let mut next = 0;
                v.resize_with(17, || {
                    next += 1;
                    make(next)
                });
                assert_eq!(v.len(), 17);
                assert_eq!(value(&v[16]), 17);
                v.resize_with(2, || unreachable!());
                assert_eq!(v.len(), 2);
                assert_eq!(value(&v[1]), 2);
            }

            #[test]
            fn checked_access() {
                let mut v: $cont = (0..5).map(make).collect();
                assert_eq!(v.at(4).map(value), Ok(4));
                let err = v.at(5).unwrap_err();
                assert_eq!((err.index, err.len), (5, 5));
                assert!(v.at_mut(9).is_err());
                assert_eq!(v.get(2).map(value), Some(2));
                assert!(v.get(5).is_none());
                assert_eq!(v.first().map(value), Some(0));
                assert_eq!(v.last().map(value), Some(4));
            }

            #[test]
            fn into_iter_both_ends() {
                let v: $cont = (0..25).map(make).collect();
                let mut it = v.into_iter();
                assert_eq!(it.len(), 25);
                assert_eq!(it.next().map(|e| value(&e)), Some(0));
                assert_eq!(it.next_back().map(|e| value(&e)), Some(24));
                assert_eq!(it.len(), 23);
                let rest: Vec<i32> = it.map(|e| value(&e)).collect();
                assert_eq!(rest, (1..24).collect::<Vec<_>>());
            }

            #[test]
            fn partially_consumed_into_iter_drops_rest() {
                let v: $cont = (0..25).map(make).collect();
                let mut it = v.into_iter();
                it.next();
                it.next_back();
                drop(it);
            }

            #[test]
            fn swap_exchanges_contents() {
                for (a, b) in [(0, 0), (0, 9), (9, 0), (3, 8), (8, 3), (0, 40), (40, 0), (11, 40), (40, 11), (3, 40)] {
                    let mut v: $cont = (0..a).map(make).collect();
                    let mut w: $cont = (100..100 + b).map(make).collect();
                    v.swap(&mut w);
                    assert!(check_equal(v.iter().map(value), 100..100 + b), "swap({a}, {b}) left side");
                    assert!(check_equal(w.iter().map(value), 0..a), "swap({a}, {b}) right side");
                }
            }

            #[test]
            fn move_assign_takes_source_contents() {
                let mut v: $cont = (0..7).map(make).collect();
                let src: $cont = (50..80).map(make).collect();
                v.move_assign(src);
                assert!(check_equal(v.iter().map(value), 50..80));
                let small: $cont = (1..3).map(make).collect();
                v.move_assign(small);
                assert!(check_equal(v.iter().map(value), 1..3));
            }

            #[test]
            fn extend_appends() {
                let mut v: $cont = (0..3).map(make).collect();
                v.extend((3..60).map(make));
                assert!(check_equal(v.iter().map(value), 0..60));
            }

            #[test]
            fn reserve_and_shrink_keep_contents() {
                let mut v: $cont = (0..9).map(make).collect();
                v.reserve(100);
                assert!(check_equal(v.iter().map(value), 0..9));
                v.truncate(2);
                v.shrink_to_fit();
                assert!(check_equal(v.iter().map(value), 0..2));
            }

            $($extra)*
        }
    };
}
