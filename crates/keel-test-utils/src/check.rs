//! Container comparison helpers.

use std::fmt::Debug;

/// Whether two sequences have the same length and pairwise-equal elements.
pub fn check_equal<I, J>(a: I, b: J) -> bool
where
    I: IntoIterator,
    J: IntoIterator,
    I::Item: PartialEq<J::Item>,
{
    let mut a = a.into_iter();
    let mut b = b.into_iter();
    loop {
        match (a.next(), b.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if x == y => {}
            _ => return false,
        }
    }
}

/// Assert that an iterator factory behaves like a slice iterator over
/// `reference` under random-access style use.
///
/// Exercises advancing by arbitrary strides from both ends (`nth`,
/// `nth_back`), remaining-length bookkeeping after each step, reversal,
/// and distance between two positions measured via `len()`.
#[track_caller]
pub fn check_random_access<'a, T, I, F>(make: F, reference: &'a [T])
where
    T: PartialEq + Debug + 'a,
    I: DoubleEndedIterator<Item = &'a T> + ExactSizeIterator,
    F: Fn() -> I,
{
    let n = reference.len();
    assert_eq!(make().len(), n, "iterator length");
    assert!(make().eq(reference.iter()), "forward order");
    assert!(make().rev().eq(reference.iter().rev()), "reverse order");

    let strides = [1usize, 2, 3, 7, 10, 64, n / 2 + 1];
    for &stride in &strides {
        // advance from the front
        let mut it = make();
        let mut expect = reference.iter();
        loop {
            let got = it.nth(stride - 1);
            let want = expect.nth(stride - 1);
            assert_eq!(got, want, "nth({}) mismatch", stride - 1);
            assert_eq!(it.len(), expect.len(), "remaining length after advance");
            if got.is_none() {
                break;
            }
        }

        // advance from the back
        let mut it = make();
        let mut expect = reference.iter();
        loop {
            let got = it.nth_back(stride - 1);
            let want = expect.nth_back(stride - 1);
            assert_eq!(got, want, "nth_back({}) mismatch", stride - 1);
            if got.is_none() {
                break;
            }
        }
    }

    // distance between two cursors: advance a by i, b by j, compare lengths.
    for &(i, j) in &[(0, n), (0, n / 2), (n / 3, n / 2), (n / 2, n / 2)] {
        let mut a = make();
        let mut b = make();
        if i > 0 {
            a.nth(i - 1);
        }
        if j > 0 {
            b.nth(j - 1);
        }
        assert_eq!(a.len() - b.len(), j - i, "distance({i}, {j})");
    }

    // meet in the middle
    let mut it = make();
    let mut front = 0;
    let mut back = n;
    while let Some(x) = it.next() {
        assert_eq!(x, &reference[front]);
        front += 1;
        if let Some(y) = it.next_back() {
            back -= 1;
            assert_eq!(y, &reference[back]);
        }
    }
    assert_eq!(front, back, "front and back cursors met");
}
