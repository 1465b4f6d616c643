/// Build a [`SmallVec`](crate::SmallVec) from a list of elements, or from
/// an element and a count, like `vec!`.
///
/// ```
/// use keel_small::{small_vec, SmallVec};
///
/// let v: SmallVec<i32, 4> = small_vec![1, 2, 3];
/// assert_eq!(v, [1, 2, 3]);
/// let z: SmallVec<u8, 4> = small_vec![0; 8];
/// assert!(z.spilled());
/// ```
#[macro_export]
macro_rules! small_vec {
    () => {
        $crate::SmallVec::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::SmallVec::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::SmallVec::from([$($x),+])
    };
}
