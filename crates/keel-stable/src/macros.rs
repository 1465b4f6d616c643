/// Build a [`StableVec`](crate::StableVec) like `vec!`.
///
/// ```
/// use keel_stable::{stable_vec, StableVec};
///
/// let v: StableVec<&str> = stable_vec!["a", "b"];
/// assert_eq!(v, ["a", "b"]);
/// let z: StableVec<u8> = stable_vec![0; 3];
/// assert_eq!(z.len(), 3);
/// ```
#[macro_export]
macro_rules! stable_vec {
    () => {
        $crate::StableVec::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::StableVec::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::StableVec::from([$($x),+])
    };
}
