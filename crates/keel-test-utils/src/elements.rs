//! Element types exercising each mobility profile.
//!
//! Rust moves are always bitwise and infallible, so the profiles differ in
//! which of `Clone`, `Copy`, and `Default` they implement. A container that
//! needs a copy must ask for `Clone` in its bounds; these types make sure
//! the bounds are no stronger than necessary.
//!
//! - [`MovableInt`]: no `Clone`.
//! - [`CopyableInt`]: `Clone + Copy`.
//! - [`MovableAndCopyableInt`]: `Clone`, not `Copy`.
//! - [`MoveConstructInt`]: no `Clone`, no `Default`.
//! - [`NonCopyMovableInt`]: no `Clone`; only ever built in place.
//! - [`EmplaceInt`]: five-argument constructor with a construction counter.
//! - [`Tracked`]: counts live instances and can panic on a chosen clone.

use std::cell::Cell;
use std::rc::Rc;

macro_rules! int_wrapper {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub i32);

        impl $name {
            /// Wrap `value`.
            pub fn new(value: i32) -> Self {
                Self(value)
            }

            /// The wrapped integer.
            pub fn value(&self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }
    };
}

int_wrapper!(
    /// Movable only.
    #[derive(Default)]
    MovableInt
);

int_wrapper!(
    /// Trivially copyable.
    #[derive(Default, Clone, Copy)]
    CopyableInt
);

int_wrapper!(
    /// Clone but not `Copy`.
    #[derive(Default, Clone)]
    MovableAndCopyableInt
);

int_wrapper!(
    /// Movable only, and without a default value.
    MoveConstructInt
);

int_wrapper!(
    /// Neither clonable nor meant to be moved after construction.
    #[derive(Default)]
    NonCopyMovableInt
);

thread_local! {
    static EMPLACE_CONSTRUCTIONS: Cell<usize> = const { Cell::new(0) };
}

/// A five-field element built from zero to five arguments.
///
/// Every construction bumps a thread-local counter, so a test can assert
/// that an emplace built exactly one value.
#[derive(Debug, PartialEq, Eq)]
pub struct EmplaceInt {
    /// First argument.
    pub a: i32,
    /// Second argument.
    pub b: i32,
    /// Third argument.
    pub c: i32,
    /// Fourth argument.
    pub d: i32,
    /// Fifth argument.
    pub e: i32,
}

impl EmplaceInt {
    /// Build from up to five leading arguments; missing ones are zero.
    pub fn with_args(args: &[i32]) -> Self {
        assert!(args.len() <= 5, "EmplaceInt takes at most five arguments");
        EMPLACE_CONSTRUCTIONS.with(|c| c.set(c.get() + 1));
        let arg = |i: usize| args.get(i).copied().unwrap_or(0);
        Self {
            a: arg(0),
            b: arg(1),
            c: arg(2),
            d: arg(3),
            e: arg(4),
        }
    }

    /// Constructions on this thread since the last reset.
    pub fn constructions() -> usize {
        EMPLACE_CONSTRUCTIONS.with(Cell::get)
    }

    /// Zero this thread's construction counter.
    pub fn reset_constructions() {
        EMPLACE_CONSTRUCTIONS.with(|c| c.set(0));
    }

    /// Whether the fields equal `args` (zero-padded).
    pub fn matches(&self, args: &[i32]) -> bool {
        let arg = |i: usize| args.get(i).copied().unwrap_or(0);
        self.a == arg(0) && self.b == arg(1) && self.c == arg(2) && self.d == arg(3) && self.e == arg(4)
    }
}

/// Shared counters for [`Tracked`] values.
#[derive(Debug, Default)]
pub struct Ledger {
    live: Cell<isize>,
    clones: Cell<usize>,
    panic_at_clone: Cell<Option<usize>>,
}

impl Ledger {
    /// A fresh ledger, shared through an `Rc`.
    pub fn new() -> Rc<Ledger> {
        Rc::new(Ledger::default())
    }

    /// Values created and not yet dropped.
    pub fn live(&self) -> isize {
        self.live.get()
    }

    /// Clones performed so far.
    pub fn clones(&self) -> usize {
        self.clones.get()
    }

    /// Make the clone with ordinal `n` (0-based, counted from now) panic.
    pub fn panic_after_clones(&self, n: usize) {
        self.panic_at_clone.set(Some(self.clones.get() + n));
    }

    /// Cancel a pending [`panic_after_clones`](Self::panic_after_clones).
    pub fn disarm(&self) {
        self.panic_at_clone.set(None);
    }
}

/// An `i32` that records its lifetime in a [`Ledger`].
#[derive(Debug)]
pub struct Tracked {
    value: i32,
    ledger: Rc<Ledger>,
}

impl Tracked {
    /// A live value counted in `ledger`.
    pub fn new(value: i32, ledger: &Rc<Ledger>) -> Self {
        ledger.live.set(ledger.live.get() + 1);
        Self {
            value,
            ledger: Rc::clone(ledger),
        }
    }

    /// The wrapped integer.
    pub fn value(&self) -> i32 {
        self.value
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        let n = self.ledger.clones.get();
        if self.ledger.panic_at_clone.get() == Some(n) {
            self.ledger.panic_at_clone.set(None);
            panic!("Tracked: clone #{n} armed to panic");
        }
        self.ledger.clones.set(n + 1);
        Tracked::new(self.value, &self.ledger)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.ledger.live.set(self.ledger.live.get() - 1);
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialEq<i32> for Tracked {
    fn eq(&self, other: &i32) -> bool {
        self.value == *other
    }
}
