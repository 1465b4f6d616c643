//! Test utilities and instrumented types for Keel development.
//!
//! Provides instrumented implementations of [`Allocator`] that record every
//! block they hand out, element types covering each mobility profile, and
//! helpers that compare a container under test against a `Vec` reference.
//!
//! - [`TestAllocator`]: stateful allocator with an id and a shared ledger;
//!   [`PropagatingAllocator`] / [`NonPropagatingAllocator`] fix its policy.
//! - [`FailingAllocator`]: succeeds a fixed number of times, then fails.
//! - [`elements`]: mobility profiles, emplace counters, drop/clone ledgers.
//! - [`check`]: container equality and iterator conformance assertions.
//! - [`ops`]: proptest strategies for random operation scripts.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod check;
mod conformance;
pub mod elements;
pub mod ops;

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::ptr::NonNull;
use std::rc::Rc;

use indexmap::IndexMap;
use keel_core::{AllocError, Allocator, Global};

/// A block handed out by an instrumented allocator and not yet returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiveBlock {
    /// Layout it was allocated with.
    pub layout: Layout,
    /// Id of the allocator that produced the block.
    pub owner: u32,
}

/// Shared record of allocator activity.
///
/// Several allocators may share one ledger so a test can detect a block
/// being returned to an allocator that did not produce it.
#[derive(Debug, Default)]
pub struct AllocLedger {
    live: IndexMap<usize, LiveBlock>,
    allocations: usize,
    deallocations: usize,
    constructs: usize,
    destroys: usize,
    violations: Vec<String>,
}

impl AllocLedger {
    /// Create a ledger wrapped for sharing between allocators.
    pub fn shared() -> Rc<RefCell<AllocLedger>> {
        Rc::new(RefCell::new(AllocLedger::default()))
    }

    fn record_alloc(&mut self, addr: usize, layout: Layout, owner: u32) {
        self.allocations += 1;
        if self.live.insert(addr, LiveBlock { layout, owner }).is_some() {
            self.violations
                .push(format!("block {addr:#x} handed out twice"));
        }
    }

    fn record_free(&mut self, addr: usize, layout: Layout, freer: u32) {
        self.deallocations += 1;
        match self.live.shift_remove(&addr) {
            None => self
                .violations
                .push(format!("free of unknown block {addr:#x} by allocator {freer}")),
            Some(block) => {
                if block.layout != layout {
                    self.violations.push(format!(
                        "block {addr:#x} freed with {layout:?}, allocated with {:?}",
                        block.layout
                    ));
                }
                if block.owner != freer {
                    self.violations.push(format!(
                        "block {addr:#x} from allocator {} freed by allocator {freer}",
                        block.owner
                    ));
                }
            }
        }
    }

    /// Blocks currently outstanding, in allocation order.
    pub fn live_blocks(&self) -> impl Iterator<Item = (usize, LiveBlock)> + '_ {
        self.live.iter().map(|(&addr, &block)| (addr, block))
    }

    /// Number of blocks currently outstanding.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of outstanding blocks owned by allocator `id`.
    pub fn live_count_for(&self, id: u32) -> usize {
        self.live.values().filter(|b| b.owner == id).count()
    }

    /// Successful allocations so far.
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    /// Deallocations so far, including misdirected ones.
    pub fn deallocations(&self) -> usize {
        self.deallocations
    }

    /// Elements constructed through the allocator.
    pub fn constructs(&self) -> usize {
        self.constructs
    }

    /// Elements destroyed through the allocator.
    pub fn destroys(&self) -> usize {
        self.destroys
    }

    /// Misuse detected so far: double hand-outs, foreign or unknown frees,
    /// layout mismatches.
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Panic unless every block was returned to its owner without misuse.
    #[track_caller]
    pub fn assert_clean(&self) {
        assert!(self.violations.is_empty(), "allocator misuse: {:?}", self.violations);
        assert_eq!(self.live.len(), 0, "leaked blocks: {:?}", self.live);
    }
}

/// An allocator with an identity and a ledger.
///
/// Two instances are equal iff their ids match. `PROPAGATE` sets all three
/// propagation constants at once.
#[derive(Clone, Debug)]
pub struct TestAllocator<const PROPAGATE: bool> {
    id: u32,
    ledger: Rc<RefCell<AllocLedger>>,
}

/// Allocator whose policy transfers it on copy-assign, move-assign and swap.
pub type PropagatingAllocator = TestAllocator<true>;

/// Allocator whose policy keeps it in place on copy-assign, move-assign and
/// swap.
pub type NonPropagatingAllocator = TestAllocator<false>;

impl<const PROPAGATE: bool> TestAllocator<PROPAGATE> {
    /// An allocator with its own fresh ledger.
    pub fn new(id: u32) -> Self {
        Self::with_ledger(id, &AllocLedger::shared())
    }

    /// An allocator recording into `ledger`.
    pub fn with_ledger(id: u32, ledger: &Rc<RefCell<AllocLedger>>) -> Self {
        Self {
            id,
            ledger: Rc::clone(ledger),
        }
    }

    /// Identity used for equality and block ownership.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Borrow the shared ledger.
    pub fn ledger(&self) -> std::cell::Ref<'_, AllocLedger> {
        self.ledger.borrow()
    }
}

impl<const PROPAGATE: bool> Default for TestAllocator<PROPAGATE> {
    fn default() -> Self {
        Self::new(0)
    }
}

unsafe impl<const PROPAGATE: bool> Allocator for TestAllocator<PROPAGATE> {
    const PROPAGATE_ON_COPY: bool = PROPAGATE;
    const PROPAGATE_ON_MOVE: bool = PROPAGATE;
    const PROPAGATE_ON_SWAP: bool = PROPAGATE;

    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let ptr = Global.allocate(layout)?;
        self.ledger
            .borrow_mut()
            .record_alloc(ptr.as_ptr() as usize, layout, self.id);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.ledger
            .borrow_mut()
            .record_free(ptr.as_ptr() as usize, layout, self.id);
        unsafe { Global.deallocate(ptr, layout) }
    }

    unsafe fn construct<T>(&self, slot: *mut T, value: T) {
        self.ledger.borrow_mut().constructs += 1;
        unsafe { slot.write(value) }
    }

    unsafe fn destroy<T>(&self, slot: *mut T) {
        self.ledger.borrow_mut().destroys += 1;
        unsafe { std::ptr::drop_in_place(slot) }
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// An allocator that succeeds `budget` times and then reports failure.
///
/// Clones share the budget and compare equal.
#[derive(Clone, Debug)]
pub struct FailingAllocator {
    remaining: Rc<Cell<usize>>,
}

impl FailingAllocator {
    /// Allow `budget` successful allocations.
    pub fn new(budget: usize) -> Self {
        Self {
            remaining: Rc::new(Cell::new(budget)),
        }
    }

    /// Reset the number of allocations that will still succeed.
    pub fn set_budget(&self, budget: usize) {
        self.remaining.set(budget);
    }

    /// Allocations that will still succeed.
    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }
}

unsafe impl Allocator for FailingAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        match self.remaining.get() {
            0 => Err(AllocError),
            n => {
                self.remaining.set(n - 1);
                Global.allocate(layout)
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { Global.deallocate(ptr, layout) }
    }

    fn is_equal(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.remaining, &other.remaining)
    }
}
