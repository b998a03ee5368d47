//! A byte-budgeted allocator with allocation accounting.
//!
//! Wraps another [`HiveAlloc`] and refuses any request that would push the
//! bytes currently in use past a configurable limit. It also counts live
//! allocations, which makes leaks and double frees observable.
//!
//! Clones share one budget, so a hive and a probe handle can observe the
//! same accounting. The state lives behind `Rc<Cell<_>>`: the allocator is
//! single-threaded.

use crate::alloc::{AllocError, Global, HiveAlloc};
use core::alloc::Layout;
use core::cell::Cell;
use core::ptr::NonNull;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Budget {
    limit: Cell<Option<usize>>,
    in_use: Cell<usize>,
    live: Cell<usize>,
    failures: Cell<usize>,
}

/// Allocator with a shared byte budget.
#[derive(Debug, Clone)]
pub struct BudgetAlloc<A: HiveAlloc = Global> {
    inner: A,
    budget: Rc<Budget>,
}

impl BudgetAlloc<Global> {
    /// Creates an allocator that refuses to hold more than `limit` bytes.
    pub fn new(limit: usize) -> Self {
        Self::with_inner(Global, Some(limit))
    }

    /// Creates an allocator without a limit that only keeps accounts.
    pub fn unbounded() -> Self {
        Self::with_inner(Global, None)
    }
}

impl<A: HiveAlloc> BudgetAlloc<A> {
    /// Wraps `inner` with an optional byte limit.
    pub fn with_inner(inner: A, limit: Option<usize>) -> Self {
        let budget = Budget::default();
        budget.limit.set(limit);
        Self {
            inner,
            budget: Rc::new(budget),
        }
    }

    /// Replaces the byte limit; `None` removes it.
    ///
    /// Lowering the limit below [`in_use`](Self::in_use) only affects
    /// future requests.
    pub fn set_limit(&self, limit: Option<usize>) {
        self.budget.limit.set(limit);
    }

    /// Current byte limit.
    pub fn limit(&self) -> Option<usize> {
        self.budget.limit.get()
    }

    /// Bytes currently allocated through this budget.
    pub fn in_use(&self) -> usize {
        self.budget.in_use.get()
    }

    /// Number of allocations not yet returned.
    pub fn live_allocations(&self) -> usize {
        self.budget.live.get()
    }

    /// Number of requests refused so far.
    pub fn failures(&self) -> usize {
        self.budget.failures.get()
    }

    fn refuse(&self) -> Result<NonNull<u8>, AllocError> {
        self.budget.failures.set(self.budget.failures.get() + 1);
        Err(AllocError)
    }
}

impl<A: HiveAlloc> HiveAlloc for BudgetAlloc<A> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let Some(wanted) = self.budget.in_use.get().checked_add(layout.size()) else {
            return self.refuse();
        };
        if self.budget.limit.get().is_some_and(|limit| wanted > limit) {
            return self.refuse();
        }
        let ptr = match self.inner.allocate(layout) {
            Ok(ptr) => ptr,
            Err(AllocError) => return self.refuse(),
        };
        self.budget.in_use.set(wanted);
        self.budget.live.set(self.budget.live.get() + 1);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.inner.deallocate(ptr, layout);
        self.budget.in_use.set(self.budget.in_use.get() - layout.size());
        self.budget.live.set(self.budget.live.get() - 1);
    }
}

/// Two handles are equal when they share one budget.
impl<A: HiveAlloc> PartialEq for BudgetAlloc<A> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.budget, &other.budget)
    }
}

impl<A: HiveAlloc> Eq for BudgetAlloc<A> {}
