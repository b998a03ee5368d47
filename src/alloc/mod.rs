//! Allocators backing hive blocks.
//!
//! - [`HiveAlloc`]: the allocator interface a hive consumes.
//! - [`Global`]: the process heap.
//! - [`BudgetAlloc`]: byte-budgeted wrapper with allocation accounting.

pub mod allocator;
pub mod budget;
pub mod global;

pub use allocator::{AllocError, HiveAlloc};
pub use budget::BudgetAlloc;
pub use global::Global;
