//! # `hive` - Stable-Address Block Container
//!
//! A container of elements stored in a chain of fixed-capacity blocks.
//! Elements never move once inserted: references and [`Position`]s stay valid
//! while other elements are inserted and erased around them.
//!
//! ## Guarantees
//!
//! - **O(1) insertion and erasure**: vacated slots are recycled through a
//!   per-block free list; no shifting, no rehashing.
//! - **Stable addresses**: an element keeps its address until it is erased,
//!   unless its block is moved by [`Hive::reshape`].
//! - **Capacity reuse**: emptied blocks are kept as reserved capacity and are
//!   the first to be reused.
//! - **Failure atomicity**: allocation happens before bookkeeping, so a failed
//!   insertion or reservation leaves the container consistent.
//!
//! ## Architecture
//!
//! 1. **Blocks** (`collections::hive::block`): one allocation per block
//!    holding a slot array and an occupancy bitmap.
//! 2. **Block arena** (`collections::hive::links`): block records in a
//!    structure-of-arrays layout with three intrusive circular lists
//!    (active, open, reserved) closed by a sentinel head.
//! 3. **Engine** ([`Hive`]): insertion, erasure, capacity management and
//!    traversal over the arena.
//! 4. **Allocation** ([`HiveAlloc`]): the allocator seam, with the system
//!    allocator ([`Global`]) and a budgeted wrapper ([`BudgetAlloc`]).
//! 5. **Configuration** ([`Limits`]): block capacity bounds, deserializable
//!    with serde.
//!
//! ## Example
//!
//! ```rust
//! use hive::Hive;
//!
//! let mut hive = Hive::new();
//! let a = hive.insert(1);
//! let b = hive.insert(2);
//! let c = hive.insert(3);
//!
//! let addr = hive.get(c).unwrap() as *const i32;
//! hive.erase(b);
//! hive.insert(4);
//!
//! assert_eq!(hive.get(a), Some(&1));
//! assert_eq!(hive.get(c).map(|v| v as *const i32), Some(addr));
//! assert_eq!(hive.len(), 3);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

#[macro_use]
mod macros;

pub mod alloc;
pub mod collections;
pub mod error;
pub mod limits;

pub use alloc::{AllocError, BudgetAlloc, Global, HiveAlloc};
pub use collections::hive::{BlockInfo, Entries, Hive, IntoIter, Iter, IterMut, Position};
pub use error::HiveError;
pub use limits::Limits;

// Compile-time assertions for memory layout
const _: () = {
    use core::mem;

    // Positions are two 32-bit indices.
    assert!(mem::size_of::<Position>() == 8);
    assert!(mem::size_of::<Option<Position>>() <= 12);

    // The default allocator adds nothing to a hive.
    assert!(mem::size_of::<Global>() == 0);

    // Limits are two words, copied freely.
    assert!(mem::size_of::<Limits>() == 2 * mem::size_of::<usize>());
};
