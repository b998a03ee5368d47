//! Collections.
//!
//! - `hive`: the segmented block container and its positions and iterators.

pub mod hive;

pub use hive::{BlockInfo, Entries, Hive, IntoIter, Iter, IterMut, Position};
