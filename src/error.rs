//! Error types shared by the hive engine and its allocators.

use crate::limits::Limits;
use core::alloc::Layout;
use core::fmt;

/// Errors reported by fallible [`Hive`](crate::Hive) operations.
///
/// Every operation that returns one of these leaves the hive exactly as
/// consistent as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiveError {
    /// The allocator could not provide storage for a new block.
    AllocFailed {
        /// Layout of the block that could not be allocated.
        layout: Layout,
    },
    /// The requested capacity exceeds [`Hive::max_size`](crate::Hive::max_size)
    /// or a block layout does not fit in `isize`.
    CapacityOverflow,
    /// Block capacity limits are inverted or outside [`Limits::HARD`].
    InvalidLimits {
        /// Requested minimum block capacity.
        min: usize,
        /// Requested maximum block capacity.
        max: usize,
    },
    /// A block that would be adopted does not satisfy the receiver's limits.
    LimitsViolation {
        /// Capacity of the offending block.
        capacity: usize,
        /// Limits it was checked against.
        limits: Limits,
    },
}

impl fmt::Display for HiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocFailed { layout } => write!(
                f,
                "block allocation failed: {} bytes aligned to {}",
                layout.size(),
                layout.align()
            ),
            Self::CapacityOverflow => f.write_str("hive capacity overflow"),
            Self::InvalidLimits { min, max } => write!(
                f,
                "invalid block capacity limits {min}..={max} (hard limits {}..={})",
                Limits::HARD.min(),
                Limits::HARD.max()
            ),
            Self::LimitsViolation { capacity, limits } => write!(
                f,
                "block of capacity {capacity} is outside limits {}..={}",
                limits.min(),
                limits.max()
            ),
        }
    }
}

impl std::error::Error for HiveError {}
