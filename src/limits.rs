//! Block capacity limits.
//!
//! Every block a hive allocates has a capacity inside its current
//! [`Limits`]. Limits are plain configuration: they can be built in code,
//! derived from the element type, or deserialized (deserialization runs the
//! same validation as [`Limits::new`]).

use crate::error::HiveError;
use core::mem;
use serde::{Deserialize, Serialize};

/// Per-block capacity bounds, `min..=max` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLimits")]
pub struct Limits {
    min: usize,
    max: usize,
}

/// Unvalidated wire form of [`Limits`].
#[derive(Deserialize)]
struct RawLimits {
    min: usize,
    max: usize,
}

impl TryFrom<RawLimits> for Limits {
    type Error = HiveError;

    fn try_from(raw: RawLimits) -> Result<Self, Self::Error> {
        Limits::new(raw.min, raw.max)
    }
}

/// Minimum block capacity used by [`Limits::for_type`].
const DEFAULT_MIN: usize = 8;
/// Upper bound on the default maximum block capacity.
const DEFAULT_MAX: usize = 8_192;
/// Target byte size of a maximal default block.
const DEFAULT_BLOCK_BYTES: usize = 64 * 1024;

impl Limits {
    /// The widest limits any hive accepts.
    pub const HARD: Limits = Limits { min: 2, max: 65_535 };

    /// Creates validated limits.
    ///
    /// # Errors
    /// Returns [`HiveError::InvalidLimits`] if `min > max` or either bound is
    /// outside [`Limits::HARD`].
    pub const fn new(min: usize, max: usize) -> Result<Self, HiveError> {
        if min > max || min < Self::HARD.min || max > Self::HARD.max {
            return Err(HiveError::InvalidLimits { min, max });
        }
        Ok(Self { min, max })
    }

    /// Default limits for elements of type `T`.
    ///
    /// Small elements get large blocks and large elements small ones, so a
    /// maximal block stays around 64 KiB.
    pub fn for_type<T>() -> Self {
        // Size of a slot: the element or a free-list link, whichever is larger.
        let align = mem::align_of::<T>().max(mem::align_of::<usize>());
        let slot = mem::size_of::<T>()
            .max(mem::size_of::<usize>())
            .next_multiple_of(align);
        let max = (DEFAULT_BLOCK_BYTES / slot).clamp(DEFAULT_MIN, DEFAULT_MAX);
        Self {
            min: DEFAULT_MIN,
            max,
        }
    }

    /// Smallest permitted block capacity.
    #[inline]
    pub const fn min(&self) -> usize {
        self.min
    }

    /// Largest permitted block capacity.
    #[inline]
    pub const fn max(&self) -> usize {
        self.max
    }

    /// Returns `true` if a block of `capacity` slots satisfies these limits.
    #[inline]
    pub const fn contains(&self, capacity: usize) -> bool {
        self.min <= capacity && capacity <= self.max
    }

    /// Clamps a requested block capacity into `min..=max`.
    #[inline]
    pub fn clamp(&self, capacity: usize) -> usize {
        capacity.clamp(self.min, self.max)
    }
}
