//! Internal logging shims.
//!
//! With the `tracing` feature enabled these forward to the `tracing` crate;
//! without it they expand to nothing, so the hot paths carry no logging cost.

/// Trace-level event for per-block bookkeeping (allocation, release, growth).
#[cfg(feature = "tracing")]
macro_rules! hive_trace {
    ($($arg:tt)*) => {
        ::tracing::trace!(target: "hive", $($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! hive_trace {
    ($($arg:tt)*) => {};
}

/// Debug-level event for whole-hive operations (reshape, splice).
#[cfg(feature = "tracing")]
macro_rules! hive_debug {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "hive", $($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! hive_debug {
    ($($arg:tt)*) => {};
}
