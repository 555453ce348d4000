//! Structural self-checks for the grid and the halo plan.
//!
//! `validate_invariants` is always available and returns the first broken
//! invariant as a [`GridError`]. `debug_assert_invariants` is called after
//! every halo exchange and time shift; it panics on a broken invariant in
//! debug builds and in release builds with the `check-invariants` feature,
//! and compiles to nothing otherwise.

use crate::grid_error::GridError;

pub trait DebugInvariants {
    /// Panic on a broken invariant when invariant checking is compiled in.
    fn debug_assert_invariants(&self);
    /// First broken invariant, if any.
    fn validate_invariants(&self) -> Result<(), GridError>;
}

/// Panic with `"[invariants] <context>: <error>"` if `$expr` is an `Err`.
///
/// Expands to nothing unless `debug_assertions` or the `check-invariants`
/// feature is enabled, so `$expr` is not evaluated in plain release builds.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
