#![forbid(unsafe_code)]

//! Logging support.
//!
//! Re-exports the tracing macros the registry uses when the `tracing` feature
//! is enabled. Without the feature the same names expand to nothing, so call
//! sites stay unconditional.

#[cfg(feature = "tracing")]
pub use tracing::{debug, warn};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op warn macro when tracing is disabled.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}
