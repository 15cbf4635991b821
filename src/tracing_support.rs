//! Logging support.
//!
//! This module re-exports the `tracing` macros used by the crate when the
//! `tracing` feature is enabled, and provides no-op replacements when it's
//! disabled.

#[cfg(feature = "tracing")]
mod enabled {
    use std::sync::Once;

    use tracing::Level;

    /// Installs a `fmt` subscriber writing to the test writer.  Safe to call
    /// more than once; only the first call has an effect.
    pub fn init_tracing() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_max_level(Level::DEBUG)
                .with_test_writer()
                .try_init();
        });
    }

    pub(crate) use tracing::{debug, info_span, warn};
}

#[cfg(not(feature = "tracing"))]
mod disabled {
    pub fn init_tracing() {
        // No-op when tracing is disabled
    }

    macro_rules! debug {
        ($($args:tt)*) => {{}};
    }

    macro_rules! warn {
        ($($args:tt)*) => {{}};
    }

    macro_rules! info_span {
        ($($args:tt)*) => {{ $crate::tracing_support::NoOpSpan }};
    }

    pub(crate) use {debug, info_span, warn};

    pub struct NoOpSpan;

    impl NoOpSpan {
        pub fn entered(self) -> NoOpSpanGuard {
            NoOpSpanGuard
        }
    }

    pub struct NoOpSpanGuard;
}

#[cfg(feature = "tracing")]
pub use enabled::*;

#[cfg(not(feature = "tracing"))]
pub use disabled::*;
