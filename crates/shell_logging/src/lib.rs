#![deny(missing_docs)]
//! Logging facade for the shell workspace.
//!
//! Every crate logs through the `shell_*` macros. They expand to the `log`
//! crate re-exported from here, so the backend is picked once by the binary
//! (or by [`initialize_for_tests`]).

#[doc(hidden)]
pub use log as __log;

/// Trace-level record.
#[macro_export]
macro_rules! shell_trace {
    ($($arg:tt)*) => { $crate::__log::trace!($($arg)*) };
}

/// Debug-level record.
#[macro_export]
macro_rules! shell_debug {
    ($($arg:tt)*) => { $crate::__log::debug!($($arg)*) };
}

/// Info-level record.
#[macro_export]
macro_rules! shell_info {
    ($($arg:tt)*) => { $crate::__log::info!($($arg)*) };
}

/// Warn-level record.
#[macro_export]
macro_rules! shell_warn {
    ($($arg:tt)*) => { $crate::__log::warn!($($arg)*) };
}

/// Error-level record.
#[macro_export]
macro_rules! shell_error {
    ($($arg:tt)*) => { $crate::__log::error!($($arg)*) };
}

/// Level used by [`initialize_for_tests`]: debug in debug builds, info otherwise.
pub fn test_level() -> log::LevelFilter {
    if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

/// Routes records through the test harness so they show up only for failing
/// tests. Repeated calls are ignored.
pub fn initialize_for_tests() {
    let _ = simplelog::TestLogger::init(test_level(), simplelog::Config::default());
}
