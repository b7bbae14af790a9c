pub mod game;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log a message every 100 frames when the perf_stats feature is enabled.
///
/// When the perf_stats feature is disabled this expands to an empty block and
/// the arguments are never evaluated.
///
/// # Example
/// ```ignore
/// profile_log!(ctx.frame, "Steered {} agents", steered);
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($frame:expr, $($arg:tt)*) => {
        if $frame % 100 == 0 {
            bevy::prelude::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($frame:expr, $($arg:tt)*) => {};
}
