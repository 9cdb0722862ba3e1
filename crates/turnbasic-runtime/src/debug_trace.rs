#![forbid(unsafe_code)]

//! Turn log on stderr.
//!
//! `TURNBASIC_DEBUG_TRACE=1` (or `true`) makes the driver print one line per
//! turn and per loaded program, stamped with milliseconds since the first
//! line. The variable is read once per process. This works without the
//! `tracing` feature and is meant for watching a host loop by eye.

use std::sync::LazyLock;

use web_time::Instant;

static TURN_LOG_ENABLED: LazyLock<bool> = LazyLock::new(|| {
    std::env::var("TURNBASIC_DEBUG_TRACE")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
});

static TURN_LOG_EPOCH: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Whether `TURNBASIC_DEBUG_TRACE` asked for the turn log.
#[inline]
pub fn is_enabled() -> bool {
    *TURN_LOG_ENABLED
}

/// Milliseconds since the first stamped line.
#[inline]
pub fn elapsed_ms() -> u64 {
    TURN_LOG_EPOCH.elapsed().as_millis() as u64
}

/// Write one stamped line of the turn log.
#[macro_export]
macro_rules! debug_trace {
    ($($arg:tt)*) => {
        if $crate::debug_trace::is_enabled() {
            eprintln!(
                "[turnbasic {:>8}ms] {}",
                $crate::debug_trace::elapsed_ms(),
                format_args!($($arg)*)
            );
        }
    };
}
