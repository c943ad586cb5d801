// cli/constants.rs: program identity, display level and output macros
//
// The display level is a process-wide atomic so the library can emit trace
// output through the same macros the binary uses.

use std::sync::atomic::{AtomicU32, Ordering};

// ── Identity ─────────────────────────────────────────────────────────────────
pub const PROGRAM_NAME: &str = "brstate";
pub const AUTHOR: &str = "brotli-state contributors";

// ── Size multipliers ─────────────────────────────────────────────────────────
pub const KB: usize = 1 << 10;
pub const MB: usize = 1 << 20;

// ── Display level ────────────────────────────────────────────────────────────
//
// 0 = no output; 1 = errors only; 2 = normal (downgradable); 3 = non-downgradable; 4 = verbose
pub const DISPLAY_LEVEL_DEFAULT: u32 = 2;
pub const DISPLAY_LEVEL_MAX: u32 = 4;

pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(DISPLAY_LEVEL_DEFAULT);

/// Returns the current display level.
#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the display level.
#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

/// Display level after applying `verbose` increments and `quiet` decrements
/// to the default, clamped to `0..=DISPLAY_LEVEL_MAX`.
pub fn level_from_flags(verbose: u8, quiet: u8) -> u32 {
    (DISPLAY_LEVEL_DEFAULT + u32::from(verbose))
        .saturating_sub(u32::from(quiet))
        .min(DISPLAY_LEVEL_MAX)
}

// ── Output macros ────────────────────────────────────────────────────────────

/// Print to stdout.
#[macro_export]
macro_rules! displayout {
    ($($arg:tt)*) => { print!($($arg)*) };
}

/// Print to stderr.
#[macro_export]
macro_rules! display {
    ($($arg:tt)*) => { eprint!($($arg)*) };
}

/// Print to stderr when the display level is at least `level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::cli::constants::display_level() >= $level {
            eprint!($($arg)*);
        }
    };
}
