/// Macro for prefixed status logging to stderr.
///
/// Usage:
/// ```ignore
/// log_status!("Checking out branch '{}'", branch);
/// ```
#[macro_export]
macro_rules! log_status {
    ($($arg:tt)*) => {
        eprintln!("* {}", format_args!($($arg)*))
    };
}

/// Macro for prefixed warning logging to stderr. Warnings never stop a run.
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {
        eprintln!("* Warning: {}", format_args!($($arg)*))
    };
}

pub mod core;
pub mod utils;

// Re-export everything from core for ergonomic library use
// Users can write `shipwright::sync` instead of `shipwright::core::sync`
pub use core::*;
pub use utils::*;
