//! Structured logging for nftscout
//!
//! Leveled, tagged, colored console logging:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-subsystem tags for quick scanning of batch runs
//! - Minimum-level threshold configured once at startup
//!
//! ## Usage
//!
//! ```ignore
//! use nftscout::logger::{self, LogTag};
//!
//! logger::info(LogTag::Enrich, "Prepared 42 NFTs");
//! logger::warning(LogTag::Prices, "Solanart price fetch failed");
//! ```

mod format;
mod levels;
mod tags;

pub use levels::LogLevel;
pub use tags::LogTag;

use once_cell::sync::Lazy;
use std::sync::RwLock;

static MIN_LEVEL: Lazy<RwLock<LogLevel>> = Lazy::new(|| RwLock::new(LogLevel::Info));

/// Set the minimum level shown on the console
///
/// Call once at startup, before any logging occurs.
pub fn init(min_level: LogLevel) {
    if let Ok(mut level) = MIN_LEVEL.write() {
        *level = min_level;
    }
}

/// Check if a log message should be displayed
///
/// Errors always log; everything else is gated by the configured threshold.
pub fn should_log(level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }
    match MIN_LEVEL.read() {
        Ok(min) => level <= *min,
        Err(_) => true,
    }
}

fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(level) {
        return;
    }
    format::format_and_log(tag, level, message);
}

/// Log at ERROR level (always shown, critical issues)
pub fn error(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (degraded lookups, skipped records)
pub fn warning(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operational progress)
pub fn info(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (per-record diagnostics, shown with --verbose)
pub fn debug(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (raw payload traces)
pub fn verbose(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Verbose, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_always_pass_the_filter() {
        init(LogLevel::Error);
        assert!(should_log(LogLevel::Error));
        assert!(!should_log(LogLevel::Info));
        init(LogLevel::Info);
    }

    #[test]
    fn threshold_gates_lower_levels() {
        init(LogLevel::Debug);
        assert!(should_log(LogLevel::Info));
        assert!(should_log(LogLevel::Debug));
        assert!(!should_log(LogLevel::Verbose));
        init(LogLevel::Info);
    }
}
