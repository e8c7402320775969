//! Structured console logging
//!
//! ```rust,ignore
//! use clmm_apr::logger::{self, LogTag};
//!
//! logger::info(LogTag::Subgraph, "Fetched pool state");
//! logger::debug(LogTag::Ticks, "Raw ticks: ..."); // only with --debug-ticks
//! logger::verbose(LogTag::Api, "GraphQL query: ..."); // only with --verbose
//! ```
//!
//! Call `logger::init()` once at startup; it scans the command line for
//! `--debug-<tag>`, `--debug-all`, `--verbose`, `--quiet` and `--no-color`.

mod config;
mod core;
mod format;
mod levels;
mod tags;

pub use config::{
    config_from_args, get_logger_config, init_from_args, is_debug_enabled, set_logger_config,
    LoggerConfig,
};
pub use levels::LogLevel;
pub use tags::LogTag;

pub fn init() {
    config::init_from_args();
}

/// Always shown
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Shown unless the minimum level is below warnings
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Only shown with `--debug-<tag>` (or `--debug-all` / `--verbose`)
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Only shown with `--verbose`
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}
