/// Logger configuration built from command-line flags
///
/// Recognized flags:
/// - `--debug-<tag>`: enable debug output for one tag (e.g. `--debug-ticks`)
/// - `--debug-all`: enable debug output for every tag
/// - `--verbose`: enable everything, including verbose traces
/// - `--quiet`: only errors and warnings
use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments::get_cmd_args;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    /// Tags (debug keys) with debug output enabled
    pub debug_tags: HashSet<String>,
    /// Use colored output
    pub colors: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            colors: true,
        }
    }
}

impl LoggerConfig {
    /// `--verbose` implies debug output for every tag
    pub fn debug_enabled_for(&self, tag: &LogTag) -> bool {
        self.min_level == LogLevel::Verbose || self.debug_tags.contains(&tag.to_debug_key())
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    match LOGGER_CONFIG.read() {
        Ok(config) => config.clone(),
        Err(_) => LoggerConfig::default(),
    }
}

pub fn set_logger_config(config: LoggerConfig) {
    if let Ok(mut current) = LOGGER_CONFIG.write() {
        *current = config;
    }
}

/// Build the logger configuration from the stored command-line arguments
pub fn init_from_args() {
    set_logger_config(config_from_args(&get_cmd_args()));
}

pub fn config_from_args(args: &[String]) -> LoggerConfig {
    let mut config = LoggerConfig::default();

    let all_debug = args.iter().any(|a| a == "--debug-all");
    for tag in LogTag::all() {
        let key = tag.to_debug_key();
        let flag = format!("--debug-{}", key);
        if all_debug || args.iter().any(|a| *a == flag) {
            config.debug_tags.insert(key);
        }
    }

    if !config.debug_tags.is_empty() {
        config.min_level = LogLevel::Debug;
    }
    if args.iter().any(|a| a == "--verbose") {
        config.min_level = LogLevel::Verbose;
    }
    if args.iter().any(|a| a == "--quiet") {
        config.min_level = LogLevel::Warning;
        config.debug_tags.clear();
    }
    if args.iter().any(|a| a == "--no-color") {
        config.colors = false;
    }

    config
}

pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    get_logger_config().debug_enabled_for(tag)
}

/// Shortcut used by code that wants to skip building expensive debug strings
pub fn is_debug_enabled(tag: LogTag) -> bool {
    is_debug_enabled_for_tag(&tag)
}
