//! Log formatting and output with ANSI colors
//!
//! Log lines go to stderr so report output on stdout (tables or `--json`)
//! stays machine-readable when piped.

use super::config::get_logger_config;
use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{stderr, ErrorKind, Write};

/// Log format widths for alignment
const TAG_WIDTH: usize = 10;
const LEVEL_WIDTH: usize = 7;

/// EVM addresses (0x + 40 hex chars) or numbers: prices, ticks, USD values, percentages
static HIGHLIGHT_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(0x[0-9a-fA-F]{40})|(-?\$?\d[\d,]*\.?\d*%?)").ok());

pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str) {
    let config = get_logger_config();
    let time = Local::now().format("%H:%M:%S").to_string();

    let line = if config.colors {
        format!(
            "{} [{}] [{}] {}",
            time.dimmed(),
            format_tag(&tag),
            format_level(level),
            highlight_message(level, message)
        )
    } else {
        format!(
            "{} [{:<tag_width$}] [{:<level_width$}] {}",
            time,
            tag.to_plain_string(),
            level.as_str(),
            message,
            tag_width = TAG_WIDTH,
            level_width = LEVEL_WIDTH
        )
    };

    print_stderr_safe(&line);
}

fn format_tag(tag: &LogTag) -> ColoredString {
    let label = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    match tag {
        LogTag::System => label.bright_yellow().bold(),
        LogTag::Config => label.bright_white().bold(),
        LogTag::Api => label.bright_purple().bold(),
        LogTag::Subgraph => label.bright_blue().bold(),
        LogTag::Ticks => label.bright_cyan().bold(),
        LogTag::Fees => label.bright_green().bold(),
        LogTag::Emissions => label.bright_magenta().bold(),
        LogTag::Report => label.green().bold(),
    }
}

fn format_level(level: LogLevel) -> ColoredString {
    let label = format!("{:<width$}", level.as_str(), width = LEVEL_WIDTH);
    match level {
        LogLevel::Error => label.bright_red().bold(),
        LogLevel::Warning => label.yellow().bold(),
        LogLevel::Info => label.white().bold(),
        LogLevel::Debug => label.purple(),
        LogLevel::Verbose => label.dimmed(),
    }
}

/// Highlight numbers (prices, ticks, USD values, percentages) and pool addresses
fn highlight_message(level: LogLevel, message: &str) -> String {
    match level {
        LogLevel::Error => return message.red().to_string(),
        LogLevel::Warning => return message.yellow().to_string(),
        LogLevel::Verbose => return message.dimmed().to_string(),
        _ => {}
    }

    let Some(re) = HIGHLIGHT_RE.as_ref() else {
        return message.to_string();
    };

    re.replace_all(message, |caps: &regex::Captures| {
        if let Some(addr) = caps.get(1) {
            let addr = addr.as_str();
            format!("{}...{}", &addr[..8], &addr[addr.len() - 4..])
                .bright_cyan()
                .bold()
                .to_string()
        } else {
            caps[0].bright_white().bold().to_string()
        }
    })
    .to_string()
}

/// Print to stderr but ignore broken pipe errors
fn print_stderr_safe(message: &str) {
    let mut handle = stderr();
    if let Err(e) = writeln!(handle, "{}", message) {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
    }
    let _ = handle.flush();
}
