/// Centralized command-line argument access
///
/// Binaries parse their own options with clap; this module keeps a global copy
/// of the raw arguments so the logger and the debug-flag helpers below can be
/// queried from anywhere without threading the parsed struct through.
use crate::logger::{self, LogTag};
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Override the stored arguments (binaries with synthetic args, tests)
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Returns a clone to avoid holding the mutex
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Value following a flag (`--config path/to/file.toml`)
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1).cloned())
}

// =============================================================================
// DEBUG FLAG CHECKING FUNCTIONS
// =============================================================================

/// Subgraph HTTP requests and raw responses
pub fn is_debug_api_enabled() -> bool {
    has_arg("--debug-api") || has_arg("--debug-all")
}

/// Price to tick conversion details
pub fn is_debug_ticks_enabled() -> bool {
    has_arg("--debug-ticks") || has_arg("--debug-all")
}

pub fn is_debug_fees_enabled() -> bool {
    has_arg("--debug-fees") || has_arg("--debug-all")
}

pub fn is_debug_emissions_enabled() -> bool {
    has_arg("--debug-emissions") || has_arg("--debug-all")
}

pub fn is_json_output_enabled() -> bool {
    has_arg("--json")
}

pub fn get_enabled_debug_modes() -> Vec<&'static str> {
    let mut modes = Vec::new();
    if is_debug_api_enabled() {
        modes.push("api");
    }
    if is_debug_ticks_enabled() {
        modes.push("ticks");
    }
    if is_debug_fees_enabled() {
        modes.push("fees");
    }
    if is_debug_emissions_enabled() {
        modes.push("emissions");
    }
    modes
}

pub fn print_debug_info() {
    let modes = get_enabled_debug_modes();
    if !modes.is_empty() {
        logger::info(
            LogTag::System,
            &format!("Debug modes enabled: {}", modes.join(", ")),
        );
    }
}
