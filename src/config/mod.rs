//! Configuration system
//!
//! TOML file with embedded defaults (`config_struct!`), validated on load.
//! There is no global instance: binaries load the file once and pass the
//! relevant section into the estimators.

pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::*;
pub use utils::{
    load_config_from_path, parse_config, read_config_file, save_config, API_KEY_ENV,
    CONFIG_FILE_PATH,
};
