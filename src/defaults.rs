//! Default file names, directories and IDE options.
//!
//! Every value here can be overridden from `confgen.json` or the command
//! line.

use serde_json::{json, Map, Value};
use std::path::PathBuf;

/// Tool settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "confgen.json";

/// IDE configuration file written by `generate`.
pub const OUTPUT_FILE: &str = "./pyrightconfig.json";

/// Where mirrored search paths are placed.
pub const MIRROR_DIR: &str = "./includes";

/// Where organization repositories are cloned.
pub const CLONE_DIR: &str = "./clones";

/// Upper bound for a single git command.
pub const CLONE_TIMEOUT_SECS: u64 = 600;

/// Environment variables holding search paths, read in this order.
pub fn path_variables() -> Vec<String> {
    vec!["PYTHONPATH".to_string(), "BD_HOOKPATH".to_string()]
}

/// IDE configuration fields that receive the search paths.
pub fn add_to_fields() -> Vec<String> {
    vec!["extraPaths".to_string()]
}

/// Returns the default credentials file, `~/.confgen.json`.
///
/// Falls back to `.confgen.json` in the current directory if the home
/// directory cannot be determined.
pub fn token_file() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".confgen.json"))
        .unwrap_or_else(|| PathBuf::from(".confgen.json"))
}

/// Baseline pyright options.
pub fn ide_defaults() -> Map<String, Value> {
    let venv_path = dirs::home_dir()
        .map(|home| home.join(".virtualenvs").to_string_lossy().into_owned())
        .unwrap_or_else(|| "./.virtualenvs".to_string());

    let defaults = json!({
        "include": ["./python"],
        "extraPaths": [],
        "venvPath": venv_path,
        "venv": "venv",
        "pythonVersion": "3.9",
        "pythonPlatform": "Linux",
        "typeCheckingMode": "basic",
    });
    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
