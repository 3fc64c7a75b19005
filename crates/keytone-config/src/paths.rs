//! Platform-specific configuration paths.
//!
//! - Linux: `~/.config/keytone/config.toml`
//! - macOS: `~/Library/Application Support/keytone/config.toml`
//! - Windows: `%APPDATA%\keytone\config.toml`
//!
//! # Example
//!
//! ```rust,no_run
//! use keytone_config::paths;
//!
//! println!("Config file: {:?}", paths::default_config_path());
//! ```

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "keytone";

/// File name of the engine configuration.
pub const CONFIG_FILE: &str = "config.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_ends_with_app_and_file() {
        let path = default_config_path();
        assert!(path.ends_with("keytone/config.toml"), "got {path:?}");
        assert_eq!(path.parent(), Some(user_config_dir().as_path()));
    }
}
