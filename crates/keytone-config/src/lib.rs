//! Configuration for the keytone sound engine.
//!
//! Settings live in one TOML file with three sections: `[audio]` for the
//! output device, `[engine]` for graph and scheduling limits, and
//! `[defaults]` for the enable flags the engine starts with.
//!
//! # Example
//!
//! ```rust,no_run
//! use keytone_config::{EngineConfig, default_config_path};
//!
//! let config = EngineConfig::load_or_default(default_config_path()).unwrap();
//! println!("rendering at {} Hz", config.audio.sample_rate);
//! ```

mod config;
mod error;

/// Platform-specific configuration paths.
pub mod paths;

/// Range checks for configuration values.
pub mod validation;

pub use config::{AudioConfig, DefaultFlags, EngineConfig, EngineSettings};
pub use error::ConfigError;
pub use paths::{default_config_path, user_config_dir};
pub use validation::{ValidationError, ValidationResult};
