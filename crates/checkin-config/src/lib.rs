//! Configuration for the attendance check-in tool.
//!
//! Provides TOML-based configuration with:
//! - `[oauth]`, `[checkin]` and `[location]` sections
//! - Config file layering (user config + project-local overrides)
//! - Environment overrides from the process and a `.env` file
//! - Validation into a [`ResolvedConfig`]

pub mod discovery;
pub mod env;
pub mod error;
pub mod resolve;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config_file, load_config_with_env,
    load_config_with_options, user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use resolve::{
    DEFAULT_TIMEOUT_SECS, ResolvedConfig, ResolvedLocation, ResolvedOAuth, mask_secret,
};
pub use types::*;
