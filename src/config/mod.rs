//! Configuration module for Stevedore
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (STEVEDORE_*)
//! 3. Explicit `--config` file, else `./stevedore.toml`
//! 4. User config (`<config dir>/stevedore/config.toml`)
//! 5. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{
    parse_flag, resolve, user_config_path, ConfigError, ConfigResult, ConfigWarning, LoadedConfig,
    PROJECT_CONFIG_FILE,
};

pub use types::{ColorMode, EngineConfig, OutputConfig, ReconcileConfig, RuntimeConfig};
