//! Kernel configuration with hierarchical layering.
//!
//! # Architecture
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌─────────────────────────────────────────┐
//! │  1. Environment Variables (WEFT_*)      │  Runtime override
//! ├─────────────────────────────────────────┤
//! │  2. Project Config (.weft/config.toml)  │  Project-specific
//! ├─────────────────────────────────────────┤
//! │  3. Global Config (~/.weft/config.toml) │  User defaults
//! ├─────────────────────────────────────────┤
//! │  4. Default Values (compile-time)       │  Fallback
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `WEFT_MAX_DEPTH` | `bus.max_depth` | usize |
//! | `WEFT_ROOT_NAMESPACE` | `registry.root_namespace` | String |
//! | `WEFT_LOG` | `log.filter` | String |
//! | `WEFT_LOG_ANSI` | `log.ansi` | bool |
//!
//! # Example Configuration
//!
//! ```toml
//! # ~/.weft/config.toml
//!
//! [bus]
//! max_depth = 32
//!
//! [registry]
//! root_namespace = "weft"
//!
//! [log]
//! filter = "warn"
//! ansi = true
//! target = false
//! ```

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::{save_global_config, ConfigLoader};
pub use types::{BusConfig, KernelConfig, LogConfig, RegistryConfig};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".weft")
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join(PROJECT_CONFIG_FILE)
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".weft";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";
