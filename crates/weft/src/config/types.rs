//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use weft_event::DEFAULT_MAX_DEPTH;
use weft_registry::DEFAULT_ROOT_NAMESPACE;

/// Kernel configuration after merging all layers.
///
/// Fields carry `#[serde(default)]`, so every table and key is optional
/// in a config file.
///
/// # Example
///
/// ```
/// use weft::config::KernelConfig;
///
/// let config = KernelConfig::from_toml("[bus]\nmax_depth = 8\n").unwrap();
/// assert_eq!(config.bus.max_depth, 8);
/// assert_eq!(config.registry.root_namespace, "weft");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KernelConfig {
    /// Event bus settings.
    pub bus: BusConfig,

    /// Registry settings.
    pub registry: RegistryConfig,

    /// Logging settings.
    pub log: LogConfig,
}

impl KernelConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes to TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Writes the config to `path`, creating the parent directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
            }
        }

        let toml = self.to_toml()?;
        std::fs::write(path, toml).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Merges another config into this one.
    ///
    /// Values from `other` override values in `self` only if they
    /// differ from the default.
    pub fn merge(&mut self, other: &Self) {
        self.bus.merge(&other.bus);
        self.registry.merge(&other.registry);
        self.log.merge(&other.log);
    }

    /// Checks values the type system cannot.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bus.max_depth == 0 {
            return Err(ConfigError::invalid_value(
                "bus.max_depth",
                "must be at least 1",
            ));
        }

        let ns = &self.registry.root_namespace;
        if ns.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "registry.root_namespace",
                "must not be blank",
            ));
        }
        if ns.contains('.') || ns.contains('/') || ns.trim() != ns {
            return Err(ConfigError::invalid_value(
                "registry.root_namespace",
                format!("'{ns}' must be a single path segment"),
            ));
        }

        Ok(())
    }
}

/// Event bus configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BusConfig {
    /// Maximum nesting of publishes from inside listeners.
    pub max_depth: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl BusConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.max_depth != default.max_depth {
            self.max_depth = other.max_depth;
        }
    }
}

/// Registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Leading path segment ignored by every registry the kernel builds.
    pub root_namespace: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root_namespace: DEFAULT_ROOT_NAMESPACE.into(),
        }
    }
}

impl RegistryConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.root_namespace != default.root_namespace {
            self.root_namespace = other.root_namespace.clone();
        }
    }
}

/// Logging configuration.
///
/// # Example TOML
///
/// ```toml
/// [log]
/// filter = "weft_event=debug,warn"
/// ansi = false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directives.
    pub filter: String,

    /// Colored output.
    pub ansi: bool,

    /// Print the event target (module path).
    pub target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".into(),
            ansi: true,
            target: false,
        }
    }
}

impl LogConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.filter != default.filter {
            self.filter = other.filter.clone();
        }
        if other.ansi != default.ansi {
            self.ansi = other.ansi;
        }
        if other.target != default.target {
            self.target = other.target;
        }
    }
}
