//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;
use weft_types::ErrorCode;

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config file '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Failed to serialize config.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Failed to write config file.
    #[error("failed to write config file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid environment variable value.
    #[error("invalid value for environment variable '{name}': {message}")]
    InvalidEnvVar { name: String, message: String },

    /// A loaded value is out of range.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Failed to create config directory.
    #[error("failed to create config directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Creates a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse TOML error.
    pub fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }

    /// Creates a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid env var error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a create dir error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::ReadFile { .. } => "CONFIG_READ_FILE",
            Self::ParseToml { .. } => "CONFIG_PARSE_TOML",
            Self::Serialize(_) => "CONFIG_SERIALIZE",
            Self::WriteFile { .. } => "CONFIG_WRITE_FILE",
            Self::InvalidEnvVar { .. } => "CONFIG_INVALID_ENV_VAR",
            Self::InvalidValue { .. } => "CONFIG_INVALID_VALUE",
            Self::CreateDir { .. } => "CONFIG_CREATE_DIR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::ReadFile { .. } | Self::WriteFile { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_types::assert_error_codes;

    fn io() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "gone")
    }

    #[test]
    fn all_error_codes_valid() {
        let parse = toml::from_str::<toml::Table>("= broken").expect_err("invalid toml");
        let variants = vec![
            ConfigError::read_file("/a", io()),
            ConfigError::parse_toml("/a", parse),
            ConfigError::write_file("/a", io()),
            ConfigError::invalid_env_var("WEFT_LOG", "bad"),
            ConfigError::invalid_value("bus.max_depth", "must be positive"),
            ConfigError::create_dir("/a", io()),
        ];
        assert_error_codes(&variants, "CONFIG_");
    }

    #[test]
    fn display_names_the_variable() {
        let err = ConfigError::invalid_env_var("WEFT_LOG_ANSI", "expected bool");
        assert_eq!(
            err.to_string(),
            "invalid value for environment variable 'WEFT_LOG_ANSI': expected bool"
        );
    }
}
