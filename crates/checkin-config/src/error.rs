//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration loading and resolution.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize config.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Failed to read a `.env` file.
    #[error("failed to read env file '{path}': {message}")]
    EnvFile { path: String, message: String },

    /// An environment variable holds a value of the wrong type.
    #[error("invalid value '{value}' for {var}: expected {expected}")]
    InvalidValue {
        var: String,
        value: String,
        expected: &'static str,
    },

    /// Missing required field.
    #[error("missing required field '{field}' in {context}")]
    MissingField { field: String, context: String },

    /// A field is present but outside its allowed range.
    #[error("{field} is out of range: {message}")]
    OutOfRange { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn missing(field: &str, section: &str, env_var: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
            context: format!("[{}] (or set {})", section, env_var),
        }
    }
}
