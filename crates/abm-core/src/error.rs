use thiserror::Error;

/// Errors raised while loading or validating engine configuration.
///
/// Missing optional entries are not errors: lookups fall back to neutral
/// defaults at call time and log a warning. This enum covers genuinely
/// broken configuration only.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}
