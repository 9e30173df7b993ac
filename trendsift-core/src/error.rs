use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Post source error: {0}")]
    Source(#[from] SourceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

}

/// Failures reported by a post source (platform search API or a saved dump of one).
///
/// The retryable variants (`RateLimitExceeded`, `Unavailable`, `RequestTimeout`)
/// are what network-backed `PostSource` implementations report for transient
/// failures; the file-backed source maps transient read errors onto them too.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    #[error("Authentication failed for {platform}: {reason}")]
    AuthenticationFailed { platform: String, reason: String },

    #[error("Rate limit exceeded for {platform}. Retry after {retry_after} seconds")]
    RateLimitExceeded { platform: String, retry_after: u64 },

    #[error("Search quota exhausted for {platform}")]
    QuotaExceeded { platform: String },

    #[error("Source unavailable: {platform}")]
    Unavailable { platform: String },

    #[error("Request timeout for {platform}")]
    RequestTimeout { platform: String },

    #[error("Invalid response from {platform}: {details}")]
    InvalidResponse { platform: String, details: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid configuration format: {details}")]
    InvalidFormat { details: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
