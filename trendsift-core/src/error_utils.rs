use crate::error::*;
use std::time::Duration;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn is_retryable(&self) -> bool;
    fn retry_after(&self) -> Option<Duration>;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Source(e) => {
                error!("Post source error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::Source(e) => e.is_retryable(),
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CoreError::Source(e) => e.retry_after(),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Source(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Io(_) => "Could not read or write a file. Please check the path.".to_string(),
            CoreError::Serialization(_) => {
                "The data could not be read as JSON. Please check the file contents.".to_string()
            }
            CoreError::InvalidInput { message } => {
                format!("Invalid input provided: {}.", message)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Source(_) => "SOURCE".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
        }
    }
}

impl ErrorExt for SourceError {
    fn log_error(&self) -> &Self {
        error!("SourceError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("SourceError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            SourceError::RateLimitExceeded { .. }
                | SourceError::Unavailable { .. }
                | SourceError::RequestTimeout { .. }
        )
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            SourceError::RateLimitExceeded { retry_after, .. } => {
                Some(Duration::from_secs(*retry_after))
            }
            _ if self.is_retryable() => Some(Duration::from_secs(5)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            SourceError::AuthenticationFailed { platform, .. } => format!(
                "Could not sign in to {}. Please check the API credentials.",
                platform
            ),
            SourceError::RateLimitExceeded {
                platform,
                retry_after,
            } => format!(
                "Too many searches on {}. Please wait {} seconds before trying again.",
                platform, retry_after
            ),
            SourceError::QuotaExceeded { platform } => {
                format!("The daily search quota for {} is used up.", platform)
            }
            SourceError::Unavailable { platform } => format!(
                "{} is temporarily unavailable. Please try again later.",
                platform
            ),
            SourceError::RequestTimeout { platform } => {
                format!("Search on {} timed out. Please try again.", platform)
            }
            SourceError::InvalidResponse { platform, .. } => {
                format!("{} returned results we could not read.", platform)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            SourceError::AuthenticationFailed { .. } => "SOURCE_AUTH_FAILED".to_string(),
            SourceError::RateLimitExceeded { .. } => "SOURCE_RATE_LIMIT".to_string(),
            SourceError::QuotaExceeded { .. } => "SOURCE_QUOTA_EXCEEDED".to_string(),
            SourceError::Unavailable { .. } => "SOURCE_UNAVAILABLE".to_string(),
            SourceError::RequestTimeout { .. } => "SOURCE_TIMEOUT".to_string(),
            SourceError::InvalidResponse { .. } => "SOURCE_INVALID_RESPONSE".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false // Config errors need the user to fix the file
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::InvalidFormat { .. } | ConfigError::Parse(_) => {
                "Configuration file format is invalid. Please check the settings.".to_string()
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::ValidationFailed { reason } => {
                format!("Configuration is not valid: {}.", reason)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidFormat { .. } => "CONFIG_INVALID_FORMAT".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

pub struct ErrorReporter {
    report_errors: bool,
    report_warnings: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            report_errors: true,
            report_warnings: true,
        }
    }

    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn with_warning_reporting(mut self, enabled: bool) -> Self {
        self.report_warnings = enabled;
        self
    }

    pub fn report_error(&self, error: &CoreError) {
        if self.report_errors {
            error.log_error();
            info!("Error code: {}", error.error_code());
            info!("User message: {}", error.user_friendly_message());
            if error.is_retryable() {
                if let Some(retry_after) = error.retry_after() {
                    info!("Error is retryable. Retry after: {:?}", retry_after);
                }
            }
        }
    }

    pub fn report_warning(&self, error: &CoreError) {
        if self.report_warnings {
            error.log_warn();
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
