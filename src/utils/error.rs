use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkerError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Catalog returned HTTP {status} for {url}")]
    ApiStatusError { status: u16, url: String },

    #[error("Catalog query failed: {message}")]
    CatalogError { message: String },

    #[error("Failed to link scene {scene_id}: {message}")]
    MutationError { scene_id: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown mode: {mode}")]
    UnknownModeError { mode: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Catalog,
    Configuration,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LinkerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LinkerError::ApiError(_) | LinkerError::ApiStatusError { .. } => {
                ErrorCategory::Network
            }
            LinkerError::CatalogError { .. } | LinkerError::MutationError { .. } => {
                ErrorCategory::Catalog
            }
            LinkerError::ConfigError { .. }
            | LinkerError::InvalidConfigValueError { .. }
            | LinkerError::UnknownModeError { .. }
            | LinkerError::UrlError(_) => ErrorCategory::Configuration,
            LinkerError::IoError(_) | LinkerError::SerializationError(_) => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 單一場景的失敗，不影響整批
            LinkerError::MutationError { .. } => ErrorSeverity::Low,
            LinkerError::ApiError(_) | LinkerError::ApiStatusError { .. } => ErrorSeverity::Medium,
            LinkerError::CatalogError { .. }
            | LinkerError::ConfigError { .. }
            | LinkerError::InvalidConfigValueError { .. }
            | LinkerError::UnknownModeError { .. }
            | LinkerError::UrlError(_)
            | LinkerError::SerializationError(_) => ErrorSeverity::High,
            LinkerError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the server is running and reachable, then retry",
            ErrorCategory::Catalog => "Check the server logs for the rejected query or mutation",
            ErrorCategory::Configuration => "Review the plugin settings and the task arguments",
            ErrorCategory::Data => "Check that the input payload is valid JSON",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LinkerError::ApiError(_) | LinkerError::ApiStatusError { .. } => {
                format!("Could not reach the catalog: {}", self)
            }
            LinkerError::UnknownModeError { mode } => {
                format!("'{}' is not a supported task mode (expected 'processAll')", mode)
            }
            LinkerError::SerializationError(e) => format!("Malformed input: {}", e),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LinkerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_errors_are_low_severity() {
        let err = LinkerError::MutationError {
            scene_id: "12".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.category(), ErrorCategory::Catalog);
        assert_eq!(err.to_string(), "Failed to link scene 12: boom");
    }

    #[test]
    fn test_unknown_mode_message() {
        let err = LinkerError::UnknownModeError {
            mode: "cleanup".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.user_friendly_message().contains("processAll"));
    }
}
