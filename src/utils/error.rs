use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unexpected response from {provider}: {message}")]
    UnexpectedResponse { provider: String, message: String },

    #[error("PDF extraction failed: {message}")]
    PdfError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SnapshotError {
    pub fn unexpected(provider: &str, message: impl Into<String>) -> Self {
        SnapshotError::UnexpectedResponse {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SnapshotError::HttpError(_) | SnapshotError::UnexpectedResponse { .. } => {
                ErrorSeverity::Medium
            }
            SnapshotError::PdfError { .. } => ErrorSeverity::Low,
            SnapshotError::ConfigError { .. }
            | SnapshotError::MissingConfigError { .. }
            | SnapshotError::InvalidConfigValueError { .. }
            | SnapshotError::TomlError(_)
            | SnapshotError::UrlError(_) => ErrorSeverity::High,
            SnapshotError::IoError(_) | SnapshotError::SerializationError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SnapshotError::HttpError(_) | SnapshotError::UnexpectedResponse { .. } => {
                format!("A data provider could not be reached: {}", self)
            }
            SnapshotError::IoError(e) => format!("Could not write the snapshot file: {}", e),
            SnapshotError::SerializationError(e) => {
                format!("Could not serialize the snapshot: {}", e)
            }
            SnapshotError::TomlError(_)
            | SnapshotError::UrlError(_)
            | SnapshotError::ConfigError { .. }
            | SnapshotError::MissingConfigError { .. }
            | SnapshotError::InvalidConfigValueError { .. } => {
                format!("Invalid configuration: {}", self)
            }
            SnapshotError::PdfError { message } => format!("Could not read the PDF: {}", message),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SnapshotError::HttpError(_) | SnapshotError::UnexpectedResponse { .. } => {
                "Check network connectivity and the endpoint URLs in [endpoints]"
            }
            SnapshotError::IoError(_) => {
                "Check that the output directory exists and is writable"
            }
            SnapshotError::SerializationError(_) => "Report this as a bug",
            SnapshotError::TomlError(_) => "Make sure the config file is valid TOML",
            SnapshotError::UrlError(_) => "Use absolute http(s) URLs in [endpoints]",
            SnapshotError::ConfigError { .. }
            | SnapshotError::MissingConfigError { .. }
            | SnapshotError::InvalidConfigValueError { .. } => {
                "Fix the reported field in the config file or command line"
            }
            SnapshotError::PdfError { .. } => "The published PDF layout may have changed",
        }
    }
}

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_follow_severity() {
        let config = SnapshotError::ConfigError {
            message: "no sections".to_string(),
        };
        assert_eq!(config.severity(), ErrorSeverity::High);
        assert_eq!(config.exit_code(), 1);

        let io = SnapshotError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(io.exit_code(), 3);

        let upstream = SnapshotError::unexpected("World Bank", "empty payload");
        assert_eq!(upstream.exit_code(), 2);
        assert!(upstream.to_string().contains("World Bank"));
    }

    #[test]
    fn test_user_friendly_message_mentions_cause() {
        let err = SnapshotError::MissingConfigError {
            field: "sections".to_string(),
        };
        assert!(err.user_friendly_message().contains("sections"));
        assert!(!err.recovery_suggestion().is_empty());
    }
}
