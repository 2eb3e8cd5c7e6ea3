//! Error types for statusgen
//!
//! Only failures that must abort a report are errors. A degraded LLM summary
//! or judge call is carried as data (`llm::SummaryOutcome`), never as an error.

use std::fmt;

/// Result type alias for statusgen operations
pub type Result<T> = std::result::Result<T, StatusError>;

/// Main error type for statusgen operations
#[derive(Debug)]
pub enum StatusError {
    /// Invalid user input (empty required field, malformed name or URL)
    Input(String),

    /// Period string that is neither a known keyword nor `<date> to <date>`
    InvalidPeriod(String),

    /// Issue source unreachable or query rejected
    UpstreamFetch(String),

    /// Configuration error
    Config(String),

    /// Preset store error
    Storage(String),

    /// IO error
    Io(std::io::Error),

    /// Serialization/deserialization error
    Serde(serde_json::Error),

    /// Generic error with message
    Other(String),
}

impl StatusError {
    /// Whether the caller supplied bad input. These are surfaced verbatim and
    /// never retried.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Input(_) | Self::InvalidPeriod(_))
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(msg) => write!(f, "{}", msg),
            Self::InvalidPeriod(period) => write!(f, "Invalid period: {}", period),
            Self::UpstreamFetch(msg) => write!(f, "Failed to fetch issues: {}", msg),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Storage(msg) => write!(f, "Preset storage error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Serde(err) => write!(f, "Serialization error: {}", err),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for StatusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serde(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StatusError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for StatusError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err)
    }
}

impl From<toml::de::Error> for StatusError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<utils::UtilsError> for StatusError {
    fn from(err: utils::UtilsError) -> Self {
        match err {
            utils::UtilsError::ConfigError(msg) => Self::Config(msg),
            utils::UtilsError::IoError(err) => Self::Io(err),
            other => Self::UpstreamFetch(other.to_string()),
        }
    }
}

impl From<llm::LlmError> for StatusError {
    fn from(err: llm::LlmError) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<anyhow::Error> for StatusError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for StatusError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}

impl From<&str> for StatusError {
    fn from(msg: &str) -> Self {
        Self::Other(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_verbatim() {
        let err = StatusError::Input("Initiative name is required".into());
        assert_eq!(err.to_string(), "Initiative name is required");
        assert!(err.is_input_error());
    }

    #[test]
    fn test_invalid_period_is_input_error() {
        let err = StatusError::InvalidPeriod("yesterday".into());
        assert!(err.is_input_error());
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn test_utils_status_error_becomes_upstream_fetch() {
        let err: StatusError = utils::UtilsError::StatusError {
            status: 400,
            body: "bad jql".into(),
        }
        .into();
        assert!(matches!(err, StatusError::UpstreamFetch(_)));
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_io_error_has_source() {
        let err: StatusError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(std::error::Error::source(&err).is_some());
    }
}
