use thiserror::Error;

/// Core error types for LeadBridge event processing
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("No tenant mapping found for company {0}")]
    MissingMapping(String),

    #[error("Malformed event: {message}")]
    MalformedEvent { message: String },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    /// Create a new MissingMapping error
    pub fn missing_mapping(company_id: impl Into<String>) -> Self {
        Self::MissingMapping(company_id.into())
    }

    /// Create a new MalformedEvent error
    pub fn malformed_event(message: impl Into<String>) -> Self {
        Self::MalformedEvent {
            message: message.into(),
        }
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingMapping(_) => ErrorCategory::MissingMapping,
            Self::MalformedEvent { .. } => ErrorCategory::Malformed,
            Self::JsonError(_) => ErrorCategory::Serialization,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error categories for monitoring and classification.
///
/// Shared across the workspace: `Remote` and `Store` classify downstream
/// failures surfaced by other crates' error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    MissingMapping,
    Malformed,
    Serialization,
    Configuration,
    Remote,
    Store,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingMapping => write!(f, "missing_mapping"),
            Self::Malformed => write!(f, "malformed"),
            Self::Serialization => write!(f, "serialization"),
            Self::Configuration => write!(f, "configuration"),
            Self::Remote => write!(f, "remote"),
            Self::Store => write!(f, "store"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CoreError::missing_mapping("comp-1");
        assert_eq!(
            err.to_string(),
            "No tenant mapping found for company comp-1"
        );
        assert_eq!(err.category(), ErrorCategory::MissingMapping);
    }

    #[test]
    fn test_malformed_event_error() {
        let err = CoreError::malformed_event("customer id absent");
        assert_eq!(err.to_string(), "Malformed event: customer id absent");
        assert_eq!(err.category(), ErrorCategory::Malformed);
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err =
            serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();
        let core_err: CoreError = json_err.into();
        assert!(matches!(core_err, CoreError::JsonError(_)));
        assert_eq!(core_err.category(), ErrorCategory::Serialization);
    }

    #[test]
    fn test_error_categories_display() {
        assert_eq!(ErrorCategory::MissingMapping.to_string(), "missing_mapping");
        assert_eq!(ErrorCategory::Malformed.to_string(), "malformed");
        assert_eq!(ErrorCategory::Serialization.to_string(), "serialization");
        assert_eq!(ErrorCategory::Configuration.to_string(), "configuration");
        assert_eq!(ErrorCategory::Remote.to_string(), "remote");
        assert_eq!(ErrorCategory::Store.to_string(), "store");
    }
}
