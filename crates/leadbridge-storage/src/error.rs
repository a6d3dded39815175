//! Error types for mapping-store operations.

/// Errors that can occur during mapping-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested link was not found.
    #[error("Link not found: {kind} {key}")]
    NotFound {
        /// Which relation was queried (tenant, contact, opportunity).
        kind: String,
        /// The lookup key that missed.
        key: String,
    },

    /// A write violated a uniqueness constraint.
    #[error("Link conflict: {kind} {key} already exists")]
    Conflict {
        /// Which relation rejected the write.
        kind: String,
        /// The conflicting key.
        key: String,
    },

    /// Failed to reach the storage backend.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StoreError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            key: key.into(),
        }
    }

    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Conflict {
            kind: kind.into(),
            key: key.into(),
        }
    }

    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error indicates a missing link rather than a backend fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StoreError::not_found("opportunity", "C1/E1");
        assert_eq!(err.to_string(), "Link not found: opportunity C1/E1");
        assert!(err.is_not_found());

        let err = StoreError::conflict("contact", "C1/CU1");
        assert_eq!(err.to_string(), "Link conflict: contact C1/CU1 already exists");
        assert!(!err.is_not_found());
    }
}
