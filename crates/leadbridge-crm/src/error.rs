//! Error types for remote CRM calls.

/// Errors that can occur while talking to the CRM.
///
/// None of these are retried here; the caller or its queue decides policy.
#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    /// A network error occurred (includes call-level timeouts).
    #[error("Network error: {0}")]
    Network(String),

    /// The CRM returned a non-success status code.
    #[error("CRM returned status {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body did not match the expected schema.
    #[error("Unexpected CRM response: {0}")]
    UnexpectedResponse(String),

    /// The credential supplier could not produce a token.
    #[error("Missing credentials for {0}")]
    MissingCredentials(String),

    /// The client configuration is unusable.
    #[error("Invalid CRM client configuration: {0}")]
    InvalidConfig(String),
}

impl CrmError {
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    #[must_use]
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn unexpected_response(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse(message.into())
    }

    #[must_use]
    pub fn missing_credentials(credential_ref: impl Into<String>) -> Self {
        Self::MissingCredentials(credential_ref.into())
    }

    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

impl From<reqwest::Error> for CrmError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
