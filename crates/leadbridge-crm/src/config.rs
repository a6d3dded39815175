//! CRM client configuration.

use std::time::Duration;

use url::Url;

/// The CRM API version header value this client speaks.
pub const DEFAULT_API_VERSION: &str = "2021-07-28";

const DEFAULT_BASE_URL: &str = "https://services.leadconnectorhq.com";

/// Configuration for the CRM HTTP client.
#[derive(Debug, Clone)]
pub struct CrmConfig {
    /// Base URL of the CRM API.
    pub base_url: Url,

    /// Value of the fixed API-version header sent with every request.
    pub api_version: String,

    /// The pipeline every opportunity is created in.
    pub pipeline_id: String,

    /// Call-level timeout for every request (default: 10 seconds).
    pub request_timeout: Duration,
}

impl CrmConfig {
    /// Creates a configuration for the given pipeline with default endpoint
    /// settings.
    pub fn new(pipeline_id: impl Into<String>) -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            api_version: DEFAULT_API_VERSION.to_string(),
            pipeline_id: pipeline_id.into(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Sets the API-version header value.
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Joins a path onto the base URL, tolerating trailing slashes.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CrmConfig::new("pipe-1");
        assert_eq!(config.base_url.as_str(), "https://services.leadconnectorhq.com/");
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.pipeline_id, "pipe-1");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_config_builder() {
        let config = CrmConfig::new("pipe-1")
            .with_base_url(Url::parse("https://crm.example.com/api/").unwrap())
            .with_api_version("2022-01-01")
            .with_request_timeout(Duration::from_secs(5));

        assert_eq!(config.api_version, "2022-01-01");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(
            config.endpoint("/contacts/"),
            "https://crm.example.com/api/contacts/"
        );
    }
}
