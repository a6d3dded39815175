use std::collections::HashMap;

use async_trait::async_trait;

use leadbridge_crm::{CrmError, TokenProvider};

use crate::config::TenantSeed;

/// Token provider backed by the seeded tenant credentials.
///
/// Stands in for the external OAuth machinery: tokens are handed to the
/// bridge at startup and resolved by credential reference. Refresh and
/// expiry are outside this service.
#[derive(Debug, Default)]
pub struct StaticTokenProvider {
    tokens: HashMap<String, String>,
}

impl StaticTokenProvider {
    pub fn from_seeds(seeds: &[TenantSeed]) -> Self {
        let tokens = seeds
            .iter()
            .filter(|s| !s.access_token.is_empty())
            .map(|s| (s.credential_ref.clone(), s.access_token.clone()))
            .collect();
        Self { tokens }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self, credential_ref: &str) -> Result<String, CrmError> {
        self.tokens
            .get(credential_ref)
            .cloned()
            .ok_or_else(|| CrmError::missing_credentials(credential_ref))
    }
}
