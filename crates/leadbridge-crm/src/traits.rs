//! Trait seams for the CRM capability.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CrmError;
use crate::fields::{ContactFields, DealFields};

/// The four-and-a-half idempotent-ish remote operations the engine needs.
///
/// Implementations hold no local state beyond their connection; every side
/// effect is at the remote system.
#[async_trait]
pub trait CrmApi: Send + Sync {
    /// Creates a contact under the given location, returning its id.
    async fn create_contact(
        &self,
        location_id: &str,
        fields: &ContactFields,
    ) -> Result<String, CrmError>;

    /// Updates a contact in place.
    async fn update_contact(&self, contact_id: &str, fields: &ContactFields)
    -> Result<(), CrmError>;

    /// Deletes a contact.
    async fn delete_contact(&self, contact_id: &str) -> Result<(), CrmError>;

    /// Creates an open opportunity for a contact, returning its id.
    /// `stage_id` of `None` lets the CRM place it at the pipeline entry.
    async fn create_opportunity(
        &self,
        location_id: &str,
        contact_id: &str,
        deal: &DealFields,
        stage_id: Option<&str>,
    ) -> Result<String, CrmError>;

    /// Updates an opportunity; only the set deal fields are sent, and a
    /// `stage_id` of `None` leaves the current stage untouched.
    async fn update_opportunity(
        &self,
        opportunity_id: &str,
        deal: &DealFields,
        stage_id: Option<&str>,
    ) -> Result<(), CrmError>;

    /// Closes an opportunity as won or lost.
    async fn close_opportunity(&self, opportunity_id: &str, won: bool) -> Result<(), CrmError>;
}

pub type DynCrmApi = Arc<dyn CrmApi>;

/// The opaque credential supplier. Token refresh and expiry handling live
/// behind this seam, outside the bridge.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Resolves a tenant's credential reference to a live bearer token.
    async fn bearer_token(&self, credential_ref: &str) -> Result<String, CrmError>;
}

/// Builds a per-tenant [`CrmApi`] from a credential reference.
///
/// This is the engine's mockable boundary: production connects over HTTP,
/// tests hand back recording fakes.
#[async_trait]
pub trait CrmConnector: Send + Sync {
    async fn connect(&self, credential_ref: &str) -> Result<DynCrmApi, CrmError>;
}
