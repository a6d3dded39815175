//! Store trait for the mapping-store abstraction layer.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{ContactLink, OpportunityLink, TenantLink};

/// The mapping store every backend must implement.
///
/// The store is the single source of truth for cross-system links; the
/// reconciliation engine re-reads it on every event and never caches links
/// across calls. Backends must serialize writes per key (unique-constraint
/// semantics) so near-simultaneous events for the same customer or deal do
/// not create duplicate links. Implementations must be `Send + Sync`.
#[async_trait]
pub trait LinkStore: Send + Sync {
    // ==================== Tenants ====================

    /// Looks up the tenant link for a source company.
    ///
    /// Returns `None` if the company has not been onboarded.
    async fn tenant(&self, company_id: &str) -> Result<Option<TenantLink>, StoreError>;

    /// Creates or replaces a tenant link. Used by onboarding and seeding,
    /// never by event processing.
    async fn put_tenant(&self, link: TenantLink) -> Result<(), StoreError>;

    // ==================== Contacts ====================

    /// Looks up the contact link for `(company_id, customer_id)`.
    async fn contact(
        &self,
        company_id: &str,
        customer_id: &str,
    ) -> Result<Option<ContactLink>, StoreError>;

    /// Creates or replaces the contact link for its `(customer, company)`
    /// key. Upsert semantics keep lookups idempotent.
    async fn put_contact(&self, link: ContactLink) -> Result<(), StoreError>;

    /// Removes the contact link for `(company_id, customer_id)`.
    ///
    /// Removing an absent link is not an error.
    async fn delete_contact(&self, company_id: &str, customer_id: &str)
    -> Result<(), StoreError>;

    // ==================== Opportunities ====================

    /// Looks up the opportunity link keyed by estimate.
    async fn opportunity_by_estimate(
        &self,
        company_id: &str,
        estimate_id: &str,
    ) -> Result<Option<OpportunityLink>, StoreError>;

    /// Looks up the opportunity link keyed by job.
    async fn opportunity_by_job(
        &self,
        company_id: &str,
        job_id: &str,
    ) -> Result<Option<OpportunityLink>, StoreError>;

    /// Creates or replaces an opportunity link, indexed by whichever of its
    /// estimate/job ids are set.
    async fn put_opportunity(&self, link: OpportunityLink) -> Result<(), StoreError>;

    /// Lineage merge: writes `job_id` onto the existing estimate-keyed link
    /// in place and returns the updated record. The deal must never fork
    /// into a second record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no link exists for the estimate.
    async fn attach_job(
        &self,
        company_id: &str,
        estimate_id: &str,
        job_id: &str,
    ) -> Result<OpportunityLink, StoreError>;

    // ==================== Metadata ====================

    /// Returns the name of this store backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
