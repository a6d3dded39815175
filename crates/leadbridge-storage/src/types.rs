//! Durable link records owned by the mapping store.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Pairs one source-system company with one CRM location and credential set.
///
/// Created during onboarding; read-only to the reconciliation engine.
/// At most one per `company_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantLink {
    pub company_id: String,
    pub location_id: String,
    /// Opaque handle the credential supplier resolves to a bearer token.
    pub credential_ref: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TenantLink {
    pub fn new(
        company_id: impl Into<String>,
        location_id: impl Into<String>,
        credential_ref: impl Into<String>,
    ) -> Self {
        Self {
            company_id: company_id.into(),
            location_id: location_id.into(),
            credential_ref: credential_ref.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Maps a source-system customer to a CRM contact.
///
/// Unique per `(customer_id, company_id)`; deleted when the source customer
/// is deleted, never duplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLink {
    pub customer_id: String,
    pub contact_id: String,
    pub company_id: String,
    pub location_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ContactLink {
    pub fn new(
        customer_id: impl Into<String>,
        contact_id: impl Into<String>,
        company_id: impl Into<String>,
        location_id: impl Into<String>,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            contact_id: contact_id.into(),
            company_id: company_id.into(),
            location_id: location_id.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Maps a source-system estimate and/or job to a single CRM opportunity.
///
/// One record tracks one commercial deal across its whole lineage: a record
/// created for an estimate gains its `job_id` in place when the estimate is
/// converted, it must never fork into two records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityLink {
    pub estimate_id: Option<String>,
    pub job_id: Option<String>,
    pub opportunity_id: String,
    pub company_id: String,
    pub location_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl OpportunityLink {
    /// A link created for an estimate-scoped deal.
    pub fn for_estimate(
        estimate_id: impl Into<String>,
        opportunity_id: impl Into<String>,
        company_id: impl Into<String>,
        location_id: impl Into<String>,
    ) -> Self {
        Self {
            estimate_id: Some(estimate_id.into()),
            job_id: None,
            opportunity_id: opportunity_id.into(),
            company_id: company_id.into(),
            location_id: location_id.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// A link created for a deal first seen as a job. Retains the estimate
    /// lineage when the source supplies one.
    pub fn for_job(
        job_id: impl Into<String>,
        estimate_id: Option<String>,
        opportunity_id: impl Into<String>,
        company_id: impl Into<String>,
        location_id: impl Into<String>,
    ) -> Self {
        Self {
            estimate_id,
            job_id: Some(job_id.into()),
            opportunity_id: opportunity_id.into(),
            company_id: company_id.into(),
            location_id: location_id.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
