use std::sync::Arc;

use async_trait::async_trait;
use papaya::HashMap as PapayaHashMap;
use uuid::Uuid;

use leadbridge_storage::{ContactLink, LinkStore, OpportunityLink, StoreError, TenantLink};

type ScopedKey = String; // Format: "company_id/entity_id"

pub(crate) fn make_scoped_key(company_id: &str, entity_id: &str) -> ScopedKey {
    format!("{company_id}/{entity_id}")
}

/// In-memory mapping store using papaya lock-free hash maps.
///
/// Opportunity links live in a primary table keyed by an internal uuid with
/// estimate and job index maps pointing at it, so a lineage merge rewrites
/// one record and both indexes resolve to the same deal.
#[derive(Debug, Default)]
pub struct InMemoryLinkStore {
    tenants: Arc<PapayaHashMap<String, TenantLink>>,
    contacts: Arc<PapayaHashMap<ScopedKey, ContactLink>>,
    opportunities: Arc<PapayaHashMap<String, OpportunityLink>>,
    estimate_index: Arc<PapayaHashMap<ScopedKey, String>>,
    job_index: Arc<PapayaHashMap<ScopedKey, String>>,
}

impl InMemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn opportunity_by_ref(&self, link_ref: &str) -> Option<OpportunityLink> {
        let guard = self.opportunities.pin();
        guard.get(link_ref).cloned()
    }
}

#[async_trait]
impl LinkStore for InMemoryLinkStore {
    async fn tenant(&self, company_id: &str) -> Result<Option<TenantLink>, StoreError> {
        let guard = self.tenants.pin();
        Ok(guard.get(company_id).cloned())
    }

    async fn put_tenant(&self, link: TenantLink) -> Result<(), StoreError> {
        let guard = self.tenants.pin();
        guard.insert(link.company_id.clone(), link);
        Ok(())
    }

    async fn contact(
        &self,
        company_id: &str,
        customer_id: &str,
    ) -> Result<Option<ContactLink>, StoreError> {
        let key = make_scoped_key(company_id, customer_id);
        let guard = self.contacts.pin();
        Ok(guard.get(&key).cloned())
    }

    async fn put_contact(&self, link: ContactLink) -> Result<(), StoreError> {
        let key = make_scoped_key(&link.company_id, &link.customer_id);
        let guard = self.contacts.pin();
        guard.insert(key, link);
        Ok(())
    }

    async fn delete_contact(
        &self,
        company_id: &str,
        customer_id: &str,
    ) -> Result<(), StoreError> {
        let key = make_scoped_key(company_id, customer_id);
        let guard = self.contacts.pin();
        guard.remove(&key);
        Ok(())
    }

    async fn opportunity_by_estimate(
        &self,
        company_id: &str,
        estimate_id: &str,
    ) -> Result<Option<OpportunityLink>, StoreError> {
        let key = make_scoped_key(company_id, estimate_id);
        let link_ref = {
            let guard = self.estimate_index.pin();
            guard.get(&key).cloned()
        };
        Ok(link_ref.and_then(|r| self.opportunity_by_ref(&r)))
    }

    async fn opportunity_by_job(
        &self,
        company_id: &str,
        job_id: &str,
    ) -> Result<Option<OpportunityLink>, StoreError> {
        let key = make_scoped_key(company_id, job_id);
        let link_ref = {
            let guard = self.job_index.pin();
            guard.get(&key).cloned()
        };
        Ok(link_ref.and_then(|r| self.opportunity_by_ref(&r)))
    }

    async fn put_opportunity(&self, link: OpportunityLink) -> Result<(), StoreError> {
        // Reuse the existing record when either key already points at one,
        // otherwise mint a fresh internal ref.
        let existing_ref = {
            if let Some(estimate_id) = &link.estimate_id {
                let key = make_scoped_key(&link.company_id, estimate_id);
                let guard = self.estimate_index.pin();
                guard.get(&key).cloned()
            } else {
                None
            }
        }
        .or_else(|| {
            link.job_id.as_ref().and_then(|job_id| {
                let key = make_scoped_key(&link.company_id, job_id);
                let guard = self.job_index.pin();
                guard.get(&key).cloned()
            })
        });

        let link_ref = existing_ref.unwrap_or_else(|| Uuid::new_v4().to_string());

        if let Some(estimate_id) = &link.estimate_id {
            let key = make_scoped_key(&link.company_id, estimate_id);
            let guard = self.estimate_index.pin();
            guard.insert(key, link_ref.clone());
        }
        if let Some(job_id) = &link.job_id {
            let key = make_scoped_key(&link.company_id, job_id);
            let guard = self.job_index.pin();
            guard.insert(key, link_ref.clone());
        }

        let guard = self.opportunities.pin();
        guard.insert(link_ref, link);
        Ok(())
    }

    async fn attach_job(
        &self,
        company_id: &str,
        estimate_id: &str,
        job_id: &str,
    ) -> Result<OpportunityLink, StoreError> {
        let estimate_key = make_scoped_key(company_id, estimate_id);
        let link_ref = {
            let guard = self.estimate_index.pin();
            guard.get(&estimate_key).cloned()
        }
        .ok_or_else(|| StoreError::not_found("opportunity", &estimate_key))?;

        let updated = {
            let guard = self.opportunities.pin();
            let mut link = guard
                .get(&link_ref)
                .cloned()
                .ok_or_else(|| StoreError::internal(format!("dangling link ref {link_ref}")))?;
            link.job_id = Some(job_id.to_string());
            guard.insert(link_ref.clone(), link.clone());
            link
        };

        let job_key = make_scoped_key(company_id, job_id);
        let guard = self.job_index.pin();
        guard.insert(job_key, link_ref);

        Ok(updated)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
