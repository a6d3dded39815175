//! The reconciliation engine.
//!
//! One event is processed synchronously, start to finish, per invocation.
//! Contact work always completes before opportunity work starts; the store
//! is re-read on every event and never cached across calls.

use tracing::{info, warn};

use leadbridge_core::{
    ApprovalStagePolicy, CoreError, CustomerPayload, ErrorCategory, EventKind, Handler, Routed,
    StageMap, WebhookEnvelope, deal_name, minor_to_major, resolve_stage, route,
};
use leadbridge_crm::{ContactFields, CrmConnector, CrmError, DealFields, DynCrmApi};
use leadbridge_storage::{ContactLink, DynLinkStore, OpportunityLink, StoreError, TenantLink};

use crate::report::SyncReport;

#[cfg(test)]
mod tests;

/// Internal error taxonomy; every variant ends up as a `SyncReport` error,
/// never as a panic or an error across the boundary. Mapping and payload
/// faults carry the shared [`CoreError`] vocabulary so messages stay
/// uniform across the workspace.
#[derive(Debug, thiserror::Error)]
enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("CRM call failed: {0}")]
    Remote(#[from] CrmError),

    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Core(err) => err.category(),
            Self::Remote(_) => ErrorCategory::Remote,
            Self::Store(_) => ErrorCategory::Store,
        }
    }
}

fn malformed(message: impl Into<String>) -> EngineError {
    EngineError::Core(CoreError::malformed_event(message))
}

fn required<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str, EngineError> {
    value
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed(format!("no {what} in event payload")))
}

/// What a job upsert did to the deal record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobAction {
    Created,
    Updated,
    Merged,
}

/// Orchestrates one event: ensures the contact, then ensures/updates the
/// opportunity, applying lineage and close-out rules.
pub struct SyncEngine {
    store: DynLinkStore,
    crm: std::sync::Arc<dyn CrmConnector>,
    stages: StageMap,
    approval_policy: ApprovalStagePolicy,
}

impl SyncEngine {
    pub fn new(
        store: DynLinkStore,
        crm: std::sync::Arc<dyn CrmConnector>,
        stages: StageMap,
        approval_policy: ApprovalStagePolicy,
    ) -> Self {
        Self {
            store,
            crm,
            stages,
            approval_policy,
        }
    }

    /// Process one raw webhook body. Never errors across this boundary; the
    /// outcome is always a structured report.
    pub async fn process(&self, raw: &serde_json::Value) -> SyncReport {
        let envelope: WebhookEnvelope = match serde_json::from_value(raw.clone()) {
            Ok(envelope) => envelope,
            Err(err) => return SyncReport::failed(format!("Malformed event: {err}")),
        };

        let (kind, handler) = match route(&envelope.event) {
            Routed::Handled(kind, handler) => (kind, handler),
            Routed::Unhandled => {
                info!(event = %envelope.event, "event type not in catalogue, acknowledging");
                return SyncReport::unhandled(&envelope.event);
            }
        };

        info!(
            event = %kind,
            company_id = envelope.company_id.as_deref().unwrap_or("<missing>"),
            "processing event"
        );

        match self.dispatch(kind, handler, &envelope).await {
            Ok(report) => report,
            Err(err) => {
                warn!(
                    event = %kind,
                    category = %err.category(),
                    error = %err,
                    "event processing failed"
                );
                SyncReport::failed(err.to_string())
            }
        }
    }

    async fn dispatch(
        &self,
        kind: EventKind,
        handler: Handler,
        envelope: &WebhookEnvelope,
    ) -> Result<SyncReport, EngineError> {
        let company_id = required(envelope.company_id.as_deref(), "company_id")?;
        let tenant = self
            .store
            .tenant(company_id)
            .await?
            .ok_or_else(|| EngineError::Core(CoreError::missing_mapping(company_id)))?;
        let crm = self.crm.connect(&tenant.credential_ref).await?;
        let stage_id = self.stage_id_for(kind);
        let stage_id = stage_id.as_deref();

        match handler {
            Handler::ContactCreated | Handler::ContactUpdated => {
                self.contact_upsert(&crm, &tenant, envelope).await
            }
            Handler::ContactDeleted => self.contact_delete(&crm, &tenant, envelope).await,
            Handler::EstimateUpsert => {
                self.estimate_upsert(&crm, &tenant, envelope, stage_id).await
            }
            Handler::EstimateCopyToJob => self.estimate_copy_to_job(&crm, &tenant, envelope).await,
            Handler::JobUpsert => self.job_event(&crm, &tenant, envelope, stage_id, None).await,
            Handler::JobCompleted | Handler::JobPaid => {
                self.job_event(&crm, &tenant, envelope, stage_id, Some(true))
                    .await
            }
            Handler::JobClosedLost => {
                self.job_event(&crm, &tenant, envelope, stage_id, Some(false))
                    .await
            }
            Handler::JobAppointment => self.appointment(&crm, &tenant, envelope, stage_id).await,
        }
    }

    /// Resolved CRM stage identifier for an event, if it carries one.
    fn stage_id_for(&self, kind: EventKind) -> Option<String> {
        resolve_stage(kind, self.approval_policy)
            .and_then(|stage| self.stages.id(stage))
            .map(str::to_string)
    }

    // ==================== Contact lifecycle ====================

    /// Explicit customer create/update events. A second `customer.created`
    /// refreshes the linked contact instead of duplicating it; here a
    /// failed refresh is a reported failure.
    async fn contact_upsert(
        &self,
        crm: &DynCrmApi,
        tenant: &TenantLink,
        envelope: &WebhookEnvelope,
    ) -> Result<SyncReport, EngineError> {
        let customer = envelope
            .customer
            .as_ref()
            .ok_or_else(|| malformed("no customer in event payload"))?;
        let customer_id = required(customer.id.as_deref(), "customer id")?;
        let fields = ContactFields::from_customer(customer);

        if let Some(link) = self.store.contact(&tenant.company_id, customer_id).await? {
            crm.update_contact(&link.contact_id, &fields).await?;
            return Ok(SyncReport::completed("Contact updated").with_contact_id(link.contact_id));
        }

        let contact_id = crm.create_contact(&tenant.location_id, &fields).await?;
        self.store
            .put_contact(ContactLink::new(
                customer_id,
                &contact_id,
                &tenant.company_id,
                &tenant.location_id,
            ))
            .await?;
        Ok(SyncReport::completed("Contact created").with_contact_id(contact_id))
    }

    async fn contact_delete(
        &self,
        crm: &DynCrmApi,
        tenant: &TenantLink,
        envelope: &WebhookEnvelope,
    ) -> Result<SyncReport, EngineError> {
        let customer = envelope
            .customer
            .as_ref()
            .ok_or_else(|| malformed("no customer in event payload"))?;
        let customer_id = required(customer.id.as_deref(), "customer id")?;

        let Some(link) = self.store.contact(&tenant.company_id, customer_id).await? else {
            return Ok(SyncReport::skipped(format!(
                "No linked contact for customer {customer_id}"
            )));
        };

        // The link is dropped even when the remote delete fails, so a
        // re-created customer starts from a clean slate.
        if let Err(err) = crm.delete_contact(&link.contact_id).await {
            warn!(contact_id = %link.contact_id, error = %err, "remote contact delete failed");
        }
        self.store
            .delete_contact(&tenant.company_id, customer_id)
            .await?;
        Ok(SyncReport::completed("Contact deleted").with_contact_id(link.contact_id))
    }

    /// Contact-ensure step used by every deal handler. Fails closed: no
    /// opportunity work proceeds without a contact id. An existing link is
    /// refreshed best-effort; only *create* failure aborts the event.
    async fn ensure_contact(
        &self,
        crm: &DynCrmApi,
        tenant: &TenantLink,
        customer: &CustomerPayload,
    ) -> Result<String, EngineError> {
        let customer_id = required(customer.id.as_deref(), "customer id")?;
        let fields = ContactFields::from_customer(customer);

        if let Some(link) = self.store.contact(&tenant.company_id, customer_id).await? {
            if let Err(err) = crm.update_contact(&link.contact_id, &fields).await {
                warn!(
                    contact_id = %link.contact_id,
                    error = %err,
                    "contact refresh failed, continuing with linked id"
                );
            }
            return Ok(link.contact_id);
        }

        let contact_id = crm.create_contact(&tenant.location_id, &fields).await?;
        self.store
            .put_contact(ContactLink::new(
                customer_id,
                &contact_id,
                &tenant.company_id,
                &tenant.location_id,
            ))
            .await?;
        Ok(contact_id)
    }

    // ==================== Estimate lifecycle ====================

    async fn estimate_upsert(
        &self,
        crm: &DynCrmApi,
        tenant: &TenantLink,
        envelope: &WebhookEnvelope,
        stage_id: Option<&str>,
    ) -> Result<SyncReport, EngineError> {
        let estimate = envelope
            .estimate
            .as_ref()
            .ok_or_else(|| malformed("no estimate in event payload"))?;
        let estimate_id = required(estimate.id.as_deref(), "estimate id")?;
        let customer = estimate
            .customer
            .as_ref()
            .ok_or_else(|| malformed("estimate has no embedded customer"))?;

        let contact_id = self.ensure_contact(crm, tenant, customer).await?;

        let name = deal_name(
            customer.first_name.as_deref(),
            customer.last_name.as_deref(),
            estimate.estimate_number.as_deref(),
            None,
            estimate_id,
        );
        let mut deal =
            DealFields::named(name).with_monetary_value(minor_to_major(estimate.effective_amount()));
        if let Some(source) = estimate.lead_source.as_deref().filter(|s| !s.is_empty()) {
            deal = deal.with_source(source);
        }

        if let Some(link) = self
            .store
            .opportunity_by_estimate(&tenant.company_id, estimate_id)
            .await?
        {
            crm.update_opportunity(&link.opportunity_id, &deal, stage_id)
                .await?;
            return Ok(SyncReport::completed("Opportunity updated")
                .with_contact_id(contact_id)
                .with_opportunity_id(link.opportunity_id));
        }

        let opportunity_id = crm
            .create_opportunity(&tenant.location_id, &contact_id, &deal, stage_id)
            .await?;
        self.store
            .put_opportunity(OpportunityLink::for_estimate(
                estimate_id,
                &opportunity_id,
                &tenant.company_id,
                &tenant.location_id,
            ))
            .await?;
        Ok(SyncReport::completed("Opportunity created")
            .with_contact_id(contact_id)
            .with_opportunity_id(opportunity_id))
    }

    /// Close out the estimate's deal as won; the job events that follow will
    /// merge into the same link through the estimate lineage.
    async fn estimate_copy_to_job(
        &self,
        crm: &DynCrmApi,
        tenant: &TenantLink,
        envelope: &WebhookEnvelope,
    ) -> Result<SyncReport, EngineError> {
        let estimate = envelope
            .estimate
            .as_ref()
            .ok_or_else(|| malformed("no estimate in event payload"))?;
        let estimate_id = required(estimate.id.as_deref(), "estimate id")?;

        let Some(link) = self
            .store
            .opportunity_by_estimate(&tenant.company_id, estimate_id)
            .await?
        else {
            return Ok(SyncReport::skipped(format!(
                "No opportunity linked to estimate {estimate_id}"
            )));
        };

        // Best-effort: a failed close-out must not block the job events
        // that follow this conversion.
        if let Err(err) = crm.close_opportunity(&link.opportunity_id, true).await {
            warn!(
                opportunity_id = %link.opportunity_id,
                error = %err,
                "closing estimate opportunity as won failed"
            );
        }
        Ok(SyncReport::completed("Estimate closed for job conversion")
            .with_opportunity_id(link.opportunity_id))
    }

    // ==================== Job lifecycle ====================

    /// Job create/update plus optional close-out. The close call runs only
    /// after a successful create/update and its failure does not invalidate
    /// the upsert.
    async fn job_event(
        &self,
        crm: &DynCrmApi,
        tenant: &TenantLink,
        envelope: &WebhookEnvelope,
        stage_id: Option<&str>,
        close_won: Option<bool>,
    ) -> Result<SyncReport, EngineError> {
        let job = envelope
            .job
            .as_ref()
            .ok_or_else(|| malformed("no job in event payload"))?;
        let job_id = required(job.id.as_deref(), "job id")?;
        let customer = job
            .customer
            .as_ref()
            .ok_or_else(|| malformed("job has no embedded customer"))?;

        let contact_id = self.ensure_contact(crm, tenant, customer).await?;

        let name = deal_name(
            customer.first_name.as_deref(),
            customer.last_name.as_deref(),
            None,
            job.invoice_number.as_deref(),
            job_id,
        );
        let mut deal =
            DealFields::named(name).with_monetary_value(minor_to_major(job.total_amount));
        if let Some(source) = job.lead_source.as_deref().filter(|s| !s.is_empty()) {
            deal = deal.with_source(source);
        }

        let (opportunity_id, action) = self
            .ensure_job_opportunity(crm, tenant, job_id, job.original_estimate_id.as_deref(), &contact_id, &deal, stage_id)
            .await?;

        if let Some(won) = close_won {
            if let Err(err) = crm.close_opportunity(&opportunity_id, won).await {
                warn!(
                    opportunity_id = %opportunity_id,
                    won,
                    error = %err,
                    "close-out failed after successful upsert"
                );
            }
        }

        let message = match (action, close_won) {
            (_, Some(true)) => "Opportunity closed won",
            (_, Some(false)) => "Opportunity closed lost",
            (JobAction::Created, None) => "Opportunity created",
            (JobAction::Updated, None) => "Opportunity updated",
            (JobAction::Merged, None) => "Opportunity merged with estimate lineage",
        };
        Ok(SyncReport::completed(message)
            .with_contact_id(contact_id)
            .with_opportunity_id(opportunity_id))
    }

    /// The three-way job lookup: by job id, by estimate lineage (merge in
    /// place, never a second record), or a brand-new deal.
    #[allow(clippy::too_many_arguments)]
    async fn ensure_job_opportunity(
        &self,
        crm: &DynCrmApi,
        tenant: &TenantLink,
        job_id: &str,
        original_estimate_id: Option<&str>,
        contact_id: &str,
        deal: &DealFields,
        stage_id: Option<&str>,
    ) -> Result<(String, JobAction), EngineError> {
        if let Some(link) = self
            .store
            .opportunity_by_job(&tenant.company_id, job_id)
            .await?
        {
            crm.update_opportunity(&link.opportunity_id, deal, stage_id)
                .await?;
            return Ok((link.opportunity_id, JobAction::Updated));
        }

        let estimate_id = original_estimate_id.filter(|s| !s.is_empty());
        if let Some(estimate_id) = estimate_id {
            let existing = self
                .store
                .opportunity_by_estimate(&tenant.company_id, estimate_id)
                .await?;
            if existing.is_some() {
                let merged = self
                    .store
                    .attach_job(&tenant.company_id, estimate_id, job_id)
                    .await?;
                crm.update_opportunity(&merged.opportunity_id, deal, stage_id)
                    .await?;
                return Ok((merged.opportunity_id, JobAction::Merged));
            }
        }

        let opportunity_id = crm
            .create_opportunity(&tenant.location_id, contact_id, deal, stage_id)
            .await?;
        self.store
            .put_opportunity(OpportunityLink::for_job(
                job_id,
                estimate_id.map(str::to_string),
                &opportunity_id,
                &tenant.company_id,
                &tenant.location_id,
            ))
            .await?;
        Ok((opportunity_id, JobAction::Created))
    }

    // ==================== Appointments ====================

    /// Appointment events only move the stage of an already-linked deal;
    /// there is no creation path and a miss is a reported no-op.
    async fn appointment(
        &self,
        crm: &DynCrmApi,
        tenant: &TenantLink,
        envelope: &WebhookEnvelope,
        stage_id: Option<&str>,
    ) -> Result<SyncReport, EngineError> {
        let appointment = envelope
            .appointment
            .as_ref()
            .ok_or_else(|| malformed("no appointment in event payload"))?;
        let job_id = required(appointment.job_id.as_deref(), "appointment job id")?;

        let Some(link) = self
            .store
            .opportunity_by_job(&tenant.company_id, job_id)
            .await?
        else {
            return Ok(SyncReport::skipped(format!(
                "No opportunity linked to job {job_id}"
            )));
        };

        crm.update_opportunity(&link.opportunity_id, &DealFields::default(), stage_id)
            .await?;
        Ok(SyncReport::completed("Opportunity stage updated")
            .with_opportunity_id(link.opportunity_id))
    }
}
