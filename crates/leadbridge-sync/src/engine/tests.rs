use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use leadbridge_core::{ApprovalStagePolicy, StageMap};
use leadbridge_crm::{ContactFields, CrmApi, CrmConnector, CrmError, DealFields, DynCrmApi};
use leadbridge_db_memory::InMemoryLinkStore;
use leadbridge_storage::{ContactLink, LinkStore, OpportunityLink, TenantLink};

use crate::report::Disposition;

use super::SyncEngine;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    CreateContact {
        location_id: String,
    },
    UpdateContact {
        contact_id: String,
    },
    DeleteContact {
        contact_id: String,
    },
    CreateOpportunity {
        location_id: String,
        contact_id: String,
        name: Option<String>,
        monetary_value: Option<f64>,
        stage_id: Option<String>,
    },
    UpdateOpportunity {
        opportunity_id: String,
        monetary_value: Option<f64>,
        stage_id: Option<String>,
    },
    CloseOpportunity {
        opportunity_id: String,
        won: bool,
    },
}

/// CRM fake that records every call and can be told to fail specific ops.
#[derive(Default)]
struct RecordingCrm {
    calls: Mutex<Vec<Call>>,
    counter: AtomicUsize,
    fail_create_contact: bool,
    fail_create_opportunity: bool,
    fail_update_contact: bool,
    fail_close: bool,
}

impl RecordingCrm {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{prefix}-{n}")
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn count<F: Fn(&Call) -> bool>(&self, pred: F) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl CrmApi for RecordingCrm {
    async fn create_contact(
        &self,
        location_id: &str,
        _fields: &ContactFields,
    ) -> Result<String, CrmError> {
        self.record(Call::CreateContact {
            location_id: location_id.to_string(),
        });
        if self.fail_create_contact {
            return Err(CrmError::http(500, "create contact failed"));
        }
        Ok(self.next_id("contact"))
    }

    async fn update_contact(
        &self,
        contact_id: &str,
        _fields: &ContactFields,
    ) -> Result<(), CrmError> {
        self.record(Call::UpdateContact {
            contact_id: contact_id.to_string(),
        });
        if self.fail_update_contact {
            return Err(CrmError::http(500, "update contact failed"));
        }
        Ok(())
    }

    async fn delete_contact(&self, contact_id: &str) -> Result<(), CrmError> {
        self.record(Call::DeleteContact {
            contact_id: contact_id.to_string(),
        });
        Ok(())
    }

    async fn create_opportunity(
        &self,
        location_id: &str,
        contact_id: &str,
        deal: &DealFields,
        stage_id: Option<&str>,
    ) -> Result<String, CrmError> {
        self.record(Call::CreateOpportunity {
            location_id: location_id.to_string(),
            contact_id: contact_id.to_string(),
            name: deal.name.clone(),
            monetary_value: deal.monetary_value,
            stage_id: stage_id.map(str::to_string),
        });
        if self.fail_create_opportunity {
            return Err(CrmError::http(500, "create opportunity failed"));
        }
        Ok(self.next_id("opp"))
    }

    async fn update_opportunity(
        &self,
        opportunity_id: &str,
        deal: &DealFields,
        stage_id: Option<&str>,
    ) -> Result<(), CrmError> {
        self.record(Call::UpdateOpportunity {
            opportunity_id: opportunity_id.to_string(),
            monetary_value: deal.monetary_value,
            stage_id: stage_id.map(str::to_string),
        });
        Ok(())
    }

    async fn close_opportunity(&self, opportunity_id: &str, won: bool) -> Result<(), CrmError> {
        self.record(Call::CloseOpportunity {
            opportunity_id: opportunity_id.to_string(),
            won,
        });
        if self.fail_close {
            return Err(CrmError::http(500, "close failed"));
        }
        Ok(())
    }
}

/// Connector that always hands back the same recording fake.
struct FixedConnector {
    api: Arc<RecordingCrm>,
    connects: AtomicUsize,
}

#[async_trait]
impl CrmConnector for FixedConnector {
    async fn connect(&self, _credential_ref: &str) -> Result<DynCrmApi, CrmError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let api: DynCrmApi = self.api.clone();
        Ok(api)
    }
}

struct Harness {
    engine: SyncEngine,
    store: Arc<InMemoryLinkStore>,
    crm: Arc<RecordingCrm>,
    connector: Arc<FixedConnector>,
}

async fn harness_with(crm: RecordingCrm) -> Harness {
    let store = Arc::new(InMemoryLinkStore::new());
    store
        .put_tenant(TenantLink::new("C1", "L1", "cred-1"))
        .await
        .unwrap();
    let crm = Arc::new(crm);
    let connector = Arc::new(FixedConnector {
        api: crm.clone(),
        connects: AtomicUsize::new(0),
    });
    let engine = SyncEngine::new(
        store.clone(),
        connector.clone(),
        StageMap::production_defaults(),
        ApprovalStagePolicy::default(),
    );
    Harness {
        engine,
        store,
        crm,
        connector,
    }
}

async fn harness() -> Harness {
    harness_with(RecordingCrm::default()).await
}

fn estimate_created_event() -> serde_json::Value {
    json!({
        "event": "estimate.created",
        "company_id": "C1",
        "estimate": {
            "id": "E1",
            "customer": {"id": "CU1", "first_name": "A", "last_name": "B"},
            "options": [{"total_amount": 10000}]
        }
    })
}

fn job_event(event: &str, original_estimate_id: Option<&str>) -> serde_json::Value {
    let mut job = json!({
        "id": "J1",
        "invoice_number": "INV-7",
        "total_amount": 25000,
        "customer": {"id": "CU1", "first_name": "A", "last_name": "B"}
    });
    if let Some(estimate_id) = original_estimate_id {
        job["original_estimate_id"] = json!(estimate_id);
    }
    json!({"event": event, "company_id": "C1", "job": job})
}

#[tokio::test]
async fn estimate_created_creates_contact_and_opportunity() {
    let h = harness().await;
    let report = h.engine.process(&estimate_created_event()).await;

    assert_eq!(report.disposition, Disposition::Completed);
    assert_eq!(report.message.as_deref(), Some("Opportunity created"));

    // one ContactLink, one estimate-keyed OpportunityLink
    let contact = h.store.contact("C1", "CU1").await.unwrap().unwrap();
    assert_eq!(Some(contact.contact_id.as_str()), report.contact_id.as_deref());
    let opp = h
        .store
        .opportunity_by_estimate("C1", "E1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(opp.job_id, None);

    // one create-opportunity call with the normalized amount and stage
    let calls = h.crm.calls();
    assert_eq!(
        calls,
        vec![
            Call::CreateContact {
                location_id: "L1".into()
            },
            Call::CreateOpportunity {
                location_id: "L1".into(),
                contact_id: contact.contact_id.clone(),
                name: Some("A B #E1".into()),
                monetary_value: Some(100.0),
                stage_id: Some("be6b28f7-b0ce-43c6-a27d-b3862c937573".into()),
            },
        ]
    );
}

#[tokio::test]
async fn repeated_estimate_event_updates_instead_of_creating() {
    let h = harness().await;
    h.engine.process(&estimate_created_event()).await;
    let report = h.engine.process(&estimate_created_event()).await;

    assert_eq!(report.disposition, Disposition::Completed);
    assert_eq!(report.message.as_deref(), Some("Opportunity updated"));

    // zero additional creates; the second pass is one contact refresh and
    // one opportunity update
    assert_eq!(h.crm.count(|c| matches!(c, Call::CreateContact { .. })), 1);
    assert_eq!(
        h.crm.count(|c| matches!(c, Call::CreateOpportunity { .. })),
        1
    );
    assert_eq!(h.crm.count(|c| matches!(c, Call::UpdateContact { .. })), 1);
    assert_eq!(
        h.crm.count(|c| matches!(c, Call::UpdateOpportunity { .. })),
        1
    );
}

#[tokio::test]
async fn customer_created_twice_yields_one_link_and_an_update() {
    let h = harness().await;
    let event = json!({
        "event": "customer.created",
        "company_id": "C1",
        "customer": {"id": "CU1", "first_name": "A", "last_name": "B"}
    });

    let first = h.engine.process(&event).await;
    assert_eq!(first.message.as_deref(), Some("Contact created"));

    let second = h.engine.process(&event).await;
    assert_eq!(second.message.as_deref(), Some("Contact updated"));
    assert_eq!(first.contact_id, second.contact_id);

    assert_eq!(h.crm.count(|c| matches!(c, Call::CreateContact { .. })), 1);
    assert_eq!(h.crm.count(|c| matches!(c, Call::UpdateContact { .. })), 1);
}

#[tokio::test]
async fn job_with_estimate_lineage_merges_onto_the_same_link() {
    let h = harness().await;
    h.store
        .put_opportunity(OpportunityLink::for_estimate("E1", "opp-est", "C1", "L1"))
        .await
        .unwrap();

    let report = h.engine.process(&job_event("job.created", Some("E1"))).await;
    assert_eq!(report.disposition, Disposition::Completed);
    assert_eq!(
        report.message.as_deref(),
        Some("Opportunity merged with estimate lineage")
    );
    assert_eq!(report.opportunity_id.as_deref(), Some("opp-est"));

    // the same record now holds both ids
    let by_estimate = h
        .store
        .opportunity_by_estimate("C1", "E1")
        .await
        .unwrap()
        .unwrap();
    let by_job = h.store.opportunity_by_job("C1", "J1").await.unwrap().unwrap();
    assert_eq!(by_estimate, by_job);
    assert_eq!(by_estimate.estimate_id.as_deref(), Some("E1"));
    assert_eq!(by_estimate.job_id.as_deref(), Some("J1"));

    // exactly one remote update, no create
    assert_eq!(
        h.crm.count(|c| matches!(c, Call::UpdateOpportunity { .. })),
        1
    );
    assert_eq!(
        h.crm.count(|c| matches!(c, Call::CreateOpportunity { .. })),
        0
    );
}

#[tokio::test]
async fn job_without_lineage_creates_a_new_deal() {
    let h = harness().await;
    let report = h.engine.process(&job_event("job.created", None)).await;
    assert_eq!(report.message.as_deref(), Some("Opportunity created"));

    let link = h.store.opportunity_by_job("C1", "J1").await.unwrap().unwrap();
    assert_eq!(link.estimate_id, None);

    // invoice-number naming and minor-unit normalization on the wire
    let create = h
        .crm
        .calls()
        .into_iter()
        .find(|c| matches!(c, Call::CreateOpportunity { .. }))
        .unwrap();
    match create {
        Call::CreateOpportunity {
            name,
            monetary_value,
            ..
        } => {
            assert_eq!(name.as_deref(), Some("A B #INV-7"));
            assert_eq!(monetary_value, Some(250.0));
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn job_retains_unlinked_estimate_lineage_on_create() {
    let h = harness().await;
    // lineage id present but no estimate link exists: brand-new deal that
    // keeps the estimate id for later reconciliation
    h.engine.process(&job_event("job.created", Some("E9"))).await;

    let link = h.store.opportunity_by_job("C1", "J1").await.unwrap().unwrap();
    assert_eq!(link.estimate_id.as_deref(), Some("E9"));
    assert_eq!(
        h.crm.count(|c| matches!(c, Call::CreateOpportunity { .. })),
        1
    );
}

#[tokio::test]
async fn contact_failure_blocks_opportunity_work() {
    let h = harness_with(RecordingCrm {
        fail_create_contact: true,
        ..Default::default()
    })
    .await;

    let report = h.engine.process(&estimate_created_event()).await;
    assert_eq!(report.disposition, Disposition::Failed);
    assert!(report.error.is_some());

    // no opportunity call was attempted and no links were persisted
    assert_eq!(
        h.crm.count(|c| matches!(c, Call::CreateOpportunity { .. })),
        0
    );
    assert!(h.store.contact("C1", "CU1").await.unwrap().is_none());
    assert!(
        h.store
            .opportunity_by_estimate("C1", "E1")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn contact_refresh_failure_does_not_block_opportunity_work() {
    let h = harness_with(RecordingCrm {
        fail_update_contact: true,
        ..Default::default()
    })
    .await;
    h.store
        .put_contact(ContactLink::new("CU1", "contact-0", "C1", "L1"))
        .await
        .unwrap();

    let report = h.engine.process(&estimate_created_event()).await;

    // refresh failed but the linked id is kept and the deal work proceeds
    assert_eq!(report.disposition, Disposition::Completed);
    assert_eq!(report.contact_id.as_deref(), Some("contact-0"));
    assert_eq!(h.crm.count(|c| matches!(c, Call::UpdateContact { .. })), 1);
    assert_eq!(h.crm.count(|c| matches!(c, Call::CreateContact { .. })), 0);
    assert_eq!(
        h.crm.count(|c| matches!(c, Call::CreateOpportunity { .. })),
        1
    );
}

#[tokio::test]
async fn explicit_customer_update_failure_is_reported() {
    // the same flag on the direct customer.updated path is a hard failure,
    // unlike the best-effort refresh inside deal handling
    let h = harness_with(RecordingCrm {
        fail_update_contact: true,
        ..Default::default()
    })
    .await;
    h.store
        .put_contact(ContactLink::new("CU1", "contact-0", "C1", "L1"))
        .await
        .unwrap();

    let event = json!({
        "event": "customer.updated",
        "company_id": "C1",
        "customer": {"id": "CU1", "first_name": "A"}
    });
    let report = h.engine.process(&event).await;
    assert_eq!(report.disposition, Disposition::Failed);
}

#[tokio::test]
async fn job_completed_closes_won_once_after_successful_upsert() {
    let h = harness().await;
    let report = h.engine.process(&job_event("job.completed", None)).await;

    assert_eq!(report.disposition, Disposition::Completed);
    assert_eq!(report.message.as_deref(), Some("Opportunity closed won"));

    let closes: Vec<Call> = h
        .crm
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::CloseOpportunity { .. }))
        .collect();
    let opportunity_id = report.opportunity_id.unwrap();
    assert_eq!(
        closes,
        vec![Call::CloseOpportunity {
            opportunity_id,
            won: true
        }]
    );
}

#[tokio::test]
async fn job_canceled_closes_lost() {
    let h = harness().await;
    let report = h.engine.process(&job_event("job.canceled", None)).await;
    assert_eq!(report.message.as_deref(), Some("Opportunity closed lost"));
    assert_eq!(
        h.crm
            .count(|c| matches!(c, Call::CloseOpportunity { won: false, .. })),
        1
    );
}

#[tokio::test]
async fn failed_upsert_skips_the_close_call() {
    let h = harness_with(RecordingCrm {
        fail_create_opportunity: true,
        ..Default::default()
    })
    .await;

    let report = h.engine.process(&job_event("job.completed", None)).await;
    assert_eq!(report.disposition, Disposition::Failed);
    assert_eq!(
        h.crm.count(|c| matches!(c, Call::CloseOpportunity { .. })),
        0
    );
}

#[tokio::test]
async fn close_failure_does_not_invalidate_the_upsert() {
    let h = harness_with(RecordingCrm {
        fail_close: true,
        ..Default::default()
    })
    .await;

    let report = h.engine.process(&job_event("job.completed", None)).await;
    assert_eq!(report.disposition, Disposition::Completed);
}

#[tokio::test]
async fn copy_to_job_closes_the_estimate_deal_as_won() {
    let h = harness().await;
    h.store
        .put_opportunity(OpportunityLink::for_estimate("E1", "opp-est", "C1", "L1"))
        .await
        .unwrap();

    let event = json!({
        "event": "estimate.copy_to_job",
        "company_id": "C1",
        "estimate": {"id": "E1", "customer": {"id": "CU1"}}
    });
    let report = h.engine.process(&event).await;

    assert_eq!(report.disposition, Disposition::Completed);
    assert_eq!(
        h.crm.calls(),
        vec![Call::CloseOpportunity {
            opportunity_id: "opp-est".into(),
            won: true
        }]
    );
    // no creation on this path; the job event that follows does the merge
    assert_eq!(
        h.crm.count(|c| matches!(c, Call::CreateOpportunity { .. })),
        0
    );
}

#[tokio::test]
async fn unknown_event_is_acknowledged_without_any_interaction() {
    let h = harness().await;
    let report = h
        .engine
        .process(&json!({"event": "foo.bar", "company_id": "C1"}))
        .await;

    assert_eq!(report.disposition, Disposition::Unhandled);
    assert_eq!(report.message.as_deref(), Some("Event foo.bar not handled"));
    assert_eq!(h.connector.connects.load(Ordering::SeqCst), 0);
    assert!(h.crm.calls().is_empty());
}

#[tokio::test]
async fn missing_tenant_mapping_is_a_reported_failure() {
    let h = harness().await;
    let mut event = estimate_created_event();
    event["company_id"] = json!("C-unknown");

    let report = h.engine.process(&event).await;
    assert_eq!(report.disposition, Disposition::Failed);
    assert!(
        report
            .error
            .unwrap()
            .contains("No tenant mapping found for company C-unknown")
    );
    assert!(h.crm.calls().is_empty());
}

#[tokio::test]
async fn missing_required_id_is_malformed() {
    let h = harness().await;
    let event = json!({
        "event": "estimate.created",
        "company_id": "C1",
        "estimate": {"customer": {"id": "CU1"}}
    });
    let report = h.engine.process(&event).await;
    assert_eq!(report.disposition, Disposition::Failed);
    assert!(report.error.unwrap().contains("Malformed event"));
}

#[tokio::test]
async fn appointment_without_link_is_a_noop() {
    let h = harness().await;
    let event = json!({
        "event": "job.appointment.scheduled",
        "company_id": "C1",
        "appointment": {"id": "A1", "job_id": "J404"}
    });
    let report = h.engine.process(&event).await;

    assert_eq!(report.disposition, Disposition::Skipped);
    assert!(h.crm.calls().is_empty());
}

#[tokio::test]
async fn appointment_moves_the_linked_deal_to_job_scheduled() {
    let h = harness().await;
    h.store
        .put_opportunity(OpportunityLink::for_job(
            "J1", None, "opp-job", "C1", "L1",
        ))
        .await
        .unwrap();

    let event = json!({
        "event": "job.appointment.scheduled",
        "company_id": "C1",
        "appointment": {"id": "A1", "job_id": "J1"}
    });
    let report = h.engine.process(&event).await;

    assert_eq!(report.disposition, Disposition::Completed);
    assert_eq!(
        h.crm.calls(),
        vec![Call::UpdateOpportunity {
            opportunity_id: "opp-job".into(),
            monetary_value: None,
            stage_id: Some("7d17b02f-88af-4e7c-abc4-59ef89f0e189".into()),
        }]
    );
}

#[tokio::test]
async fn customer_deleted_drops_the_link_and_remote_contact() {
    let h = harness().await;
    let create = json!({
        "event": "customer.created",
        "company_id": "C1",
        "customer": {"id": "CU1", "first_name": "A"}
    });
    let created = h.engine.process(&create).await;
    let contact_id = created.contact_id.unwrap();

    let delete = json!({
        "event": "customer.deleted",
        "company_id": "C1",
        "customer": {"id": "CU1"}
    });
    let report = h.engine.process(&delete).await;

    assert_eq!(report.message.as_deref(), Some("Contact deleted"));
    assert!(h.store.contact("C1", "CU1").await.unwrap().is_none());
    assert_eq!(
        h.crm
            .count(|c| matches!(c, Call::DeleteContact { contact_id: id } if *id == contact_id)),
        1
    );

    // deleting again is a recognized no-op
    let again = h.engine.process(&delete).await;
    assert_eq!(again.disposition, Disposition::Skipped);
}
