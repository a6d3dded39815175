//! Pipeline stage resolution.
//!
//! [`resolve_stage`] is a pure, total function from event kind to a symbolic
//! [`Stage`]; events that carry no stage semantics resolve to `None`, which
//! callers must treat as "leave the current stage untouched". The mapping
//! from symbolic stage to the CRM's stage identifier lives in [`StageMap`]
//! and is overridable per deployment.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::event::EventKind;

/// Symbolic pipeline stages of the deal lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    EstimateCreated,
    EstimateScheduled,
    EstimateOnMyWay,
    EstimateCompleted,
    EstimateSent,
    JobCreated,
    JobScheduled,
    JobOnMyWay,
    JobStarted,
    JobCompleted,
}

impl Stage {
    pub const ALL: &'static [Stage] = &[
        Self::EstimateCreated,
        Self::EstimateScheduled,
        Self::EstimateOnMyWay,
        Self::EstimateCompleted,
        Self::EstimateSent,
        Self::JobCreated,
        Self::JobScheduled,
        Self::JobOnMyWay,
        Self::JobStarted,
        Self::JobCompleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EstimateCreated => "estimate_created",
            Self::EstimateScheduled => "estimate_scheduled",
            Self::EstimateOnMyWay => "estimate_on_my_way",
            Self::EstimateCompleted => "estimate_completed",
            Self::EstimateSent => "estimate_sent",
            Self::JobCreated => "job_created",
            Self::JobScheduled => "job_scheduled",
            Self::JobOnMyWay => "job_on_my_way",
            Self::JobStarted => "job_started",
            Self::JobCompleted => "job_completed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy for `estimate.option.approval_status_changed`, which production
/// deployments have wanted to treat two different ways.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStagePolicy {
    /// Move the deal to the estimate-sent stage.
    #[default]
    TreatAsSent,
    /// Leave the current pipeline position untouched.
    LeaveStage,
}

/// Resolve the pipeline stage for an event.
///
/// `None` means the event carries no stage change; the caller must leave the
/// deal's current stage alone.
pub fn resolve_stage(kind: EventKind, policy: ApprovalStagePolicy) -> Option<Stage> {
    match kind {
        EventKind::CustomerCreated | EventKind::CustomerUpdated | EventKind::CustomerDeleted => {
            None
        }
        EventKind::EstimateCreated | EventKind::EstimateOptionCreated => {
            Some(Stage::EstimateCreated)
        }
        EventKind::EstimateScheduled => Some(Stage::EstimateScheduled),
        EventKind::EstimateOnMyWay => Some(Stage::EstimateOnMyWay),
        EventKind::EstimateCompleted => Some(Stage::EstimateCompleted),
        EventKind::EstimateSent => Some(Stage::EstimateSent),
        EventKind::EstimateApprovalChanged => match policy {
            ApprovalStagePolicy::TreatAsSent => Some(Stage::EstimateSent),
            ApprovalStagePolicy::LeaveStage => None,
        },
        // copy_to_job only closes the estimate deal; stage moves come from
        // the job events that follow.
        EventKind::EstimateCopyToJob => None,
        EventKind::JobCreated => Some(Stage::JobCreated),
        EventKind::JobUpdated => None,
        EventKind::JobScheduled => Some(Stage::JobScheduled),
        EventKind::JobOnMyWay => Some(Stage::JobOnMyWay),
        EventKind::JobStarted => Some(Stage::JobStarted),
        EventKind::JobCompleted | EventKind::JobPaid => Some(Stage::JobCompleted),
        // closed-lost is expressed through the opportunity status, not a stage
        EventKind::JobCanceled | EventKind::JobDeleted => None,
        EventKind::AppointmentScheduled | EventKind::AppointmentRescheduled => {
            Some(Stage::JobScheduled)
        }
        EventKind::AppointmentProsAssigned
        | EventKind::AppointmentProsUnassigned
        | EventKind::AppointmentDiscarded => None,
    }
}

/// Maps symbolic stages to the CRM's pipeline-stage identifiers.
#[derive(Debug, Clone)]
pub struct StageMap {
    ids: HashMap<Stage, String>,
}

impl StageMap {
    /// The stage identifiers of the production pipeline this bridge was
    /// first deployed against.
    pub fn production_defaults() -> Self {
        let ids = [
            (Stage::EstimateCreated, "be6b28f7-b0ce-43c6-a27d-b3862c937573"),
            (Stage::EstimateScheduled, "4af05417-3d54-4dbf-82c9-ef98367fdf51"),
            (Stage::EstimateOnMyWay, "4ae7824b-92a7-4f25-a4ca-0e65b4ca4c43"),
            (Stage::EstimateCompleted, "40c97416-7379-43e3-a908-e37f88f923bb"),
            (Stage::EstimateSent, "db9f2183-de84-4b60-8c41-3c2177dbc947"),
            (Stage::JobCreated, "6c9e3352-2958-4d59-b93b-9f967274539d"),
            (Stage::JobScheduled, "7d17b02f-88af-4e7c-abc4-59ef89f0e189"),
            (Stage::JobOnMyWay, "e72d3998-b9cf-42bb-bfdc-e0ac9226466d"),
            (Stage::JobStarted, "706a1981-db46-4b0d-9543-47270c20193e"),
            (Stage::JobCompleted, "6be00967-b2ad-4e5f-b6a2-7f63d6977a39"),
        ]
        .into_iter()
        .map(|(stage, id)| (stage, id.to_string()))
        .collect();
        Self { ids }
    }

    /// Apply per-deployment overrides on top of the defaults.
    pub fn with_overrides(mut self, overrides: &HashMap<Stage, String>) -> Self {
        for (stage, id) in overrides {
            self.ids.insert(*stage, id.clone());
        }
        self
    }

    /// The CRM stage identifier for a symbolic stage.
    pub fn id(&self, stage: Stage) -> Option<&str> {
        self.ids.get(&stage).map(String::as_str)
    }
}

impl Default for StageMap {
    fn default() -> Self {
        Self::production_defaults()
    }
}
