//! Structured processing result returned to the boundary layer.

use serde::Serialize;

/// How an event was disposed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The event was processed and remote state reconciled.
    Completed,
    /// The event type is outside the catalogue; acknowledged, no action.
    Unhandled,
    /// The event was recognized but required no action (e.g. an appointment
    /// for a job the bridge has never seen).
    Skipped,
    /// Processing failed; the caller's queue decides whether to retry.
    Failed,
}

/// The result of processing one event.
///
/// Serializes as `{message | error, contact_id?, opportunity_id?}`, which is
/// what the webhook acknowledgment body carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    #[serde(skip)]
    pub disposition: Disposition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opportunity_id: Option<String>,
}

impl SyncReport {
    pub fn completed(message: impl Into<String>) -> Self {
        Self {
            disposition: Disposition::Completed,
            message: Some(message.into()),
            error: None,
            contact_id: None,
            opportunity_id: None,
        }
    }

    pub fn unhandled(event_type: &str) -> Self {
        Self {
            disposition: Disposition::Unhandled,
            message: Some(format!("Event {event_type} not handled")),
            error: None,
            contact_id: None,
            opportunity_id: None,
        }
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Self {
            disposition: Disposition::Skipped,
            message: Some(message.into()),
            error: None,
            contact_id: None,
            opportunity_id: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            disposition: Disposition::Failed,
            message: None,
            error: Some(error.into()),
            contact_id: None,
            opportunity_id: None,
        }
    }

    #[must_use]
    pub fn with_contact_id(mut self, contact_id: impl Into<String>) -> Self {
        self.contact_id = Some(contact_id.into());
        self
    }

    #[must_use]
    pub fn with_opportunity_id(mut self, opportunity_id: impl Into<String>) -> Self {
        self.opportunity_id = Some(opportunity_id.into());
        self
    }
}
