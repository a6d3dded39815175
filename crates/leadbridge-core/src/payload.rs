//! Inbound webhook payload model.
//!
//! Field names follow the source system's wire format. Deserialization is
//! deliberately lenient: missing fields default, unknown fields are ignored,
//! and amounts go through the tolerant parser in [`crate::money`].

use serde::{Deserialize, Serialize};

use crate::money::lenient_minor_units;

/// The outer webhook body: `event`, `company_id` and one nested entity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub customer: Option<CustomerPayload>,
    #[serde(default)]
    pub estimate: Option<EstimatePayload>,
    #[serde(default)]
    pub job: Option<JobPayload>,
    #[serde(default)]
    pub appointment: Option<AppointmentPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub home_number: Option<String>,
    #[serde(default)]
    pub work_number: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub lead_source: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstimatePayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub estimate_number: Option<String>,
    #[serde(default)]
    pub customer: Option<CustomerPayload>,
    #[serde(default, deserialize_with = "lenient_minor_units")]
    pub total_amount: Option<i64>,
    #[serde(default)]
    pub lead_source: Option<String>,
    #[serde(default)]
    pub options: Vec<EstimateOption>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstimateOption {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_minor_units")]
    pub total_amount: Option<i64>,
    #[serde(default)]
    pub approval_status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub customer: Option<CustomerPayload>,
    #[serde(default, deserialize_with = "lenient_minor_units")]
    pub total_amount: Option<i64>,
    #[serde(default)]
    pub original_estimate_id: Option<String>,
    #[serde(default)]
    pub lead_source: Option<String>,
    #[serde(default)]
    pub work_status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

impl EstimatePayload {
    /// Amount for the deal, preferring the first option's amount over the
    /// estimate-level amount when present.
    pub fn effective_amount(&self) -> Option<i64> {
        self.options
            .first()
            .and_then(|opt| opt.total_amount)
            .or(self.total_amount)
    }
}
