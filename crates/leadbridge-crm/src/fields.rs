//! Outbound field sets for contact and opportunity calls.

use leadbridge_core::CustomerPayload;
use serde_json::{Value, json};

/// Contact fields sent to the CRM, built from the source customer payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub source: String,
    pub tags: Vec<String>,
    pub home_phone: Option<String>,
    pub work_phone: Option<String>,
}

impl ContactFields {
    pub fn from_customer(customer: &CustomerPayload) -> Self {
        Self {
            first_name: customer.first_name.clone().unwrap_or_default(),
            last_name: customer.last_name.clone().unwrap_or_default(),
            email: customer.email.clone().unwrap_or_default(),
            phone: customer.mobile_number.clone().unwrap_or_default(),
            source: customer.lead_source.clone().unwrap_or_default(),
            tags: customer.tags.clone(),
            home_phone: customer.home_number.clone().filter(|s| !s.is_empty()),
            work_phone: customer.work_number.clone().filter(|s| !s.is_empty()),
        }
    }

    /// The JSON body shared by contact create and update calls. Secondary
    /// phone numbers travel as custom fields.
    pub(crate) fn to_body(&self) -> Value {
        let mut body = json!({
            "firstName": self.first_name,
            "lastName": self.last_name,
            "email": self.email,
            "phone": self.phone,
            "source": self.source,
            "tags": self.tags,
        });

        let mut custom_fields = Vec::new();
        if let Some(home) = &self.home_phone {
            custom_fields.push(json!({"key": "home_phone", "field_value": home}));
        }
        if let Some(work) = &self.work_phone {
            custom_fields.push(json!({"key": "work_phone", "field_value": work}));
        }
        if !custom_fields.is_empty() {
            body["customFields"] = Value::Array(custom_fields);
        }

        body
    }
}

/// Deal fields for opportunity calls. All fields optional: create requires
/// a name and value from the caller, updates send only what is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealFields {
    pub name: Option<String>,
    /// Major-unit decimal value, already normalized from minor units.
    pub monetary_value: Option<f64>,
    pub source: Option<String>,
}

impl DealFields {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_monetary_value(mut self, value: f64) -> Self {
        self.monetary_value = Some(value);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;

    #[test]
    fn contact_body_includes_phone_custom_fields() {
        let customer = CustomerPayload {
            id: Some("CU1".into()),
            first_name: Some("A".into()),
            last_name: Some("B".into()),
            email: Some("a@example.com".into()),
            mobile_number: Some("+1555".into()),
            home_number: Some("+1444".into()),
            work_number: None,
            lead_source: Some("Referral".into()),
            tags: vec!["vip".into()],
            ..Default::default()
        };
        let fields = ContactFields::from_customer(&customer);
        assert_json_eq!(
            fields.to_body(),
            serde_json::json!({
                "firstName": "A",
                "lastName": "B",
                "email": "a@example.com",
                "phone": "+1555",
                "source": "Referral",
                "tags": ["vip"],
                "customFields": [{"key": "home_phone", "field_value": "+1444"}],
            })
        );
    }

    #[test]
    fn contact_body_omits_empty_custom_fields() {
        let fields = ContactFields::from_customer(&CustomerPayload::default());
        assert!(fields.to_body().get("customFields").is_none());
    }
}
