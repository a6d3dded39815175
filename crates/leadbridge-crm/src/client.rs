//! HTTP implementation of the CRM capability.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{Value, json};

use crate::config::CrmConfig;
use crate::error::CrmError;
use crate::fields::{ContactFields, DealFields};
use crate::traits::{CrmApi, CrmConnector, DynCrmApi, TokenProvider};

/// CRM client bound to one tenant's bearer token.
pub struct HttpCrmClient {
    http: Client,
    config: CrmConfig,
    token: String,
}

impl HttpCrmClient {
    pub fn new(http: Client, config: CrmConfig, token: impl Into<String>) -> Self {
        Self {
            http,
            config,
            token: token.into(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.config.endpoint(path))
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Version", &self.config.api_version)
            .timeout(self.config.request_timeout)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, CrmError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CrmError::http(status.as_u16(), body));
        }
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        response.json().await.map_err(CrmError::from)
    }

    fn extract_id(body: &Value, entity: &str) -> Result<String, CrmError> {
        body.get(entity)
            .and_then(|e| e.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                CrmError::unexpected_response(format!("missing {entity}.id in response"))
            })
    }

    fn opportunity_body(deal: &DealFields, stage_id: Option<&str>) -> Value {
        let mut body = json!({});
        if let Some(name) = &deal.name {
            body["name"] = json!(name);
        }
        if let Some(value) = deal.monetary_value {
            body["monetaryValue"] = json!(value);
        }
        if let Some(source) = &deal.source {
            body["source"] = json!(source);
        }
        if let Some(stage_id) = stage_id {
            body["pipelineStageId"] = json!(stage_id);
        }
        body
    }
}

#[async_trait]
impl CrmApi for HttpCrmClient {
    async fn create_contact(
        &self,
        location_id: &str,
        fields: &ContactFields,
    ) -> Result<String, CrmError> {
        let mut body = fields.to_body();
        body["locationId"] = json!(location_id);

        let response = self
            .send(self.request(Method::POST, "contacts/").json(&body))
            .await?;
        Self::extract_id(&response, "contact")
    }

    async fn update_contact(
        &self,
        contact_id: &str,
        fields: &ContactFields,
    ) -> Result<(), CrmError> {
        let path = format!("contacts/{contact_id}");
        self.send(self.request(Method::PUT, &path).json(&fields.to_body()))
            .await?;
        Ok(())
    }

    async fn delete_contact(&self, contact_id: &str) -> Result<(), CrmError> {
        let path = format!("contacts/{contact_id}");
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn create_opportunity(
        &self,
        location_id: &str,
        contact_id: &str,
        deal: &DealFields,
        stage_id: Option<&str>,
    ) -> Result<String, CrmError> {
        let mut body = Self::opportunity_body(deal, stage_id);
        body["pipelineId"] = json!(self.config.pipeline_id);
        body["locationId"] = json!(location_id);
        body["contactId"] = json!(contact_id);
        body["status"] = json!("open");

        let response = self
            .send(self.request(Method::POST, "opportunities/").json(&body))
            .await?;
        Self::extract_id(&response, "opportunity")
    }

    async fn update_opportunity(
        &self,
        opportunity_id: &str,
        deal: &DealFields,
        stage_id: Option<&str>,
    ) -> Result<(), CrmError> {
        let path = format!("opportunities/{opportunity_id}");
        let body = Self::opportunity_body(deal, stage_id);
        self.send(self.request(Method::PUT, &path).json(&body))
            .await?;
        Ok(())
    }

    async fn close_opportunity(&self, opportunity_id: &str, won: bool) -> Result<(), CrmError> {
        let path = format!("opportunities/{opportunity_id}/status");
        let status = if won { "won" } else { "lost" };
        self.send(
            self.request(Method::PUT, &path)
                .json(&json!({"status": status})),
        )
        .await?;
        Ok(())
    }
}

/// Builds per-tenant [`HttpCrmClient`]s over one shared connection pool.
pub struct HttpCrmConnector {
    http: Client,
    config: CrmConfig,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpCrmConnector {
    pub fn new(config: CrmConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, CrmError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CrmError::invalid_config(e.to_string()))?;
        Ok(Self {
            http,
            config,
            tokens,
        })
    }
}

#[async_trait]
impl CrmConnector for HttpCrmConnector {
    async fn connect(&self, credential_ref: &str) -> Result<DynCrmApi, CrmError> {
        let token = self.tokens.bearer_token(credential_ref).await?;
        Ok(Arc::new(HttpCrmClient::new(
            self.http.clone(),
            self.config.clone(),
            token,
        )))
    }
}
