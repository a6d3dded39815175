use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use leadbridge_core::{ApprovalStagePolicy, Stage, StageMap};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub crm: CrmSettings,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Onboarded tenants. Real deployments seed these from the onboarding
    /// flow; the bridge itself never writes them during event processing.
    #[serde(default)]
    pub tenants: Vec<TenantSeed>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        // CRM validations
        if self.crm.pipeline_id.is_empty() {
            return Err("crm.pipeline_id must not be empty".into());
        }
        if url::Url::parse(&self.crm.base_url).is_err() {
            return Err(format!("crm.base_url is not a valid URL: {}", self.crm.base_url));
        }
        if self.crm.request_timeout_ms == 0 {
            return Err("crm.request_timeout_ms must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // Tenant validations
        for tenant in &self.tenants {
            if tenant.company_id.is_empty()
                || tenant.location_id.is_empty()
                || tenant.credential_ref.is_empty()
            {
                return Err(
                    "tenants entries require company_id, location_id and credential_ref".into(),
                );
            }
        }
        Ok(())
    }

    /// The effective stage table: production defaults plus overrides.
    pub fn stage_map(&self) -> StageMap {
        StageMap::production_defaults().with_overrides(&self.sync.stage_overrides)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmSettings {
    #[serde(default = "default_crm_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub pipeline_id: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for CrmSettings {
    fn default() -> Self {
        Self {
            base_url: default_crm_base_url(),
            api_version: default_api_version(),
            pipeline_id: String::new(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_crm_base_url() -> String {
    "https://services.leadconnectorhq.com".to_string()
}

fn default_api_version() -> String {
    "2021-07-28".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncSettings {
    /// How `estimate.option.approval_status_changed` moves the pipeline.
    #[serde(default)]
    pub approval_policy: ApprovalStagePolicy,
    /// Per-deployment stage-id overrides, keyed by symbolic stage name.
    #[serde(default)]
    pub stage_overrides: HashMap<Stage, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// One onboarded tenant: source company paired with a CRM location and a
/// credential the token provider can resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSeed {
    pub company_id: String,
    pub location_id: String,
    pub credential_ref: String,
    /// Bearer token for the static token provider. Refresh handling is an
    /// external concern.
    #[serde(default)]
    pub access_token: String,
}

/// Load configuration from an optional TOML file plus `LEADBRIDGE_*`
/// environment overrides.
pub fn load_config(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(path).required(false));
    }
    let settings = builder
        .add_source(
            config::Environment::with_prefix("LEADBRIDGE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    let cfg: AppConfig = settings.try_deserialize()?;
    Ok(cfg)
}
