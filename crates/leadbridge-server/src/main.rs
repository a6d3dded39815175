use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use leadbridge_crm::{CrmConfig, HttpCrmConnector};
use leadbridge_db_memory::InMemoryLinkStore;
use leadbridge_server::observability::{apply_logging_level, init_tracing};
use leadbridge_server::{AppState, StaticTokenProvider, build_router, load_config};
use leadbridge_storage::{LinkStore, TenantLink};
use leadbridge_sync::SyncEngine;

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From LEADBRIDGE_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (leadbridge.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (LEADBRIDGE_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present, before anything reads the environment
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    init_tracing();

    let (config_path, source) = resolve_config_path();

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };
    if let Err(e) = cfg.validate() {
        eprintln!("Configuration error: {e}");
        std::process::exit(2);
    }

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    apply_logging_level(&cfg.logging.level);

    // Link store seeded with the onboarded tenants.
    let store = Arc::new(InMemoryLinkStore::new());
    for seed in &cfg.tenants {
        store
            .put_tenant(TenantLink::new(
                &seed.company_id,
                &seed.location_id,
                &seed.credential_ref,
            ))
            .await?;
    }
    tracing::info!(tenants = cfg.tenants.len(), "Tenant links seeded");

    let tokens = Arc::new(StaticTokenProvider::from_seeds(&cfg.tenants));
    let crm_config = CrmConfig::new(&cfg.crm.pipeline_id)
        .with_base_url(url::Url::parse(&cfg.crm.base_url)?)
        .with_api_version(&cfg.crm.api_version)
        .with_request_timeout(Duration::from_millis(cfg.crm.request_timeout_ms));
    let connector = Arc::new(HttpCrmConnector::new(crm_config, tokens)?);

    let engine = Arc::new(SyncEngine::new(
        store,
        connector,
        cfg.stage_map(),
        cfg.sync.approval_policy,
    ));

    let app = build_router(AppState::new(engine));
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: LEADBRIDGE_CONFIG
/// 3. Default: leadbridge.toml
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (path, ConfigSource::CliArgument);
            }
        }
    }

    if let Ok(path) = env::var("LEADBRIDGE_CONFIG") {
        if !path.is_empty() {
            return (path, ConfigSource::EnvironmentVariable);
        }
    }

    ("leadbridge.toml".to_string(), ConfigSource::Default)
}
