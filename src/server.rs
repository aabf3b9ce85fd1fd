//! HTTP server bootstrap for the Echo verification worker.
//!
//! This module wires together:
//! - configuration
//! - the Walrus and fullnode clients
//! - the verification service
//! - the Axum router

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use crate::auth::SessionValidator;
use crate::chain::{Ledger, SuiConfig, SuiRpcClient};
use crate::crypto::Credential;
use crate::metrics::VerifierMetrics;
use crate::storage::{BlobStore, WalrusClient, WalrusConfig};
use crate::verify::{MinLengthPredicate, VerificationService, VerifierConfig};

/// Server configuration, loaded from the environment at the composition root
/// only. Everything downstream receives explicit structs.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server listen address.
    pub listen_addr: SocketAddr,
    /// Walrus read aggregator base URL.
    pub aggregator_url: String,
    /// Walrus write publisher base URL.
    pub publisher_url: String,
    /// Sui fullnode JSON-RPC URL.
    pub sui_rpc_url: String,
    /// Published Echo package id.
    pub package_id: String,
    /// Optional TEE signing key (base64 or hex encoded secret).
    pub admin_secret_key: Option<String>,
    /// Optional HMAC secret enabling the session layer.
    pub session_secret: Option<String>,
    /// Session token issuer.
    pub session_issuer: String,
    /// Session token audience.
    pub session_audience: String,
    /// Timeout applied to each outbound request.
    pub request_timeout: Duration,
    /// Upper bound on concurrently running verifications.
    pub max_concurrent: usize,
    /// Gas budget for verification transactions, in MIST.
    pub gas_budget: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3001);
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let listen_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .expect("Invalid listen address");

        let aggregator_url = std::env::var("WALRUS_AGGREGATOR")
            .unwrap_or_else(|_| "https://aggregator.walrus-testnet.walrus.space".to_string());
        let publisher_url = std::env::var("WALRUS_PUBLISHER")
            .unwrap_or_else(|_| "https://publisher.walrus-testnet.walrus.space".to_string());
        let sui_rpc_url = std::env::var("SUI_RPC_URL")
            .unwrap_or_else(|_| "https://fullnode.testnet.sui.io:443".to_string());
        let package_id = std::env::var("PACKAGE_ID").unwrap_or_else(|_| "0x0".to_string());

        let request_timeout = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(30));

        let max_concurrent = std::env::var("MAX_CONCURRENT_VERIFICATIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8);

        let gas_budget = std::env::var("GAS_BUDGET")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10_000_000);

        Self {
            listen_addr,
            aggregator_url,
            publisher_url,
            sui_rpc_url,
            package_id,
            admin_secret_key: std::env::var("ADMIN_SECRET_KEY").ok(),
            session_secret: std::env::var("SESSION_JWT_SECRET").ok(),
            session_issuer: std::env::var("SESSION_JWT_ISSUER")
                .unwrap_or_else(|_| "sui-echo".to_string()),
            session_audience: std::env::var("SESSION_JWT_AUDIENCE")
                .unwrap_or_else(|_| "echo-verifier".to_string()),
            request_timeout,
            max_concurrent,
            gas_budget,
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<VerificationService>,
    pub blob_store: Arc<dyn BlobStore>,
    pub ledger: Arc<dyn Ledger>,
    pub sessions: Option<Arc<SessionValidator>>,
    pub metrics: Arc<VerifierMetrics>,
}

/// Start the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Echo verifier v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    info!("Configuration loaded");
    info!("  Listen address: {}", config.listen_addr);
    info!("  Walrus aggregator: {}", config.aggregator_url);
    info!("  Walrus publisher: {}", config.publisher_url);
    info!("  Sui RPC: {}", config.sui_rpc_url);
    info!("  Package id: {}", config.package_id);
    info!("  Max concurrent verifications: {}", config.max_concurrent);

    let credential = match &config.admin_secret_key {
        Some(secret) => {
            let credential = Credential::from_encoded(secret)
                .map_err(|e| anyhow::anyhow!("Invalid ADMIN_SECRET_KEY: {e}"))?;
            info!("TEE signing key configured (address {})", credential.address());
            Some(credential)
        }
        None => {
            info!("No TEE signing key configured; verifications stay local (Demo Mode)");
            None
        }
    };

    let sessions = config.session_secret.as_ref().map(|secret| {
        info!("Session layer enabled for authenticated reads");
        Arc::new(SessionValidator::new(
            secret.as_bytes(),
            &config.session_issuer,
            &config.session_audience,
        ))
    });
    if sessions.is_none() {
        info!("Session layer disabled; reads require an explicit owner parameter");
    }

    let blob_store: Arc<dyn BlobStore> = Arc::new(WalrusClient::new(WalrusConfig {
        aggregator_url: config.aggregator_url.clone(),
        publisher_url: config.publisher_url.clone(),
        timeout: config.request_timeout,
    })?);

    let ledger: Arc<dyn Ledger> = Arc::new(SuiRpcClient::new(SuiConfig {
        rpc_url: config.sui_rpc_url.clone(),
        package_id: config.package_id.clone(),
        gas_budget: config.gas_budget,
        timeout: config.request_timeout,
    })?);

    let verifier = Arc::new(VerificationService::new(
        VerifierConfig {
            max_concurrent: config.max_concurrent,
        },
        blob_store.clone(),
        ledger.clone(),
        Arc::new(MinLengthPredicate::default()),
        credential,
    ));

    let state = AppState {
        verifier,
        blob_store,
        ledger,
        sessions,
        metrics: Arc::new(VerifierMetrics::new()),
    };

    let app = build_router()?.with_state(state);

    info!("Starting HTTP server on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    info!("Echo verifier is ready to accept connections");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}

/// Build the router with health endpoints and middleware layers.
pub fn build_router() -> anyhow::Result<Router<AppState>> {
    let mut router = crate::api::router()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .layer(TraceLayer::new_for_http());

    if let Some(cors_layer) = cors_layer_from_env()? {
        router = router.layer(cors_layer);
    }

    Ok(router)
}

fn cors_layer_from_env() -> anyhow::Result<Option<CorsLayer>> {
    let origins = match std::env::var("CORS_ALLOW_ORIGINS") {
        Ok(v) => v,
        Err(_) => return Ok(None),
    };

    let origins = origins.trim();
    if origins.is_empty() {
        return Ok(None);
    }

    let allow_origin = if origins == "*" {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {s:?}: {e}"))
            })
            .collect::<anyhow::Result<_>>()?;
        AllowOrigin::list(origins)
    };

    Ok(Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([
                axum::http::header::AUTHORIZATION,
                axum::http::header::CONTENT_TYPE,
            ]),
    ))
}

/// Health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "healthy",
        "service": "echo-verifier",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check endpoint. The worker holds no local state, so readiness
/// reports the configured operating mode rather than probing collaborators.
async fn readiness_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ready",
        "signing": if state.verifier.has_credential() { "onchain" } else { "local_only" },
        "sessions": state.sessions.is_some(),
    }))
}
