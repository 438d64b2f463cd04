//! REST API Handlers
//!
//! Implements the resolution endpoints: service lookup, registry listing,
//! registry reload, and health probes.

use crate::registry::{self, SharedRegistry};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Successful resolution response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationResponse {
    /// Hostname or IP literal
    pub host: String,
    /// TCP port
    pub port: u16,
}

/// One entry in the registry listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntryResponse {
    pub service_name: String,
    pub host: String,
    pub port: u16,
}

/// Reload outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub loaded: usize,
    pub skipped: usize,
    pub overwritten: usize,
    pub total: usize,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// =============================================================================
// REST Router
// =============================================================================

/// REST API router builder
pub struct RestRouter {
    registry: SharedRegistry,
    source: PathBuf,
}

impl RestRouter {
    /// Create a new REST router over a registry and its CSV source
    pub fn new(registry: SharedRegistry, source: PathBuf) -> Self {
        Self { registry, source }
    }

    /// Build the Axum router
    pub fn build(self) -> Router {
        let state = AppState {
            registry: self.registry,
            source: Arc::new(self.source),
        };

        Router::new()
            // Resolution endpoints
            .route("/service/:service_name", get(resolve_service))
            .route("/services", get(list_services))
            // Registry management
            .route("/reload", post(reload_registry))
            // Health endpoints
            .route("/health", get(health_check))
            .route("/ready", get(readiness_check))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    registry: SharedRegistry,
    source: Arc<PathBuf>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Resolve a service name to its network location
async fn resolve_service(
    State(state): State<AppState>,
    Path(service_name): Path<String>,
) -> impl IntoResponse {
    match state.registry.resolve(&service_name) {
        Some(record) => {
            debug!("Resolved '{}' to {}", service_name, record);
            (
                StatusCode::OK,
                Json(LocationResponse {
                    host: record.host,
                    port: record.port,
                }),
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiErrorResponse {
                error: "not_found".into(),
                message: format!("Service {} not found", service_name),
                details: None,
            }),
        )
            .into_response(),
    }
}

/// List all registered services
async fn list_services(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.registry.snapshot();
    let mut services: Vec<ServiceEntryResponse> = snapshot
        .iter()
        .map(|(name, record)| ServiceEntryResponse {
            service_name: name.clone(),
            host: record.host.clone(),
            port: record.port,
        })
        .collect();
    services.sort_by(|a, b| a.service_name.cmp(&b.service_name));

    (StatusCode::OK, Json(services))
}

/// Rebuild the registry from its source and swap it in atomically
async fn reload_registry(State(state): State<AppState>) -> impl IntoResponse {
    let source = state.source.clone();

    // CSV parsing is blocking file IO; keep it off the request executor.
    let result =
        tokio::task::spawn_blocking(move || registry::load(source.as_path())).await;

    match result {
        Ok(Ok(report)) => {
            let total = report.registry.len();
            state.registry.replace(report.registry);
            info!(
                "Registry reloaded: {} services ({} skipped, {} overwritten)",
                total, report.skipped, report.overwritten
            );
            (
                StatusCode::OK,
                Json(ReloadResponse {
                    loaded: report.loaded,
                    skipped: report.skipped,
                    overwritten: report.overwritten,
                    total,
                }),
            )
                .into_response()
        }
        Ok(Err(e)) => {
            // The previous snapshot stays installed.
            error!("Registry reload failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiErrorResponse {
                    error: "reload_failed".into(),
                    message: e.to_string(),
                    details: None,
                }),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiErrorResponse {
                error: "internal_error".into(),
                message: format!("reload task failed: {}", e),
                details: None,
            }),
        )
            .into_response(),
    }
}

/// Health check
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Readiness check
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    // The registry snapshot always exists once the server is up; an empty
    // registry is still ready (it resolves everything to not-found).
    let snapshot = state.registry.snapshot();
    (
        StatusCode::OK,
        format!("ready ({} services)", snapshot.len()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Registry, ServiceRecord};
    use std::collections::HashMap;
    use std::io::Write;

    fn sample_state() -> (SharedRegistry, tempfile::NamedTempFile) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "service_name,host,port\nauth_devs,pi7.local,5001\nnetwork_scan,pi7.local,5002\n"
        )
        .unwrap();
        file.flush().unwrap();

        let mut services = HashMap::new();
        services.insert(
            "auth_devs".to_string(),
            ServiceRecord::new("pi7.local", 5001),
        );
        services.insert(
            "network_scan".to_string(),
            ServiceRecord::new("pi7.local", 5002),
        );
        (SharedRegistry::new(Registry::from_records(services)), file)
    }

    async fn spawn_router(registry: SharedRegistry, source: PathBuf) -> String {
        let app = RestRouter::new(registry, source).build();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_resolve_returns_host_and_port() {
        let (registry, file) = sample_state();
        let base = spawn_router(registry, file.path().to_path_buf()).await;

        let resp = reqwest::get(format!("{}/service/auth_devs", base))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: LocationResponse = resp.json().await.unwrap();
        assert_eq!(body.host, "pi7.local");
        assert_eq!(body.port, 5001);
    }

    #[tokio::test]
    async fn test_resolve_unknown_service_is_404() {
        let (registry, file) = sample_state();
        let base = spawn_router(registry, file.path().to_path_buf()).await;

        let resp = reqwest::get(format!("{}/service/missing_svc", base))
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
        let body: ApiErrorResponse = resp.json().await.unwrap();
        assert_eq!(body.error, "not_found");
        assert!(body.message.contains("missing_svc"));
    }

    #[tokio::test]
    async fn test_list_services_is_sorted() {
        let (registry, file) = sample_state();
        let base = spawn_router(registry, file.path().to_path_buf()).await;

        let resp = reqwest::get(format!("{}/services", base)).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: Vec<ServiceEntryResponse> = resp.json().await.unwrap();
        assert_eq!(body.len(), 2);
        assert_eq!(body[0].service_name, "auth_devs");
        assert_eq!(body[1].service_name, "network_scan");
    }

    #[tokio::test]
    async fn test_reload_picks_up_new_rows() {
        let (registry, mut file) = sample_state();
        let base = spawn_router(registry.clone(), file.path().to_path_buf()).await;

        writeln!(file, "metrics,pi8.local,9100").unwrap();
        file.flush().unwrap();

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("{}/reload", base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: ReloadResponse = resp.json().await.unwrap();
        assert_eq!(body.total, 3);

        let record = registry.resolve("metrics").unwrap();
        assert_eq!(record, ServiceRecord::new("pi8.local", 9100));
    }

    #[tokio::test]
    async fn test_reload_failure_keeps_old_snapshot() {
        let (registry, file) = sample_state();
        let missing = file.path().with_extension("gone");
        let base = spawn_router(registry.clone(), missing).await;

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("{}/reload", base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 500);
        let body: ApiErrorResponse = resp.json().await.unwrap();
        assert_eq!(body.error, "reload_failed");

        // Previous snapshot still serves.
        assert!(registry.resolve("auth_devs").is_some());
    }

    #[tokio::test]
    async fn test_health_and_ready() {
        let (registry, file) = sample_state();
        let base = spawn_router(registry, file.path().to_path_buf()).await;

        let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
        assert_eq!(resp.status(), 200);

        let resp = reqwest::get(format!("{}/ready", base)).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert!(resp.text().await.unwrap().contains("2 services"));
    }
}
