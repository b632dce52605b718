use crate::error::ApiError;
use crate::routes;
use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use backyard_core::config::ServiceConfig;
use backyard_core::report::imagery::provider_for;
use backyard_core::report::{RandomReportGenerator, ReportGenerator};
use backyard_core::{open_store, RecordStore, ReportService, ServiceError};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared across handlers. The store is opened once per process and reached
/// through the report service.
pub struct AppState {
    pub reports: Arc<ReportService>,
    pub config: ServiceConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        generator: Arc<dyn ReportGenerator>,
        config: ServiceConfig,
    ) -> Self {
        let reports = ReportService::new(store, generator)
            .with_imagery(provider_for(config.maps_api_key.as_deref()));
        Self {
            reports: Arc::new(reports),
            config,
        }
    }

    pub fn from_config(config: ServiceConfig) -> anyhow::Result<Self> {
        let store = open_store(&config.storage).with_context(|| {
            format!("failed to open {} storage", config.storage.backend.as_str())
        })?;
        let generator = Arc::new(RandomReportGenerator::from_config(&config));
        Ok(Self::new(store, generator, config))
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        self.reports.store().clone()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api", get(routes::root))
        .route("/api/health", get(routes::health_check))
        .route("/api/submit-property", post(routes::submit::submit_property))
        .route(
            "/api/property-analysis/:id",
            get(routes::analysis::property_analysis),
        )
        .route("/api/admin/submissions", get(routes::admin::list_submissions))
        .route("/api/admin/export-csv", get(routes::admin::export_csv))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run blocking store work off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::from(ServiceError::storage(e)))?
        .map_err(ApiError::from)
}

pub async fn run(config: ServiceConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(config)?);
    let listener = tokio::net::TcpListener::bind(&state.config.bind)
        .await
        .with_context(|| format!("failed to bind {}", state.config.bind))?;

    tracing::info!(
        event = "listening",
        addr = %listener.local_addr()?,
        storage = state.config.storage.backend.as_str(),
        store = state.reports.store().kind(),
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!(event = "server_stop");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
