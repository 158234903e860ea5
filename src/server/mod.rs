//! HTTP surface consumed by the dashboard UI.

mod errors;
mod handlers;

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use log::{error, info};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::analytics;
use crate::dataset::DatasetSource;
use crate::error::Result;
use crate::gateway::{Gateway, HttpBackend, TestSuites};

/// Suites offered by the prediction form when the scoring service cannot
/// list its own. A UI resilience default, not something the gateway
/// guarantees.
pub const FALLBACK_TEST_SUITES: [&str; 3] = ["test/unit", "test/integration", "test/e2e"];

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_path: PathBuf,
    pub predictor_url: String,
    pub upstream_timeout: Duration,
    pub outlier_threshold: f64,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Per-process handles shared by all requests. Nothing in here is mutated
/// after start-up.
#[derive(Clone)]
pub struct AppState {
    pub dataset: DatasetSource,
    pub gateway: Gateway,
    pub fallback_test_suites: TestSuites,
    pub outlier_threshold: f64,
}

impl AppState {
    pub fn new(dataset: DatasetSource, gateway: Gateway, outlier_threshold: f64) -> Self {
        Self {
            dataset,
            gateway,
            fallback_test_suites: fallback_test_suites(),
            outlier_threshold,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let outlier_threshold = analytics::validate_outlier_threshold(config.outlier_threshold)?;

        let backend = HttpBackend::new(&config.predictor_url, config.upstream_timeout)?;
        let gateway = Gateway::new(Arc::new(backend), config.upstream_timeout);

        Ok(Self::new(
            DatasetSource::new(&config.data_path),
            gateway,
            outlier_threshold,
        ))
    }
}

pub fn fallback_test_suites() -> TestSuites {
    TestSuites {
        suites: FALLBACK_TEST_SUITES.iter().map(|s| (*s).to_string()).collect(),
        default: None,
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/data", get(handlers::get_data))
        .route("/api/analytics", get(handlers::get_analytics))
        .route("/api/test-suites", get(handlers::get_test_suites))
        .route("/api/features", get(handlers::get_features))
        .route("/api/health", get(handlers::get_health))
        .route("/api/predict", post(handlers::post_predict))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve<F>(config: ServerConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = AppState::from_config(&config)?;

    let listener = TcpListener::bind(config.bind_address()).await?;
    let local_addr: SocketAddr = listener.local_addr()?;
    info!("Server is running on http://{local_addr}");
    info!("Dataset: {}", config.data_path.display());
    info!(
        "Prediction service: {} (timeout {}s)",
        config.predictor_url,
        config.upstream_timeout.as_secs()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped");
    Ok(())
}

pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down gracefully..."),
        () = terminate => info!("Received SIGTERM, shutting down gracefully..."),
    }
}
