mod client;
#[cfg(test)]
pub(crate) mod fake;
mod types;

pub use client::HttpBackend;
pub use types::{
    Confidence, GatewayHealth, PredictionRequest, PredictionResult, ServiceStatus, TestSuites,
    UpstreamHealth,
};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use serde_json::Value;

use crate::error::{CIForecastError, Result};

/// The external scoring service, as seen by the gateway.
#[async_trait]
pub trait PredictionBackend: Send + Sync {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult>;

    async fn list_test_suites(&self) -> Result<TestSuites>;

    async fn list_features(&self) -> Result<Value>;

    /// Raw health report of the backend itself.
    async fn health(&self) -> Result<Value>;
}

/// Forwards calls to a [`PredictionBackend`], bounding each one by a timeout
/// and translating every failure into [`CIForecastError::UpstreamUnavailable`].
///
/// Stateless per call; clones share only the backend handle.
#[derive(Clone)]
pub struct Gateway {
    backend: Arc<dyn PredictionBackend>,
    timeout: Duration,
}

impl Gateway {
    pub fn new(backend: Arc<dyn PredictionBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        self.call("predict", self.backend.predict(request)).await
    }

    pub async fn list_test_suites(&self) -> Result<TestSuites> {
        self.call("list_test_suites", self.backend.list_test_suites())
            .await
    }

    pub async fn list_features(&self) -> Result<Value> {
        self.call("list_features", self.backend.list_features())
            .await
    }

    /// Always reports the gateway itself as healthy; upstream trouble only
    /// shows up in `upstream_status`.
    pub async fn health(&self) -> GatewayHealth {
        let upstream_status = match self.call("health", self.backend.health()).await {
            Ok(report) => UpstreamHealth::Reachable { report },
            Err(err) => UpstreamHealth::Unreachable {
                error: err.to_string(),
            },
        };

        GatewayHealth {
            self_status: ServiceStatus::Healthy,
            upstream_status,
        }
    }

    async fn call<T, F>(&self, operation: &str, upstream: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, upstream).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(into_upstream_unavailable(operation, err)),
            Err(_) => {
                warn!(
                    "Upstream {operation} timed out after {}ms",
                    self.timeout.as_millis()
                );
                Err(CIForecastError::UpstreamUnavailable { detail: None })
            }
        }
    }
}

fn into_upstream_unavailable(operation: &str, err: CIForecastError) -> CIForecastError {
    warn!("Upstream {operation} failed: {err}");

    match err {
        CIForecastError::UpstreamUnavailable { detail } => {
            CIForecastError::UpstreamUnavailable { detail }
        }
        _ => CIForecastError::UpstreamUnavailable { detail: None },
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeBackend;
    use super::*;
    use chrono::NaiveDate;

    fn request() -> PredictionRequest {
        PredictionRequest {
            is_pull_request: true,
            start_time: NaiveDate::from_ymd_opt(2024, 5, 6)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            test_suite: "test/unit".to_string(),
        }
    }

    fn gateway(backend: FakeBackend) -> Gateway {
        Gateway::new(Arc::new(backend), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_predict_returns_upstream_result_untouched() {
        let backend = Arc::new(FakeBackend::healthy());
        let expected = backend.prediction.clone();
        let gateway = Gateway::new(backend.clone(), Duration::from_secs(5));

        let result = gateway.predict(&request()).await.unwrap();

        assert_eq!(result, expected);
        assert_eq!(*backend.received.lock().unwrap(), vec![request()]);
    }

    #[tokio::test]
    async fn test_predict_failure_keeps_upstream_detail() {
        let backend = FakeBackend::unavailable(Some("Model not loaded"));

        let err = gateway(backend).predict(&request()).await.unwrap_err();

        match err {
            CIForecastError::UpstreamUnavailable { detail } => {
                assert_eq!(detail.as_deref(), Some("Model not loaded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_upstream_errors_are_normalised_without_detail() {
        let backend = FakeBackend::failing_with(|| {
            CIForecastError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ))
        });

        let err = gateway(backend).list_features().await.unwrap_err();

        assert!(matches!(
            err,
            CIForecastError::UpstreamUnavailable { detail: None }
        ));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out_as_unavailable() {
        let backend = FakeBackend::healthy().with_delay(Duration::from_secs(30));
        let gateway = Gateway::new(Arc::new(backend), Duration::from_millis(20));

        let err = gateway.list_test_suites().await.unwrap_err();

        assert!(matches!(
            err,
            CIForecastError::UpstreamUnavailable { detail: None }
        ));
    }

    #[tokio::test]
    async fn test_health_is_healthy_even_when_upstream_fails() {
        let backend = FakeBackend::unavailable(None);

        let health = gateway(backend).health().await;

        assert_eq!(health.self_status, ServiceStatus::Healthy);
        assert!(matches!(
            health.upstream_status,
            UpstreamHealth::Unreachable { .. }
        ));
    }

    #[tokio::test]
    async fn test_health_carries_upstream_report_when_reachable() {
        let backend = FakeBackend::healthy();
        let report = backend.health_report.clone();

        let health = gateway(backend).health().await;

        assert_eq!(health.self_status, ServiceStatus::Healthy);
        assert_eq!(health.upstream_status, UpstreamHealth::Reachable { report });
    }

    #[tokio::test]
    async fn test_hung_upstream_call_does_not_block_other_calls() {
        let slow = gateway(FakeBackend::healthy().with_delay(Duration::from_secs(30)));
        let fast = gateway(FakeBackend::healthy());

        let slow_call = tokio::spawn(async move { slow.list_test_suites().await });
        let fast_result = tokio::time::timeout(Duration::from_secs(1), fast.predict(&request()))
            .await
            .expect("fast call should not wait on the slow one");

        assert!(fast_result.is_ok());
        assert!(!slow_call.is_finished());
        slow_call.abort();
    }
}
