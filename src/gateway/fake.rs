use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{PredictionBackend, PredictionRequest, PredictionResult, TestSuites};
use crate::error::{CIForecastError, Result};

type FailureFactory = Box<dyn Fn() -> CIForecastError + Send + Sync>;

/// In-memory stand-in for the scoring service.
pub(crate) struct FakeBackend {
    pub prediction: PredictionResult,
    pub suites: TestSuites,
    pub features: Value,
    pub health_report: Value,
    pub received: Mutex<Vec<PredictionRequest>>,
    failure: Option<FailureFactory>,
    delay: Option<Duration>,
}

impl FakeBackend {
    pub fn healthy() -> Self {
        let prediction = serde_json::from_value(json!({
            "prediction_seconds": 151.2,
            "prediction_minutes": 2.52,
            "confidence": "high",
            "input_features": {
                "Build Pull Request": true,
                "start_hour_of_day": 10,
                "start_day_of_week": 0
            },
            "base_model_prediction": 43.1
        }))
        .expect("fixture prediction is valid");

        Self {
            prediction,
            suites: TestSuites {
                suites: vec![
                    "test/api".to_string(),
                    "test/unit".to_string(),
                    "test/smoke".to_string(),
                ],
                default: Some("test/unit".to_string()),
            },
            features: json!({
                "features": ["Build Pull Request", "start_hour_of_day", "start_day_of_week"],
                "categorical_features": [],
                "target": "Test Suite Duration",
                "model_version": "v2"
            }),
            health_report: json!({"status": "healthy", "model_loaded": true}),
            received: Mutex::new(Vec::new()),
            failure: None,
            delay: None,
        }
    }

    /// Every call fails the way the HTTP adapter reports a non-2xx answer.
    pub fn unavailable(detail: Option<&str>) -> Self {
        let detail = detail.map(str::to_string);
        Self::failing_with(move || CIForecastError::UpstreamUnavailable {
            detail: detail.clone(),
        })
    }

    pub fn failing_with<F>(failure: F) -> Self
    where
        F: Fn() -> CIForecastError + Send + Sync + 'static,
    {
        Self {
            failure: Some(Box::new(failure)),
            ..Self::healthy()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn respond<T>(&self, value: &T) -> Result<T>
    where
        T: Clone,
    {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.failure {
            Some(failure) => Err(failure()),
            None => Ok(value.clone()),
        }
    }
}

#[async_trait]
impl PredictionBackend for FakeBackend {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        self.received
            .lock()
            .expect("fake backend lock poisoned")
            .push(request.clone());
        self.respond(&self.prediction).await
    }

    async fn list_test_suites(&self) -> Result<TestSuites> {
        self.respond(&self.suites).await
    }

    async fn list_features(&self) -> Result<Value> {
        self.respond(&self.features).await
    }

    async fn health(&self) -> Result<Value> {
        self.respond(&self.health_report).await
    }
}
