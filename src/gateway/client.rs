use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::{PredictionBackend, PredictionRequest, PredictionResult, TestSuites};
use crate::error::{CIForecastError, Result};

/// Scoring service reached over HTTP.
pub struct HttpBackend {
    client: Client,
    api_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ciforecast/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| CIForecastError::Config(format!("Failed to create HTTP client: {e}")))?;

        let mut base = Url::parse(base_url)
            .map_err(|e| CIForecastError::Config(format!("Invalid predictor URL: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let api_url = base
            .join("api/")
            .map_err(|e| CIForecastError::Config(format!("Invalid predictor API URL: {e}")))?;

        Ok(Self { client, api_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| CIForecastError::Config(format!("Invalid endpoint URL: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!("GET {url}");

        let response = self.client.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Predictor answered {status}: {body}");
            return Err(CIForecastError::UpstreamUnavailable {
                detail: error_detail(&body),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!("Predictor answered {status} with an undecodable body: {e}");
            CIForecastError::UpstreamUnavailable {
                detail: Some(format!("Unexpected prediction response: {e}")),
            }
        })
    }
}

/// The scoring service reports failures as `{"error": "..."}`.
fn error_detail(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;

    parsed
        .get("error")
        .or_else(|| parsed.get("details"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl PredictionBackend for HttpBackend {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        let url = self.endpoint("predict")?;
        debug!("POST {url}");

        let response = self.client.post(url).json(request).send().await?;
        Self::read_json(response).await
    }

    async fn list_test_suites(&self) -> Result<TestSuites> {
        self.get_json("test-suites").await
    }

    async fn list_features(&self) -> Result<Value> {
        self.get_json("features").await
    }

    async fn health(&self) -> Result<Value> {
        self.get_json("health").await
    }
}
