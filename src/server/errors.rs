use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, error, warn};
use serde_json::json;

use crate::error::CIForecastError;

const UNAVAILABLE_DETAIL: &str = "The prediction service could not be reached";

impl CIForecastError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CIForecastError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CIForecastError {
    fn into_response(self) -> Response {
        let body = match &self {
            CIForecastError::SourceUnreadable(_) => {
                error!("Dataset error: {self}");
                json!({ "error": "Error processing data" })
            }
            CIForecastError::UpstreamUnavailable { detail } => {
                warn!("Prediction request failed: {self}");
                json!({
                    "error": "Prediction service unavailable",
                    "details": detail.as_deref().unwrap_or(UNAVAILABLE_DETAIL),
                })
            }
            CIForecastError::InvalidRequest(message) => {
                debug!("Client error: {self}");
                json!({ "error": message })
            }
            _ => {
                error!("Internal error: {self}");
                json!({ "error": "Internal server error" })
            }
        };

        (self.status_code(), Json(body)).into_response()
    }
}
