use thiserror::Error;

#[derive(Error, Debug)]
pub enum CIForecastError {
    #[error("Data source unreadable: {0}")]
    SourceUnreadable(String),

    #[error("Prediction service unavailable{}", detail_suffix(.detail))]
    UpstreamUnavailable { detail: Option<String> },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CIForecastError>;

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}
