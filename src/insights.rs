use serde::{Deserialize, Serialize};

use crate::telemetry::Weekday;

/// Everything the dashboard renders for one pass over the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardInsights {
    pub summary: SummaryStatistics,
    pub weekly_trend: Vec<WeeklyBucket>,
    pub correlation: Vec<CorrelationPoint>,
    /// Rows dropped by the record parser.
    pub invalid_rows: usize,
    pub outlier_threshold_seconds: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub total_jobs: usize,
    pub average_actual_seconds: f64,
    pub average_predicted_seconds: f64,
    pub accuracy_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    pub day_label: Weekday,
    pub average_actual: f64,
    pub average_predicted: f64,
    pub sample_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPoint {
    pub actual: f64,
    pub predicted: f64,
}
