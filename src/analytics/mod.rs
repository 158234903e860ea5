mod correlation;
mod summary;
mod weekly;

use log::{info, warn};

use crate::dataset::{parse_rows, DatasetSource, ParsedRow};
use crate::error::{CIForecastError, Result};
use crate::insights::DashboardInsights;
use crate::telemetry::{TelemetryRecord, Weekday};

/// Points with either duration at or above this many seconds are left out of
/// the correlation view. A plotting choice, not a statistical outlier test.
pub const OUTLIER_THRESHOLD_SECONDS: f64 = 1000.0;

/// Accepts only finite, positive thresholds.
pub fn validate_outlier_threshold(threshold: f64) -> Result<f64> {
    if threshold.is_finite() && threshold > 0.0 {
        Ok(threshold)
    } else {
        Err(CIForecastError::Config(format!(
            "Outlier threshold must be a positive number, got {threshold}"
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    actual: f64,
    predicted: f64,
}

/// Single-pass accumulator over typed records.
///
/// Samples are held per weekday until [`Aggregator::finish`]; all means are
/// computed over sorted values so the result does not depend on input order.
#[derive(Debug, Clone)]
pub struct Aggregator {
    outlier_threshold: f64,
    by_day: [Vec<Sample>; 7],
    invalid_rows: usize,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(OUTLIER_THRESHOLD_SECONDS)
    }
}

impl Aggregator {
    pub fn new(outlier_threshold: f64) -> Self {
        Self {
            outlier_threshold,
            by_day: Default::default(),
            invalid_rows: 0,
        }
    }

    pub fn push(&mut self, record: &TelemetryRecord) {
        self.by_day[record.start_day_of_week.index()].push(Sample {
            actual: record.actual_duration_seconds,
            predicted: record.predicted_duration_seconds,
        });
    }

    pub fn push_parsed(&mut self, row: ParsedRow) {
        match row {
            ParsedRow::Valid(record) => self.push(&record),
            ParsedRow::Invalid(_) => self.invalid_rows += 1,
        }
    }

    pub fn finish(self) -> DashboardInsights {
        let samples: Vec<Sample> = self.by_day.iter().flatten().copied().collect();

        let days = Weekday::ALL
            .iter()
            .copied()
            .zip(self.by_day.iter().map(Vec::as_slice));

        DashboardInsights {
            summary: summary::summarize(&samples),
            weekly_trend: weekly::weekly_trend(days),
            correlation: correlation::correlation_points(&samples, self.outlier_threshold),
            invalid_rows: self.invalid_rows,
            outlier_threshold_seconds: self.outlier_threshold,
        }
    }
}

/// Aggregates already-typed records with the default outlier threshold.
pub fn aggregate<I>(records: I) -> DashboardInsights
where
    I: IntoIterator<Item = TelemetryRecord>,
{
    let mut aggregator = Aggregator::default();
    for record in records {
        aggregator.push(&record);
    }
    aggregator.finish()
}

/// Streams the dataset through the record parser into the aggregator.
///
/// Only an unreadable source fails; bad rows are counted in
/// `invalid_rows`.
pub fn analyze_source(source: &DatasetSource, outlier_threshold: f64) -> Result<DashboardInsights> {
    let outlier_threshold = validate_outlier_threshold(outlier_threshold)?;
    info!("Aggregating dataset {}", source.path().display());

    let mut aggregator = Aggregator::new(outlier_threshold);
    for row in parse_rows(source.open()?) {
        aggregator.push_parsed(row?);
    }

    let insights = aggregator.finish();

    if insights.invalid_rows > 0 {
        warn!(
            "Excluded {} invalid rows from aggregation",
            insights.invalid_rows
        );
    }
    info!(
        "Aggregated {} jobs into {} weekly buckets and {} correlation points",
        insights.summary.total_jobs,
        insights.weekly_trend.len(),
        insights.correlation.len()
    );

    Ok(insights)
}

/// Mean that is bit-for-bit independent of the order values arrive in.
#[allow(clippy::cast_precision_loss)]
fn order_independent_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut values: Vec<f64> = values.into_iter().collect();
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(f64::total_cmp);
    values.iter().sum::<f64>() / values.len() as f64
}
