use super::{order_independent_mean, Sample};
use crate::insights::SummaryStatistics;

pub(super) fn summarize(samples: &[Sample]) -> SummaryStatistics {
    if samples.is_empty() {
        return SummaryStatistics::default();
    }

    SummaryStatistics {
        total_jobs: samples.len(),
        average_actual_seconds: order_independent_mean(samples.iter().map(|s| s.actual)),
        average_predicted_seconds: order_independent_mean(samples.iter().map(|s| s.predicted)),
        accuracy_percent: order_independent_mean(samples.iter().filter_map(accuracy_score))
            * 100.0,
    }
}

/// Per-job accuracy in `[0, 1]`. Jobs with a zero actual duration have no
/// defined relative error and are left out of the accuracy mean.
fn accuracy_score(sample: &Sample) -> Option<f64> {
    if sample.actual <= 0.0 {
        return None;
    }

    let relative_error = (sample.actual - sample.predicted).abs() / sample.actual;
    Some((1.0 - relative_error).clamp(0.0, 1.0))
}
