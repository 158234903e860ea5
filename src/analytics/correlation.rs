use super::Sample;
use crate::insights::CorrelationPoint;

/// Actual-vs-predicted pairs with both values strictly below `threshold`,
/// sorted so the output is the same for any input order.
pub(super) fn correlation_points(samples: &[Sample], threshold: f64) -> Vec<CorrelationPoint> {
    let mut points: Vec<CorrelationPoint> = samples
        .iter()
        .filter(|s| s.actual < threshold && s.predicted < threshold)
        .map(|s| CorrelationPoint {
            actual: s.actual,
            predicted: s.predicted,
        })
        .collect();

    points.sort_by(|a, b| {
        a.actual
            .total_cmp(&b.actual)
            .then_with(|| a.predicted.total_cmp(&b.predicted))
    });
    points
}
