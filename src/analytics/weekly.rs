use super::{order_independent_mean, Sample};
use crate::insights::WeeklyBucket;
use crate::telemetry::Weekday;

/// One bucket per weekday that has samples, Monday first. Days without
/// samples are omitted rather than reported as zero-duration days.
pub(super) fn weekly_trend<'a, I>(days: I) -> Vec<WeeklyBucket>
where
    I: IntoIterator<Item = (Weekday, &'a [Sample])>,
{
    let mut buckets: Vec<WeeklyBucket> = days
        .into_iter()
        .filter(|(_, samples)| !samples.is_empty())
        .map(|(day_label, samples)| WeeklyBucket {
            day_label,
            average_actual: order_independent_mean(samples.iter().map(|s| s.actual)),
            average_predicted: order_independent_mean(samples.iter().map(|s| s.predicted)),
            sample_count: samples.len(),
        })
        .collect();

    buckets.sort_by_key(|b| b.day_label);
    buckets
}
