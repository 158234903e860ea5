use serde::{Deserialize, Serialize};

/// Day a pipeline execution started on, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Maps the dataset's `start_day_of_week` index (0 = Monday) to a day.
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One pipeline execution observation taken from the historical dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub actual_duration_seconds: f64,
    pub predicted_duration_seconds: f64,
    pub start_day_of_week: Weekday,
    pub is_pull_request: bool,
    pub test_suite: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_from_index_covers_monday_to_sunday() {
        assert_eq!(Weekday::from_index(0), Some(Weekday::Mon));
        assert_eq!(Weekday::from_index(6), Some(Weekday::Sun));
        assert_eq!(Weekday::from_index(7), None);
        assert_eq!(Weekday::from_index(-1), None);
    }

    #[test]
    fn test_weekday_index_round_trips_through_all() {
        for (i, day) in Weekday::ALL.iter().enumerate() {
            assert_eq!(day.index(), i);
        }
    }

    #[test]
    fn test_weekday_serializes_as_short_label() {
        let labels = serde_json::to_value(Weekday::ALL).unwrap();
        assert_eq!(
            labels,
            serde_json::json!(["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"])
        );
    }
}
