use log::debug;
use thiserror::Error;

use super::reader::{RawFields, RawRow};
use crate::error::Result;
use crate::telemetry::{TelemetryRecord, Weekday};

pub const ACTUAL_DURATION_COLUMN: &str = "Test Suite Duration";
pub const PREDICTED_DURATION_COLUMN: &str = "predicted_duration";
pub const DAY_OF_WEEK_COLUMN: &str = "start_day_of_week";
pub const PULL_REQUEST_COLUMN: &str = "Build Pull Request";
pub const TEST_SUITE_COLUMN: &str = "Test Suite";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    #[error("missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("non-numeric duration")]
    NonNumericDuration { column: &'static str },

    #[error("negative duration")]
    NegativeDuration { column: &'static str },

    #[error("day of week '{0}' is not an integer in 0..=6")]
    InvalidDayOfWeek(String),

    #[error("malformed row: {0}")]
    MalformedRow(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub line: u64,
    pub reason: FailureReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRow {
    Valid(TelemetryRecord),
    Invalid(ParseFailure),
}

pub fn parse_row(raw: RawRow) -> ParsedRow {
    let outcome = match raw {
        RawRow::Fields { line, fields } => {
            parse_fields(&fields).map_err(|reason| ParseFailure { line, reason })
        }
        RawRow::Malformed { line, message } => Err(ParseFailure {
            line,
            reason: FailureReason::MalformedRow(message),
        }),
    };

    match outcome {
        Ok(record) => ParsedRow::Valid(record),
        Err(failure) => {
            debug!("Skipping row at line {}: {}", failure.line, failure.reason);
            ParsedRow::Invalid(failure)
        }
    }
}

/// Lazily types a stream of raw rows. Source failures pass through untouched
/// so the consumer can abort; row failures become [`ParsedRow::Invalid`].
pub fn parse_rows<I>(rows: I) -> impl Iterator<Item = Result<ParsedRow>>
where
    I: IntoIterator<Item = Result<RawRow>>,
{
    rows.into_iter().map(|row| row.map(parse_row))
}

pub fn parse_fields(fields: &RawFields) -> std::result::Result<TelemetryRecord, FailureReason> {
    let actual_duration_seconds = parse_duration(fields, ACTUAL_DURATION_COLUMN)?;
    let predicted_duration_seconds = parse_duration(fields, PREDICTED_DURATION_COLUMN)?;
    let start_day_of_week = parse_day_of_week(fields)?;

    Ok(TelemetryRecord {
        actual_duration_seconds,
        predicted_duration_seconds,
        start_day_of_week,
        is_pull_request: fields
            .get(PULL_REQUEST_COLUMN)
            .and_then(|v| parse_flag(v))
            .unwrap_or(false),
        test_suite: fields.get(TEST_SUITE_COLUMN).cloned().unwrap_or_default(),
    })
}

fn parse_duration(
    fields: &RawFields,
    column: &'static str,
) -> std::result::Result<f64, FailureReason> {
    let raw = fields
        .get(column)
        .ok_or(FailureReason::MissingColumn(column))?;

    let value = raw
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(FailureReason::NonNumericDuration { column })?;

    if value < 0.0 {
        return Err(FailureReason::NegativeDuration { column });
    }

    Ok(value)
}

fn parse_day_of_week(fields: &RawFields) -> std::result::Result<Weekday, FailureReason> {
    let raw = fields
        .get(DAY_OF_WEEK_COLUMN)
        .ok_or(FailureReason::MissingColumn(DAY_OF_WEEK_COLUMN))?;

    raw.parse::<i64>()
        .ok()
        .and_then(Weekday::from_index)
        .ok_or_else(|| FailureReason::InvalidDayOfWeek(raw.clone()))
}

/// Interprets the pull-request column; anything unrecognised is `None`.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
