mod parser;
mod reader;

pub use parser::{
    parse_fields, parse_row, parse_rows, FailureReason, ParseFailure, ParsedRow,
    ACTUAL_DURATION_COLUMN, DAY_OF_WEEK_COLUMN, PREDICTED_DURATION_COLUMN, PULL_REQUEST_COLUMN,
    TEST_SUITE_COLUMN,
};
pub use reader::{DatasetSource, RawFields, RawRow, RawRows};

use log::{info, warn};
use serde_json::{Map, Number, Value};

use crate::error::Result;

/// Columns emitted as JSON numbers whenever their text parses.
const NUMERIC_COLUMNS: [&str; 2] = [ACTUAL_DURATION_COLUMN, PREDICTED_DURATION_COLUMN];

/// Reads every row of the dataset as a JSON object, typing the numeric
/// columns where possible. Malformed rows are skipped.
pub fn load_rows(source: &DatasetSource) -> Result<Vec<Map<String, Value>>> {
    info!("Loading dataset rows from {}", source.path().display());

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for row in source.open()? {
        match row? {
            RawRow::Fields { fields, .. } => rows.push(typed_row(fields)),
            RawRow::Malformed { .. } => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} malformed rows while loading dataset");
    }

    Ok(rows)
}

fn typed_row(fields: RawFields) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(column, raw)| {
            let value = typed_value(&column, raw);
            (column, value)
        })
        .collect()
}

fn typed_value(column: &str, raw: String) -> Value {
    if NUMERIC_COLUMNS.contains(&column) {
        if let Some(number) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    } else if column == DAY_OF_WEEK_COLUMN {
        if let Ok(day) = raw.parse::<i64>() {
            return Value::from(day);
        }
    }

    Value::String(raw)
}
