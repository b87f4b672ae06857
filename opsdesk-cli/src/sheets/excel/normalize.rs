//! Cell normalization: raw spreadsheet cells to canonical search strings
//!
//! Every cell kind collapses to a display string here. Formula cells never
//! reach this code as formulas: calamine resolves them to their cached
//! concrete values when reading the worksheet range, so they normalize by
//! their resulting kind. Nothing in this module can abort ingestion; a cell
//! that cannot be rendered degrades to the empty string and is logged.

use calamine::Data;
use chrono::{NaiveDateTime, NaiveTime};

/// Fractional digits kept when rendering non-whole numbers
const MAX_FRACTION_DIGITS: usize = 10;

/// Normalize one cell to its canonical display string
///
/// Empty output means the cell will not be persisted at all; the index is
/// intentionally sparse.
pub fn normalize_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => render_number(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(dt) => render_datetime(dt),
            None => {
                log::warn!("cell has unrenderable date serial {}, treating as empty", dt.as_f64());
                String::new()
            }
        },
        Data::DateTimeIso(s) => s.trim().to_string(),
        Data::DurationIso(s) => s.trim().to_string(),
        Data::Error(_) => "ERROR".to_string(),
    }
}

/// Render a numeric cell: whole numbers as integer literals, everything
/// else with up to [`MAX_FRACTION_DIGITS`] fractional digits, trailing
/// zeros trimmed
fn render_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return (value as i64).to_string();
    }

    let rendered = format!("{:.*}", MAX_FRACTION_DIGITS, value);
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Render a date/time cell: calendar date when the time component is
/// exactly midnight, date+time to second precision otherwise
pub fn render_datetime(dt: NaiveDateTime) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
