//! Series loader and validator.
//!
//! Turns raw tabular input (header names plus string cells) into a validated
//! [`Series`]: required `Date`/`Close` columns, parseable values, positive
//! closes, ascending unique dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::error::PricecastError;
use super::price::{PricePoint, Series};

pub const DATE_COLUMN: &str = "Date";
pub const CLOSE_COLUMN: &str = "Close";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Raw rows as read from a tabular source, before any validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        RawTable { headers, rows }
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }
}

pub fn load_series(table: &RawTable, max_rows: Option<usize>) -> Result<Series, PricecastError> {
    let date_idx = table.column_index(DATE_COLUMN);
    let close_idx = table.column_index(CLOSE_COLUMN);

    let (date_idx, close_idx) = match (date_idx, close_idx) {
        (Some(d), Some(c)) => (d, c),
        (d, c) => {
            let mut missing = Vec::new();
            if d.is_none() {
                missing.push(DATE_COLUMN.to_string());
            }
            if c.is_none() {
                missing.push(CLOSE_COLUMN.to_string());
            }
            return Err(PricecastError::Schema { missing });
        }
    };

    if let Some(limit) = max_rows {
        if table.rows.len() > limit {
            return Err(PricecastError::TooManyRows {
                rows: table.rows.len(),
                limit,
            });
        }
    }

    let mut points = Vec::with_capacity(table.rows.len());
    for (i, record) in table.rows.iter().enumerate() {
        let row = i + 1;
        let date_str = cell(record, date_idx, row, DATE_COLUMN)?;
        let close_str = cell(record, close_idx, row, CLOSE_COLUMN)?;

        let date = parse_date(date_str).ok_or_else(|| PricecastError::Parse {
            row,
            column: DATE_COLUMN.into(),
            reason: format!("unrecognised date '{}'", date_str),
        })?;
        let close = parse_close(close_str).map_err(|reason| PricecastError::Parse {
            row,
            column: CLOSE_COLUMN.into(),
            reason,
        })?;

        points.push(PricePoint::new(date, close));
    }

    // Stable sort keeps input order among equal dates; Series::new rejects them.
    points.sort_by_key(|p| p.date);
    Series::new(points)
}

fn cell<'a>(
    record: &'a [String],
    idx: usize,
    row: usize,
    column: &str,
) -> Result<&'a str, PricecastError> {
    record
        .get(idx)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PricecastError::Parse {
            row,
            column: column.into(),
            reason: "missing value".into(),
        })
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn parse_close(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid close '{}': {}", s, e))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("close must be a positive finite number, got {}", s));
    }
    Ok(value)
}
