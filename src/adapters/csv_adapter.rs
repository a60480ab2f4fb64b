//! CSV file data adapter.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::domain::error::PricecastError;
use crate::domain::features::FeatureTable;
use crate::domain::loader::{self, RawTable};
use crate::domain::price::Series;
use crate::ports::data_port::PriceSource;

#[derive(Debug)]
pub struct CsvAdapter {
    path: PathBuf,
    max_rows: Option<usize>,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            max_rows: None,
        }
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Read every record as strings. Short rows are kept; the loader reports
    /// the missing cell. Reading stops at the first record past `max_rows`.
    pub fn read_table(&self) -> Result<RawTable, PricecastError> {
        let file = File::open(&self.path)?;
        read_table_from(file, self.max_rows)
    }
}

impl PriceSource for CsvAdapter {
    fn load(&self) -> Result<Series, PricecastError> {
        let table = self.read_table()?;
        debug!(
            path = %self.path.display(),
            rows = table.rows.len(),
            "read csv"
        );
        loader::load_series(&table, self.max_rows)
    }
}

pub fn read_table_from<R: io::Read>(
    reader: R,
    max_rows: Option<usize>,
) -> Result<RawTable, PricecastError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut record = csv::StringRecord::new();
    while rdr.read_record(&mut record).map_err(csv_error)? {
        if let Some(limit) = max_rows {
            if rows.len() >= limit {
                return Err(PricecastError::TooManyRows {
                    rows: rows.len() + 1,
                    limit,
                });
            }
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows))
}

/// Write the feature table as `Date,<features...>,Close`.
pub fn write_features<W: Write>(table: &FeatureTable, writer: W) -> Result<(), PricecastError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["Date".to_string()];
    header.extend(table.columns.iter().map(|c| c.to_string()));
    header.push("Close".to_string());
    wtr.write_record(&header).map_err(csv_error)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(row.values.len() + 2);
        record.push(row.date.format("%Y-%m-%d").to_string());
        record.extend(row.values.iter().map(|v| v.to_string()));
        record.push(row.close.to_string());
        wtr.write_record(&record).map_err(csv_error)?;
    }

    wtr.flush()?;
    Ok(())
}

fn csv_error(e: csv::Error) -> PricecastError {
    let line = e.position().map_or(0, |p| p.line() as usize);
    let reason = e.to_string();
    match e.into_kind() {
        csv::ErrorKind::Io(io) => PricecastError::Io(io),
        _ => PricecastError::Parse {
            row: line,
            column: "record".into(),
            reason,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::features::{self, FeatureSet};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_reads_date_and_close() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "prices.csv",
            "Date,Open,Close\n2024-01-02,1,10.5\n2024-01-03,1,11.0\n",
        );

        let series = CsvAdapter::new(path).load().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![10.5, 11.0]);
        assert_eq!(
            series.first_date(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
    }

    #[test]
    fn load_sorts_unordered_input() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "prices.csv",
            "date,close\n2024-01-05,3\n2024-01-01,1\n2024-01-03,2\n",
        );

        let series = CsvAdapter::new(path).load().unwrap();
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = CsvAdapter::new(dir.path().join("nope.csv"))
            .load()
            .unwrap_err();
        assert!(matches!(err, PricecastError::Io(_)));
    }

    #[test]
    fn missing_close_column_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "prices.csv", "Date,Open\n2024-01-02,1\n");
        let err = CsvAdapter::new(path).load().unwrap_err();
        assert!(matches!(err, PricecastError::Schema { missing } if missing == vec!["Close"]));
    }

    #[test]
    fn short_row_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "prices.csv", "Date,Close\n2024-01-02,1\n2024-01-03\n");
        let err = CsvAdapter::new(path).load().unwrap_err();
        assert!(matches!(err, PricecastError::Parse { row: 2, .. }));
    }

    #[test]
    fn max_rows_enforced() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "prices.csv",
            "Date,Close\n2024-01-01,1\n2024-01-02,2\n2024-01-03,3\n",
        );
        let err = CsvAdapter::new(path).with_max_rows(2).load().unwrap_err();
        assert!(matches!(err, PricecastError::TooManyRows { rows: 3, limit: 2 }));
    }

    #[test]
    fn row_cap_stops_before_reading_rest() {
        let mut content = b"Date,Close\n2024-01-01,1\n2024-01-02,2\n".to_vec();
        content.extend_from_slice(b"2024-01-03,\xff\xfe\n");
        let err = read_table_from(content.as_slice(), Some(1)).unwrap_err();
        assert!(matches!(err, PricecastError::TooManyRows { rows: 2, limit: 1 }));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, &content).unwrap();
        let err = CsvAdapter::new(path).with_max_rows(1).load().unwrap_err();
        assert!(matches!(err, PricecastError::TooManyRows { limit: 1, .. }));
    }

    #[test]
    fn row_cap_allows_exact_limit() {
        let content = "Date,Close\n2024-01-01,1\n2024-01-02,2\n";
        let table = read_table_from(content.as_bytes(), Some(2)).unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn byte_order_mark_stripped() {
        let table = read_table_from("\u{feff}Date,Close\n2024-01-01,1\n".as_bytes(), None).unwrap();
        assert_eq!(table.headers, vec!["Date", "Close"]);
    }

    #[test]
    fn write_features_header_and_rows() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = (0..30)
            .map(|i| {
                crate::domain::price::PricePoint::new(
                    start + chrono::Duration::days(i),
                    100.0 + i as f64,
                )
            })
            .collect();
        let series = Series::new(points).unwrap();
        let table = features::compute(&series, &FeatureSet::default());

        let mut out = Vec::new();
        write_features(&table, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date,Returns,Volatility,Close");
        assert_eq!(lines.len(), 1 + table.len());
        assert!(lines[1].starts_with("2024-01-21,"));
        assert!(lines[1].ends_with(",120"));
    }
}
