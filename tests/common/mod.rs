#![allow(dead_code)]

use chrono::NaiveDate;
use pricecast::domain::error::PricecastError;
use pricecast::domain::price::{PricePoint, Series};
use pricecast::ports::data_port::PriceSource;
use std::io::Write;

/// In-memory price source.
pub struct MockPriceSource {
    pub points: Vec<PricePoint>,
    pub error: Option<String>,
}

impl MockPriceSource {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self {
            points,
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            points: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl PriceSource for MockPriceSource {
    fn load(&self) -> Result<Series, PricecastError> {
        if let Some(reason) = &self.error {
            return Err(PricecastError::Io(std::io::Error::other(reason.clone())));
        }
        Series::new(self.points.clone())
    }
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

pub fn make_points(prices: &[f64]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint::new(start_date() + chrono::Duration::days(i as i64), close))
        .collect()
}

pub fn make_series(prices: &[f64]) -> Series {
    Series::new(make_points(prices)).unwrap()
}

/// Smooth synthetic series with trend and cycles; strictly positive.
pub fn generate_prices(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            120.0 + 0.08 * t + 9.0 * (t / 11.0).sin() + 3.5 * (t / 3.7).cos()
        })
        .collect()
}

/// 50 bars at 100, 10 at 120, 11 at 80: one golden cross at bar 50 and one
/// death cross at bar 70.
pub fn crossover_prices() -> Vec<f64> {
    let mut prices = vec![100.0; 50];
    prices.extend(std::iter::repeat_n(120.0, 10));
    prices.extend(std::iter::repeat_n(80.0, 11));
    prices
}

pub fn csv_content(prices: &[f64]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Volume\n");
    for p in make_points(prices) {
        out.push_str(&format!(
            "{},{},{},{},{},1000\n",
            p.date.format("%Y-%m-%d"),
            p.close,
            p.close,
            p.close,
            p.close
        ));
    }
    out
}

pub fn write_temp_file(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn write_temp_csv(prices: &[f64]) -> tempfile::NamedTempFile {
    write_temp_file(&csv_content(prices), ".csv")
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    write_temp_file(content, ".ini")
}
