//! Daily closing price representation.

use chrono::NaiveDate;
use serde::Serialize;

use super::error::PricecastError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        PricePoint { date, close }
    }

    /// Percentage change from `prev_close` to this close.
    pub fn pct_change(&self, prev_close: f64) -> f64 {
        (self.close - prev_close) / prev_close
    }
}

/// Chronologically ordered closes with strictly increasing dates.
///
/// Only constructed through [`Series::new`], which rejects unordered or
/// duplicated dates, so every consumer can rely on the ordering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    points: Vec<PricePoint>,
}

impl Series {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, PricecastError> {
        for pair in points.windows(2) {
            if pair[1].date == pair[0].date {
                return Err(PricecastError::DuplicateDate { date: pair[1].date });
            }
            if pair[1].date < pair[0].date {
                return Err(PricecastError::InvalidParameter {
                    name: "series".into(),
                    reason: format!(
                        "dates out of order: {} follows {}",
                        pair[1].date, pair[0].date
                    ),
                });
            }
        }
        Ok(Series { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn pct_change() {
        let p = PricePoint::new(d(2), 110.0);
        assert!((p.pct_change(100.0) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn series_accepts_increasing_dates_with_gaps() {
        let series = Series::new(vec![
            PricePoint::new(d(1), 10.0),
            PricePoint::new(d(2), 11.0),
            PricePoint::new(d(5), 12.0),
        ])
        .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.first_date(), Some(d(1)));
        assert_eq!(series.last_date(), Some(d(5)));
        assert_eq!(series.closes(), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let err = Series::new(vec![
            PricePoint::new(d(1), 10.0),
            PricePoint::new(d(1), 11.0),
        ])
        .unwrap_err();
        assert!(matches!(err, PricecastError::DuplicateDate { date } if date == d(1)));
    }

    #[test]
    fn series_rejects_unordered_dates() {
        let err = Series::new(vec![
            PricePoint::new(d(3), 10.0),
            PricePoint::new(d(1), 11.0),
        ])
        .unwrap_err();
        assert!(matches!(err, PricecastError::InvalidParameter { .. }));
    }

    #[test]
    fn empty_series() {
        let series = Series::new(vec![]).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.last_date(), None);
    }
}
