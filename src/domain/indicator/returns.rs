//! Daily returns and rolling volatility.
//!
//! RETURNS[i] = (C[i] - C[i-1]) / C[i-1], invalid at the first point.
//! VOLATILITY(n)[i] = sample standard deviation (n-1 denominator) of
//! RETURNS[i-n+1..=i]. Warmup: first n points are invalid, since the window
//! may only contain defined returns.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PricePoint;

pub const DEFAULT_VOLATILITY_WINDOW: usize = 20;

pub fn calculate_returns(points: &[PricePoint]) -> IndicatorSeries {
    let values = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let (valid, value) = if i == 0 {
                (false, 0.0)
            } else {
                (true, point.pct_change(points[i - 1].close))
            };
            IndicatorPoint {
                date: point.date,
                valid,
                value: IndicatorValue::Simple(value),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Returns,
        values,
    }
}

pub fn calculate_volatility(points: &[PricePoint], window: usize) -> IndicatorSeries {
    let returns: Vec<f64> = calculate_returns(points)
        .values
        .iter()
        .map(|p| match p.value {
            IndicatorValue::Simple(v) => v,
            IndicatorValue::Macd { line, .. } => line,
        })
        .collect();

    let mut values = Vec::with_capacity(points.len());
    for (i, point) in points.iter().enumerate() {
        let valid = window >= 2 && i >= window;
        let value = if valid {
            sample_stddev(&returns[i + 1 - window..=i])
        } else {
            0.0
        };

        values.push(IndicatorPoint {
            date: point.date,
            valid,
            value: IndicatorValue::Simple(value),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Volatility(window),
        values,
    }
}

fn sample_stddev(window: &[f64]) -> f64 {
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_points;

    #[test]
    fn returns_first_point_invalid() {
        let series = calculate_returns(&make_points(&[100.0, 110.0, 99.0]));
        let v = series.simple_values();
        assert_eq!(v[0], None);
        assert!((v[1].unwrap() - 0.1).abs() < 1e-12);
        assert!((v[2].unwrap() - (-0.1)).abs() < 1e-12);
    }

    #[test]
    fn volatility_warmup() {
        let prices: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let series = calculate_volatility(&make_points(&prices), 20);

        for i in 0..20 {
            assert!(!series.values[i].valid, "Point {} should be invalid", i);
        }
        assert!(series.values[20].valid);
    }

    #[test]
    fn volatility_constant_returns_is_zero() {
        let prices: Vec<f64> = (0..10).map(|i| 2f64.powi(i)).collect();
        let series = calculate_volatility(&make_points(&prices), 3);
        for v in series.simple_values().into_iter().flatten() {
            assert!(v.abs() < 1e-12);
        }
    }

    #[test]
    fn volatility_uses_sample_stddev() {
        // Returns: +10%, -10%, +10%
        let points = make_points(&[100.0, 110.0, 99.0, 108.9]);
        let series = calculate_volatility(&points, 3);
        let got = series.simple_values()[3].unwrap();

        let r = [0.1, -0.1, 0.1];
        let mean = (0.1 - 0.1 + 0.1) / 3.0;
        let var = r.iter().map(|x: &f64| (x - mean).powi(2)).sum::<f64>() / 2.0;
        assert!((got - var.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn volatility_window_below_two_is_never_valid() {
        let series = calculate_volatility(&make_points(&[1.0, 2.0, 3.0]), 1);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn volatility_indicator_type() {
        let series = calculate_volatility(&make_points(&[1.0]), 20);
        assert_eq!(series.indicator_type, IndicatorType::Volatility(20));
    }
}
