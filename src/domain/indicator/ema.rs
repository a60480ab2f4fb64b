//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded with the first close, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! No warmup: every point is valid from the first one.

/// Recursive EMA over raw values, seeded by the first value.
pub fn ema_values(input: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return Vec::new();
    }

    let k = smoothing_factor(span);
    let mut out = Vec::with_capacity(input.len());
    let mut ema = 0.0;

    for (i, &value) in input.iter().enumerate() {
        ema = if i == 0 {
            value
        } else {
            value * k + ema * (1.0 - k)
        };
        out.push(ema);
    }

    out
}

pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_seed_is_first_value() {
        let values = ema_values(&[10.0, 20.0, 30.0], 3);
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], 10.0);
    }

    #[test]
    fn ema_recursive_calculation() {
        let got = ema_values(&[10.0, 20.0, 30.0, 40.0], 3);
        let k = 2.0 / 4.0;

        let e1 = 20.0 * k + 10.0 * (1.0 - k);
        let e2 = 30.0 * k + e1 * (1.0 - k);
        let e3 = 40.0 * k + e2 * (1.0 - k);

        assert!((got[1] - e1).abs() < f64::EPSILON);
        assert!((got[2] - e2).abs() < f64::EPSILON);
        assert!((got[3] - e3).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_equal_prices() {
        let values = ema_values(&[100.0; 10], 5);
        assert!(values.iter().all(|v| *v == 100.0));
    }

    #[test]
    fn ema_span_1_tracks_input() {
        let values = ema_values(&[3.0, 7.0, 1.0], 1);
        assert_eq!(values, vec![3.0, 7.0, 1.0]);
    }

    #[test]
    fn ema_empty_and_zero_span() {
        assert!(ema_values(&[], 3).is_empty());
        assert!(ema_values(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn ema_smoothing_factor() {
        assert!((smoothing_factor(10) - 2.0 / 11.0).abs() < f64::EPSILON);
    }
}
