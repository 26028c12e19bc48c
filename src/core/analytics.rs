//! Series statistics used by the chart

/// Trailing simple moving average accepting shorter windows at the start.
///
/// Point `i` is the mean of `values[i + 1 - n ..= i]` with
/// `n = min(window, i + 1)`. A zero window is treated as 1.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Smallest and largest finite value, if any.
pub fn finite_bounds<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(got: &[f64], want: &[f64]) {
        assert_eq!(got.len(), want.len());
        for (g, w) in got.iter().zip(want) {
            assert!((g - w).abs() < 1e-9, "{got:?} != {want:?}");
        }
    }

    #[test]
    fn test_short_series_uses_growing_window() {
        let ma = moving_average(&[13000.0, 13130.0, 12870.0], 7);
        assert_close(&ma, &[13000.0, 13065.0, 13000.0]);
    }

    #[test]
    fn test_full_window_is_trailing_mean() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let ma = moving_average(&values, 7);

        for i in 0..values.len() {
            let start = i.saturating_sub(6);
            let expected = values[start..=i].iter().sum::<f64>() / (i - start + 1) as f64;
            assert!((ma[i] - expected).abs() < 1e-9);
        }
        // mean of 4..=10
        assert!((ma[9] - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_of_one_is_identity() {
        let values = [3.0, 1.0, 4.0, 1.5];
        assert_close(&moving_average(&values, 1), &values);
        assert_close(&moving_average(&values, 0), &values);
    }

    #[test]
    fn test_empty_series() {
        assert!(moving_average(&[], 7).is_empty());
        assert_eq!(finite_bounds(&[] as &[f64]), None);
    }

    #[test]
    fn test_finite_bounds_skips_non_finite() {
        let values = [f64::NAN, 5.0, -2.0, f64::INFINITY, 9.5];
        assert_eq!(finite_bounds(&values), Some((-2.0, 9.5)));
    }
}
