//! Statistical helper functions for the diagon diagnostics.
//!
//! Every function skips non-finite samples (pairwise for two-series
//! statistics) and signals degenerate input with `NaN` instead of panicking,
//! so gridded reductions can run over land/sea masks and short records.

/// Finite `(x, y)` pairs of two equally indexed series.
fn finite_pairs<'a>(x: &'a [f64], y: &'a [f64]) -> impl Iterator<Item = (f64, f64)> + 'a {
    x.iter()
        .zip(y.iter())
        .filter(|(xi, yi)| xi.is_finite() && yi.is_finite())
        .map(|(&xi, &yi)| (xi, yi))
}

/// Arithmetic mean of the finite values. Returns `NaN` if there are none.
pub fn mean(data: &[f64]) -> f64 {
    let (sum, n) = data
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Sample variance with N-1 denominator over the finite values.
/// Returns `NaN` if fewer than 2 finite values.
pub fn variance(data: &[f64]) -> f64 {
    let finite: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
    let n = finite.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = finite.iter().sum::<f64>() / n as f64;
    finite.iter().map(|&v| (v - m) * (v - m)).sum::<f64>() / (n as f64 - 1.0)
}

/// Sample standard deviation with N-1 denominator.
/// Returns `NaN` if fewer than 2 finite values.
pub fn sd(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Centered sums over the finite pairs: `(n, sum_xy, sum_xx, sum_yy)`.
fn centered_sums(x: &[f64], y: &[f64]) -> (usize, f64, f64, f64) {
    let pairs: Vec<(f64, f64)> = finite_pairs(x, y).collect();
    let n = pairs.len();
    if n == 0 {
        return (0, f64::NAN, f64::NAN, f64::NAN);
    }

    let nf = n as f64;
    let mx = pairs.iter().map(|(xi, _)| xi).sum::<f64>() / nf;
    let my = pairs.iter().map(|(_, yi)| yi).sum::<f64>() / nf;

    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_yy = 0.0;
    for &(xi, yi) in &pairs {
        let dx = xi - mx;
        let dy = yi - my;
        sum_xy += dx * dy;
        sum_xx += dx * dx;
        sum_yy += dy * dy;
    }
    (n, sum_xy, sum_xx, sum_yy)
}

/// Sample covariance with N-1 denominator over the finite pairs.
/// Returns `NaN` if fewer than 2 finite pairs.
pub fn covariance(x: &[f64], y: &[f64]) -> f64 {
    let (n, sum_xy, _, _) = centered_sums(x, y);
    if n < 2 {
        return f64::NAN;
    }
    sum_xy / (n as f64 - 1.0)
}

/// Pearson correlation coefficient over the finite pairs.
///
/// Returns `NaN` if fewer than 2 finite pairs or if either series is
/// constant (zero variance propagates through the division).
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    let (n, sum_xy, sum_xx, sum_yy) = centered_sums(x, y);
    if n < 2 {
        return f64::NAN;
    }
    let denom = (sum_xx * sum_yy).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    sum_xy / denom
}

/// Least-squares slope of `y` on `x`: `cov(x, y) / var(x)`.
///
/// Returns `NaN` if fewer than 2 finite pairs or if `x` is constant.
pub fn regression_slope(x: &[f64], y: &[f64]) -> f64 {
    let (n, sum_xy, sum_xx, _) = centered_sums(x, y);
    if n < 2 || sum_xx == 0.0 {
        return f64::NAN;
    }
    sum_xy / sum_xx
}

/// Weighted mean of `values`, skipping entries where either the value or
/// the weight is non-finite. Returns `NaN` if the remaining weights sum to 0.
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
    let (num, den) = finite_pairs(values, weights)
        .fold((0.0, 0.0), |(num, den), (v, w)| (num + v * w, den + w));
    if den == 0.0 { f64::NAN } else { num / den }
}

/// Centered rolling mean with a minimum number of observations.
///
/// The window for index `i` spans `[i - window/2, i + window - window/2)`,
/// truncated at the series edges. A position is `NaN` when its window holds
/// fewer than `min_periods` finite samples. The output always has the same
/// length as `series`.
pub fn rolling_mean_centered(series: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    let n = series.len();
    if window == 0 {
        return vec![f64::NAN; n];
    }

    let half = window / 2;
    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + window - half).min(n);
            let (sum, count) = series[start..end]
                .iter()
                .filter(|v| v.is_finite())
                .fold((0.0, 0usize), |(s, c), &v| (s + v, c + 1));
            if count == 0 || count < min_periods {
                f64::NAN
            } else {
                sum / count as f64
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&data), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mean_skips_nan() {
        assert_relative_eq!(mean(&[1.0, f64::NAN, 3.0]), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mean_empty_is_nan() {
        assert!(mean(&[]).is_nan());
        assert!(mean(&[f64::NAN]).is_nan());
    }

    #[test]
    fn test_sd() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(sd(&data), 2.138090, epsilon = 1e-6);
    }

    #[test]
    fn test_variance_two() {
        // [3.0, 7.0]: mean=5, sum_sq=8, var=8/1=8
        assert_relative_eq!(variance(&[3.0, 7.0]), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_variance_single_is_nan() {
        assert!(variance(&[5.0]).is_nan());
    }

    #[test]
    fn test_covariance() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        // cov = 2 * var(x) = 2 * 1.6667
        assert_relative_eq!(covariance(&x, &y), 10.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_correlation_perfect() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        assert_relative_eq!(pearson_correlation(&x, &y), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_correlation_anti() {
        let x = [1.0, 2.0, 3.0];
        let y = [3.0, 2.0, 1.0];
        assert_relative_eq!(pearson_correlation(&x, &y), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_correlation_constant_is_nan() {
        let x = [1.0, 1.0, 1.0];
        let y = [1.0, 2.0, 3.0];
        assert!(pearson_correlation(&x, &y).is_nan());
    }

    #[test]
    fn test_pearson_correlation_with_nan() {
        let x = [1.0, f64::NAN, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, f64::NAN, 8.0, 10.0];
        // Finite pairs: (1,2), (4,8), (5,10), perfectly linear
        assert_relative_eq!(pearson_correlation(&x, &y), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_correlation_insufficient() {
        assert!(pearson_correlation(&[1.0], &[2.0]).is_nan());
    }

    #[test]
    fn test_regression_slope() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.5, 6.0, 8.5];
        assert_relative_eq!(regression_slope(&x, &y), 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_regression_slope_matches_cov_over_var() {
        let x = [0.3, -1.2, 2.2, 0.9, -0.4];
        let y = [1.0, -0.5, 2.0, 0.1, 0.7];
        assert_relative_eq!(
            regression_slope(&x, &y),
            covariance(&x, &y) / variance(&x),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_regression_slope_constant_x_is_nan() {
        assert!(regression_slope(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn test_weighted_mean() {
        assert_relative_eq!(
            weighted_mean(&[1.0, 3.0], &[3.0, 1.0]),
            1.5,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            weighted_mean(&[1.0, f64::NAN, 3.0], &[1.0, 5.0, 1.0]),
            2.0,
            epsilon = 1e-12
        );
        assert!(weighted_mean(&[f64::NAN], &[1.0]).is_nan());
    }

    #[test]
    fn test_rolling_mean_centered_odd() {
        let s = [1.0, 2.0, 3.0, 4.0, 5.0];
        let r = rolling_mean_centered(&s, 3, 1);
        assert_relative_eq!(r[0], 1.5, epsilon = 1e-12);
        assert_relative_eq!(r[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(r[2], 3.0, epsilon = 1e-12);
        assert_relative_eq!(r[4], 4.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rolling_mean_centered_even_window() {
        // window 4 at i covers [i-2, i+1]
        let s = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let r = rolling_mean_centered(&s, 4, 4);
        assert!(r[0].is_nan());
        assert!(r[1].is_nan());
        assert_relative_eq!(r[2], 2.5, epsilon = 1e-12);
        assert_relative_eq!(r[4], 4.5, epsilon = 1e-12);
        assert!(r[5].is_nan());
    }

    #[test]
    fn test_rolling_mean_min_periods_edges() {
        let s = [1.0, 2.0, 3.0, 4.0];
        let r = rolling_mean_centered(&s, 4, 2);
        assert_eq!(r.len(), s.len());
        assert!(r.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_rolling_mean_empty_and_zero_window() {
        assert!(rolling_mean_centered(&[], 3, 1).is_empty());
        assert!(rolling_mean_centered(&[1.0, 2.0], 0, 1).iter().all(|v| v.is_nan()));
    }
}
