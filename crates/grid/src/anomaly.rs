//! Monthly anomaly computation.

/// Compute anomalies by subtracting the monthly climatology.
///
/// For each timestep, subtract the mean of all finite values sharing that
/// calendar month. Non-finite inputs stay non-finite; a month with no finite
/// value yields `NaN` for all of its timesteps.
pub fn monthly_anomalies(values: &[f64], months: &[u32]) -> Vec<f64> {
    let mut sums = [0.0_f64; 13];
    let mut counts = [0_usize; 13];

    for (&value, &month) in values.iter().zip(months.iter()) {
        if value.is_finite() && (1..=12).contains(&month) {
            sums[month as usize] += value;
            counts[month as usize] += 1;
        }
    }

    let mut means = [f64::NAN; 13];
    for m in 1..=12 {
        if counts[m] > 0 {
            means[m] = sums[m] / counts[m] as f64;
        }
    }

    values
        .iter()
        .zip(months.iter())
        .map(|(&value, &month)| {
            if (1..=12).contains(&month) {
                value - means[month as usize]
            } else {
                f64::NAN
            }
        })
        .collect()
}
