//! Small numeric reductions over score slices.

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). `None` below two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    if is_constant(values) {
        return Some(0.0);
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Whether every value equals the first one.
///
/// Summing and dividing can leave a tiny residual variance for constant
/// fractional series (5.9, 3.3), so this compares values directly.
pub fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Quantile with linear interpolation between closest ranks.
///
/// `sorted` must be in ascending order.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Outcome of a Pearson computation that could not produce a coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degenerate {
    /// Fewer than two paired observations.
    TooShort,
    /// The first series is constant.
    First,
    /// The second series is constant.
    Second,
}

/// Pearson correlation coefficient of two equally long series.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64, Degenerate> {
    debug_assert_eq!(x.len(), y.len());
    if x.len() < 2 {
        return Err(Degenerate::TooShort);
    }
    if is_constant(x) {
        return Err(Degenerate::First);
    }
    if is_constant(y) {
        return Err(Degenerate::Second);
    }

    let mx = x.iter().sum::<f64>() / x.len() as f64;
    let my = y.iter().sum::<f64>() / y.len() as f64;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    // Rounding can push |r| a hair above 1.
    Ok((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}
