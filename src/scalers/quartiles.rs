/// Sorted copy of the sample, NaNs last.
fn sorted(data: &[f64]) -> Vec<f64> {
    let mut sorted_data = data.to_vec();
    sorted_data.sort_by(|a, b| a.total_cmp(b));
    sorted_data
}

/// Quantile `p` in `[0, 1]` of an already sorted sample.
///
/// Linear interpolation between order statistics: with `h = (n - 1) * p`,
/// the result is `x[floor(h)] + (h - floor(h)) * (x[floor(h) + 1] - x[floor(h)])`.
/// This is the pandas / numpy default ("linear", Hyndman-Fan type 7), so
/// fences match what an offline notebook computes on the same data.
pub fn quantile_sorted(sorted_data: &[f64], p: f64) -> Option<f64> {
    let n = sorted_data.len();
    if n == 0 {
        return None;
    }

    let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = h - lo as f64;

    Some(sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo]))
}

pub fn quantile(data: &[f64], p: f64) -> Option<f64> {
    quantile_sorted(&sorted(data), p)
}

pub fn median(data: &[f64]) -> Option<f64> {
    quantile(data, 0.5)
}

/// First and third quartile of a sample.
pub fn quartiles(data: &[f64]) -> Option<(f64, f64)> {
    let sorted_data = sorted(data);
    let q1 = quantile_sorted(&sorted_data, 0.25)?;
    let q3 = quantile_sorted(&sorted_data, 0.75)?;
    Some((q1, q3))
}
