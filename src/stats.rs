//! Small numeric helpers shared by the dashboard views

use statrs::statistics::Statistics;

/// -log10(p), with p == 0 (underflow) and missing values treated as missing
pub fn neg_log10(p: Option<f64>) -> Option<f64> {
    p.filter(|&v| v != 0.0).map(|v| -v.log10()).filter(|v| v.is_finite())
}

/// Pearson correlation over the pairs where both values are present.
///
/// Returns None with fewer than two complete pairs or zero variance.
pub fn pearson<I>(pairs: I) -> Option<f64>
where
    I: IntoIterator<Item = (Option<f64>, Option<f64>)>,
{
    let (x, y): (Vec<f64>, Vec<f64>) = pairs
        .into_iter()
        .filter_map(|(a, b)| Some((a?, b?)))
        .unzip();

    if x.len() < 2 {
        return None;
    }

    let cov = x.iter().covariance(y.iter());
    let sd_x = x.iter().std_dev();
    let sd_y = y.iter().std_dev();
    let r = cov / (sd_x * sd_y);

    if r.is_finite() {
        Some(r)
    } else {
        None
    }
}

/// Round to a fixed number of decimals for table display
pub fn round_to(value: Option<f64>, decimals: i32) -> Option<f64> {
    let factor = 10f64.powi(decimals);
    value.map(|v| (v * factor).round() / factor)
}

/// Largest of the present values, ignoring missing ones
pub fn max_present(values: &[Option<f64>]) -> Option<f64> {
    values.iter().flatten().copied().reduce(f64::max)
}

/// Min and max of the present values
pub fn range_present<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
