//! Intensity statistics
//!
//! Percentiles use linear interpolation between closest ranks, and histograms
//! use equal-width bins over a closed range with the last bin including its
//! right edge.

/// Percentile of `values` (p in [0, 100]) with linear interpolation.
///
/// Returns `None` for an empty slice.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(percentile_sorted(&sorted, p))
}

/// Percentile of an already sorted, non-empty slice
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Mean and population standard deviation. `None` for an empty slice.
pub fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / n;
    Some((mean, var.sqrt()))
}

/// Equal-width histogram
#[derive(Clone, Debug)]
pub struct Histogram {
    /// Count per bin
    pub counts: Vec<f64>,
    /// Bin edges, `counts.len() + 1` entries
    pub edges: Vec<f64>,
}

impl Histogram {
    /// Histogram of `values` over `[lo, hi]` with `num_bins` bins.
    ///
    /// Values outside the range are ignored. A zero-width range is widened
    /// to `[lo - 0.5, hi + 0.5]`.
    pub fn new(values: &[f64], num_bins: usize, range: (f64, f64)) -> Self {
        let num_bins = num_bins.max(1);
        let (mut lo, mut hi) = range;
        if hi <= lo {
            lo -= 0.5;
            hi += 0.5;
        }
        let width = (hi - lo) / num_bins as f64;
        let edges: Vec<f64> = (0..=num_bins).map(|i| lo + i as f64 * width).collect();

        let mut counts = vec![0.0; num_bins];
        for &v in values {
            if !(v >= lo && v <= hi) {
                continue;
            }
            let bin = (((v - lo) / (hi - lo)) * num_bins as f64).floor() as usize;
            counts[bin.min(num_bins - 1)] += 1.0;
        }

        Self { counts, edges }
    }

    /// Histogram over the data's own min..max range
    pub fn auto_range(values: &[f64], num_bins: usize) -> Self {
        if values.is_empty() {
            return Self::new(values, num_bins, (0.0, 1.0));
        }
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Self::new(values, num_bins, (min, max))
    }

    pub fn num_bins(&self) -> usize {
        self.counts.len()
    }

    /// Midpoint of each bin
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }
}

/// Piecewise-linear interpolation of `x` against increasing `xp` / `fp`.
///
/// Clamps to the first/last `fp` outside the sampled range.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return x;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    // first index with xp[i] > x
    let hi = xp[..n].partition_point(|&v| v <= x);
    let lo = hi - 1;
    let span = xp[hi] - xp[lo];
    if span <= 0.0 {
        return fp[hi];
    }
    let y = fp[lo] + (fp[hi] - fp[lo]) * (x - xp[lo]) / span;
    y.clamp(fp[lo].min(fp[hi]), fp[lo].max(fp[hi]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&data, 0.0), Some(1.0));
        assert_eq!(percentile(&data, 50.0), Some(3.0));
        assert_eq!(percentile(&data, 100.0), Some(5.0));
        let p = percentile(&[0.0, 10.0], 25.0).unwrap();
        assert!((p - 2.5).abs() < 1e-12, "got {}", p);
    }

    #[test]
    fn test_percentile_unsorted_and_empty() {
        assert_eq!(percentile(&[5.0, 1.0, 3.0], 50.0), Some(3.0));
        assert_eq!(percentile(&[], 50.0), None);
        assert_eq!(percentile(&[7.0], 99.0), Some(7.0));
    }

    #[test]
    fn test_mean_std_population() {
        let (mean, std) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((mean - 5.0).abs() < 1e-12);
        assert!((std - 2.0).abs() < 1e-12);
        assert!(mean_std(&[]).is_none());
    }

    #[test]
    fn test_histogram_edges_and_counts() {
        let hist = Histogram::new(&[0.0, 0.5, 1.0, 2.0, -1.0, 3.0], 4, (0.0, 2.0));
        assert_eq!(hist.edges, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        // -1 and 3 are out of range, 2.0 lands in the last bin
        assert_eq!(hist.counts, vec![1.0, 1.0, 1.0, 1.0]);
        assert_eq!(hist.centers()[0], 0.25);
    }

    #[test]
    fn test_histogram_zero_width_range() {
        let hist = Histogram::new(&[0.0, 0.0], 2, (0.0, 0.0));
        assert_eq!(hist.edges, vec![-0.5, 0.0, 0.5]);
        assert_eq!(hist.counts, vec![0.0, 2.0]);
    }

    #[test]
    fn test_interp() {
        let xp = [0.0, 1.0, 2.0];
        let fp = [0.0, 10.0, 30.0];
        assert_eq!(interp(-1.0, &xp, &fp), 0.0);
        assert_eq!(interp(0.5, &xp, &fp), 5.0);
        assert_eq!(interp(1.5, &xp, &fp), 20.0);
        assert_eq!(interp(5.0, &xp, &fp), 30.0);
    }
}
