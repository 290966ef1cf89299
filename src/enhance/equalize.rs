//! Blended histogram equalization
//!
//! Full equalization over-amplifies contrast in continuous intensities, so
//! the equalized value is mixed back with the linearly scaled one.

use crate::utils::stats::{interp, Histogram};

/// Default weight of the equalized values in the blend
pub const DEFAULT_BLEND_WEIGHT: f64 = 0.7;

/// Equalize `scaled` over `bin_count` bins and blend with the input.
///
/// The cumulative histogram is normalized to `[0, bin_count - 1]` and sampled
/// at each value by linear interpolation against the lower bin edges. If the
/// histogram holds nothing the input is returned unchanged.
pub fn equalize(scaled: &[f64], bin_count: usize, blend_weight: f64) -> Vec<f64> {
    if scaled.is_empty() {
        return Vec::new();
    }

    let hist = Histogram::auto_range(scaled, bin_count);
    let mut cdf = Vec::with_capacity(hist.num_bins());
    let mut total = 0.0;
    for &c in &hist.counts {
        total += c;
        cdf.push(total);
    }
    if !(total > 0.0) {
        return scaled.to_vec();
    }

    let top = (bin_count.max(1) - 1) as f64;
    for c in cdf.iter_mut() {
        *c = top * *c / total;
    }

    let lower_edges = &hist.edges[..hist.num_bins()];
    scaled
        .iter()
        .map(|&v| {
            let eq = interp(v, lower_edges, &cdf);
            // convex mix, kept between its two endpoints
            (v + blend_weight * (eq - v)).clamp(eq.min(v), eq.max(v))
        })
        .collect()
}
