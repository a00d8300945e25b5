//! Price histogram

use shared::models::PriceStat;

/// Number of equal-width price buckets
pub const PRICE_BINS: usize = 4;

/// Equal-width histogram over `[min, max]` of `values`.
///
/// Edges are `bins + 1` evenly spaced points. A degenerate range widens
/// to `[v - 0.5, v + 0.5]`. Every bucket is half-open except the last,
/// which also holds values equal to the upper edge. Empty input yields an
/// empty stat.
pub fn histogram(values: &[f64], bins: usize) -> PriceStat {
    if values.is_empty() || bins == 0 {
        return PriceStat::default();
    }

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let step = (hi - lo) / bins as f64;
    let mut edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * step).collect();
    edges[bins] = hi;

    let mut counts = vec![0_u64; bins];
    for &v in values {
        let mut idx = (((v - lo) / (hi - lo)) * bins as f64) as usize;
        idx = idx.min(bins - 1);
        // float rounding can land one bucket off the computed edges
        if v < edges[idx] && idx > 0 {
            idx -= 1;
        } else if idx + 1 < bins && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    PriceStat {
        labels: edges,
        data: counts,
    }
}
