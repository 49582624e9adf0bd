//! Statistical primitives for the analyzers
//!
//! Entropy, distribution distances, quantiles, binning, and association
//! measures. Everything here works on plain `f64` slices; the analyzers
//! are responsible for extracting and filtering column values.

use anyhow::{bail, Result};

/// Shannon entropy (base 2) of a probability distribution, ignoring
/// zero-probability entries.
pub fn shannon_entropy(probs: &[f64]) -> f64 {
    probs
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.log2())
        .sum()
}

/// Normalize counts into a probability vector. Counts that sum to zero are
/// returned unchanged, mirroring an all-empty histogram.
pub fn normalize(counts: &[f64]) -> Vec<f64> {
    let sum: f64 = counts.iter().sum();
    if sum > 0.0 {
        counts.iter().map(|&c| c / sum).collect()
    } else {
        counts.to_vec()
    }
}

/// Total variation distance: half the sum of absolute per-entry probability
/// differences. Inputs are normalized first; both slices must share the
/// same index space.
pub fn total_variation(p: &[f64], q: &[f64]) -> f64 {
    debug_assert_eq!(p.len(), q.len());
    let p = normalize(p);
    let q = normalize(q);
    0.5 * p
        .iter()
        .zip(q.iter())
        .map(|(a, b)| (a - b).abs())
        .sum::<f64>()
}

/// First Wasserstein (earth mover's) distance between two 1-D empirical
/// distributions, computed as the integral of the absolute CDF difference.
/// Returns 0.0 when either side is empty (degenerate class).
pub fn wasserstein_1d(u: &[f64], v: &[f64]) -> f64 {
    if u.is_empty() || v.is_empty() {
        return 0.0;
    }
    let mut u_sorted = u.to_vec();
    let mut v_sorted = v.to_vec();
    u_sorted.sort_by(f64::total_cmp);
    v_sorted.sort_by(f64::total_cmp);

    let mut all: Vec<f64> = Vec::with_capacity(u_sorted.len() + v_sorted.len());
    all.extend_from_slice(&u_sorted);
    all.extend_from_slice(&v_sorted);
    all.sort_by(f64::total_cmp);

    let u_n = u_sorted.len() as f64;
    let v_n = v_sorted.len() as f64;
    let mut distance = 0.0;
    for window in all.windows(2) {
        let (x, next) = (window[0], window[1]);
        let delta = next - x;
        if delta == 0.0 {
            continue;
        }
        let u_cdf = u_sorted.partition_point(|&a| a <= x) as f64 / u_n;
        let v_cdf = v_sorted.partition_point(|&a| a <= x) as f64 / v_n;
        distance += (u_cdf - v_cdf).abs() * delta;
    }
    distance
}

/// Linear-interpolation quantile over an ascending-sorted slice, q in [0,1].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

fn linspace(start: f64, end: f64, segments: usize) -> Vec<f64> {
    let mut edges = Vec::with_capacity(segments + 1);
    for i in 0..=segments {
        edges.push(start + (end - start) * i as f64 / segments as f64);
    }
    edges
}

/// Freedman–Diaconis-style bin edges over ascending-sorted values:
/// width h = 2·IQR·n^(−1/3), falling back to range/`numeric_bins` when the
/// IQR is zero and to 1 when even that degenerates. Equal min and max get
/// a single padded bin.
pub fn fd_bin_edges(sorted: &[f64], numeric_bins: usize) -> Vec<f64> {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    let min = sorted[0];
    let max = sorted[n - 1];
    if min == max {
        return vec![min - 0.5, max + 0.5];
    }
    let iqr = quantile_sorted(sorted, 0.75) - quantile_sorted(sorted, 0.25);
    let mut h = if iqr > 0.0 {
        2.0 * iqr * (n as f64).powf(-1.0 / 3.0)
    } else {
        (max - min) / numeric_bins.max(1) as f64
    };
    if h == 0.0 || h.is_nan() {
        h = 1.0;
    }
    let bin_count = (((max - min) / h).ceil() as usize).max(1);
    linspace(min, max, bin_count)
}

/// Quantile bin edges: `numeric_bins + 1` evenly spaced quantile cut points
/// over ascending-sorted values, de-duplicated. A fully degenerate column
/// gets a single padded bin.
pub fn quantile_bin_edges(sorted: &[f64], numeric_bins: usize) -> Vec<f64> {
    debug_assert!(!sorted.is_empty());
    let segments = numeric_bins.max(1);
    let mut edges: Vec<f64> = (0..=segments)
        .map(|i| quantile_sorted(sorted, i as f64 / segments as f64))
        .collect();
    edges.dedup();
    if edges.len() < 2 {
        let v = edges[0];
        return vec![v - 0.5, v + 0.5];
    }
    edges
}

/// Histogram counts over shared bin edges. Bin i covers
/// [edges[i], edges[i+1]); the final bin includes its upper edge. Values
/// outside the edge range are dropped, as are NaNs.
pub fn histogram(values: &[f64], edges: &[f64]) -> Vec<f64> {
    if edges.len() < 2 {
        return Vec::new();
    }
    let bins = edges.len() - 1;
    let last = edges[bins];
    let mut counts = vec![0.0; bins];
    for &v in values {
        // NaN compares false against both range guards; drop it explicitly.
        if v.is_nan() || v < edges[0] || v > last {
            continue;
        }
        let idx = if v == last {
            bins - 1
        } else {
            edges.partition_point(|&e| e <= v) - 1
        };
        counts[idx] += 1.0;
    }
    counts
}

/// Pearson correlation over paired observations. `None` when fewer than two
/// pairs exist or either side has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&a, &b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Chi-square statistic of a contingency table, without continuity
/// correction. Fails on an empty table or zero grand total.
pub fn chi_square(table: &[Vec<f64>]) -> Result<f64> {
    let rows = table.len();
    let cols = table.first().map(|r| r.len()).unwrap_or(0);
    if rows == 0 || cols == 0 {
        bail!("contingency table is empty");
    }
    let row_sums: Vec<f64> = table.iter().map(|r| r.iter().sum()).collect();
    let col_sums: Vec<f64> = (0..cols)
        .map(|c| table.iter().map(|r| r[c]).sum())
        .collect();
    let total: f64 = row_sums.iter().sum();
    if total == 0.0 {
        bail!("contingency table has zero total");
    }
    let mut chi2 = 0.0;
    for r in 0..rows {
        for c in 0..cols {
            let expected = row_sums[r] * col_sums[c] / total;
            if expected > 0.0 {
                let d = table[r][c] - expected;
                chi2 += d * d / expected;
            }
        }
    }
    Ok(chi2)
}
