//! Stateless conditioning filters over ordered `(time, value)` samples.
//!
//! Every filter returns a sequence of the same length as its input and
//! keeps each sample's timestamp. Windows shrink at the edges instead of
//! wrapping.

use crate::config::{BaselineFilter, BaselineFilterOptions};
use crate::signal::Sample;

/// Centered moving average over `[idx - floor(w/2), idx + ceil(w/2))`.
pub fn smooth(data: &[Sample], window: usize) -> Vec<Sample> {
    let window = window.max(1);
    let before = window / 2;
    let after = window - before;
    let prefix = prefix_sums(data);
    (0..data.len())
        .map(|idx| {
            let start = idx.saturating_sub(before);
            let end = (idx + after).min(data.len());
            let mean = (prefix[end] - prefix[start]) / (end - start) as f64;
            Sample::new(data[idx].time, mean)
        })
        .collect()
}

/// Symmetric mean over `[idx - w/2, idx + w/2]`.
pub fn mean_filter(data: &[Sample], window: usize) -> Vec<Sample> {
    let half = window / 2;
    let prefix = prefix_sums(data);
    (0..data.len())
        .map(|idx| {
            let (start, end) = symmetric_bounds(idx, half, data.len());
            let mean = (prefix[end] - prefix[start]) / (end - start) as f64;
            Sample::new(data[idx].time, mean)
        })
        .collect()
}

/// Symmetric median over `[idx - w/2, idx + w/2]`. Even-length windows
/// (only possible at the edges) take the lower of the two middle values.
pub fn median_filter(data: &[Sample], window: usize) -> Vec<Sample> {
    let half = window / 2;
    let mut scratch = Vec::with_capacity(2 * half + 1);
    (0..data.len())
        .map(|idx| {
            let (start, end) = symmetric_bounds(idx, half, data.len());
            scratch.clear();
            scratch.extend(data[start..end].iter().map(|s| s.voltage));
            scratch.sort_by(f64::total_cmp);
            Sample::new(data[idx].time, scratch[(scratch.len() - 1) / 2])
        })
        .collect()
}

/// Exponential low-pass: `y[0] = x[0]`, `y[i] = a*x[i] + (1-a)*y[i-1]`.
pub fn low_pass(data: &[Sample], alpha: f64) -> Vec<Sample> {
    let Some(first) = data.first() else {
        return Vec::new();
    };
    let mut prev = first.voltage;
    data.iter()
        .map(|s| {
            prev = alpha * s.voltage + (1.0 - alpha) * prev;
            Sample::new(s.time, prev)
        })
        .collect()
}

/// First-order difference; one element shorter than the input.
pub fn slope(data: &[Sample]) -> Vec<f64> {
    data.windows(2).map(|w| w[1].voltage - w[0].voltage).collect()
}

/// Apply the configured baseline filter.
pub fn baseline(data: &[Sample], filter: BaselineFilter, opts: &BaselineFilterOptions) -> Vec<Sample> {
    match filter {
        BaselineFilter::Lowpass => low_pass(data, opts.alpha),
        BaselineFilter::Mean => mean_filter(data, opts.window_size),
        BaselineFilter::Median => median_filter(data, opts.window_size),
    }
}

fn prefix_sums(data: &[Sample]) -> Vec<f64> {
    let mut out = Vec::with_capacity(data.len() + 1);
    let mut acc = 0.0;
    out.push(acc);
    for s in data {
        acc += s.voltage;
        out.push(acc);
    }
    out
}

fn symmetric_bounds(idx: usize, half: usize, len: usize) -> (usize, usize) {
    (idx.saturating_sub(half), (idx + half + 1).min(len))
}
