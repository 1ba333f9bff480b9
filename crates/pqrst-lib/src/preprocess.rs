//! Peak-preserving downsampling applied before segmentation.

/// A sample jumping further than this from its predecessor is a spike.
pub const SPIKE_JUMP: f64 = 2.0;
/// Recordings whose range stays inside `±CENTER_LIMIT` are left uncentred.
pub const CENTER_LIMIT: f64 = 1.5;

/// Reduce `data` by grouping `ratio` consecutive samples into one.
///
/// A group emits its maximum when the maximum exceeds both its first and
/// last member, its minimum when the minimum undercuts both, and its mean
/// otherwise, so QRS extremes survive the reduction. Spikes are dropped.
/// A missing (non-finite) sample flushes the partial group and is passed
/// through as `NaN`, keeping the gap visible to the segment splitter.
/// A trailing partial group is discarded.
pub fn aggregate(data: &[f64], ratio: usize) -> Vec<f64> {
    let ratio = ratio.max(1);
    let mut out = Vec::with_capacity(data.len() / ratio + 1);
    let mut group: Vec<f64> = Vec::with_capacity(ratio);
    let mut prev: Option<f64> = None;
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;

    for &v in data {
        if !v.is_finite() {
            if !group.is_empty() {
                out.push(reduce_group(&group));
                group.clear();
            }
            out.push(f64::NAN);
            prev = None;
            continue;
        }
        let spike = prev.map_or(false, |p| (v - p).abs() > SPIKE_JUMP);
        prev = Some(v);
        if spike {
            continue;
        }
        max = max.max(v);
        min = min.min(v);
        group.push(v);
        if group.len() >= ratio {
            out.push(reduce_group(&group));
            group.clear();
        }
    }

    if max.is_finite() && !(max < CENTER_LIMIT && min > -CENTER_LIMIT) {
        let middle = (max + min) / 2.0;
        for v in out.iter_mut() {
            *v -= middle;
        }
    }
    out
}

fn reduce_group(group: &[f64]) -> f64 {
    let first = group[0];
    let last = group[group.len() - 1];
    let max = group.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = group.iter().copied().fold(f64::INFINITY, f64::min);
    if max > first && max > last {
        max
    } else if min < first && min < last {
        min
    } else {
        group.iter().sum::<f64>() / group.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_peaks_and_troughs() {
        let out = aggregate(&[0.0, 1.0, 0.2, 0.0, -0.8, 0.1, 0.0, 0.25, 0.5], 3);
        assert_eq!(out, vec![1.0, -0.8, 0.25]);
    }

    #[test]
    fn monotonic_group_takes_the_mean() {
        let out = aggregate(&[0.1, 0.2, 0.3, 0.4], 4);
        assert!((out[0] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn ratio_one_is_identity_for_small_signals() {
        let data = [0.1, -0.3, 1.2, 0.4];
        assert_eq!(aggregate(&data, 1), data.to_vec());
        assert_eq!(aggregate(&data, 0), data.to_vec());
    }

    #[test]
    fn drops_spikes_and_partial_tail() {
        let out = aggregate(&[0.0, 0.1, 5.0, 0.2, 0.1], 2);
        // 5.0 jumps by more than 2 and is skipped; 0.2 also jumps 4.8 from 5.0
        assert_eq!(out.len(), 1);
        assert!((out[0] - 0.05).abs() < 1e-12);
    }

    #[test]
    fn missing_samples_become_gaps() {
        let out = aggregate(&[0.1, f64::NAN, 0.2, 0.3], 2);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], 0.1);
        assert!(out[1].is_nan());
        assert!((out[2] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn large_signals_are_recentred() {
        let out = aggregate(&[3.0, 4.0, 5.0], 1);
        assert_eq!(out, vec![-1.0, 0.0, 1.0]);
    }
}
