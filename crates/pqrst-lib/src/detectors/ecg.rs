use crate::{
    config::DelineationConfig,
    filters::{slope, smooth},
    signal::{Events, Segment},
};
use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Flat,
    Rising,
}

/// Detect R-peaks in one segment.
///
/// The smoothed signal's slope is walked with a two-state machine: a slope
/// above `+threshold` opens a rising edge, a slope below `-threshold`
/// closes it and emits the local maximum just before the closing point.
/// Candidates within `r_peak_min_distance` samples of the previous accepted
/// peak are dropped. Indices refer to the segment's original samples.
pub fn detect_r_peaks(segment: &Segment, cfg: &DelineationConfig) -> Events {
    let smoothed = smooth(segment.samples(), cfg.smooth_window_size);
    let slope = slope(&smoothed);
    let threshold = cfg.r_peak_slope_threshold;

    let mut edge = Edge::Flat;
    let mut peaks: Vec<usize> = Vec::new();
    for (i, &s) in slope.iter().enumerate().skip(1) {
        match edge {
            Edge::Flat if s > threshold => edge = Edge::Rising,
            Edge::Rising if s < -threshold => {
                edge = Edge::Flat;
                let mut j = i;
                while j > 0 && smoothed[j].voltage < smoothed[j - 1].voltage {
                    j -= 1;
                }
                let accepted = peaks
                    .last()
                    .map_or(true, |&prev| j.saturating_sub(prev) > cfg.r_peak_min_distance);
                if accepted {
                    peaks.push(j);
                } else {
                    trace!("dropping R-peak candidate at sample {j}: too close to previous");
                }
            }
            _ => {}
        }
    }
    Events::from_indices(peaks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{split_segments, Sample};

    fn segment(values: &[f64]) -> Segment {
        let samples: Vec<Sample> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Sample::new(i as f64 * 10.0, v))
            .collect();
        split_segments(&samples).remove(0)
    }

    fn spikes(len: usize, at: &[usize]) -> Vec<f64> {
        let mut data = vec![0.0; len];
        for &c in at {
            for (offset, v) in [0.3, 1.0, 1.5, 1.0, 0.3].into_iter().enumerate() {
                data[c + offset - 2] = v;
            }
        }
        data
    }

    #[test]
    fn detects_each_spike_once() {
        let seg = segment(&spikes(200, &[20, 80, 140]));
        let events = detect_r_peaks(&seg, &DelineationConfig::default());
        assert_eq!(events.indices, vec![20, 80, 140]);
    }

    #[test]
    fn suppresses_peaks_within_min_distance() {
        let seg = segment(&spikes(200, &[20, 40, 100]));
        let events = detect_r_peaks(&seg, &DelineationConfig::default());
        assert_eq!(events.indices, vec![20, 100]);
        let cfg = DelineationConfig {
            r_peak_min_distance: 10,
            ..DelineationConfig::default()
        };
        assert_eq!(detect_r_peaks(&seg, &cfg).indices, vec![20, 40, 100]);
    }

    #[test]
    fn flat_signal_has_no_peaks() {
        let seg = segment(&[0.2; 100]);
        assert!(detect_r_peaks(&seg, &DelineationConfig::default()).is_empty());
    }

    #[test]
    fn ignores_slow_waves() {
        let data: Vec<f64> = (0..300)
            .map(|i| 0.2 * (i as f64 * std::f64::consts::PI / 50.0).sin())
            .collect();
        let seg = segment(&data);
        assert!(detect_r_peaks(&seg, &DelineationConfig::default()).is_empty());
    }
}
