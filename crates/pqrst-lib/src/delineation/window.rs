use super::{is_shallow, FLAT_SLOPE};
use crate::{
    config::DelineationConfig,
    detectors::peaks::{find_peaks, PeakDirection},
    filters::{slope, smooth},
    signal::{Events, Sample, Segment},
};
use log::trace;

/// A beat's raw window plus the first-pass boundary estimates.
///
/// All boundaries are absolute timestamps; downstream stages look the
/// matching sample up again instead of carrying array offsets around.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatWindow {
    /// Left arm, the R-peak, then the right arm.
    pub samples: Vec<Sample>,
    /// Position of the R-peak inside `samples`.
    pub r_index: usize,
    pub start_time: f64,
    pub end_time: f64,
    /// Start of the trimmed left arm; where the P-wave search begins.
    pub p_onset: Option<f64>,
    /// First flat point before the R-peak.
    pub q_onset: Option<f64>,
    /// First flat point after the R-peak.
    pub s_offset: Option<f64>,
    /// Where the T-wave flattens out, or the last right-arm sample.
    pub t_offset: Option<f64>,
}

impl BeatWindow {
    pub fn r_peak(&self) -> Sample {
        self.samples[self.r_index]
    }

    pub fn left(&self) -> &[Sample] {
        &self.samples[..self.r_index]
    }

    pub fn right(&self) -> &[Sample] {
        &self.samples[self.r_index + 1..]
    }
}

/// Cut a segment into one window per R-peak.
///
/// Beats are built in R-peak order: each left arm starts where the previous
/// beat's T-wave was estimated to end.
pub fn window_beats(
    segment: &Segment,
    r_peaks: &Events,
    fs: f64,
    cfg: &DelineationConfig,
) -> Vec<BeatWindow> {
    let samples = segment.samples();
    let mut windows: Vec<BeatWindow> = Vec::with_capacity(r_peaks.len());
    for (i, &r) in r_peaks.indices.iter().enumerate() {
        let Some(&peak) = samples.get(r) else {
            continue;
        };
        let start = match windows.last().and_then(|w| w.t_offset) {
            Some(t) => t,
            None if i == 0 => segment.start_time(),
            None => samples[r_peaks.indices[i - 1]].time,
        };
        let end = r_peaks.indices.get(i + 1).map(|&next| samples[next].time);

        let left: Vec<Sample> = samples
            .iter()
            .filter(|s| s.time >= start && s.time < peak.time)
            .copied()
            .collect();
        let right: Vec<Sample> = samples
            .iter()
            .filter(|s| s.time > peak.time && end.map_or(true, |e| s.time <= e))
            .copied()
            .collect();
        windows.push(build_window(left, peak, right, fs, cfg));
    }
    windows
}

fn build_window(
    left: Vec<Sample>,
    peak: Sample,
    right: Vec<Sample>,
    fs: f64,
    cfg: &DelineationConfig,
) -> BeatWindow {
    let left_slope = slope(&left);
    let q_flat = (0..left_slope.len())
        .rev()
        .find(|&j| left_slope[j].abs() * fs < FLAT_SLOPE);

    let left_cut = p_search_start(&left, fs, cfg);
    let q_onset = q_flat
        .filter(|&q| q >= 1 && q - 1 >= left_cut)
        .map(|q| left[q - 1].time);
    let left = &left[left_cut..];

    let right_slope = slope(&right);
    let s_flat = right_slope
        .iter()
        .position(|&s| s.abs() * fs < FLAT_SLOPE);
    let t_cut = t_search_end(&right, s_flat, fs, cfg);
    let (right, t_offset) = match t_cut {
        Some(cut) if cut > 0 => (&right[..cut], Some(right[cut].time)),
        _ => (&right[..], right.last().map(|s| s.time)),
    };
    let s_offset = s_flat.and_then(|j| right.get(j + 1)).map(|s| s.time);

    trace!(
        "window at R={:.1}ms: left_cut={left_cut} q_flat={q_flat:?} s_flat={s_flat:?} t_cut={t_cut:?}",
        peak.time
    );

    let mut samples = Vec::with_capacity(left.len() + 1 + right.len());
    samples.extend_from_slice(left);
    samples.push(peak);
    samples.extend_from_slice(right);
    BeatWindow {
        r_index: left.len(),
        start_time: left.first().map_or(peak.time, |s| s.time),
        end_time: right.last().map_or(peak.time, |s| s.time),
        p_onset: left.first().map(|s| s.time),
        q_onset,
        s_offset,
        t_offset,
        samples,
    }
}

/// Index at which the left arm is trimmed: walking back from the first
/// P candidate to the point where the smoothed slope turns shallow.
fn p_search_start(left: &[Sample], fs: f64, cfg: &DelineationConfig) -> usize {
    let smoothed = smooth(left, cfg.smooth_window_size);
    let candidates = find_peaks(
        &smoothed,
        PeakDirection::Forward,
        cfg.through_min_distance,
        cfg.min_p_wave_height,
    );
    let Some(&first) = candidates.first() else {
        return 0;
    };
    (1..=first)
        .rev()
        .find(|&j| is_shallow((smoothed[j].voltage - smoothed[j - 1].voltage) * fs))
        .unwrap_or(0)
}

/// Index at which the right arm is trimmed: walking forward from the first
/// T candidate at or after the S offset until the slope turns shallow.
fn t_search_end(
    right: &[Sample],
    s_flat: Option<usize>,
    fs: f64,
    cfg: &DelineationConfig,
) -> Option<usize> {
    let smoothed = smooth(right, cfg.smooth_window_size);
    let candidates = find_peaks(
        &smoothed,
        PeakDirection::Forward,
        cfg.through_min_distance,
        cfg.min_t_wave_height,
    );
    let t_peak = candidates
        .into_iter()
        .find(|&p| s_flat.map_or(true, |s| p >= s))?;
    (t_peak..right.len().saturating_sub(1))
        .find(|&j| is_shallow((smoothed[j + 1].voltage - smoothed[j].voltage) * fs))
}
