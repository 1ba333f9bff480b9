use super::{
    beat::{Beat, BeatTrace, Wave},
    window::BeatWindow,
    EDGE_PADDING, SIGNIFICANCE,
};
use crate::{
    config::DelineationConfig,
    filters::{baseline, smooth},
    signal::Sample,
};
use log::trace;

/// Curves every crossing rule is evaluated against, all aligned with the
/// beat's raw samples.
struct Curves {
    smoothed: Vec<Sample>,
    baseline: Vec<Sample>,
    baseline_without_qrs: Vec<Sample>,
}

impl Curves {
    fn build(window: &BeatWindow, cfg: &DelineationConfig) -> Self {
        let raw = &window.samples;
        let padded = pad_edges(raw, EDGE_PADDING);
        let smoothed = smooth(&padded, cfg.smooth_window_size);
        let excluded = hold_over_qrs(&smoothed, window.q_onset, window.s_offset);
        let opts = &cfg.baseline_filter_options;
        let base = baseline(&smoothed, cfg.baseline_filter, opts);
        let base_without_qrs = baseline(&excluded, cfg.baseline_filter, opts);

        let keep = EDGE_PADDING..EDGE_PADDING + raw.len();
        Self {
            smoothed: smoothed[keep.clone()].to_vec(),
            baseline: base[keep.clone()].to_vec(),
            baseline_without_qrs: base_without_qrs[keep].to_vec(),
        }
    }

    fn sm(&self, i: usize) -> f64 {
        self.smoothed[i].voltage
    }
    fn base(&self, i: usize) -> f64 {
        self.baseline[i].voltage
    }
    fn base_nq(&self, i: usize) -> f64 {
        self.baseline_without_qrs[i].voltage
    }
}

/// Resolve the P, Q, R, S and T waves of one beat.
///
/// Indices below are positions in the beat's raw samples: `0..=r` is the
/// left arm including the R-peak, `r..` the right arm. A wave whose rule
/// finds nothing is left unset.
pub fn delineate(window: BeatWindow, cfg: &DelineationConfig) -> Beat {
    let raw = &window.samples;
    let r = window.r_index;
    let curves = Curves::build(&window, cfg);
    let thr = SIGNIFICANCE;

    let left_pos = |time: Option<f64>| {
        time.and_then(|t| raw[..=r].iter().position(|s| s.time == t))
    };
    let right_pos = |time: Option<f64>| {
        time.and_then(|t| raw[r..].iter().position(|s| s.time == t))
            .map(|k| r + k)
    };
    let q_start = left_pos(window.q_onset);
    let s_end = right_pos(window.s_offset);

    // P: upward crossing of baseline+thr after the arm start, and a local
    // maximum back near the baseline before the Q onset.
    let p_from = left_pos(window.p_onset);
    let p_start = match (p_from, q_start) {
        (Some(from), Some(to)) => (from.max(1)..to).find(|&i| {
            curves.sm(i) > curves.sm(i - 1)
                && curves.sm(i - 1) <= curves.base(i - 1) + thr
                && curves.sm(i) >= curves.base(i) + thr
        }),
        _ => None,
    };
    let p_end = q_start.and_then(|q| {
        (1..=q.min(r.saturating_sub(1))).rev().find(|&i| {
            curves.sm(i) > curves.sm(i + 1)
                && curves.sm(i) >= curves.base(i)
                && curves.sm(i) <= curves.base_nq(i) + thr
                && curves.sm(i + 1) <= curves.base_nq(i + 1) + thr
        })
    });
    let p = match (p_start, p_end) {
        (Some(start), Some(end)) if start < end => {
            let peak = first_extreme(&curves.smoothed, start..end, |a, b| a > b);
            Wave::located(raw[start], raw[end], raw[peak])
        }
        _ => Wave::default(),
    };

    // Q: last dip to the baseline before the upstroke into R.
    let q_end = (q_start.unwrap_or(0)..r).rev().find(|&i| {
        curves.sm(i) < curves.sm(i + 1)
            && curves.sm(i) <= curves.base(i) + thr
            && curves.sm(i + 1) >= curves.base(i + 1) + thr
    });
    let q = match (q_start, q_end) {
        (Some(start), Some(end)) if start < end => {
            let peak = last_extreme(&curves.smoothed, start..end, |a, b| a < b);
            Wave::located(raw[start], raw[end], raw[peak])
        }
        _ => Wave::default(),
    };

    // R: from the Q end to where the downstroke reaches the baseline.
    let r_end = s_end.and_then(|s| {
        (r + 1..s).find(|&i| {
            curves.sm(i - 1) >= curves.sm(i) && curves.sm(i) <= curves.base(i) + thr
        })
    });
    let r_wave = match (q_end, r_end) {
        (Some(start), Some(end)) => Wave::located(raw[start], raw[end], raw[r]),
        _ => Wave::peak_only(raw[r]),
    };

    // S: deepest point between the R end and the provisional S offset.
    let s = match (r_end, s_end) {
        (Some(start), Some(end)) if start < end => {
            let peak = first_extreme(&curves.smoothed, start..end, |a, b| a < b);
            Wave::located(raw[start], raw[end], raw[peak])
        }
        _ => Wave::default(),
    };

    // T: first rise clear of the QRS-free baseline after the S offset (or
    // the right arm start), up to the provisional T end; the peak is taken
    // on the raw signal.
    let t_end = right_pos(window.t_offset).unwrap_or(raw.len() - 1);
    let t_from = s_end.unwrap_or(r + 1).max(1);
    let t_start = (t_from..raw.len()).find(|&i| {
        curves.sm(i) > curves.sm(i - 1) && curves.sm(i) >= curves.base_nq(i) + thr
    });
    let t = match t_start {
        Some(start) if start < t_end => {
            let peak = last_extreme(raw, start..t_end, |a, b| a > b);
            Wave::located(raw[start], raw[t_end], raw[peak])
        }
        _ => Wave::default(),
    };

    trace!(
        "beat at R={:.1}ms: p={p_start:?}..{p_end:?} q={q_start:?}..{q_end:?} r_end={r_end:?} s_end={s_end:?} t={t_start:?}..{t_end}",
        raw[r].time
    );

    let (samples, trace) = if cfg.debug {
        let trace = BeatTrace {
            smoothed: curves.smoothed,
            baseline: curves.baseline,
            baseline_without_qrs: curves.baseline_without_qrs,
        };
        (Some(window.samples.clone()), Some(trace))
    } else {
        (None, None)
    };
    Beat {
        start_time: window.start_time,
        end_time: window.end_time,
        valid: false,
        p,
        q,
        r: r_wave,
        s,
        t,
        intervals: None,
        samples,
        trace,
        raw: window.samples,
    }
}

/// Repeat the first and last sample `n` times on each side.
fn pad_edges(data: &[Sample], n: usize) -> Vec<Sample> {
    let (Some(&first), Some(&last)) = (data.first(), data.last()) else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(data.len() + 2 * n);
    out.extend(std::iter::repeat(first).take(n));
    out.extend_from_slice(data);
    out.extend(std::iter::repeat(last).take(n));
    out
}

/// Replace the signal inside `[q_onset, s_offset]` with the last value seen
/// before it, so the QRS complex does not drag the baseline upward.
fn hold_over_qrs(data: &[Sample], q_onset: Option<f64>, s_offset: Option<f64>) -> Vec<Sample> {
    let (Some(from), Some(to)) = (q_onset, s_offset) else {
        return data.to_vec();
    };
    let mut held: Option<f64> = None;
    data.iter()
        .map(|s| {
            if s.time >= from && s.time <= to {
                Sample::new(s.time, *held.get_or_insert(s.voltage))
            } else {
                held = Some(s.voltage);
                *s
            }
        })
        .collect()
}

/// First index in `range` whose value beats every other under `better`.
fn first_extreme(
    data: &[Sample],
    range: std::ops::Range<usize>,
    better: impl Fn(f64, f64) -> bool,
) -> usize {
    let mut best = range.start;
    for i in range {
        if better(data[i].voltage, data[best].voltage) {
            best = i;
        }
    }
    best
}

/// Last index in `range` whose value is not beaten by any other.
fn last_extreme(
    data: &[Sample],
    range: std::ops::Range<usize>,
    better: impl Fn(f64, f64) -> bool,
) -> usize {
    let mut best = range.start;
    for i in range {
        if !better(data[best].voltage, data[i].voltage) {
            best = i;
        }
    }
    best
}
