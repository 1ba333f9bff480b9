use crate::delineation::{Beat, BeatIntervals};
use log::warn;
use serde::{Deserialize, Serialize};

/// Delay after the J-point at which the ST level is sampled (seconds).
pub const ST_OFFSET_S: f64 = 0.080;

/// Aggregate intervals of a segment or a whole recording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Heart rate (beats per minute); `None` with fewer than two beats.
    pub hr: Option<u32>,
    /// Time spanned by the R-R intervals used for `hr` (ms).
    pub hr_duration: Option<f64>,
    /// Number of R-R intervals behind `hr`.
    pub hr_beats: usize,
    pub st: Option<f64>,
    /// Mean PR interval (ms).
    pub pr: Option<f64>,
    /// Mean QRS duration (ms).
    pub qrs: Option<f64>,
    /// Beats that contributed an ST measurement.
    pub valid_beats: usize,
}

/// ST, PR and QRS of a valid beat.
///
/// ST is the voltage `ST_OFFSET_S` after the J-point (the S-wave end),
/// capped at the T-wave start, minus the J-point voltage. When the T-wave
/// starts later than the sample after the J-point, the higher of those two
/// samples serves as the J-point voltage.
pub fn measure_beat(beat: &Beat, fs: f64) -> Option<BeatIntervals> {
    if !beat.valid {
        return None;
    }
    let j_time = beat.s.end_time?;
    let j = beat.index_of(j_time)?;
    let t_start = beat.index_of(beat.t.start_time?)?;
    let raw = beat.raw_samples();

    let mut j_voltage = raw[j].voltage;
    if t_start > j + 1 {
        if let Some(next) = raw.get(j + 1) {
            j_voltage = j_voltage.max(next.voltage);
        }
    }
    let at = (j + (ST_OFFSET_S * fs).floor() as usize).min(t_start);
    let st = raw.get(at)?.voltage - j_voltage;

    Some(BeatIntervals {
        st,
        pr: beat.r.start_time? - beat.p.start_time?,
        qrs: j_time - beat.q.start_time?,
    })
}

/// Attach per-beat intervals; a valid beat without an ST measurement is
/// demoted to invalid.
pub fn with_intervals(mut beat: Beat, fs: f64) -> Beat {
    beat.intervals = measure_beat(&beat, fs);
    if beat.valid && beat.intervals.is_none() {
        warn!(
            "beat at R={:?}ms has no measurable ST level; marking invalid",
            beat.r.peak_time
        );
        beat.valid = false;
    }
    beat
}

/// Summarise one segment's beats (in R-peak order).
pub fn summarize_segment(beats: &[Beat]) -> Summary {
    let mut summary = Summary::default();
    if beats.len() >= 2 {
        let first = beats[0].r.peak_time.unwrap_or_default();
        let last = beats[beats.len() - 1].r.peak_time.unwrap_or_default();
        let intervals = beats.len() - 1;
        let duration = last - first;
        if duration > 0.0 {
            summary.hr_duration = Some(duration);
            summary.hr = Some(heart_rate(duration, intervals));
        }
        summary.hr_beats = intervals;
    }

    let measured: Vec<BeatIntervals> = beats.iter().filter_map(|b| b.intervals).collect();
    summary.st = mean(measured.iter().map(|m| m.st));
    summary.pr = mean(measured.iter().map(|m| m.pr));
    summary.qrs = mean(measured.iter().map(|m| m.qrs));
    summary.valid_beats = measured.len();
    summary
}

/// Combine segment summaries.
///
/// Heart rate pools every segment's R-R time and interval count. PR and
/// QRS are weighted by each segment's valid beats. ST is the plain mean
/// over segments that measured it.
pub fn summarize_recording(segments: &[Summary]) -> Summary {
    let mut summary = Summary::default();
    let mut hr_duration = 0.0;
    let mut pr_sum = 0.0;
    let mut qrs_sum = 0.0;
    for seg in segments {
        if let Some(duration) = seg.hr_duration {
            hr_duration += duration;
            summary.hr_beats += seg.hr_beats;
        }
        let weight = seg.valid_beats as f64;
        pr_sum += seg.pr.unwrap_or_default() * weight;
        qrs_sum += seg.qrs.unwrap_or_default() * weight;
        summary.valid_beats += seg.valid_beats;
    }
    if summary.hr_beats > 0 {
        summary.hr_duration = Some(hr_duration);
        summary.hr = Some(heart_rate(hr_duration, summary.hr_beats));
    }
    if summary.valid_beats > 0 {
        summary.pr = Some(pr_sum / summary.valid_beats as f64);
        summary.qrs = Some(qrs_sum / summary.valid_beats as f64);
    }
    summary.st = mean(segments.iter().filter_map(|s| s.st));
    summary
}

/// Beats per minute from `intervals` R-R intervals spanning `duration_ms`.
fn heart_rate(duration_ms: f64, intervals: usize) -> u32 {
    (60.0 / (duration_ms / 1000.0 / intervals as f64)).round() as u32
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
