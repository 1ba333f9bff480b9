use crate::{
    config::DelineationConfig,
    delineation::{delineate, window_beats, Beat},
    detectors::ecg::detect_r_peaks,
    error::DelineationError,
    metrics::summary::{summarize_recording, summarize_segment, with_intervals, Summary},
    preprocess::aggregate,
    signal::{split_segments, Events, RRSeries, Sample, Segment, TimeSeries},
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Delineation result for one contiguous segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub start_time: f64,
    pub end_time: f64,
    pub summary: Summary,
    pub rr: RRSeries,
    pub beats: Vec<Beat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<Sample>>,
}

/// Delineation result for a whole recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Effective sampling frequency after aggregation (Hz).
    pub fs: f64,
    pub summary: Summary,
    pub segments: Vec<SegmentResult>,
}

/// Run the full pipeline on a uniformly sampled recording.
///
/// Unless `use_direct_data` is set the voltages are first aggregated by
/// [`DelineationConfig::aggregation_ratio`]. Non-finite voltages split
/// the recording into segments.
pub fn process(ts: &TimeSeries, cfg: &DelineationConfig) -> Result<Recording, DelineationError> {
    let (samples, fs) = prepare_samples(ts, cfg)?;
    process_samples(&samples, fs, cfg)
}

/// Run the pipeline on `(time, voltage)` pairs whose time is counted in
/// sample periods (`1/fs` seconds). No aggregation is applied.
pub fn process_direct(
    pairs: &[Sample],
    fs: f64,
    cfg: &DelineationConfig,
) -> Result<Recording, DelineationError> {
    let samples = prepare_direct(pairs, fs)?;
    process_samples(&samples, fs, cfg)
}

/// Millisecond-timed samples and the effective sampling frequency of a
/// uniformly sampled recording, aggregated unless `use_direct_data` is set.
pub fn prepare_samples(
    ts: &TimeSeries,
    cfg: &DelineationConfig,
) -> Result<(Vec<Sample>, f64), DelineationError> {
    check_frequency(ts.fs)?;
    cfg.validate()?;
    if cfg.use_direct_data {
        return Ok((ts.to_samples(), ts.fs));
    }
    let ratio = cfg.aggregation_ratio(ts.fs);
    debug!("aggregating {} samples by {ratio}", ts.len());
    let reduced = TimeSeries {
        fs: ts.fs / ratio as f64,
        data: aggregate(&ts.data, ratio),
    };
    Ok((reduced.to_samples(), reduced.fs))
}

/// Convert direct-timing pairs to milliseconds. Times must be finite and
/// non-decreasing.
pub fn prepare_direct(pairs: &[Sample], fs: f64) -> Result<Vec<Sample>, DelineationError> {
    check_frequency(fs)?;
    let scale = 1000.0 / fs;
    let mut samples = Vec::with_capacity(pairs.len());
    let mut last = f64::NEG_INFINITY;
    for (index, pair) in pairs.iter().enumerate() {
        if !pair.time.is_finite() || pair.time < last {
            return Err(DelineationError::NonMonotonicTime {
                index,
                time: pair.time,
            });
        }
        last = pair.time;
        samples.push(Sample::new(pair.time * scale, pair.voltage));
    }
    Ok(samples)
}

/// Run the pipeline on samples already timestamped in milliseconds.
pub fn process_samples(
    samples: &[Sample],
    fs: f64,
    cfg: &DelineationConfig,
) -> Result<Recording, DelineationError> {
    check_frequency(fs)?;
    cfg.validate()?;
    let segments: Vec<SegmentResult> = split_segments(samples)
        .iter()
        .map(|segment| process_segment(segment, fs, cfg))
        .collect();
    let summaries: Vec<Summary> = segments.iter().map(|s| s.summary).collect();
    let summary = summarize_recording(&summaries);
    debug!(
        "processed {} segments: hr={:?} valid_beats={}",
        segments.len(),
        summary.hr,
        summary.valid_beats
    );
    Ok(Recording {
        fs,
        summary,
        segments,
    })
}

/// R-peaks of every segment, for callers that only need beat timing.
pub fn find_r_peaks(
    samples: &[Sample],
    cfg: &DelineationConfig,
) -> Result<Vec<(Segment, Events)>, DelineationError> {
    cfg.validate()?;
    Ok(split_segments(samples)
        .into_iter()
        .map(|segment| {
            let events = detect_r_peaks(&segment, cfg);
            (segment, events)
        })
        .collect())
}

/// Window, delineate, validate and summarise one segment.
pub fn process_segment(segment: &Segment, fs: f64, cfg: &DelineationConfig) -> SegmentResult {
    let r_peaks = detect_r_peaks(segment, cfg);
    let beats: Vec<Beat> = window_beats(segment, &r_peaks, fs, cfg)
        .into_iter()
        .map(|window| with_intervals(delineate(window, cfg).validated(), fs))
        .collect();
    let peak_times: Vec<f64> = r_peaks
        .indices
        .iter()
        .map(|&i| segment.samples()[i].time)
        .collect();
    let summary = summarize_segment(&beats);
    debug!(
        "segment {:.0}..{:.0}ms: {} beats, {} valid",
        segment.start_time(),
        segment.end_time(),
        beats.len(),
        summary.valid_beats
    );
    SegmentResult {
        start_time: segment.start_time(),
        end_time: segment.end_time(),
        summary,
        rr: RRSeries::from_peak_times(&peak_times),
        beats,
        samples: cfg.debug.then(|| segment.samples().to_vec()),
    }
}

fn check_frequency(fs: f64) -> Result<(), DelineationError> {
    if fs.is_finite() && fs > 0.0 {
        Ok(())
    } else {
        Err(DelineationError::InvalidFrequency(fs))
    }
}
