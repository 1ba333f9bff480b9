use serde::{Deserialize, Serialize};

/// Basic typed time series of raw voltages. `NaN` marks a missing sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Uniform sampling frequency in Hz
    pub fs: f64,
    /// Samples
    pub data: Vec<f64>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Pair every voltage with its timestamp in milliseconds.
    pub fn to_samples(&self) -> Vec<Sample> {
        let step = 1000.0 / self.fs;
        self.data
            .iter()
            .enumerate()
            .map(|(idx, &voltage)| Sample::new(idx as f64 * step, voltage))
            .collect()
    }
}

/// One timed voltage reading. `time` is in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub voltage: f64,
}

impl Sample {
    pub fn new(time: f64, voltage: f64) -> Self {
        Self { time, voltage }
    }

    /// `NaN` marks a gap. Infinite readings cannot be filtered either, so
    /// they split the recording the same way.
    pub fn is_missing(&self) -> bool {
        !self.voltage.is_finite()
    }
}

/// Maximal run of consecutive non-missing samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    samples: Vec<Sample>,
}

impl Segment {
    /// Returns `None` for an empty run or one that contains a missing sample.
    pub fn new(samples: Vec<Sample>) -> Option<Self> {
        if samples.is_empty() || samples.iter().any(Sample::is_missing) {
            return None;
        }
        Some(Self { samples })
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    pub fn start_time(&self) -> f64 {
        self.samples.first().map(|s| s.time).unwrap_or_default()
    }
    pub fn end_time(&self) -> f64 {
        self.samples.last().map(|s| s.time).unwrap_or_default()
    }
}

/// Split a recording into segments at every missing sample.
pub fn split_segments(samples: &[Sample]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for sample in samples {
        if sample.is_missing() {
            segments.extend(Segment::new(std::mem::take(&mut current)));
        } else {
            current.push(*sample);
        }
    }
    segments.extend(Segment::new(current));
    segments
}

/// Point events on a segment (R-peak sample indices).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Events {
    pub indices: Vec<usize>,
}

impl Events {
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }
    pub fn len(&self) -> usize {
        self.indices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// RR intervals (seconds)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RRSeries {
    pub rr: Vec<f64>,
}

impl RRSeries {
    /// Build from R-peak timestamps in milliseconds.
    pub fn from_peak_times(times_ms: &[f64]) -> Self {
        let rr = times_ms
            .windows(2)
            .map(|w| (w[1] - w[0]) / 1000.0)
            .collect();
        Self { rr }
    }
}
