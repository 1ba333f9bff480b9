use crate::signal::Sample;
use serde::{Deserialize, Serialize};

/// Boundaries and peak of one wave. A field is `None` until located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub peak_time: Option<f64>,
    pub peak_voltage: Option<f64>,
}

impl Wave {
    pub fn located(start: Sample, end: Sample, peak: Sample) -> Self {
        Self {
            start_time: Some(start.time),
            end_time: Some(end.time),
            peak_time: Some(peak.time),
            peak_voltage: Some(peak.voltage),
        }
    }

    /// A wave whose only known point is its peak.
    pub fn peak_only(peak: Sample) -> Self {
        Self {
            peak_time: Some(peak.time),
            peak_voltage: Some(peak.voltage),
            ..Self::default()
        }
    }

    pub fn is_located(&self) -> bool {
        self.start_time.is_some()
            && self.end_time.is_some()
            && self.peak_time.is_some()
            && self.peak_voltage.is_some()
    }
}

/// Per-beat measurements. Durations in milliseconds, ST in signal units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeatIntervals {
    pub st: f64,
    pub pr: f64,
    pub qrs: f64,
}

/// Working buffers of one beat, published only in debug mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeatTrace {
    pub smoothed: Vec<Sample>,
    pub baseline: Vec<Sample>,
    pub baseline_without_qrs: Vec<Sample>,
}

/// One cardiac cycle anchored at an R-peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    pub start_time: f64,
    pub end_time: f64,
    pub valid: bool,
    pub p: Wave,
    pub q: Wave,
    pub r: Wave,
    pub s: Wave,
    pub t: Wave,
    pub intervals: Option<BeatIntervals>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<Sample>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<BeatTrace>,
    #[serde(skip)]
    pub(crate) raw: Vec<Sample>,
}

impl Beat {
    /// Windowed raw samples (left arm, R-peak, right arm).
    pub fn raw_samples(&self) -> &[Sample] {
        &self.raw
    }

    pub fn waves(&self) -> [&Wave; 5] {
        [&self.p, &self.q, &self.r, &self.s, &self.t]
    }

    /// Mark the beat valid iff all five waves were located.
    pub fn validated(mut self) -> Self {
        self.valid = self.waves().iter().all(|w| w.is_located());
        self
    }

    pub(crate) fn index_of(&self, time: f64) -> Option<usize> {
        self.raw.iter().position(|s| s.time == time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(start: f64, peak: f64, end: f64) -> Wave {
        Wave::located(
            Sample::new(start, 0.0),
            Sample::new(end, 0.0),
            Sample::new(peak, 0.5),
        )
    }

    fn beat(p: Wave) -> Beat {
        Beat {
            start_time: 0.0,
            end_time: 500.0,
            valid: false,
            p,
            q: wave(150.0, 160.0, 170.0),
            r: wave(170.0, 180.0, 190.0),
            s: wave(190.0, 200.0, 210.0),
            t: wave(300.0, 350.0, 400.0),
            intervals: None,
            samples: None,
            trace: None,
            raw: Vec::new(),
        }
    }

    #[test]
    fn beat_with_all_waves_is_valid() {
        assert!(beat(wave(50.0, 80.0, 110.0)).validated().valid);
    }

    #[test]
    fn missing_wave_invalidates_beat() {
        assert!(!beat(Wave::default()).validated().valid);
        let partial = Wave {
            end_time: None,
            ..wave(50.0, 80.0, 110.0)
        };
        assert!(!beat(partial).validated().valid);
    }

    #[test]
    fn peak_only_wave_is_not_located() {
        let r = Wave::peak_only(Sample::new(180.0, 1.2));
        assert_eq!(r.peak_voltage, Some(1.2));
        assert!(!r.is_located());
    }

    #[test]
    fn unset_fields_serialize_as_null() {
        let json = serde_json::to_value(Wave::default()).expect("serialize wave");
        assert!(json["start_time"].is_null());
        let json = serde_json::to_value(beat(Wave::default())).expect("serialize beat");
        assert!(json.get("raw").is_none());
        assert!(json.get("trace").is_none());
        assert!(json.get("samples").is_none());
    }
}
