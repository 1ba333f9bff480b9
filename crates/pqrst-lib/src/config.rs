use crate::error::DelineationError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Filter used to estimate the isoelectric baseline of a beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BaselineFilter {
    #[default]
    Lowpass,
    Mean,
    Median,
}

impl BaselineFilter {
    pub const ALL: [BaselineFilter; 3] = [
        BaselineFilter::Lowpass,
        BaselineFilter::Mean,
        BaselineFilter::Median,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BaselineFilter::Lowpass => "LOWPASS",
            BaselineFilter::Mean => "MEAN",
            BaselineFilter::Median => "MEDIAN",
        }
    }
}

impl fmt::Display for BaselineFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaselineFilter {
    type Err = DelineationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DelineationError::UnknownBaselineFilter(s.to_string()))
    }
}

impl TryFrom<String> for BaselineFilter {
    type Error = DelineationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BaselineFilter> for String {
    fn from(value: BaselineFilter) -> Self {
        value.as_str().to_string()
    }
}

/// Parameters shared by the baseline filters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineFilterOptions {
    /// Smoothing factor of the low-pass filter.
    pub alpha: f64,
    /// Window length (samples) of the mean and median filters.
    pub window_size: usize,
}

impl Default for BaselineFilterOptions {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            window_size: 20,
        }
    }
}

/// Configurable parameters for segmentation and wave delineation.
///
/// Built once per recording and handed to every stage by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelineationConfig {
    /// Moving-average window (samples) applied before every slope search.
    pub smooth_window_size: usize,
    /// Minimum per-sample slope of the smoothed signal that opens or closes a QRS upstroke.
    pub r_peak_slope_threshold: f64,
    /// Minimum distance (samples) between two accepted R-peaks.
    pub r_peak_min_distance: usize,
    pub baseline_filter: BaselineFilter,
    pub baseline_filter_options: BaselineFilterOptions,
    /// Minimum distance (samples) between peaks found in the P/T search.
    pub through_min_distance: usize,
    /// Minimum height above the running trough for a P-wave candidate.
    pub min_p_wave_height: f64,
    /// Minimum height above the running trough for a T-wave candidate.
    pub min_t_wave_height: f64,
    /// Downsampling group size. `None` derives it from the sampling frequency.
    pub aggregation: Option<usize>,
    /// Input is already `(time, voltage)` pairs; skip aggregation.
    pub use_direct_data: bool,
    /// Keep the per-beat working buffers in the published result.
    pub debug: bool,
}

impl Default for DelineationConfig {
    fn default() -> Self {
        Self {
            smooth_window_size: 5,
            r_peak_slope_threshold: 0.05,
            r_peak_min_distance: 30,
            baseline_filter: BaselineFilter::Lowpass,
            baseline_filter_options: BaselineFilterOptions::default(),
            through_min_distance: 10,
            min_p_wave_height: 0.0,
            min_t_wave_height: 0.1,
            aggregation: None,
            use_direct_data: false,
            debug: false,
        }
    }
}

impl DelineationConfig {
    pub fn validate(&self) -> Result<(), DelineationError> {
        if self.smooth_window_size == 0 {
            return Err(invalid("smooth_window_size", "must be at least 1"));
        }
        if !(self.r_peak_slope_threshold.is_finite() && self.r_peak_slope_threshold >= 0.0) {
            return Err(invalid(
                "r_peak_slope_threshold",
                format!("must be a non-negative number, got {}", self.r_peak_slope_threshold),
            ));
        }
        let alpha = self.baseline_filter_options.alpha;
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(invalid(
                "baseline_filter_options.alpha",
                format!("must lie in (0, 1], got {alpha}"),
            ));
        }
        if self.baseline_filter_options.window_size == 0 {
            return Err(invalid("baseline_filter_options.window_size", "must be at least 1"));
        }
        if self.aggregation == Some(0) {
            return Err(invalid("aggregation", "must be at least 1"));
        }
        Ok(())
    }

    /// Group size used by the aggregation step for a recording sampled at `fs`.
    pub fn aggregation_ratio(&self, fs: f64) -> usize {
        self.aggregation
            .unwrap_or_else(|| (fs / 100.0).floor() as usize)
            .max(1)
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> DelineationError {
    DelineationError::InvalidOption {
        name,
        reason: reason.into(),
    }
}
