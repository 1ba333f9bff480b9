//! Beat windowing and P/Q/R/S/T wave delineation.

pub mod beat;
pub mod waves;
pub mod window;

pub use beat::*;
pub use waves::delineate;
pub use window::{window_beats, BeatWindow};

/// Slope magnitude (volts per second) under which the signal counts as flat.
pub const FLAT_SLOPE: f64 = 2.5;
/// Most negative slope (volts per second) still accepted as the shallow end of a wave.
pub const SHALLOW_DESCENT: f64 = -0.05;
/// Margin over the baseline a crossing must clear to be significant.
pub const SIGNIFICANCE: f64 = 1.0 / 30.0;
/// Samples repeated on each side of a beat before filtering.
pub const EDGE_PADDING: usize = 20;

fn is_shallow(slope: f64) -> bool {
    slope >= SHALLOW_DESCENT && slope.abs() < FLAT_SLOPE
}
