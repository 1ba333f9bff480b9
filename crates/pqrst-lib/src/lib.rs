pub mod config;
pub mod delineation;
pub mod detectors;
pub mod error;
pub mod filters;
pub mod io;
pub mod metrics;
pub mod pipeline;
pub mod preprocess;
pub mod signal;

pub use config::{BaselineFilter, BaselineFilterOptions, DelineationConfig};
pub use delineation::{Beat, BeatIntervals, Wave};
pub use error::DelineationError;
pub use metrics::summary::Summary;
pub use pipeline::{process, process_direct, process_samples, Recording, SegmentResult};
pub use signal::*;
