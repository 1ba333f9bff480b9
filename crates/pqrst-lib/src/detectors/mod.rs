pub mod ecg;
pub mod peaks;

pub use ecg::*;
pub use peaks::*;
