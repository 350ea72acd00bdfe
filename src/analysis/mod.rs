//! Tempo analysis modules
//!
//! The pipeline flows strictly forward:
//! onset envelope -> beat picking -> BPM samples -> smoothed tempo curve.
//! The trait abstraction allows swapping estimation backends without
//! changing pipeline code.

pub mod envelope;
pub mod flux;
pub mod peaks;
pub mod spline;
pub mod tempo;
pub mod traits;

pub use flux::FluxTempoEstimator;
pub use traits::TempoEstimator;
