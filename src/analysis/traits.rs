//! Analysis trait abstractions
//!
//! Defines the interface for swappable tempo-estimation backends. The
//! current implementation is the spectral-flux pipeline in `flux.rs`.

use crate::error::Result;
use crate::types::{AudioBuffer, TempoEstimate};

/// Tempo estimation backend
pub trait TempoEstimator: Send + Sync {
    /// Estimate beat timestamps and a tempo curve from audio samples
    ///
    /// A track with fewer than two detectable beats yields
    /// `TempoEstimate::Degenerate`, not an error.
    fn estimate(&self, buffer: &AudioBuffer) -> Result<TempoEstimate>;

    /// Get the name of this estimator (for logging)
    fn name(&self) -> &'static str;
}
