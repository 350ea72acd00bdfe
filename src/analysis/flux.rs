//! Spectral-flux tempo estimation
//!
//! The canonical pipeline: onset envelope -> beat picking -> tempo curve.
//! Data flows strictly forward; each stage consumes its input and produces
//! a new owned output, so two runs over the same waveform with the same
//! parameters yield identical results.

use crate::analysis::envelope::{onset_envelope, OnsetConfig};
use crate::analysis::peaks::{pick_beats, PeakConfig};
use crate::analysis::tempo::{synthesize, TempoConfig};
use crate::analysis::traits::TempoEstimator;
use crate::error::Result;
use crate::types::{AudioBuffer, TempoData, TempoEstimate};
use tracing::debug;

/// Tempo estimator based on rectified spectral flux
#[derive(Debug, Clone, Default)]
pub struct FluxTempoEstimator {
    /// Onset envelope extraction parameters
    pub onset: OnsetConfig,
    /// Beat picking parameters
    pub peaks: PeakConfig,
    /// Tempo curve synthesis parameters
    pub tempo: TempoConfig,
}

impl FluxTempoEstimator {
    pub fn new(peaks: PeakConfig) -> Self {
        Self {
            onset: OnsetConfig::default(),
            peaks,
            tempo: TempoConfig::default(),
        }
    }
}

impl TempoEstimator for FluxTempoEstimator {
    fn estimate(&self, buffer: &AudioBuffer) -> Result<TempoEstimate> {
        let envelope = onset_envelope(buffer, &self.onset);
        debug!(
            "Extracted onset envelope: {} frames over {:.2}s",
            envelope.len(),
            buffer.duration
        );

        let beats = pick_beats(&envelope, &self.peaks);
        if beats.len() < 2 {
            debug!("Degenerate beat set ({} beats), no tempo data", beats.len());
            return Ok(TempoEstimate::Degenerate { beats });
        }

        let (samples, curve) = synthesize(&beats, &envelope.times, &self.tempo)?;

        Ok(TempoEstimate::Tempo(TempoData {
            beats,
            samples,
            curve,
        }))
    }

    fn name(&self) -> &'static str {
        "spectral-flux"
    }
}
