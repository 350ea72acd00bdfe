//! Tempo curve synthesis from beat timestamps
//!
//! Converts consecutive beat timestamps into instantaneous BPM samples
//! (`60 / dt`, positioned at the left beat of each pair), then fits a
//! smoothing spline whose roughness budget scales with the sample count
//! so short tracks are not over-fit and long tracks are not under-smoothed.
//! The curve is evaluated over the full envelope time grid and extends its
//! boundary values as constants beyond the fitted range.

use crate::analysis::spline::SmoothingSpline;
use crate::error::{Result, TempotraceError};
use crate::types::BpmSample;
use tracing::debug;

/// Default spline polynomial degree
pub const DEFAULT_DEGREE: usize = 2;

/// Default smoothing-penalty budget per BPM sample
pub const DEFAULT_SMOOTHING_PER_SAMPLE: f64 = 500.0;

/// Tempo synthesis parameters
#[derive(Debug, Clone, Copy)]
pub struct TempoConfig {
    /// Spline polynomial degree
    pub degree: usize,
    /// Smoothing budget multiplier; total budget is `this * sample_count`
    pub smoothing_per_sample: f64,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            degree: DEFAULT_DEGREE,
            smoothing_per_sample: DEFAULT_SMOOTHING_PER_SAMPLE,
        }
    }
}

/// Smoothed tempo function over the full envelope time range
#[derive(Debug, Clone)]
pub struct TempoCurve {
    spline: SmoothingSpline,
    times: Vec<f64>,
    values: Vec<f64>,
}

impl TempoCurve {
    /// Grid times the curve was evaluated at (the envelope frame times)
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// BPM values on the grid, one per grid time
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Evaluate the curve at an arbitrary time
    ///
    /// Times before the first BPM sample or after the last return the
    /// respective boundary value exactly (constant extension).
    pub fn sample(&self, t: f64) -> f64 {
        self.spline.eval(t)
    }

    /// Fitted domain: time range of the underlying BPM samples
    pub fn domain(&self) -> (f64, f64) {
        self.spline.domain()
    }
}

/// Compute raw BPM samples from beat timestamps
///
/// N beats yield N-1 samples; each sample sits at the left beat of its pair.
/// Beat times must be strictly increasing, so every `dt` is positive and the
/// resulting BPM values are positive and finite.
pub fn bpm_samples(beats: &[f64]) -> Vec<BpmSample> {
    beats
        .windows(2)
        .map(|pair| BpmSample {
            time: pair[0],
            bpm: 60.0 / (pair[1] - pair[0]),
        })
        .collect()
}

/// Synthesize the smoothed tempo curve for a track
///
/// `beats` must hold at least two strictly increasing timestamps; `grid` is
/// the full envelope time grid the curve is evaluated on. Returns the raw
/// BPM samples alongside the fitted curve for diagnostic use.
///
/// Fails with `InsufficientData` when fewer than `degree + 1` BPM samples
/// exist; the driver reports this per-track without aborting the batch.
pub fn synthesize(
    beats: &[f64],
    grid: &[f64],
    config: &TempoConfig,
) -> Result<(Vec<BpmSample>, TempoCurve)> {
    if beats.len() < 2 {
        return Err(TempotraceError::InsufficientData {
            have: beats.len().saturating_sub(1),
            need: config.degree + 1,
        });
    }

    let samples = bpm_samples(beats);
    if samples.len() < config.degree + 1 {
        return Err(TempotraceError::InsufficientData {
            have: samples.len(),
            need: config.degree + 1,
        });
    }

    let x: Vec<f64> = samples.iter().map(|s| s.time).collect();
    let y: Vec<f64> = samples.iter().map(|s| s.bpm).collect();
    let smoothing = config.smoothing_per_sample * samples.len() as f64;

    let spline = SmoothingSpline::fit(&x, &y, config.degree, smoothing)?;

    debug!(
        "Fitted tempo curve through {} BPM samples (smoothing budget {:.0})",
        samples.len(),
        smoothing
    );

    let values: Vec<f64> = grid.iter().map(|&t| spline.eval(t)).collect();
    let curve = TempoCurve {
        spline,
        times: grid.to_vec(),
        values,
    };

    Ok((samples, curve))
}
