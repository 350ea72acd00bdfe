//! Core data types for tempotrace
//!
//! These types represent the domain model and flow through the pipeline:
//! waveform -> onset envelope -> beat timestamps -> BPM samples -> tempo curve.

use crate::analysis::tempo::TempoCurve;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// =============================================================================
// Audio buffer
// =============================================================================

/// Decoded audio samples ready for analysis
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Mono samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Duration in seconds
    pub duration: f64,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        // Guard against division by zero - use 0 duration for invalid sample rate
        let duration = if sample_rate > 0 {
            samples.len() as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self {
            samples,
            sample_rate,
            duration,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// =============================================================================
// Onset envelope
// =============================================================================

/// Frame-wise onset strength signal derived from a waveform
///
/// One strength value per analysis frame. Times start at zero and increase
/// by the frame hop duration; strengths are non-negative (rectified flux).
#[derive(Debug, Clone)]
pub struct OnsetEnvelope {
    /// Frame times in seconds, evenly spaced by `hop_secs`
    pub times: Vec<f64>,
    /// Onset strength per frame, >= 0
    pub strengths: Vec<f64>,
    /// Time step between consecutive frames in seconds
    pub hop_secs: f64,
}

impl OnsetEnvelope {
    /// Number of analysis frames
    pub fn len(&self) -> usize {
        self.strengths.len()
    }

    /// Check if the envelope has no frames
    pub fn is_empty(&self) -> bool {
        self.strengths.is_empty()
    }

    /// Mean onset strength over the whole envelope
    pub fn mean_strength(&self) -> f64 {
        if self.strengths.is_empty() {
            return 0.0;
        }
        self.strengths.iter().sum::<f64>() / self.strengths.len() as f64
    }
}

// =============================================================================
// Tempo estimation results
// =============================================================================

/// A single instantaneous BPM observation between two consecutive beats
///
/// `bpm = 60 / dt` for inter-beat interval `dt`, positioned at the left beat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BpmSample {
    /// Time of the left beat of the pair, in seconds
    pub time: f64,
    /// Instantaneous tempo in beats per minute
    pub bpm: f64,
}

/// Successful tempo estimation for one track
#[derive(Debug, Clone)]
pub struct TempoData {
    /// Accepted beat timestamps in seconds, strictly increasing
    pub beats: Vec<f64>,
    /// Raw inter-beat BPM samples (N beats -> N-1 samples)
    pub samples: Vec<BpmSample>,
    /// Smoothed tempo curve over the full envelope time range
    pub curve: TempoCurve,
}

/// Outcome of the tempo pipeline for one track
///
/// `Degenerate` is a defined "no tempo data" result (fewer than two beats),
/// distinct from a processing failure.
#[derive(Debug, Clone)]
pub enum TempoEstimate {
    /// Enough beats were found to synthesize a tempo curve
    Tempo(TempoData),
    /// Fewer than two beats detected; no BPM samples exist
    Degenerate {
        /// Whatever beats were found (zero or one)
        beats: Vec<f64>,
    },
}

impl TempoEstimate {
    /// Returns true for the degenerate "no tempo data" outcome
    pub fn is_degenerate(&self) -> bool {
        matches!(self, TempoEstimate::Degenerate { .. })
    }

    /// Accepted beat timestamps, regardless of outcome
    pub fn beats(&self) -> &[f64] {
        match self {
            TempoEstimate::Tempo(data) => &data.beats,
            TempoEstimate::Degenerate { beats } => beats,
        }
    }
}

/// Complete analysis result for a single track
#[derive(Debug, Clone)]
pub struct TrackTempo {
    /// Original file path
    pub path: PathBuf,
    /// Duration in seconds
    pub duration_seconds: f64,
    /// Analysis sample rate of the decoded waveform
    pub sample_rate: u32,
    /// Tempo estimation outcome
    pub estimate: TempoEstimate,
    /// Timestamp of analysis
    pub analyzed_at: chrono::DateTime<chrono::Utc>,
}

// =============================================================================
// Supported formats
// =============================================================================

/// Audio formats accepted by the batch driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Flac,
    Aiff,
    Ogg,
}

impl AudioFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            "flac" => Some(AudioFormat::Flac),
            "aiff" | "aif" => Some(AudioFormat::Aiff),
            "ogg" => Some(AudioFormat::Ogg),
            _ => None,
        }
    }

    /// Check if a path has a supported extension
    pub fn is_supported_path(path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .is_some()
    }
}
