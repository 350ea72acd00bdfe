//! JSON export for downstream plotting and inspection tools

use crate::error::{Result, TempotraceError};
use crate::types::{BpmSample, TempoEstimate, TrackTempo};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// JSON output schema version
const SCHEMA_VERSION: &str = "1.0";

/// Top-level JSON output structure
#[derive(Debug, Serialize, Deserialize)]
pub struct TempotraceJson {
    /// Schema version for forward compatibility
    pub version: String,
    /// Analysis metadata
    pub metadata: ExportMetadata,
    /// Analyzed tracks
    pub tracks: Vec<TrackJson>,
}

/// Export metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// tempotrace version that generated this file
    pub generator_version: String,
    /// Timestamp of export
    pub exported_at: String,
    /// Number of tracks
    pub track_count: usize,
}

/// JSON representation of one analyzed track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackJson {
    /// File path
    pub path: String,
    /// Duration in seconds
    pub duration_seconds: f64,
    /// Decoded sample rate after resampling
    pub sample_rate: u32,
    /// "tempo" when a curve was fitted, "degenerate" when fewer than
    /// two beats were found
    pub status: String,
    /// Beat timestamps in seconds
    pub beats: Vec<f64>,
    /// Instantaneous BPM samples derived from inter-beat intervals
    pub bpm_samples: Vec<BpmSample>,
    /// Smoothed tempo curve evaluated on the analysis grid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve: Option<CurveJson>,
}

/// Tempo curve as parallel time/value arrays
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveJson {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

/// Write analyzed tracks to a JSON file
///
/// Uses atomic write pattern: writes to a temp file first, then renames.
/// This prevents data corruption if the write is interrupted.
pub fn write_json(tracks: &[TrackTempo], output_path: &Path) -> Result<()> {
    // Write to temp file in same directory (ensures same filesystem for atomic rename)
    let temp_path = output_path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| TempotraceError::OutputError {
        path: output_path.to_path_buf(),
        reason: format!("Failed to create temp file: {}", e),
    })?;

    let writer = BufWriter::new(file);

    let output = TempotraceJson {
        version: SCHEMA_VERSION.to_string(),
        metadata: ExportMetadata {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            track_count: tracks.len(),
        },
        tracks: tracks.iter().map(track_to_json).collect(),
    };

    serde_json::to_writer_pretty(writer, &output).map_err(|e| {
        // Clean up temp file on error
        let _ = std::fs::remove_file(&temp_path);
        TempotraceError::OutputError {
            path: output_path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    // Atomic rename: either succeeds completely or fails without modifying target
    std::fs::rename(&temp_path, output_path).map_err(|e| {
        // Clean up temp file on error
        let _ = std::fs::remove_file(&temp_path);
        TempotraceError::OutputError {
            path: output_path.to_path_buf(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })?;

    info!("Wrote {} tracks to {}", tracks.len(), output_path.display());

    Ok(())
}

fn track_to_json(track: &TrackTempo) -> TrackJson {
    let (status, beats, bpm_samples, curve) = match &track.estimate {
        TempoEstimate::Tempo(data) => (
            "tempo".to_string(),
            data.beats.clone(),
            data.samples.clone(),
            Some(CurveJson {
                times: data.curve.times().to_vec(),
                values: data.curve.values().to_vec(),
            }),
        ),
        TempoEstimate::Degenerate { beats } => {
            ("degenerate".to_string(), beats.clone(), Vec::new(), None)
        }
    };

    TrackJson {
        path: track.path.to_string_lossy().to_string(),
        duration_seconds: track.duration_seconds,
        sample_rate: track.sample_rate,
        status,
        beats,
        bpm_samples,
        curve,
    }
}
