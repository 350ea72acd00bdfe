//! Pipeline orchestration
//!
//! Coordinates file discovery, per-track analysis, and export. Each track
//! runs its stages strictly in order (decode -> onset envelope -> beat
//! picking -> tempo curve); tracks are independent and pure given their
//! waveforms, so the batch fans out across a rayon thread pool. Any
//! per-track failure is caught here, logged with the originating file, and
//! never stops sibling tracks.

use crate::analysis::peaks::PeakConfig;
use crate::analysis::{FluxTempoEstimator, TempoEstimator};
use crate::audio;
use crate::config::Settings;
use crate::discovery::{self, DiscoveredFile};
use crate::error::{Result, TempotraceError};
use crate::export;
use crate::types::{TempoEstimate, TrackTempo};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Pipeline result summary
#[derive(Debug)]
pub struct PipelineResult {
    pub total_files: usize,
    pub successful: usize,
    /// Tracks with fewer than two beats: valid "no tempo data" outcomes
    pub degenerate: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Run the full analysis pipeline
pub fn run(settings: &Settings) -> Result<PipelineResult> {
    use std::time::Instant;

    let pipeline_start = Instant::now();

    // Configure thread pool
    configure_thread_pool(settings.analysis_threads)?;

    // Phase 1: Discovery
    info!("Scanning for audio files...");
    let files = discovery::scan(&settings.input, settings.recursive)?;

    if files.is_empty() {
        return Ok(PipelineResult {
            total_files: 0,
            successful: 0,
            degenerate: 0,
            failed: 0,
            skipped: 0,
        });
    }

    info!("Analyzing {} files", files.len());

    // Phase 2: Analysis
    let analysis_start = Instant::now();
    let (tracks, stats) = analyze_files(&files, settings);
    let analysis_elapsed = analysis_start.elapsed();
    let tracks_per_sec = if analysis_elapsed.as_secs_f64() > 0.0 {
        files.len() as f64 / analysis_elapsed.as_secs_f64()
    } else {
        0.0
    };
    info!(
        "Analysis completed in {:.2}s ({:.1} tracks/sec)",
        analysis_elapsed.as_secs_f64(),
        tracks_per_sec
    );

    // Phase 3: Export
    if !tracks.is_empty() && settings.output_json {
        let export_start = Instant::now();
        export_results(&tracks, settings)?;
        info!(
            "Export completed in {:.2}s",
            export_start.elapsed().as_secs_f64()
        );
    }

    info!(
        "Total pipeline time: {:.2}s",
        pipeline_start.elapsed().as_secs_f64()
    );

    Ok(PipelineResult {
        total_files: files.len(),
        successful: stats.successful,
        degenerate: stats.degenerate,
        failed: stats.failed,
        skipped: stats.skipped,
    })
}

/// Configure the Rayon thread pool
fn configure_thread_pool(num_threads: usize) -> Result<()> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        Ok(()) => {
            debug!("Configured thread pool with {} threads", num_threads);
        }
        Err(e) => {
            // If the pool is already initialized (e.g., in tests), that's OK
            if e.to_string().contains("already been initialized") {
                debug!("Thread pool already initialized, using existing pool");
            } else {
                return Err(TempotraceError::ConfigError(format!(
                    "Failed to configure thread pool: {}",
                    e
                )));
            }
        }
    }
    Ok(())
}

/// Analysis statistics
struct AnalysisStats {
    successful: usize,
    degenerate: usize,
    failed: usize,
    skipped: usize,
}

/// Analyze files across the thread pool with per-track failure isolation
fn analyze_files(files: &[DiscoveredFile], settings: &Settings) -> (Vec<TrackTempo>, AnalysisStats) {
    let estimator: Arc<dyn TempoEstimator> = Arc::new(FluxTempoEstimator::new(PeakConfig {
        threshold_ratio: settings.threshold_ratio,
        half_window: settings.half_window,
    }));

    // Progress tracking
    let progress_bar = if settings.show_progress {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    // Counters
    let successful = AtomicUsize::new(0);
    let degenerate = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);

    let tracks: Vec<TrackTempo> = files
        .par_iter()
        .filter_map(|file| {
            let result = analyze_single_file(file, &estimator);

            if let Some(ref pb) = progress_bar {
                pb.inc(1);
                pb.set_message(format!(
                    "{}",
                    file.path.file_name().unwrap_or_default().to_string_lossy()
                ));
            }

            match result {
                Ok(track) => {
                    if track.estimate.is_degenerate() {
                        debug!(
                            "No tempo data for {} ({} beats)",
                            file.path.display(),
                            track.estimate.beats().len()
                        );
                        degenerate.fetch_add(1, Ordering::Relaxed);
                    } else {
                        successful.fetch_add(1, Ordering::Relaxed);
                    }
                    Some(track)
                }
                Err(e) => {
                    if e.is_recoverable() {
                        warn!("Skipping {}: {}", file.path.display(), e);
                        skipped.fetch_add(1, Ordering::Relaxed);
                    } else {
                        error!("Failed {}: {}", file.path.display(), e);
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                    None
                }
            }
        })
        .collect();

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Analysis complete");
    }

    let stats = AnalysisStats {
        successful: successful.load(Ordering::Relaxed),
        degenerate: degenerate.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
        skipped: skipped.load(Ordering::Relaxed),
    };

    (tracks, stats)
}

/// Analyze a single file, surfacing any failure to the caller
///
/// This is the single-track invocation surface: decode, estimate, and
/// return the result or the error as-is (batch isolation happens above).
pub fn analyze_file(
    path: &std::path::Path,
    estimator: &Arc<dyn TempoEstimator>,
) -> Result<TrackTempo> {
    debug!("Analyzing: {}", path.display());

    // Decode audio
    let buffer = audio::decode(path)?;

    // Run tempo estimation
    let estimate = estimator.estimate(&buffer).map_err(|e| {
        // Add file context to analysis errors
        match e {
            TempotraceError::AnalysisError { reason, .. } => TempotraceError::AnalysisError {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        }
    })?;

    match &estimate {
        TempoEstimate::Tempo(data) => {
            debug!(
                "Analyzed {}: {} beats, tempo {:.1} BPM at track center",
                path.file_name().unwrap_or_default().to_string_lossy(),
                data.beats.len(),
                data.curve.sample(buffer.duration / 2.0)
            );
        }
        TempoEstimate::Degenerate { beats } => {
            debug!(
                "Analyzed {}: degenerate ({} beats)",
                path.file_name().unwrap_or_default().to_string_lossy(),
                beats.len()
            );
        }
    }

    Ok(TrackTempo {
        path: path.to_path_buf(),
        duration_seconds: buffer.duration,
        sample_rate: buffer.sample_rate,
        estimate,
        analyzed_at: chrono::Utc::now(),
    })
}

fn analyze_single_file(
    file: &DiscoveredFile,
    estimator: &Arc<dyn TempoEstimator>,
) -> Result<TrackTempo> {
    analyze_file(&file.path, estimator)
}

/// Export analysis results
fn export_results(tracks: &[TrackTempo], settings: &Settings) -> Result<()> {
    // Ensure output directory exists
    std::fs::create_dir_all(&settings.output).map_err(|e| TempotraceError::OutputError {
        path: settings.output.clone(),
        reason: e.to_string(),
    })?;

    let json_path = settings.output.join("tempotrace.json");
    export::write_json(tracks, &json_path)?;

    Ok(())
}
