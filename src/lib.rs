//! tempotrace - Batch Tempo-Curve Estimation for Audio Files
//!
//! A command-line utility that turns each audio track into a smoothed
//! tempo curve: decode to a mono waveform, compute a spectral-flux onset
//! envelope, pick beat timestamps with an adaptive threshold, convert
//! inter-beat intervals into BPM samples, and fit a smoothing spline over
//! the full track. Results are exported as JSON.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - `config`: CLI argument parsing and runtime settings
//! - `discovery`: File scanning for the batch driver
//! - `audio`: Audio decoding using symphonia
//! - `analysis`: Onset envelope, beat picking, and tempo-curve synthesis
//! - `pipeline`: Parallel processing orchestration
//! - `export`: JSON output
//!
//! # Example
//!
//! ```no_run
//! use tempotrace::{config::Settings, pipeline};
//!
//! let settings = Settings::default();
//! let result = pipeline::run(&settings).expect("Analysis failed");
//! println!("Processed {} tracks", result.successful);
//! ```

pub mod analysis;
pub mod audio;
pub mod config;
pub mod discovery;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod types;

// Re-export key types at crate root
pub use analysis::{FluxTempoEstimator, TempoEstimator};
pub use error::{Result, TempotraceError};
pub use types::{AudioBuffer, BpmSample, OnsetEnvelope, TempoEstimate, TrackTempo};
