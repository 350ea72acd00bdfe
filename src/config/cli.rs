//! CLI argument parsing and configuration

use clap::Parser;
use std::path::PathBuf;

/// tempotrace - batch tempo-curve estimation for audio files
///
/// Detects rhythmic onsets in each track, converts inter-beat intervals
/// into BPM samples, and fits a smoothed tempo curve over the full track.
/// Results are written as JSON for downstream plotting tools.
#[derive(Parser, Debug)]
#[command(name = "tempotrace")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Input path (file or directory)
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// Output directory for JSON results
    #[arg(short, long, value_name = "DIR", default_value = "./output")]
    pub output: PathBuf,

    /// Adaptive-threshold multiplier applied to the mean onset strength
    #[arg(long, value_name = "RATIO", default_value = "1.2")]
    pub threshold: f64,

    /// Suppression half-window for beat picking, in frames
    #[arg(long, value_name = "FRAMES", default_value = "7")]
    pub window: usize,

    /// Number of worker threads (defaults to CPU count - 1)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Scan subdirectories recursively
    #[arg(short, long, default_value = "true")]
    pub recursive: bool,

    /// Write per-track beats and tempo curves to JSON
    #[arg(long, default_value = "true")]
    pub json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress progress bars)
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}
