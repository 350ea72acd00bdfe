//! Runtime configuration settings

use std::path::PathBuf;

/// Runtime settings for the analysis pipeline
#[derive(Debug, Clone)]
pub struct Settings {
    /// Input path (file or directory)
    pub input: PathBuf,
    /// Output directory
    pub output: PathBuf,
    /// Adaptive-threshold multiplier for beat picking
    pub threshold_ratio: f64,
    /// Suppression half-window in frames
    pub half_window: usize,
    /// Number of analysis worker threads
    pub analysis_threads: usize,
    /// Scan recursively
    pub recursive: bool,
    /// Output JSON
    pub output_json: bool,
    /// Show progress bars
    pub show_progress: bool,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Self {
        let total_cores = num_cpus::get();
        let default_threads = total_cores.saturating_sub(1).max(1);
        let analysis_threads = cli.threads.unwrap_or(default_threads);

        Self {
            input: cli.input.clone(),
            output: cli.output.clone(),
            threshold_ratio: cli.threshold,
            half_window: cli.window,
            analysis_threads,
            recursive: cli.recursive,
            output_json: cli.json,
            show_progress: !cli.quiet,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            output: PathBuf::from("./output"),
            threshold_ratio: crate::analysis::peaks::DEFAULT_THRESHOLD_RATIO,
            half_window: crate::analysis::peaks::DEFAULT_HALF_WINDOW,
            analysis_threads: num_cpus::get().saturating_sub(1).max(1),
            recursive: true,
            output_json: true,
            show_progress: true,
        }
    }
}
