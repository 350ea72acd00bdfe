//! Integration tests for the tempotrace pipeline
//!
//! These tests verify the full analysis pipeline produces correct output.

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tempotrace::{config::Settings, pipeline};

/// Generate a sine wave WAV file for testing
///
/// Creates a mono 16-bit WAV file at the specified path.
fn generate_sine_wav(path: &Path, frequency_hz: f32, duration_secs: f32, sample_rate: u32) {
    use std::f32::consts::PI;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV file");

    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let amplitude = 0.5f32; // 50% amplitude to avoid clipping

    for i in 0..num_samples {
        let t = i as f32 / sample_rate as f32;
        let sample = (2.0 * PI * frequency_hz * t).sin() * amplitude;
        let sample_i16 = (sample * 32767.0) as i16;
        writer.write_sample(sample_i16).expect("Failed to write sample");
    }

    writer.finalize().expect("Failed to finalize WAV");
}

/// Generate a click track WAV file for tempo testing
///
/// Creates impulses (short bursts) at regular intervals matching the
/// specified BPM. This produces a clear rhythmic signal for the beat picker.
fn generate_click_track(path: &Path, bpm: f32, duration_secs: f32, sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV file");

    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let samples_per_beat = (60.0 / bpm * sample_rate as f32) as usize;

    // Impulse duration: ~5ms (short click)
    let impulse_samples = (0.005 * sample_rate as f32) as usize;

    for i in 0..num_samples {
        let position_in_beat = i % samples_per_beat;

        // Generate impulse at the start of each beat
        let sample = if position_in_beat < impulse_samples {
            // Exponential decay for a more natural click sound
            let decay = (-5.0 * position_in_beat as f32 / impulse_samples as f32).exp();
            0.8 * decay
        } else {
            0.0
        };

        let sample_i16 = (sample * 32767.0) as i16;
        writer
            .write_sample(sample_i16)
            .expect("Failed to write sample");
    }

    writer.finalize().expect("Failed to finalize WAV");
}

/// Read the exported JSON from an output directory
fn read_output_json(output_dir: &Path) -> serde_json::Value {
    let json_content =
        fs::read_to_string(output_dir.join("tempotrace.json")).expect("Failed to read JSON");
    serde_json::from_str(&json_content).expect("Should be valid JSON")
}

/// Median value of the first track's tempo curve
fn curve_median_bpm(json: &serde_json::Value) -> f64 {
    let tracks = json.get("tracks").unwrap().as_array().unwrap();
    let values = tracks[0]
        .get("curve")
        .expect("track should have a tempo curve")
        .get("values")
        .unwrap()
        .as_array()
        .unwrap();
    let mut bpms: Vec<f64> = values.iter().map(|v| v.as_f64().unwrap()).collect();
    bpms.sort_by(|a, b| a.partial_cmp(b).unwrap());
    bpms[bpms.len() / 2]
}

/// Create test settings with progress bars disabled
fn create_test_settings(input: &Path, output: &Path) -> Settings {
    Settings {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        threshold_ratio: 1.2,
        half_window: 7,
        analysis_threads: 2,
        recursive: true,
        output_json: true,
        show_progress: false, // Disable progress bars in tests
    }
}

#[test]
fn test_pipeline_produces_valid_json() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");

    // Generate a 120 BPM click track, 10 seconds long
    let test_wav = input_dir.path().join("click_120bpm.wav");
    generate_click_track(&test_wav, 120.0, 10.0, 44100);

    // Run the pipeline
    let settings = create_test_settings(input_dir.path(), output_dir.path());
    let result = pipeline::run(&settings).expect("Pipeline should succeed");

    assert_eq!(result.total_files, 1, "Should find 1 file");
    assert_eq!(result.successful, 1, "Should fit a tempo curve for 1 file");
    assert_eq!(result.failed, 0, "Should have no failures");

    // Verify JSON file exists
    let json_path = output_dir.path().join("tempotrace.json");
    assert!(json_path.exists(), "tempotrace.json should exist");

    let json = read_output_json(output_dir.path());

    // Verify JSON structure
    assert!(json.is_object(), "Root should be an object");
    assert!(json.get("version").is_some(), "Should have version field");
    assert!(json.get("metadata").is_some(), "Should have metadata field");
    assert!(json.get("tracks").is_some(), "Should have tracks field");

    let tracks = json.get("tracks").unwrap().as_array().unwrap();
    assert_eq!(tracks.len(), 1, "Should have 1 track");

    // Verify track structure
    let track = &tracks[0];
    assert!(track.get("path").is_some(), "Track should have path");
    assert!(
        track.get("duration_seconds").is_some(),
        "Track should have duration_seconds"
    );
    assert_eq!(track.get("status").unwrap().as_str().unwrap(), "tempo");

    let beats = track.get("beats").unwrap().as_array().unwrap();
    assert!(beats.len() >= 15, "10s at 120 BPM should yield many beats");

    let samples = track.get("bpm_samples").unwrap().as_array().unwrap();
    assert_eq!(
        samples.len(),
        beats.len() - 1,
        "One BPM sample per consecutive beat pair"
    );

    let curve = track.get("curve").unwrap();
    let times = curve.get("times").unwrap().as_array().unwrap();
    let values = curve.get("values").unwrap().as_array().unwrap();
    assert_eq!(times.len(), values.len(), "Curve arrays should be parallel");
    assert!(!times.is_empty(), "Curve should span the analysis grid");
}

#[test]
fn test_tempo_curve_tracks_click_tempo() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");

    let test_wav = input_dir.path().join("click_120bpm.wav");
    generate_click_track(&test_wav, 120.0, 10.0, 44100);

    let settings = create_test_settings(input_dir.path(), output_dir.path());
    pipeline::run(&settings).expect("Pipeline should succeed");

    let json = read_output_json(output_dir.path());
    let median = curve_median_bpm(&json);

    assert!(
        (median - 120.0).abs() <= 10.0,
        "120 BPM click track: smoothed curve median {} should be near 120",
        median
    );
}

#[test]
fn test_pipeline_handles_empty_directory() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");

    let settings = create_test_settings(input_dir.path(), output_dir.path());
    let result = pipeline::run(&settings).expect("Pipeline should succeed on empty directory");

    assert_eq!(result.total_files, 0, "Should find 0 files");
    assert_eq!(result.successful, 0, "Should have 0 successful");
    assert_eq!(result.failed, 0, "Should have 0 failures");
    assert_eq!(result.skipped, 0, "Should have 0 skipped");

    // The pipeline skips export when no tracks are analyzed
    let json_path = output_dir.path().join("tempotrace.json");
    assert!(
        !json_path.exists(),
        "tempotrace.json should not exist for empty input"
    );
}

#[test]
fn test_batch_continues_past_corrupt_file() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");

    // Two good click tracks and one file of garbage bytes
    generate_click_track(&input_dir.path().join("track_a.wav"), 120.0, 8.0, 44100);
    fs::write(
        input_dir.path().join("track_b.wav"),
        b"This is not a valid WAV file content!!!!!",
    )
    .expect("Failed to create invalid file");
    generate_click_track(&input_dir.path().join("track_c.wav"), 100.0, 8.0, 44100);

    let settings = create_test_settings(input_dir.path(), output_dir.path());
    let result = pipeline::run(&settings).expect("Pipeline should isolate the corrupt file");

    assert_eq!(result.total_files, 3, "Should find 3 files");
    assert_eq!(result.successful, 2, "Both valid tracks should analyze");
    assert_eq!(
        result.failed + result.skipped,
        1,
        "The corrupt file should be recorded as failed or skipped"
    );

    // The two valid tracks should still be exported
    let json = read_output_json(output_dir.path());
    let tracks = json.get("tracks").unwrap().as_array().unwrap();
    assert_eq!(tracks.len(), 2, "JSON should have the 2 valid tracks");
}

#[test]
fn test_non_rhythmic_audio_is_degenerate_not_error() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");

    // A steady sine has no repeated onsets, so at most one beat is found
    let test_wav = input_dir.path().join("steady_tone.wav");
    generate_sine_wav(&test_wav, 440.0, 5.0, 44100);

    let settings = create_test_settings(input_dir.path(), output_dir.path());
    let result = pipeline::run(&settings).expect("Pipeline should succeed");

    assert_eq!(result.total_files, 1);
    assert_eq!(result.failed, 0, "Sparse beats are never a fatal failure");
    assert_eq!(
        result.successful + result.degenerate + result.skipped,
        1,
        "The track must be accounted for without aborting the batch"
    );

    // A degenerate track (fewer than two beats) is still exported, without a curve
    if result.degenerate == 1 {
        let json = read_output_json(output_dir.path());
        let tracks = json.get("tracks").unwrap().as_array().unwrap();
        assert_eq!(tracks.len(), 1, "Degenerate tracks are still exported");
        assert_eq!(
            tracks[0].get("status").unwrap().as_str().unwrap(),
            "degenerate"
        );
        assert!(
            tracks[0].get("curve").is_none(),
            "Degenerate tracks carry no curve"
        );
    }
}

#[test]
fn test_handles_empty_audio_file() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");

    let empty_file = input_dir.path().join("empty.wav");
    fs::write(&empty_file, b"").expect("Failed to create empty file");

    // Run pipeline - should not panic
    let settings = create_test_settings(input_dir.path(), output_dir.path());
    let result = pipeline::run(&settings).expect("Pipeline should not abort on an empty file");

    assert_eq!(result.successful, 0);
    assert_eq!(
        result.failed + result.skipped,
        1,
        "Empty file should be recorded as failed or skipped"
    );
}

#[test]
fn test_handles_nonexistent_input_gracefully() {
    let output_dir = TempDir::new().expect("Failed to create output temp dir");

    let fake_input = Path::new("/nonexistent/path/that/does/not/exist");
    let settings = create_test_settings(fake_input, output_dir.path());

    // Run pipeline - should return an error, not panic
    let result = pipeline::run(&settings);
    assert!(
        result.is_err(),
        "Pipeline should return error for nonexistent input"
    );
}

#[test]
fn test_analysis_is_deterministic() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");

    let test_wav = input_dir.path().join("click_128bpm.wav");
    generate_click_track(&test_wav, 128.0, 10.0, 44100);

    // Run analysis twice
    let mut medians = Vec::new();
    for _ in 0..2 {
        let output_dir = TempDir::new().expect("Failed to create output temp dir");
        let settings = create_test_settings(input_dir.path(), output_dir.path());
        pipeline::run(&settings).expect("Pipeline should succeed");
        medians.push(curve_median_bpm(&read_output_json(output_dir.path())));
    }

    assert!(
        (medians[0] - medians[1]).abs() < 1e-9,
        "Tempo estimation should be deterministic: got {} and {}",
        medians[0],
        medians[1]
    );
}
