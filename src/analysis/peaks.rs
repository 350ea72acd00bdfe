//! Beat picking over the onset envelope
//!
//! Scans the onset envelope and emits discrete beat timestamps using an
//! adaptive mean-relative threshold and a local-maximum suppression window.
//!
//! Frames whose strength is at or below `threshold_ratio * mean` are
//! suppressed. A surviving frame `i` becomes a beat iff its value is the
//! maximum of the masked window `[i - W, i + W)` (clipped at the envelope
//! bounds, never wrapped). Equal-max ties inside overlapping windows are
//! broken first-occurrence-wins, so no two accepted beats can be closer
//! than `W` frames.

use crate::types::OnsetEnvelope;
use tracing::debug;

/// Default adaptive-threshold multiplier applied to the envelope mean
pub const DEFAULT_THRESHOLD_RATIO: f64 = 1.2;

/// Default suppression half-window in frames
pub const DEFAULT_HALF_WINDOW: usize = 7;

/// Peak picking parameters
#[derive(Debug, Clone, Copy)]
pub struct PeakConfig {
    /// Threshold multiplier `T`: frames at or below `T * mean` are suppressed
    pub threshold_ratio: f64,
    /// Suppression half-window `W` in frames
    pub half_window: usize,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            threshold_ratio: DEFAULT_THRESHOLD_RATIO,
            half_window: DEFAULT_HALF_WINDOW,
        }
    }
}

/// Pick beat timestamps from an onset envelope
///
/// Returns beat times in increasing order. Fewer than two beats is a valid
/// outcome that the caller must treat as a degenerate (no tempo data) result.
pub fn pick_beats(envelope: &OnsetEnvelope, config: &PeakConfig) -> Vec<f64> {
    if envelope.is_empty() {
        return vec![];
    }

    let threshold = config.threshold_ratio * envelope.mean_strength();

    // Masked envelope: only candidate frames retain a nonzero value
    let masked: Vec<f64> = envelope
        .strengths
        .iter()
        .map(|&s| if s > threshold { s } else { 0.0 })
        .collect();

    let n = masked.len();
    let w = config.half_window;
    let mut beats = Vec::new();

    for i in 0..n {
        if masked[i] <= 0.0 {
            continue;
        }

        // Window [i - W, i + W), clipped at the envelope bounds
        let lo = i.saturating_sub(w);
        let hi = (i + w).min(n);

        let window_max = masked[lo..hi].iter().cloned().fold(f64::MIN, f64::max);
        if masked[i] < window_max {
            continue;
        }

        // First-occurrence-wins tie break: reject i if an earlier frame in
        // the window already carries the maximal value.
        if masked[lo..i].iter().any(|&v| v >= window_max) {
            continue;
        }

        beats.push(envelope.times[i]);
    }

    debug!(
        "Picked {} beats from {} frames (threshold {:.4})",
        beats.len(),
        n,
        threshold
    );

    beats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_from(strengths: Vec<f64>) -> OnsetEnvelope {
        let hop_secs = 0.1;
        let times = (0..strengths.len()).map(|i| i as f64 * hop_secs).collect();
        OnsetEnvelope {
            times,
            strengths,
            hop_secs,
        }
    }

    #[test]
    fn test_uniform_envelope_yields_no_beats() {
        let env = envelope_from(vec![1.0; 100]);
        let beats = pick_beats(&env, &PeakConfig::default());
        assert!(beats.is_empty(), "no frame exceeds 1.2x the mean");
    }

    #[test]
    fn test_all_zero_envelope_yields_no_beats() {
        let env = envelope_from(vec![0.0; 50]);
        let beats = pick_beats(&env, &PeakConfig::default());
        assert!(beats.is_empty());
    }

    #[test]
    fn test_empty_envelope() {
        let env = envelope_from(vec![]);
        assert!(pick_beats(&env, &PeakConfig::default()).is_empty());
    }

    #[test]
    fn test_single_spike_yields_single_beat() {
        let mut strengths = vec![0.1; 60];
        strengths[25] = 10.0;
        let env = envelope_from(strengths);
        let beats = pick_beats(&env, &PeakConfig::default());
        assert_eq!(beats.len(), 1);
        assert!((beats[0] - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_spike_at_boundary_uses_clipped_window() {
        // Spikes at the first and last frame must be found without wrapping
        let mut strengths = vec![0.1; 40];
        strengths[0] = 10.0;
        strengths[39] = 10.0;
        let env = envelope_from(strengths);
        let beats = pick_beats(&env, &PeakConfig::default());
        assert_eq!(beats.len(), 2);
        assert_eq!(beats[0], 0.0);
        assert!((beats[1] - 3.9).abs() < 1e-12);
    }

    #[test]
    fn test_competing_spikes_within_window_keep_larger() {
        let mut strengths = vec![0.1; 60];
        strengths[20] = 5.0;
        strengths[23] = 8.0; // within W=7 of frame 20, larger wins
        let env = envelope_from(strengths);
        let beats = pick_beats(&env, &PeakConfig::default());
        assert_eq!(beats.len(), 1);
        assert!((beats[0] - 2.3).abs() < 1e-12);
    }

    #[test]
    fn test_equal_spikes_within_window_first_wins() {
        let mut strengths = vec![0.1; 60];
        strengths[20] = 8.0;
        strengths[24] = 8.0; // exact float tie inside the window
        let env = envelope_from(strengths);
        let beats = pick_beats(&env, &PeakConfig::default());
        assert_eq!(beats.len(), 1, "tie must not admit two close beats");
        assert!((beats[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_spikes_separated_by_window_both_accepted() {
        let mut strengths = vec![0.1; 60];
        strengths[20] = 8.0;
        strengths[30] = 8.0; // 10 frames apart, outside W=7
        let env = envelope_from(strengths);
        let beats = pick_beats(&env, &PeakConfig::default());
        assert_eq!(beats.len(), 2);
    }

    #[test]
    fn test_window_right_bound_is_exclusive() {
        // An equal spike exactly W frames later is outside the first frame's
        // window but sees the first inside its own, so only the first wins.
        let mut strengths = vec![0.1; 60];
        strengths[20] = 8.0;
        strengths[27] = 8.0;
        let env = envelope_from(strengths);
        let beats = pick_beats(&env, &PeakConfig::default());
        assert_eq!(beats.len(), 1);
        assert!((beats[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_beats_respect_minimum_separation() {
        // Deterministic pseudo-random strengths; verify the invariant rather
        // than specific positions.
        let strengths: Vec<f64> = (0..300)
            .map(|i| ((i as f64 * 12.9898).sin() * 43758.5453).fract().abs() * 5.0)
            .collect();
        let env = envelope_from(strengths);
        let config = PeakConfig::default();
        let beats = pick_beats(&env, &config);
        let min_gap = config.half_window as f64 * env.hop_secs;
        for pair in beats.windows(2) {
            assert!(
                pair[1] - pair[0] >= min_gap - 1e-12,
                "beats {} and {} closer than the suppression window",
                pair[0],
                pair[1]
            );
        }
    }
}
