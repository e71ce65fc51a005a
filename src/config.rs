//! Recognized configuration, with the defaults from the system spec.
//!
//! This crate never loads a file or reads the environment — that's the
//! host's job. `MixerConfig` just derives `serde::Deserialize` so a host
//! config loader can hand us an already-parsed value.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    pub sample_rate: u32,
    pub samples_per_frame: usize,
    pub ring_frames: usize,
    pub jitter_msecs: u32,
    pub gap_interval_samples: usize,
    pub gap_window_intervals: usize,
    pub distance_ratio: f32,
    pub max_off_axis_atten: f32,
    pub phase_amp_ratio_at_90: f32,
    pub phase_delay_at_90: f32,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22_050,
            samples_per_frame: 256,
            ring_frames: 10,
            jitter_msecs: 12,
            gap_interval_samples: 50,
            gap_window_intervals: 32,
            distance_ratio: 10.0,
            max_off_axis_atten: 0.2,
            phase_amp_ratio_at_90: 0.5,
            phase_delay_at_90: 20.0,
        }
    }
}

impl MixerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.samples_per_frame == 0 {
            return Err(ConfigError::ZeroFrameSize);
        }
        if self.ring_frames == 0 {
            return Err(ConfigError::ZeroRingFrames);
        }
        if self.gap_interval_samples == 0 {
            return Err(ConfigError::ZeroGapInterval);
        }
        if self.gap_window_intervals == 0 {
            return Err(ConfigError::ZeroGapWindow);
        }
        Ok(())
    }

    /// Startup jitter cushion, in samples (`jitter_msecs * sample_rate / 1000`).
    pub fn jitter_samples(&self) -> usize {
        (self.jitter_msecs as u64 * self.sample_rate as u64 / 1000) as usize
    }

    /// Ring buffer capacity in mono samples (`samples_per_frame * ring_frames`).
    pub fn ring_capacity(&self) -> usize {
        self.samples_per_frame * self.ring_frames
    }

    /// Wall-clock duration of one frame, for the cadence scheduler.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples_per_frame as f64 / self.sample_rate as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(MixerConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_sample_rate_rejected() {
        let cfg = MixerConfig { sample_rate: 0, ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroSampleRate));
    }

    #[test]
    fn jitter_samples_matches_default_12ms() {
        let cfg = MixerConfig::default();
        // 12ms @ 22050Hz = 264.6 -> 264
        assert_eq!(cfg.jitter_samples(), 264);
    }

    #[test]
    fn ring_capacity_matches_frame_times_ring_frames() {
        let cfg = MixerConfig::default();
        assert_eq!(cfg.ring_capacity(), 256 * 10);
    }

    #[test]
    fn deserializes_from_partial_json_with_defaults() {
        // A host config loader hands us already-parsed JSON; missing keys
        // fall back to `#[serde(default)]` per-field.
        let cfg: MixerConfig = serde_json::from_str(r#"{"sample_rate": 48000}"#).unwrap();
        assert_eq!(cfg.sample_rate, 48000);
        assert_eq!(cfg.samples_per_frame, MixerConfig::default().samples_per_frame);
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = MixerConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: MixerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
