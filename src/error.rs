//! Crate-wide error types.
//!
//! Nearly every failure mode in this crate is a local state transition
//! (ring overflow, mix-time starvation, a cadence slip) rather than a
//! propagated error — see [`crate::eligibility::Eligibility`] and
//! [`crate::stats`]. `ConfigError` is the one place a hard error makes
//! sense, since it fires once at construction, off the real-time path.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("sample_rate must be positive")]
    ZeroSampleRate,
    #[error("samples_per_frame must be positive")]
    ZeroFrameSize,
    #[error("ring_frames must be positive")]
    ZeroRingFrames,
    #[error("gap_interval_samples (S) must be positive")]
    ZeroGapInterval,
    #[error("gap_window_intervals (W) must be positive")]
    ZeroGapWindow,
}
