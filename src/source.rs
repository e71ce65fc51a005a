//! Source state (C3): pose, attenuation, and the per-source ring buffer
//! and gap tracker.

use std::sync::Arc;

use crate::config::MixerConfig;
use crate::gap::GapTracker;
use crate::ring::RingBuffer;
use crate::stats::SourceStats;

/// A position in the horizontal plane plus height. Geometry in
/// `crate::spatial` uses `x`/`z` for angles and folds `y` into distance only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn distance(&self, other: &Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    /// Facing, in degrees.
    pub bearing: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self { position: Vec3::ZERO, bearing: 0.0 }
    }
}

/// Identifies a source. Avatars carry a network-assigned id; injector
/// streams carry the fixed-length stream-id tag from their packet header.
/// Equality (and hence registry/stream-id lookup) is byte-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceId {
    Avatar(u32),
    Injector([u8; 8]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Avatar,
    Injector,
}

/// An avatar is the only kind of source that can also be a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub SourceId);

pub struct SourceState {
    pub id: SourceId,
    pub kind: SourceKind,
    pub buffer: RingBuffer,
    pub tracker: GapTracker,
    pub pose: Pose,
    /// Per-source attenuation ratio in `[0, 1]`.
    pub attenuation_ratio: f32,
    /// Whether this source hears itself when it is also the listener.
    pub loopback: bool,
    /// Transient, recomputed each frame by the eligibility gate.
    pub should_mix: bool,
    pub stats: Arc<SourceStats>,
}

impl SourceState {
    pub fn new(id: SourceId, kind: SourceKind, config: &MixerConfig) -> Self {
        let stats = Arc::new(SourceStats::default());
        Self {
            id,
            kind,
            buffer: RingBuffer::with_stats(
                config.samples_per_frame,
                config.ring_frames,
                false,
                stats.clone(),
            ),
            tracker: GapTracker::new(config.gap_interval_samples, config.gap_window_intervals),
            pose: Pose::default(),
            attenuation_ratio: 1.0,
            loopback: false,
            should_mix: false,
            stats,
        }
    }
}
