//! Telemetry counters. Observed only — nothing here feeds back into
//! control flow, per spec §7's propagation policy.

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-source counters, grounded in the teacher's `InputStats`/`JitterStats`
/// atomic-counter structs.
#[derive(Default)]
pub struct SourceStats {
    pub samples_written: AtomicU64,
    pub samples_read: AtomicU64,
    pub ring_overflows: AtomicU64,
    pub starvations: AtomicU64,
    pub frames_mixed: AtomicU64,
}

impl SourceStats {
    pub fn snapshot(&self) -> SourceStatsSnapshot {
        SourceStatsSnapshot {
            samples_written: self.samples_written.load(Ordering::Relaxed),
            samples_read: self.samples_read.load(Ordering::Relaxed),
            ring_overflows: self.ring_overflows.load(Ordering::Relaxed),
            starvations: self.starvations.load(Ordering::Relaxed),
            frames_mixed: self.frames_mixed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStatsSnapshot {
    pub samples_written: u64,
    pub samples_read: u64,
    pub ring_overflows: u64,
    pub starvations: u64,
    pub frames_mixed: u64,
}

/// Mixer-wide counters not tied to a single source.
#[derive(Default)]
pub struct MixerStats {
    pub cadence_slips: AtomicU64,
    pub sources_created: AtomicU64,
    pub malformed_packets: AtomicU64,
    pub frames_emitted: AtomicU64,
}

impl MixerStats {
    pub fn snapshot(&self) -> MixerStatsSnapshot {
        MixerStatsSnapshot {
            cadence_slips: self.cadence_slips.load(Ordering::Relaxed),
            sources_created: self.sources_created.load(Ordering::Relaxed),
            malformed_packets: self.malformed_packets.load(Ordering::Relaxed),
            frames_emitted: self.frames_emitted.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MixerStatsSnapshot {
    pub cadence_slips: u64,
    pub sources_created: u64,
    pub malformed_packets: u64,
    pub frames_emitted: u64,
}
