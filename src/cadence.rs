//! Frame cadence control (C8): paces frame emission at the nominal sample
//! rate regardless of wall-clock drift, using a monotonic clock anchored at
//! start (spec §9's open question resolved in favor of `Instant`, not a
//! wall-clock timestamp).

use std::thread;
use std::time::{Duration, Instant};

use crate::stats::MixerStats;

/// Schedules frame `n` at `t0 + n * frame_duration` and sleeps to it at the
/// end of each frame. A slipped deadline is logged and the loop proceeds
/// immediately — frames are never compressed to catch up.
pub struct Cadence {
    t0: Instant,
    frame_duration: Duration,
    frame_index: u64,
}

impl Cadence {
    pub fn new(t0: Instant, frame_duration: Duration) -> Self {
        Self { t0, frame_duration, frame_index: 0 }
    }

    /// The scheduled time of the frame about to be processed.
    pub fn scheduled_time(&self) -> Instant {
        self.t0 + self.frame_duration * self.frame_index as u32
    }

    /// Call once per frame, after that frame's processing is complete.
    /// Sleeps until the next frame's scheduled time, or logs a slip and
    /// returns immediately if that time has already passed.
    pub fn tick(&mut self, now: Instant, stats: &MixerStats) {
        self.frame_index += 1;
        let next = self.scheduled_time();
        if next > now {
            thread::sleep(next - now);
        } else {
            stats.cadence_slips.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            log::warn!("cadence: frame {} slipped by {:?}", self.frame_index, now - next);
        }
    }
}
