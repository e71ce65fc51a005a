//! Interframe gap tracker (C2): a sliding-window max over packet arrival
//! gaps, used as an observable for jitter-buffer sizing telemetry.
//!
//! Per spec §9's open question, this uses a monotonic clock
//! (`std::time::Instant`) rather than wall-clock time — reported gaps are
//! therefore unaffected by wall-clock jumps.

use std::time::{Duration, Instant};

pub struct GapTracker {
    interval_samples: usize,
    window_intervals: usize,
    last_arrival: Option<Instant>,
    interval_max: Duration,
    interval_count: usize,
    intervals: Vec<Duration>,
    newest: usize,
    window_max: Duration,
    has_new_window_result: bool,
}

impl GapTracker {
    pub fn new(interval_samples: usize, window_intervals: usize) -> Self {
        Self {
            interval_samples,
            window_intervals,
            last_arrival: None,
            interval_max: Duration::ZERO,
            interval_count: 0,
            intervals: vec![Duration::ZERO; window_intervals],
            newest: 0,
            window_max: Duration::ZERO,
            has_new_window_result: false,
        }
    }

    pub fn on_frame_received(&mut self, now: Instant) {
        if let Some(prev) = self.last_arrival {
            let gap = now.duration_since(prev);
            if gap > self.interval_max {
                self.interval_max = gap;
            }
            self.interval_count += 1;

            if self.interval_count >= self.interval_samples {
                self.newest = (self.newest + 1) % self.window_intervals;
                self.intervals[self.newest] = self.interval_max;
                self.window_max = self.intervals.iter().copied().max().unwrap_or(Duration::ZERO);
                self.has_new_window_result = true;
                self.interval_max = Duration::ZERO;
                self.interval_count = 0;
            }
        }
        self.last_arrival = Some(now);
    }

    /// Returns the last fully-computed window max, clearing the new-result flag.
    pub fn drain_window_max(&mut self) -> Option<Duration> {
        if self.has_new_window_result {
            self.has_new_window_result = false;
            Some(self.window_max)
        } else {
            None
        }
    }
}
