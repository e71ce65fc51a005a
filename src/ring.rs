//! Per-source jitter-absorbing ring buffer (C1).
//!
//! A fixed-capacity mono `i16` store with a write cursor and a read
//! cursor ("next output"), both offsets mod `capacity`. A write that
//! would lap the read cursor resets both cursors to the origin and
//! marks the buffer starved rather than returning an error — see
//! `spec.md` §4.1 and §9's note on replacing exception-like control
//! with local state transitions.

use std::sync::Arc;

use crate::stats::SourceStats;

pub struct RingBuffer {
    buf: Vec<i16>,
    capacity: usize,
    random_access: bool,
    write_pos: usize,
    read_pos: usize,
    any_write: bool,
    started: bool,
    starved: bool,
    stats: Arc<SourceStats>,
}

impl RingBuffer {
    pub fn new(samples_per_frame: usize, ring_frames: usize, random_access: bool) -> Self {
        Self::with_stats(samples_per_frame, ring_frames, random_access, Arc::new(SourceStats::default()))
    }

    pub fn with_stats(
        samples_per_frame: usize,
        ring_frames: usize,
        random_access: bool,
        stats: Arc<SourceStats>,
    ) -> Self {
        let capacity = samples_per_frame * ring_frames;
        Self {
            buf: vec![0i16; capacity],
            capacity,
            random_access,
            write_pos: 0,
            read_pos: 0,
            any_write: false,
            started: false,
            starved: false,
            stats,
        }
    }

    /// Discards all state and reallocates at the new size.
    pub fn resize(&mut self, samples_per_frame: usize, ring_frames: usize) {
        let capacity = samples_per_frame * ring_frames;
        self.buf = vec![0i16; capacity];
        self.capacity = capacity;
        self.write_pos = 0;
        self.read_pos = 0;
        self.any_write = false;
        self.started = false;
        self.starved = false;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_random_access(&self) -> bool {
        self.random_access
    }

    pub fn has_been_written(&self) -> bool {
        self.any_write
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn starved(&self) -> bool {
        self.starved
    }

    pub fn set_started(&mut self, started: bool) {
        self.started = started;
    }

    /// `(write - read) mod capacity`: the number of readable samples.
    pub fn diff_last_write_next_output(&self) -> usize {
        if self.random_access {
            if self.any_write { self.capacity } else { 0 }
        } else {
            diff(self.write_pos, self.read_pos, self.capacity)
        }
    }

    fn free_space(&self) -> usize {
        self.capacity - diff(self.write_pos, self.read_pos, self.capacity)
    }

    pub fn write(&mut self, samples: &[i16]) -> usize {
        let n = samples.len().min(self.capacity);
        // `>=`, not `>`: a write that exactly consumes the remaining free
        // space still laps the read cursor (modulo-capacity arithmetic can't
        // distinguish "just full" from "empty" any other way).
        if self.started && n > 0 && n >= self.free_space() {
            self.write_pos = 0;
            self.read_pos = 0;
            self.starved = true;
            self.stats.ring_overflows.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            log::warn!("ring buffer overflow: write of {n} samples crossed read cursor, resetting");
        }
        for (i, &s) in samples.iter().take(n).enumerate() {
            self.buf[(self.write_pos + i) % self.capacity] = s;
        }
        self.write_pos = shift(self.write_pos, n as isize, self.capacity);
        if n > 0 {
            self.any_write = true;
        }
        self.stats.samples_written.fetch_add(n as u64, std::sync::atomic::Ordering::Relaxed);
        n
    }

    pub fn read(&mut self, dst: &mut [i16], max_samples: usize) -> usize {
        let n = if self.random_access {
            max_samples.min(dst.len())
        } else {
            max_samples.min(dst.len()).min(self.diff_last_write_next_output())
        };

        for i in 0..n {
            let idx = shift(self.read_pos, i as isize, self.capacity);
            dst[i] = self.buf[idx];
            if self.random_access {
                self.buf[idx] = 0;
            }
        }
        self.read_pos = shift(self.read_pos, n as isize, self.capacity);
        self.stats.samples_read.fetch_add(n as u64, std::sync::atomic::Ordering::Relaxed);
        n
    }

    /// Appends `n` zero samples; does not mark starvation.
    pub fn add_silent(&mut self, n: usize) {
        let n = n.min(self.capacity);
        for i in 0..n {
            self.buf[(self.write_pos + i) % self.capacity] = 0;
        }
        self.write_pos = shift(self.write_pos, n as isize, self.capacity);
        if n > 0 {
            self.any_write = true;
        }
    }

    /// Cursors to origin; marks starved. `started` is left untouched.
    pub fn reset(&mut self) {
        self.write_pos = 0;
        self.read_pos = 0;
        self.starved = true;
    }

    /// Advances the read cursor without copying.
    pub fn shift_read(&mut self, n: isize) {
        self.read_pos = shift(self.read_pos, n, self.capacity);
    }

    /// Sample at offset `i` from the current read cursor, wrapping.
    pub fn index(&self, i: isize) -> i16 {
        self.buf[shift(self.read_pos, i, self.capacity)]
    }
}

fn shift(pos: usize, n: isize, capacity: usize) -> usize {
    let cap = capacity as isize;
    let p = pos as isize;
    (((p + n) % cap + cap) % cap) as usize
}

fn diff(write_pos: usize, read_pos: usize, capacity: usize) -> usize {
    shift(write_pos, -(read_pos as isize), capacity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trip() {
        let mut rb = RingBuffer::new(4, 2, false);
        let written = rb.write(&[1, 2, 3, 4]);
        assert_eq!(written, 4);
        assert_eq!(rb.diff_last_write_next_output(), 4);

        let mut out = [0i16; 4];
        let read = rb.read(&mut out, 4);
        assert_eq!(read, 4);
        assert_eq!(out, [1, 2, 3, 4]);
        assert_eq!(rb.diff_last_write_next_output(), 0);
    }

    #[test]
    fn read_with_nothing_available_returns_zero() {
        let mut rb = RingBuffer::new(4, 2, false);
        let mut out = [9i16; 4];
        let read = rb.read(&mut out, 4);
        assert_eq!(read, 0);
        // normal-mode read doesn't touch dst on a zero-available read
        assert_eq!(out, [9, 9, 9, 9]);
    }

    #[test]
    fn write_clamps_to_capacity() {
        let mut rb = RingBuffer::new(4, 1, false); // capacity 4
        let written = rb.write(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(written, 4);
    }

    #[test]
    fn wrap_write_and_read() {
        let mut rb = RingBuffer::new(2, 2, false); // capacity 4
        rb.write(&[1, 2, 3]);
        let mut out = [0i16; 3];
        rb.read(&mut out, 3);
        assert_eq!(out, [1, 2, 3]);
        // write cursor now at 3, read at 3; write 3 more, should wrap around
        let written = rb.write(&[4, 5, 6]);
        assert_eq!(written, 3);
        let mut out2 = [0i16; 3];
        rb.read(&mut out2, 3);
        assert_eq!(out2, [4, 5, 6]);
    }

    #[test]
    fn overflow_resets_and_marks_starved() {
        // Sc.2: ring_frames=2, F=256, capacity 512, started=true, write 600 -> clamp 512, overflow.
        let mut rb = RingBuffer::new(256, 2, false);
        rb.set_started(true);
        let samples = vec![7i16; 600];
        let written = rb.write(&samples);
        assert_eq!(written, 512);
        assert!(rb.starved());
        assert_eq!(rb.diff_last_write_next_output(), 0);
    }

    #[test]
    fn no_overflow_before_started() {
        let mut rb = RingBuffer::new(4, 1, false); // capacity 4
        // not started: a full-capacity write should not trip the overflow reset
        let written = rb.write(&[1, 2, 3, 4]);
        assert_eq!(written, 4);
        assert!(!rb.starved());
    }

    #[test]
    fn random_access_round_trip_zeros_positions() {
        let mut rb = RingBuffer::new(4, 1, true); // capacity 4
        rb.write(&[10, 20, 30, 40]);
        let mut out = [0i16; 4];
        let read = rb.read(&mut out, 4);
        assert_eq!(read, 4);
        assert_eq!(out, [10, 20, 30, 40]);
        // positions are zeroed after read
        assert_eq!(rb.index(-4), 0);
    }

    #[test]
    fn random_access_reads_exactly_max_samples_even_if_unwritten() {
        let mut rb = RingBuffer::new(4, 1, true);
        let mut out = [9i16; 4];
        let read = rb.read(&mut out, 4);
        assert_eq!(read, 4);
        assert_eq!(out, [0, 0, 0, 0]);
    }

    #[test]
    fn shift_composition_matches_split_shifts() {
        let rb = RingBuffer::new(4, 3, false); // capacity 12
        for n1 in -15..=15isize {
            for n2 in -15..=15isize {
                let a = shift(shift(0, n1, rb.capacity()), n2, rb.capacity());
                let b = shift(0, n1 + n2, rb.capacity());
                assert_eq!(a, b, "n1={n1} n2={n2}");
            }
        }
    }

    #[test]
    fn shift_read_moves_without_copying() {
        let mut rb = RingBuffer::new(4, 1, false); // capacity 4
        rb.write(&[1, 2, 3, 4]);
        rb.shift_read(2);
        assert_eq!(rb.index(0), 3);
        rb.shift_read(-1);
        assert_eq!(rb.index(0), 2);
    }

    #[test]
    fn negative_shift_wraps_backward_through_origin() {
        let rb = RingBuffer::new(4, 1, false);
        assert_eq!(shift(0, -1, rb.capacity()), 3);
        assert_eq!(shift(1, -3, rb.capacity()), 2);
    }

    #[test]
    fn add_silent_wraps_and_advances_write_cursor_without_starving() {
        let mut rb = RingBuffer::new(2, 2, false); // capacity 4
        rb.write(&[1, 2, 3]); // write_pos at 3
        rb.add_silent(3); // wraps: fills 3,0,1 with zero, write_pos -> 2
        assert!(!rb.starved());
        assert!(rb.has_been_written());

        let mut out = [0i16; 4];
        rb.read(&mut out, 4);
        // write left [1, 2, 3, _] at positions 0..3; add_silent(3) then
        // zeros positions 3, 0, 1 (wrapping from write_pos=3), leaving only
        // the sample at position 2 (the original `3`) non-zero.
        assert_eq!(out, [0, 0, 3, 0]);
    }

    #[test]
    fn add_silent_does_not_mark_starvation_even_when_it_would_overflow() {
        let mut rb = RingBuffer::new(4, 1, false); // capacity 4
        rb.write(&[1, 2, 3, 4]); // fills the buffer completely, unstarted
        rb.set_started(true);
        rb.add_silent(4); // would lap the read cursor if this were `write`
        assert!(!rb.starved());
    }

    #[test]
    fn reset_returns_to_origin_marks_starved_and_leaves_started_untouched() {
        let mut rb = RingBuffer::new(4, 2, false); // capacity 8
        rb.write(&[1, 2, 3, 4, 5]);
        rb.set_started(true);

        rb.reset();

        assert_eq!(rb.diff_last_write_next_output(), 0);
        assert!(rb.starved());
        assert!(rb.started(), "reset must not touch `started`");

        // cursors are both at the origin: a fresh write lands at index 0.
        rb.write(&[9]);
        assert_eq!(rb.index(0), 9);
    }

    #[test]
    fn resize_discards_state_and_reallocates_capacity() {
        let mut rb = RingBuffer::new(4, 2, false); // capacity 8
        rb.write(&[1, 2, 3, 4]);
        rb.set_started(true);
        rb.reset();
        assert!(rb.starved());

        rb.resize(2, 3); // capacity 6
        assert_eq!(rb.capacity(), 6);
        assert_eq!(rb.diff_last_write_next_output(), 0);
        assert!(!rb.starved());
        assert!(!rb.started());
        assert!(!rb.has_been_written());

        let written = rb.write(&[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(written, 6, "resized capacity should clamp writes to the new size");
    }
}
