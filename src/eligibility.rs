//! Eligibility gate (C6): decides which sources contribute to this
//! frame's mix, per spec §4.5.

use crate::source::SourceState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Buffer has never been written to.
    Skip,
    /// Awaiting the jitter cushion before first use.
    HoldBack,
    /// Insufficient samples at mix time; `started` is cleared.
    Starved,
    /// Has a whole frame ready.
    Eligible,
}

/// Evaluates one source for this frame and updates its transient flags
/// (`buffer.started`, `source.should_mix`) in place.
pub fn evaluate(source: &mut SourceState, samples_per_frame: usize, jitter_samples: usize) -> Eligibility {
    if !source.buffer.has_been_written() {
        source.should_mix = false;
        return Eligibility::Skip;
    }

    let avail = source.buffer.diff_last_write_next_output();

    if !source.buffer.started() && avail <= samples_per_frame + jitter_samples {
        source.should_mix = false;
        return Eligibility::HoldBack;
    }

    if avail < samples_per_frame {
        source.buffer.set_started(false);
        source.should_mix = false;
        source.stats.starvations.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        log::debug!("source {:?} starved: {avail} < {samples_per_frame} samples available", source.id);
        return Eligibility::Starved;
    }

    source.buffer.set_started(true);
    source.should_mix = true;
    Eligibility::Eligible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MixerConfig;
    use crate::source::{SourceId, SourceKind};

    fn new_source() -> SourceState {
        SourceState::new(SourceId::Avatar(1), SourceKind::Avatar, &MixerConfig::default())
    }

    #[test]
    fn never_written_buffer_is_skipped() {
        let mut source = new_source();
        assert_eq!(evaluate(&mut source, 256, 132), Eligibility::Skip);
        assert!(!source.should_mix);
    }

    #[test]
    fn startup_hold_back_then_eligible() {
        // Sc.1: F=256, jitter_samples=132.
        let mut source = new_source();
        let samples = vec![0i16; 256];
        source.buffer.write(&samples);

        // available = 256 <= 256+132: hold back.
        assert_eq!(evaluate(&mut source, 256, 132), Eligibility::HoldBack);
        assert!(!source.should_mix);
        assert!(!source.buffer.started());

        // second write raises available to 512 > 388: eligible.
        source.buffer.write(&samples);
        assert_eq!(evaluate(&mut source, 256, 132), Eligibility::Eligible);
        assert!(source.should_mix);
        assert!(source.buffer.started());
    }

    #[test]
    fn started_source_starves_below_a_full_frame() {
        let mut source = new_source();
        source.buffer.write(&vec![0i16; 512]);
        assert_eq!(evaluate(&mut source, 256, 132), Eligibility::Eligible);

        // drain everything but a partial frame
        let mut sink = vec![0i16; 256];
        source.buffer.read(&mut sink, 256);
        let mut sink2 = vec![0i16; 250];
        source.buffer.read(&mut sink2, 250);

        assert_eq!(evaluate(&mut source, 256, 132), Eligibility::Starved);
        assert!(!source.buffer.started());
        assert!(!source.should_mix);
    }
}
